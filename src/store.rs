use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_SPEED_MULTIPLIER;
use crate::types::{Direction, GhostRole, Vec2};

const STORE_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize game data: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("unsupported store version {version} at {path}")]
    UnsupportedVersion { version: u8, path: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostPosition {
    pub ghost_name: GhostRole,
    pub coordinate: Vec2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostSpeedMultiplier {
    pub ghost_name: GhostRole,
    pub speed_multiplier: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GhostData {
    #[serde(default)]
    pub list_alive_ghost: Vec<GhostRole>,
    #[serde(default)]
    pub current_controlling_ghost: Option<GhostRole>,
    #[serde(default)]
    pub ghost_positions: Vec<GhostPosition>,
    #[serde(default)]
    pub ghost_speed_multipliers: Vec<GhostSpeedMultiplier>,
    #[serde(default)]
    pub is_control_inverted: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PacmanData {
    #[serde(default)]
    pub coordinate: Vec2,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub ghost_data: GhostData,
    #[serde(default)]
    pub pacman_data: PacmanData,
}

impl GameData {
    pub fn position_of(&self, role: GhostRole) -> Option<Vec2> {
        self.ghost_data
            .ghost_positions
            .iter()
            .find(|entry| entry.ghost_name == role)
            .map(|entry| entry.coordinate)
    }

    pub fn set_position(&mut self, role: GhostRole, coordinate: Vec2) {
        match self
            .ghost_data
            .ghost_positions
            .iter_mut()
            .find(|entry| entry.ghost_name == role)
        {
            Some(entry) => entry.coordinate = coordinate,
            None => self.ghost_data.ghost_positions.push(GhostPosition {
                ghost_name: role,
                coordinate,
            }),
        }
    }

    pub fn speed_multiplier(&self, role: GhostRole) -> f32 {
        self.ghost_data
            .ghost_speed_multipliers
            .iter()
            .find(|entry| entry.ghost_name == role)
            .map(|entry| entry.speed_multiplier)
            .filter(|value| value.is_finite() && *value >= 0.0)
            .unwrap_or(DEFAULT_SPEED_MULTIPLIER)
    }

    pub fn set_speed_multiplier(&mut self, role: GhostRole, speed_multiplier: f32) {
        match self
            .ghost_data
            .ghost_speed_multipliers
            .iter_mut()
            .find(|entry| entry.ghost_name == role)
        {
            Some(entry) => entry.speed_multiplier = speed_multiplier,
            None => self
                .ghost_data
                .ghost_speed_multipliers
                .push(GhostSpeedMultiplier {
                    ghost_name: role,
                    speed_multiplier,
                }),
        }
    }

    pub fn is_alive(&self, role: GhostRole) -> bool {
        self.ghost_data.list_alive_ghost.contains(&role)
    }
}

pub trait GameDataStore {
    fn load(&self) -> Result<GameData, StoreError>;
    fn save(&mut self, data: &GameData) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: GameData,
    saves: u64,
}

impl MemoryStore {
    pub fn new(data: GameData) -> Self {
        Self { data, saves: 0 }
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut GameData {
        &mut self.data
    }

    pub fn save_count(&self) -> u64 {
        self.saves
    }
}

impl GameDataStore for MemoryStore {
    fn load(&self) -> Result<GameData, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &GameData) -> Result<(), StoreError> {
        self.data = data.clone();
        self.saves += 1;
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u8,
    #[serde(rename = "savedAt", default)]
    saved_at: Option<String>,
    #[serde(flatten)]
    data: GameData,
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl GameDataStore for JsonFileStore {
    fn load(&self) -> Result<GameData, StoreError> {
        let path = self.file_path.display().to_string();
        let text = match fs::read_to_string(&self.file_path) {
            Ok(value) => value,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GameData::default());
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        let parsed: StoreFile =
            serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        if parsed.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                version: parsed.version,
                path,
            });
        }
        Ok(parsed.data)
    }

    fn save(&mut self, data: &GameData) -> Result<(), StoreError> {
        let path = self.file_path.display().to_string();
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let payload = StoreFile {
            version: STORE_VERSION,
            saved_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            data: data.clone(),
        };
        let text = serde_json::to_string_pretty(&payload).map_err(StoreError::Serialize)?;
        fs::write(&self.file_path, text).map_err(|source| StoreError::Write { path, source })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_file(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("{prefix}-{nanos}"))
            .join("game.json")
    }

    #[test]
    fn positions_and_multipliers_upsert_by_role() {
        let mut data = GameData::default();
        assert_eq!(data.position_of(GhostRole::Chaser), None);
        data.set_position(GhostRole::Chaser, Vec2::new(0.08, 0.24));
        data.set_position(GhostRole::Chaser, Vec2::new(0.24, 0.24));
        assert_eq!(data.ghost_data.ghost_positions.len(), 1);
        assert_eq!(
            data.position_of(GhostRole::Chaser),
            Some(Vec2::new(0.24, 0.24))
        );

        assert_eq!(data.speed_multiplier(GhostRole::Evasive), 1.0);
        data.set_speed_multiplier(GhostRole::Evasive, 1.5);
        assert_eq!(data.speed_multiplier(GhostRole::Evasive), 1.5);
        data.set_speed_multiplier(GhostRole::Evasive, f32::NAN);
        assert_eq!(data.speed_multiplier(GhostRole::Evasive), 1.0);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = JsonFileStore::new(temp_file("ghost-store-missing"));
        assert_eq!(store.load().expect("load"), GameData::default());
    }

    #[test]
    fn saved_file_loads_back() {
        let path = temp_file("ghost-store-save");
        let mut store = JsonFileStore::new(path.clone());
        let mut data = GameData::default();
        data.ghost_data.list_alive_ghost = vec![GhostRole::Ambusher, GhostRole::Chaser];
        data.ghost_data.current_controlling_ghost = Some(GhostRole::Ambusher);
        data.ghost_data.is_control_inverted = true;
        data.set_position(GhostRole::Ambusher, Vec2::new(0.4, 0.56));
        data.pacman_data.direction = Direction::Left;
        store.save(&data).expect("save");

        let raw = fs::read_to_string(&path).expect("read back");
        assert!(raw.contains("\"pinky\""));
        assert!(raw.contains("\"savedAt\""));
        assert_eq!(store.load().expect("load"), data);

        let _ = fs::remove_file(&path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let path = temp_file("ghost-store-version");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        fs::write(&path, r#"{ "version": 9, "ghost_data": {} }"#).expect("write file");

        let store = JsonFileStore::new(path.clone());
        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion { version: 9, .. })
        ));

        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn partial_record_fills_defaults() {
        let path = temp_file("ghost-store-partial");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        let raw = r#"{
  "version": 1,
  "ghost_data": { "list_alive_ghost": ["blinky", "clyde"] }
}"#;
        fs::write(&path, raw).expect("write file");

        let data = JsonFileStore::new(path).load().expect("load");
        assert_eq!(
            data.ghost_data.list_alive_ghost,
            vec![GhostRole::Chaser, GhostRole::Evasive]
        );
        assert_eq!(data.ghost_data.current_controlling_ghost, None);
        assert_eq!(data.pacman_data.direction, Direction::None);

        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::default();
        let mut data = store.load().expect("load");
        data.ghost_data.is_control_inverted = true;
        store.save(&data).expect("save");
        assert_eq!(store.save_count(), 1);
        assert!(store.data().ghost_data.is_control_inverted);
    }
}
