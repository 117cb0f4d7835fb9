use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    default_ghost_speed, DEFAULT_COLLISION_LAYERS, GHOST_COLLIDER_SIZE, SWITCH_COOLDOWN_MS,
    TILE_OFFSET, TILE_SIZE,
};
use crate::grid::TileGrid;
use crate::types::{GhostRole, RoleMap, Vec2};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    #[error("{role:?} default speed must be positive, got {speed}")]
    InvalidSpeed { role: GhostRole, speed: f32 },
    #[error("{0:?} is configured more than once")]
    DuplicateGhost(GhostRole),
    #[error("no ghost configuration for alive ghost {0:?}")]
    MissingGhost(GhostRole),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostConfig {
    pub role: GhostRole,
    #[serde(rename = "defaultSpeed")]
    pub default_speed: f32,
    pub spawn: Vec2,
    #[serde(rename = "colliderSize", default)]
    pub collider_size: Option<Vec2>,
    #[serde(rename = "directTargeting", default = "default_true")]
    pub direct_targeting: bool,
}

impl GhostConfig {
    pub fn new(role: GhostRole, spawn: Vec2) -> Self {
        Self {
            role,
            default_speed: default_ghost_speed(role),
            spawn,
            collider_size: Some(Vec2::new(GHOST_COLLIDER_SIZE, GHOST_COLLIDER_SIZE)),
            direct_targeting: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    #[serde(rename = "tileSize", default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(rename = "tileOffset", default = "default_tile_offset")]
    pub tile_offset: f32,
    #[serde(rename = "switchCooldownMs", default = "default_cooldown")]
    pub switch_cooldown_ms: u64,
    #[serde(rename = "collisionLayers", default = "default_layers")]
    pub collision_layers: u32,
    pub ghosts: Vec<GhostConfig>,
}

fn default_tile_size() -> f32 {
    TILE_SIZE
}

fn default_tile_offset() -> f32 {
    TILE_OFFSET
}

fn default_cooldown() -> u64 {
    SWITCH_COOLDOWN_MS
}

fn default_layers() -> u32 {
    DEFAULT_COLLISION_LAYERS
}

impl MazeConfig {
    pub fn new(ghosts: Vec<GhostConfig>) -> Self {
        Self {
            tile_size: TILE_SIZE,
            tile_offset: TILE_OFFSET,
            switch_cooldown_ms: SWITCH_COOLDOWN_MS,
            collision_layers: DEFAULT_COLLISION_LAYERS,
            ghosts,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn grid(&self) -> TileGrid {
        TileGrid::new(self.tile_size, self.tile_offset)
    }

    pub fn validate(&self, alive: &[GhostRole]) -> Result<RoleMap<Option<GhostConfig>>, ConfigError> {
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        let mut by_role: RoleMap<Option<GhostConfig>> = RoleMap::default();
        for ghost in &self.ghosts {
            if !(ghost.default_speed > 0.0) {
                return Err(ConfigError::InvalidSpeed {
                    role: ghost.role,
                    speed: ghost.default_speed,
                });
            }
            if by_role[ghost.role].is_some() {
                return Err(ConfigError::DuplicateGhost(ghost.role));
            }
            by_role[ghost.role] = Some(ghost.clone());
        }
        if let Some(missing) = alive.iter().find(|role| by_role[**role].is_none()) {
            return Err(ConfigError::MissingGhost(*missing));
        }
        Ok(by_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> MazeConfig {
        MazeConfig::new(
            GhostRole::ALL
                .into_iter()
                .map(|role| GhostConfig::new(role, Vec2::new(0.08, 0.08)))
                .collect(),
        )
    }

    #[test]
    fn complete_config_validates() {
        let config = full_config();
        let by_role = config.validate(&GhostRole::ALL).expect("valid config");
        assert!(by_role.iter().all(|(_, ghost)| ghost.is_some()));
    }

    #[test]
    fn alive_ghost_without_config_is_rejected() {
        let mut config = full_config();
        config.ghosts.retain(|ghost| ghost.role != GhostRole::Whimsical);
        assert!(config.validate(&[GhostRole::Chaser]).is_ok());
        let err = config
            .validate(&[GhostRole::Chaser, GhostRole::Whimsical])
            .expect_err("missing inky");
        assert!(matches!(err, ConfigError::MissingGhost(GhostRole::Whimsical)));
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut config = full_config();
        config.ghosts[1].default_speed = 0.0;
        assert!(matches!(
            config.validate(&[]),
            Err(ConfigError::InvalidSpeed { .. })
        ));

        let mut config = full_config();
        config.ghosts.push(GhostConfig::new(GhostRole::Chaser, Vec2::ZERO));
        assert!(matches!(
            config.validate(&[]),
            Err(ConfigError::DuplicateGhost(GhostRole::Chaser))
        ));

        let mut config = full_config();
        config.tile_size = -1.0;
        assert!(matches!(
            config.validate(&[]),
            Err(ConfigError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn json_defaults_fill_missing_fields() {
        let raw = r#"{
  "ghosts": [
    { "role": "pinky", "defaultSpeed": 0.9, "spawn": { "x": 0.4, "y": 0.72 } }
  ]
}"#;
        let config: MazeConfig = serde_json::from_str(raw).expect("parse config");
        assert_eq!(config.tile_size, TILE_SIZE);
        assert_eq!(config.switch_cooldown_ms, SWITCH_COOLDOWN_MS);
        assert_eq!(config.ghosts[0].role, GhostRole::Ambusher);
        assert!(config.ghosts[0].direct_targeting);
        assert_eq!(config.ghosts[0].collider_size, None);
    }
}
