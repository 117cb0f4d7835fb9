use crate::collision::Collider;
use crate::config::{GhostConfig, MazeConfig};
use crate::grid::TileGrid;
use crate::store::GameData;
use crate::types::{Direction, GhostRole, RoleMap, Vec2};

pub const DEMO_MAZE: &[&str] = &[
    "###############",
    "#......#......#",
    "#.##.#.#.#.##.#",
    "#.#..#...#..#.#",
    "#.#.###.###.#.#",
    "#......M......#",
    "#.###.#.#.###.#",
    "#.....#.#.....#",
    "###.#.#B#.#.###",
    "#...#.CIP.#...#",
    "#.#.#######.#.#",
    "#.............#",
    "###############",
];

/// Walls and spawn markers read from ASCII rows. Row 0 is the top row.
///
/// `#` is a wall, `B`/`C`/`I`/`P` mark the blinky, clyde, inky and pinky
/// spawns, `M` marks pacman's start. Anything else is open floor.
#[derive(Clone, Debug)]
pub struct MazeLayout {
    pub width: i32,
    pub height: i32,
    pub walls: Vec<Collider>,
    pub spawns: RoleMap<Option<Vec2>>,
    pub pacman_start: Option<Vec2>,
}

impl MazeLayout {
    pub fn parse(rows: &[&str], grid: &TileGrid) -> Self {
        let height = rows.len() as i32;
        let width = rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0) as i32;
        let mut walls = Vec::new();
        let mut spawns: RoleMap<Option<Vec2>> = RoleMap::default();
        let mut pacman_start = None;

        for (row_idx, row) in rows.iter().enumerate() {
            let y = height - 1 - row_idx as i32;
            for (col_idx, ch) in row.chars().enumerate() {
                let center = grid.center_of(col_idx as i32, y);
                match ch {
                    '#' => walls.push(Collider::wall(center, grid.size)),
                    'B' => spawns[GhostRole::Chaser] = Some(center),
                    'C' => spawns[GhostRole::Evasive] = Some(center),
                    'I' => spawns[GhostRole::Whimsical] = Some(center),
                    'P' => spawns[GhostRole::Ambusher] = Some(center),
                    'M' => pacman_start = Some(center),
                    _ => {}
                }
            }
        }

        Self {
            width,
            height,
            walls,
            spawns,
            pacman_start,
        }
    }

    pub fn ghost_configs(&self) -> Vec<GhostConfig> {
        self.spawns
            .iter()
            .filter_map(|(role, spawn)| spawn.map(|spawn| GhostConfig::new(role, spawn)))
            .collect()
    }

    /// Fills a record that has no alive ghosts: every configured ghost comes
    /// alive and pacman starts on its marker heading left. Returns whether
    /// anything changed.
    pub fn seed_game_data(&self, data: &mut GameData, config: &MazeConfig) -> bool {
        if !data.ghost_data.list_alive_ghost.is_empty() {
            return false;
        }
        data.ghost_data.list_alive_ghost = config.ghosts.iter().map(|ghost| ghost.role).collect();
        if let Some(start) = self.pacman_start {
            data.pacman_data.coordinate = start;
            data.pacman_data.direction = Direction::Left;
        }
        true
    }

    pub fn cell_of(&self, grid: &TileGrid, position: Vec2) -> (i32, i32) {
        let col = ((position.x - grid.offset) / grid.size).round() as i32;
        let y = ((position.y - grid.offset) / grid.size).round() as i32;
        (col, self.height - 1 - y)
    }
}
