use serde::{Deserialize, Serialize};

use crate::constants::{TILE_OFFSET, TILE_SIZE};
use crate::types::{Direction, Vec2};

/// Square tile lattice whose centers sit at `offset + n * size` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub size: f32,
    pub offset: f32,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            size: TILE_SIZE,
            offset: TILE_OFFSET,
        }
    }
}

impl TileGrid {
    pub fn new(size: f32, offset: f32) -> Self {
        Self { size, offset }
    }

    pub fn tile_center(&self, position: Vec2) -> Vec2 {
        Vec2::new(self.snap(position.x), self.snap(position.y))
    }

    pub fn is_tile_center(&self, position: Vec2) -> bool {
        position.approx_eq(self.tile_center(position))
    }

    pub fn neighbor(&self, position: Vec2, dir: Direction) -> Vec2 {
        self.tile_center(position + dir.to_vec() * self.size)
    }

    pub fn center_of(&self, col: i32, row: i32) -> Vec2 {
        Vec2::new(
            col as f32 * self.size + self.offset,
            row as f32 * self.size + self.offset,
        )
    }

    pub fn tiles(&self, count: f32) -> f32 {
        count * self.size
    }

    fn snap(&self, coord: f32) -> f32 {
        ((coord - self.offset) / self.size).round() * self.size + self.offset
    }
}
