pub const FIXED_TICK_MS: u64 = 20;
pub const FRAME_MS: u64 = 16;

pub const TILE_SIZE: f32 = 0.16;
pub const TILE_OFFSET: f32 = 0.08;
pub const POSITION_EPSILON: f32 = 1e-5;

pub const MAX_RECENT_TILES: usize = 3;

// AI distances, in tiles.
pub const FEIGNING_IGNORANCE_DISTANCE: f32 = 8.0;
pub const WHIMSICAL_DISTANCE: f32 = 2.0;
pub const AMBUSHER_DISTANCE: f32 = 4.0;
pub const OPEN_TILE_SEARCH_RADIUS: u32 = 3;

pub const SWITCH_COOLDOWN_MS: u64 = 3_000;
pub const DEFAULT_SPEED_MULTIPLIER: f32 = 1.0;

pub const GHOST_COLLIDER_SIZE: f32 = 0.15;

pub const LAYER_WALLS: u32 = 1 << 0;
pub const LAYER_GHOSTS: u32 = 1 << 1;
pub const LAYER_PICKUPS: u32 = 1 << 2;
pub const DEFAULT_COLLISION_LAYERS: u32 = LAYER_WALLS | LAYER_GHOSTS;

pub fn default_ghost_speed(role: crate::types::GhostRole) -> f32 {
    use crate::types::GhostRole;
    match role {
        GhostRole::Chaser => 0.8,
        GhostRole::Evasive => 0.72,
        GhostRole::Whimsical => 0.76,
        GhostRole::Ambusher => 0.8,
    }
}

pub fn format_cooldown(remaining_ms: u64) -> String {
    if remaining_ms == 0 {
        return String::new();
    }
    format!("{:.1}s", remaining_ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_text_is_blank_at_zero() {
        assert_eq!(format_cooldown(0), "");
        assert_eq!(format_cooldown(2_960), "3.0s");
        assert_eq!(format_cooldown(1_240), "1.2s");
        assert_eq!(format_cooldown(40), "0.0s");
    }
}
