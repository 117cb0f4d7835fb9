use std::cmp::Ordering;
use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::collision::{CollisionProbe, Mover};
use crate::constants::{
    AMBUSHER_DISTANCE, FEIGNING_IGNORANCE_DISTANCE, MAX_RECENT_TILES, OPEN_TILE_SEARCH_RADIUS,
    WHIMSICAL_DISTANCE,
};
use crate::grid::TileGrid;
use crate::types::{Direction, GhostRole, Vec2};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecentTiles {
    tiles: VecDeque<Vec2>,
}

impl RecentTiles {
    pub fn new() -> Self {
        Self {
            tiles: VecDeque::with_capacity(MAX_RECENT_TILES),
        }
    }

    pub fn push(&mut self, tile: Vec2) {
        while self.tiles.len() >= MAX_RECENT_TILES {
            self.tiles.pop_front();
        }
        self.tiles.push_back(tile);
    }

    pub fn contains(&self, tile: Vec2) -> bool {
        self.tiles.iter().any(|seen| seen.approx_eq(tile))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    pub fn to_vec(&self) -> Vec<Vec2> {
        self.tiles.iter().copied().collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Targeting {
    Direct,
    Shuffled,
}

#[derive(Clone, Copy, Debug)]
pub struct PursuitContext {
    pub pacman: Vec2,
    pub pacman_direction: Direction,
    pub chaser: Vec2,
    pub own_position: Vec2,
    pub spawn: Vec2,
}

pub fn pursuit_target(
    role: GhostRole,
    ctx: &PursuitContext,
    grid: &TileGrid,
    probe: &CollisionProbe<'_>,
    mover: &Mover,
) -> Vec2 {
    match role {
        GhostRole::Chaser => ctx.pacman,
        GhostRole::Ambusher => {
            let ahead = ctx.pacman + ctx.pacman_direction.to_vec() * grid.tiles(AMBUSHER_DISTANCE);
            nearest_open_tile(ahead, grid, probe, mover)
        }
        GhostRole::Whimsical => {
            let ahead =
                ctx.pacman + ctx.pacman_direction.to_vec() * grid.tiles(WHIMSICAL_DISTANCE);
            let reflected = ahead + (ahead - ctx.chaser);
            nearest_open_tile(reflected, grid, probe, mover)
        }
        GhostRole::Evasive => {
            if ctx.own_position.distance(ctx.pacman) > grid.tiles(FEIGNING_IGNORANCE_DISTANCE) {
                ctx.pacman
            } else {
                ctx.spawn
            }
        }
    }
}

/// Returns `target` when open, otherwise the first open point found probing
/// up, down, left and right at one, two and three tiles out. Gives back the
/// blocked target when nothing is open within that radius.
pub fn nearest_open_tile(
    target: Vec2,
    grid: &TileGrid,
    probe: &CollisionProbe<'_>,
    mover: &Mover,
) -> Vec2 {
    if probe.can_occupy(target, mover) {
        return target;
    }
    for radius in 1..=OPEN_TILE_SEARCH_RADIUS {
        let reach = grid.tiles(radius as f32);
        for dir in Direction::ALL {
            let candidate = target + dir.to_vec() * reach;
            if probe.can_occupy(candidate, mover) {
                return candidate;
            }
        }
    }
    target
}

#[allow(clippy::too_many_arguments)]
pub fn choose_direction<R: Rng + ?Sized>(
    grid: &TileGrid,
    position: Vec2,
    previous: Direction,
    probe: &CollisionProbe<'_>,
    mover: &Mover,
    recent: &RecentTiles,
    target: Vec2,
    targeting: Targeting,
    rng: &mut R,
) -> Direction {
    let reverse = previous.opposite();
    let mut candidates: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|dir| previous.is_none() || *dir != reverse)
        .filter(|dir| {
            let next_tile = grid.neighbor(position, *dir);
            probe.can_occupy(next_tile, mover) && !recent.contains(next_tile)
        })
        .collect();

    match candidates.len() {
        0 => Direction::None,
        1 => candidates[0],
        _ => {
            match targeting {
                Targeting::Direct => {
                    // Stable sort keeps Up, Down, Left, Right order on ties.
                    candidates.sort_by(|a, b| {
                        let da = (position + a.to_vec() * grid.size).distance(target);
                        let db = (position + b.to_vec() * grid.size).distance(target);
                        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
                    });
                }
                Targeting::Shuffled => candidates.shuffle(rng),
            }
            candidates[0]
        }
    }
}
