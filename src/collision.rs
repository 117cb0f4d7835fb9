use crate::constants::{LAYER_GHOSTS, LAYER_WALLS};
use crate::types::{GhostRole, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        let dx = (self.center.x - other.center.x).abs();
        let dy = (self.center.y - other.center.y).abs();
        dx < (self.size.x + other.size.x) / 2.0 && dy < (self.size.y + other.size.y) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderOwner {
    Wall,
    Ghost(GhostRole),
    Prop(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub owner: ColliderOwner,
    pub bounds: Aabb,
    pub layer: u32,
    pub is_trigger: bool,
}

impl Collider {
    pub fn wall(center: Vec2, size: f32) -> Self {
        Self {
            owner: ColliderOwner::Wall,
            bounds: Aabb::new(center, Vec2::new(size, size)),
            layer: LAYER_WALLS,
            is_trigger: false,
        }
    }

    pub fn ghost(role: GhostRole, center: Vec2, size: Vec2) -> Self {
        Self {
            owner: ColliderOwner::Ghost(role),
            bounds: Aabb::new(center, size),
            layer: LAYER_GHOSTS,
            is_trigger: false,
        }
    }
}

/// The ghost asking whether it may stand somewhere.
#[derive(Clone, Copy, Debug)]
pub struct Mover {
    pub role: GhostRole,
    pub size: Option<Vec2>,
}

/// Read-only overlap queries against one consistent set of colliders.
#[derive(Clone, Copy, Debug)]
pub struct CollisionProbe<'a> {
    statics: &'a [Collider],
    bodies: &'a [Collider],
    layer_mask: u32,
}

impl<'a> CollisionProbe<'a> {
    pub fn new(statics: &'a [Collider], bodies: &'a [Collider], layer_mask: u32) -> Self {
        Self {
            statics,
            bodies,
            layer_mask,
        }
    }

    /// Whether `mover`'s box centered at `position` is clear of every solid
    /// collider on the masked layers other than its own. A mover without a
    /// box can never move.
    pub fn can_occupy(&self, position: Vec2, mover: &Mover) -> bool {
        let Some(size) = mover.size else {
            return false;
        };
        let probe = Aabb::new(position, size);
        !self
            .statics
            .iter()
            .chain(self.bodies.iter())
            .any(|collider| self.blocks(collider, &probe, mover.role))
    }

    fn blocks(&self, collider: &Collider, probe: &Aabb, role: GhostRole) -> bool {
        collider.layer & self.layer_mask != 0
            && !collider.is_trigger
            && collider.owner != ColliderOwner::Ghost(role)
            && collider.bounds.overlaps(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_COLLISION_LAYERS, GHOST_COLLIDER_SIZE, LAYER_PICKUPS, TILE_SIZE};
    use crate::grid::TileGrid;

    fn mover(role: GhostRole) -> Mover {
        Mover {
            role,
            size: Some(Vec2::new(GHOST_COLLIDER_SIZE, GHOST_COLLIDER_SIZE)),
        }
    }

    #[test]
    fn wall_blocks_its_own_tile_but_not_the_neighbor() {
        let grid = TileGrid::default();
        let walls = [Collider::wall(grid.center_of(1, 0), TILE_SIZE)];
        let probe = CollisionProbe::new(&walls, &[], DEFAULT_COLLISION_LAYERS);
        assert!(!probe.can_occupy(grid.center_of(1, 0), &mover(GhostRole::Chaser)));
        assert!(probe.can_occupy(grid.center_of(0, 0), &mover(GhostRole::Chaser)));
        assert!(probe.can_occupy(grid.center_of(2, 0), &mover(GhostRole::Chaser)));
    }

    #[test]
    fn own_body_and_triggers_are_ignored() {
        let grid = TileGrid::default();
        let spot = grid.center_of(3, 3);
        let size = Vec2::new(GHOST_COLLIDER_SIZE, GHOST_COLLIDER_SIZE);
        let mut pellet = Collider::wall(spot, TILE_SIZE);
        pellet.is_trigger = true;
        let statics = [pellet];
        let bodies = [Collider::ghost(GhostRole::Evasive, spot, size)];
        let probe = CollisionProbe::new(&statics, &bodies, DEFAULT_COLLISION_LAYERS);
        assert!(probe.can_occupy(spot, &mover(GhostRole::Evasive)));
        assert!(!probe.can_occupy(spot, &mover(GhostRole::Ambusher)));
    }

    #[test]
    fn unmasked_layers_do_not_block() {
        let grid = TileGrid::default();
        let spot = grid.center_of(0, 2);
        let mut prop = Collider::wall(spot, TILE_SIZE);
        prop.owner = ColliderOwner::Prop(7);
        prop.layer = LAYER_PICKUPS;
        let statics = [prop];
        let probe = CollisionProbe::new(&statics, &[], DEFAULT_COLLISION_LAYERS);
        assert!(probe.can_occupy(spot, &mover(GhostRole::Whimsical)));
    }

    #[test]
    fn mover_without_box_is_never_movable() {
        let probe = CollisionProbe::new(&[], &[], DEFAULT_COLLISION_LAYERS);
        let boxless = Mover {
            role: GhostRole::Chaser,
            size: None,
        };
        assert!(!probe.can_occupy(Vec2::new(0.08, 0.08), &boxless));
    }
}
