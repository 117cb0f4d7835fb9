use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};

use crate::collision::{Collider, CollisionProbe, Mover};
use crate::config::{ConfigError, MazeConfig};
use crate::constants::format_cooldown;
use crate::ghost_ai::{RecentTiles, Targeting};
use crate::grid::TileGrid;
use crate::store::{GameData, GameDataStore, StoreError};
use crate::types::{
    AnimationState, Direction, GhostRole, GhostView, MazeEvent, MotorState, RoleMap, Snapshot,
    Vec2,
};

mod auto_motor;
mod controlled_motor;
mod switch_system;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Debug)]
struct GhostBody {
    position: Vec2,
    direction: Direction,
    default_speed: f32,
    spawn: Vec2,
    collider_size: Option<Vec2>,
    targeting: Targeting,
    animation: AnimationState,
    recent_tiles: RecentTiles,
    reached_target: bool,
    from_tile: Vec2,
    next_tile: Option<Vec2>,
    pursuit_target: Option<Vec2>,
}

#[derive(Clone, Debug, Default)]
struct ControlState {
    active: Option<GhostRole>,
    direction: Direction,
    queued_direction: Direction,
    origin: Vec2,
    target: Vec2,
    moving: bool,
    switch_pending: bool,
    last_switch_ms: Option<u64>,
}

pub struct GhostMazeEngine<S: GameDataStore> {
    pub config: MazeConfig,

    grid: TileGrid,
    store: S,
    data: GameData,
    walls: Vec<Collider>,
    ghosts: RoleMap<Option<GhostBody>>,
    control: ControlState,
    rng: StdRng,
    events: Vec<MazeEvent>,
    cooldown_text: String,

    started: bool,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl<S: GameDataStore> GhostMazeEngine<S> {
    pub fn new(
        config: MazeConfig,
        walls: Vec<Collider>,
        store: S,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let data = store.load()?;
        let configured = config.validate(&data.ghost_data.list_alive_ghost)?;
        let grid = config.grid();

        let ghosts = RoleMap::from_fn(|role| {
            configured[role].as_ref().map(|ghost| {
                let position = grid.tile_center(data.position_of(role).unwrap_or(ghost.spawn));
                GhostBody {
                    position,
                    direction: Direction::None,
                    default_speed: ghost.default_speed,
                    spawn: ghost.spawn,
                    collider_size: ghost.collider_size,
                    targeting: if ghost.direct_targeting {
                        Targeting::Direct
                    } else {
                        Targeting::Shuffled
                    },
                    animation: AnimationState::Rest,
                    recent_tiles: RecentTiles::new(),
                    reached_target: true,
                    from_tile: position,
                    next_tile: None,
                    pursuit_target: None,
                }
            })
        });

        let mut engine = Self {
            config,
            grid,
            store,
            data,
            walls,
            ghosts,
            control: ControlState::default(),
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
            cooldown_text: String::new(),
            started: false,
            elapsed_ms: 0,
            tick_counter: 0,
        };

        for role in engine.alive_roles() {
            engine.play_animation(role, AnimationState::Rest);
        }
        if let Some(role) = engine.initial_controller() {
            engine.switch_to(role);
        }
        Ok(engine)
    }

    pub fn start_session(&mut self, active: bool) {
        if active != self.started {
            info!(active, "ghost maze session toggled");
        }
        self.started = active;
    }

    pub fn frame(&mut self) -> &str {
        if !self.started {
            return &self.cooldown_text;
        }
        self.cooldown_text = format_cooldown(self.cooldown_remaining_ms());
        self.promote_queued_direction();
        &self.cooldown_text
    }

    pub fn step(&mut self, dt_ms: u64) {
        if !self.started {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let dt_sec = dt_ms as f32 / 1000.0;

        self.update_controlled(dt_sec);
        self.update_auto_ghosts(dt_sec);
    }

    pub fn update_pacman(&mut self, position: Vec2, direction: Direction) {
        self.data.pacman_data.coordinate = position;
        self.data.pacman_data.direction = direction;
    }

    pub fn set_speed_multiplier(&mut self, role: GhostRole, multiplier: f32) {
        self.data.set_speed_multiplier(role, multiplier);
    }

    pub fn set_control_inverted(&mut self, inverted: bool) {
        self.data.ghost_data.is_control_inverted = inverted;
    }

    pub fn sync_from_store(&mut self) -> Result<(), EngineError> {
        let fresh = self.store.load()?;
        self.data.pacman_data = fresh.pacman_data;
        self.data.ghost_data.ghost_speed_multipliers = fresh.ghost_data.ghost_speed_multipliers;
        self.data.ghost_data.is_control_inverted = fresh.ghost_data.is_control_inverted;

        let alive = fresh.ghost_data.list_alive_ghost;
        if let Some(missing) = alive.iter().find(|role| self.ghosts[**role].is_none()) {
            return Err(ConfigError::MissingGhost(*missing).into());
        }
        self.data.ghost_data.list_alive_ghost = alive;

        let active = self.control.active;
        let needs_controller = match active {
            Some(role) => !self.data.is_alive(role),
            None => true,
        };
        if needs_controller {
            match self.initial_controller() {
                Some(role) => self.switch_to(role),
                None if active.is_none() => {}
                None => {
                    warn!("no alive ghost left to control");
                    self.control = ControlState {
                        last_switch_ms: self.control.last_switch_ms,
                        ..ControlState::default()
                    };
                }
            }
        }
        Ok(())
    }

    pub fn active_ghost(&self) -> Option<GhostRole> {
        self.control.active
    }

    pub fn motor_state(&self) -> MotorState {
        if self.control.moving {
            MotorState::Moving
        } else if !self.control.queued_direction.is_none() {
            MotorState::Queued
        } else {
            MotorState::Idle
        }
    }

    pub fn ghost_position(&self, role: GhostRole) -> Option<Vec2> {
        self.ghosts[role].as_ref().map(|body| body.position)
    }

    pub fn ghost_direction(&self, role: GhostRole) -> Option<Direction> {
        self.ghosts[role].as_ref().map(|body| body.direction)
    }

    pub fn recent_tiles(&self, role: GhostRole) -> Vec<Vec2> {
        self.ghosts[role]
            .as_ref()
            .map(|body| body.recent_tiles.to_vec())
            .unwrap_or_default()
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn build_snapshot(&mut self, drain_events: bool) -> Snapshot {
        let ghosts = self
            .ghosts
            .iter()
            .filter(|(role, _)| self.data.is_alive(*role))
            .filter_map(|(role, body)| {
                body.as_ref().map(|body| GhostView {
                    role,
                    x: body.position.x,
                    y: body.position.y,
                    dir: body.direction,
                    controlled: self.control.active == Some(role),
                    animation: body.animation.trigger(role),
                    pursuit_target: body.pursuit_target,
                    recent_tiles: body.recent_tiles.to_vec(),
                })
            })
            .collect();
        let events = if drain_events {
            std::mem::take(&mut self.events)
        } else {
            self.events.clone()
        };
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.elapsed_ms,
            active: self.control.active,
            motor_state: self.motor_state(),
            cooldown_text: self.cooldown_text.clone(),
            ghosts,
            events,
        }
    }

    fn initial_controller(&self) -> Option<GhostRole> {
        let alive = &self.data.ghost_data.list_alive_ghost;
        match self.data.ghost_data.current_controlling_ghost {
            Some(role) if alive.contains(&role) => Some(role),
            persisted => {
                let fallback = alive.first().copied();
                if let Some(persisted) = persisted {
                    warn!(
                        persisted = persisted.name(),
                        ?fallback,
                        "persisted controller is not alive, falling back"
                    );
                }
                fallback
            }
        }
    }

    fn alive_roles(&self) -> Vec<GhostRole> {
        GhostRole::ALL
            .into_iter()
            .filter(|role| self.data.is_alive(*role) && self.ghosts[*role].is_some())
            .collect()
    }

    fn mover(&self, role: GhostRole) -> Mover {
        Mover {
            role,
            size: self.ghosts[role].as_ref().and_then(|body| body.collider_size),
        }
    }

    fn body_colliders(&self) -> Vec<Collider> {
        self.ghosts
            .iter()
            .filter(|(role, _)| self.data.is_alive(*role))
            .filter_map(|(role, body)| {
                let body = body.as_ref()?;
                Some(Collider::ghost(role, body.position, body.collider_size?))
            })
            .collect()
    }

    fn can_occupy(&self, role: GhostRole, position: Vec2) -> bool {
        let bodies = self.body_colliders();
        CollisionProbe::new(&self.walls, &bodies, self.config.collision_layers)
            .can_occupy(position, &self.mover(role))
    }

    fn speed_of(&self, role: GhostRole) -> f32 {
        self.ghosts[role]
            .as_ref()
            .map(|body| body.default_speed * self.data.speed_multiplier(role))
            .unwrap_or(0.0)
    }

    fn play_animation(&mut self, role: GhostRole, state: AnimationState) {
        let Some(body) = self.ghosts[role].as_mut() else {
            return;
        };
        body.animation = state;
        self.events.push(MazeEvent::Animation {
            ghost: role,
            trigger: state.trigger(role),
        });
    }

    fn persist_position(&mut self, role: GhostRole, position: Vec2) {
        self.data.set_position(role, position);
        self.persist();
        self.events.push(MazeEvent::PositionSaved {
            ghost: role,
            position,
        });
    }

    fn persist(&mut self) {
        if let Err(error) = self.store.save(&self.data) {
            warn!(%error, "failed to persist ghost data");
        }
    }
}
