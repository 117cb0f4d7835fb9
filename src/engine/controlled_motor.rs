use super::*;
use crate::input::InputAction;
use tracing::debug;

impl<S: GameDataStore> GhostMazeEngine<S> {
    pub fn handle_input(&mut self, action: InputAction) {
        if !self.started {
            return;
        }
        match action.direction(self.data.ghost_data.is_control_inverted) {
            Some(dir) => {
                self.control.queued_direction = dir;
                debug!(action = action.name(), queued = dir.name(), "ghost input queued");
            }
            None if self.control.moving => {
                self.control.switch_pending = true;
                debug!("ghost switch deferred until tile arrival");
            }
            None => {
                self.request_cycle_switch();
            }
        }
    }

    pub(super) fn promote_queued_direction(&mut self) {
        let Some(role) = self.control.active else {
            return;
        };
        if self.control.moving || self.control.queued_direction.is_none() {
            return;
        }
        let dir = std::mem::take(&mut self.control.queued_direction);
        let grid = self.grid;
        let Some(body) = self.ghosts[role].as_mut() else {
            return;
        };
        let position = body.position;
        body.direction = dir;

        self.control.direction = dir;
        self.control.origin = position;
        self.control.target = grid.neighbor(position, dir);
        self.control.moving = true;
        if let Some(state) = AnimationState::for_direction(dir) {
            self.play_animation(role, state);
        }
    }

    pub(super) fn update_controlled(&mut self, dt_sec: f32) {
        if !self.control.moving {
            return;
        }
        let Some(role) = self.control.active else {
            self.control.moving = false;
            return;
        };
        let Some(position) = self.ghost_position(role) else {
            self.control.moving = false;
            return;
        };

        if position.approx_eq(self.control.target) && !self.on_tile_arrival(role, position) {
            return;
        }

        let target = self.control.target;
        if self.can_occupy(role, target) {
            let step = self.speed_of(role) * dt_sec;
            let next = position.move_towards(target, step);
            let arrived = next.approx_eq(target);
            if let Some(body) = self.ghosts[role].as_mut() {
                body.position = if arrived { target } else { next };
            }
            if arrived {
                self.persist_position(role, target);
            }
        } else {
            self.abort_move(role);
        }
    }

    fn on_tile_arrival(&mut self, role: GhostRole, position: Vec2) -> bool {
        if std::mem::take(&mut self.control.switch_pending) {
            self.request_cycle_switch();
            return false;
        }

        let grid = self.grid;
        let queued = self.control.queued_direction;
        let current = self.control.direction;
        let turn = grid.neighbor(position, queued);
        let ahead = grid.neighbor(position, current);

        if !queued.is_none() && self.can_occupy(role, turn) {
            self.control.direction = queued;
            self.control.queued_direction = Direction::None;
            self.control.origin = position;
            self.control.target = turn;
            if let Some(body) = self.ghosts[role].as_mut() {
                body.direction = queued;
            }
            if let Some(state) = AnimationState::for_direction(queued) {
                self.play_animation(role, state);
            }
            true
        } else if !current.is_none() && self.can_occupy(role, ahead) {
            self.control.origin = position;
            self.control.target = ahead;
            true
        } else {
            self.control.moving = false;
            if std::mem::take(&mut self.control.switch_pending) {
                self.request_cycle_switch();
            }
            false
        }
    }

    fn abort_move(&mut self, role: GhostRole) {
        let origin = self.control.origin;
        self.control.moving = false;
        let Some(position) = self.ghost_position(role) else {
            return;
        };
        let nearest = self.grid.tile_center(position);
        // Another body may have moved into the tile behind; stay put if both are taken.
        let fallback = [origin, nearest]
            .into_iter()
            .find(|tile| self.can_occupy(role, *tile))
            .unwrap_or(position);
        if let Some(body) = self.ghosts[role].as_mut() {
            body.position = fallback;
        }
        self.events.push(MazeEvent::MoveAborted { ghost: role });
        debug!(ghost = role.name(), "controlled move blocked");
        if std::mem::take(&mut self.control.switch_pending) {
            self.request_cycle_switch();
        }
    }
}
