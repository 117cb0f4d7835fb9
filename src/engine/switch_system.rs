use super::*;
use tracing::debug;

impl<S: GameDataStore> GhostMazeEngine<S> {
    /// Returns whether any switch happened.
    pub fn request_cycle_switch(&mut self) -> bool {
        let mut switched = false;
        while self.try_cycle_switch() {
            switched = true;
            if !std::mem::take(&mut self.control.switch_pending) {
                break;
            }
        }
        switched
    }

    pub fn cooldown_remaining_ms(&self) -> u64 {
        match self.control.last_switch_ms {
            Some(at) => self
                .config
                .switch_cooldown_ms
                .saturating_sub(self.elapsed_ms.saturating_sub(at)),
            None => 0,
        }
    }

    fn try_cycle_switch(&mut self) -> bool {
        let alive = &self.data.ghost_data.list_alive_ghost;
        if alive.is_empty() {
            debug!("no alive ghost to switch to");
            return false;
        }
        let remaining_ms = self.cooldown_remaining_ms();
        if remaining_ms > 0 {
            debug!(remaining_ms, "switch ghost cooldown in progress");
            self.events.push(MazeEvent::SwitchRejected { remaining_ms });
            return false;
        }

        let next_index = self
            .control
            .active
            .and_then(|role| alive.iter().position(|candidate| *candidate == role))
            .map(|index| (index + 1) % alive.len())
            .unwrap_or(0);
        let next = alive[next_index];
        self.switch_to(next);
        self.control.last_switch_ms = Some(self.elapsed_ms);
        true
    }

    pub(super) fn switch_to(&mut self, role: GhostRole) {
        let from = self.control.active;
        if let Some(previous) = from.filter(|previous| *previous != role) {
            if let Some(body) = self.ghosts[previous].as_mut() {
                let tile = self.grid.tile_center(body.position);
                body.direction = Direction::None;
                body.reached_target = false;
                body.next_tile = Some(tile);
                body.from_tile = tile;
                body.recent_tiles.clear();
            }
        }

        let grid = self.grid;
        let persisted = self.data.position_of(role);
        let Some(body) = self.ghosts[role].as_mut() else {
            warn!(ghost = role.name(), "cannot control an unconfigured ghost");
            return;
        };
        let position = grid.tile_center(persisted.unwrap_or(body.position));
        body.position = position;
        body.direction = Direction::None;
        body.reached_target = true;
        body.next_tile = None;
        body.from_tile = position;
        body.pursuit_target = None;

        self.control = ControlState {
            active: Some(role),
            origin: position,
            target: position,
            last_switch_ms: self.control.last_switch_ms,
            switch_pending: self.control.switch_pending,
            ..ControlState::default()
        };
        self.play_animation(role, AnimationState::Rest);
        self.data.ghost_data.current_controlling_ghost = Some(role);
        self.persist();
        self.events.push(MazeEvent::ControlSwitched { from, to: role });
        info!(
            from = from.map(GhostRole::name),
            to = role.name(),
            "ghost control switched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::*;
    use super::*;
    use crate::constants::{FIXED_TICK_MS, SWITCH_COOLDOWN_MS};
    use crate::input::InputAction;

    fn three_ghosts(cooldown_ms: u64) -> TestEngine {
        engine_with(
            OPEN_ROOM,
            &[
                (GhostRole::Chaser, (1, 1)),
                (GhostRole::Evasive, (4, 3)),
                (GhostRole::Ambusher, (7, 5)),
            ],
            cooldown_ms,
        )
    }

    #[test]
    fn cycle_wraps_through_alive_list() {
        let mut engine = three_ghosts(0);
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Evasive));
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Ambusher));
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Chaser));
    }

    #[test]
    fn second_switch_within_cooldown_is_rejected() {
        let mut engine = three_ghosts(SWITCH_COOLDOWN_MS);
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Evasive));

        engine.step(FIXED_TICK_MS);
        assert!(!engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Evasive));
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, MazeEvent::SwitchRejected { remaining_ms } if *remaining_ms == SWITCH_COOLDOWN_MS - FIXED_TICK_MS)));
    }

    #[test]
    fn cooldown_expires_on_the_simulation_clock() {
        let mut engine = three_ghosts(SWITCH_COOLDOWN_MS);
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.frame(), "3.0s");
        for _ in 0..(SWITCH_COOLDOWN_MS / FIXED_TICK_MS) {
            engine.step(FIXED_TICK_MS);
        }
        assert_eq!(engine.cooldown_remaining_ms(), 0);
        assert_eq!(engine.frame(), "");
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Ambusher));
    }

    #[test]
    fn change_ghost_at_rest_switches_immediately() {
        let mut engine = three_ghosts(0);
        engine.handle_input(InputAction::ChangeGhost);
        assert_eq!(engine.active_ghost(), Some(GhostRole::Evasive));
        assert_eq!(
            engine.store().data().ghost_data.current_controlling_ghost,
            Some(GhostRole::Evasive)
        );
    }

    #[test]
    fn switch_recenters_on_persisted_tile_and_rests() {
        let mut engine = three_ghosts(0);
        let grid = *engine.grid();
        assert!(engine.request_cycle_switch());

        let position = engine.ghost_position(GhostRole::Evasive).expect("evasive");
        assert!(grid.is_tile_center(position));
        assert_eq!(engine.ghost_direction(GhostRole::Evasive), Some(Direction::None));
        assert_eq!(engine.motor_state(), MotorState::Idle);

        let snapshot = engine.build_snapshot(true);
        let evasive = snapshot
            .ghosts
            .iter()
            .find(|ghost| ghost.role == GhostRole::Evasive)
            .expect("evasive view");
        assert!(evasive.controlled);
        assert_eq!(evasive.animation, "clyde.rest");
        assert!(snapshot.events.contains(&MazeEvent::ControlSwitched {
            from: Some(GhostRole::Chaser),
            to: GhostRole::Evasive,
        }));
    }

    #[test]
    fn single_alive_ghost_switches_to_itself() {
        let mut engine = engine_with(OPEN_ROOM, &[(GhostRole::Whimsical, (3, 3))], 0);
        assert!(engine.request_cycle_switch());
        assert_eq!(engine.active_ghost(), Some(GhostRole::Whimsical));
    }
}
