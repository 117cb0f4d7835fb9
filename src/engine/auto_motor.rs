use super::*;
use crate::ghost_ai::{self, PursuitContext};

impl<S: GameDataStore> GhostMazeEngine<S> {
    pub(super) fn update_auto_ghosts(&mut self, dt_sec: f32) {
        for role in GhostRole::ALL {
            if self.control.active == Some(role) || !self.data.is_alive(role) {
                continue;
            }
            self.update_auto_ghost(role, dt_sec);
        }
    }

    fn update_auto_ghost(&mut self, role: GhostRole, dt_sec: f32) {
        let grid = self.grid;
        let Some((position, reached)) = self.ghosts[role]
            .as_ref()
            .map(|body| (body.position, body.reached_target))
        else {
            return;
        };
        if reached && grid.is_tile_center(position) {
            self.decide_direction(role, position);
        }

        let speed = self.speed_of(role);
        let Some(body) = self.ghosts[role].as_ref() else {
            return;
        };
        let destination = body.next_tile.unwrap_or(position);
        let from_tile = body.from_tile;
        let candidate = position.move_towards(destination, speed * dt_sec);

        if self.can_occupy(role, candidate) {
            let on_center = grid.is_tile_center(candidate);
            let moved = !candidate.approx_eq(position);
            let landed = if on_center {
                grid.tile_center(candidate)
            } else {
                candidate
            };
            if let Some(body) = self.ghosts[role].as_mut() {
                body.position = landed;
                if on_center {
                    body.reached_target = true;
                }
            }
            if on_center && moved {
                self.persist_position(role, landed);
            }
        } else {
            let snapped = grid.tile_center(position);
            let snap_open = self.can_occupy(role, snapped);
            if let Some(body) = self.ghosts[role].as_mut() {
                if snap_open {
                    body.position = snapped;
                    body.next_tile = None;
                    body.reached_target = true;
                } else {
                    // Nearest center is taken; back off to the tile we left.
                    body.next_tile = Some(from_tile);
                    body.reached_target = false;
                }
            }
        }
    }

    fn decide_direction(&mut self, role: GhostRole, position: Vec2) {
        let grid = self.grid;
        let pacman = self.data.pacman_data.coordinate;
        let chaser = self.ghost_position(GhostRole::Chaser).unwrap_or(pacman);
        let mover = self.mover(role);
        let bodies = self.body_colliders();
        let probe = CollisionProbe::new(&self.walls, &bodies, self.config.collision_layers);

        let Some(body) = self.ghosts[role].as_mut() else {
            return;
        };
        let context = PursuitContext {
            pacman,
            pacman_direction: self.data.pacman_data.direction,
            chaser,
            own_position: position,
            spawn: body.spawn,
        };
        let target = ghost_ai::pursuit_target(role, &context, &grid, &probe, &mover);
        let dir = ghost_ai::choose_direction(
            &grid,
            position,
            body.direction,
            &probe,
            &mover,
            &body.recent_tiles,
            target,
            body.targeting,
            &mut self.rng,
        );

        let tile = grid.tile_center(position);
        body.position = tile;
        body.direction = dir;
        body.reached_target = false;
        body.pursuit_target = Some(target);
        body.recent_tiles.push(tile);
        body.from_tile = tile;
        body.next_tile = Some(grid.neighbor(tile, dir));

        let animation = AnimationState::for_direction(dir).unwrap_or(AnimationState::Rest);
        if body.animation != animation {
            self.play_animation(role, animation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::*;
    use super::*;
    use crate::constants::{FIXED_TICK_MS, MAX_RECENT_TILES};
    use crate::layout::{MazeLayout, DEMO_MAZE};
    use crate::store::MemoryStore;

    const CORRIDOR: &[&str] = &[
        "#######",
        "#.....#",
        "#######",
    ];

    fn demo_engine(seed: u64, shuffled: bool) -> TestEngine {
        let grid = TileGrid::default();
        let layout = MazeLayout::parse(DEMO_MAZE, &grid);
        let mut data = GameData::default();
        let mut ghosts = Vec::new();
        for role in GhostRole::ALL {
            let Some(spawn) = layout.spawns[role] else {
                continue;
            };
            data.ghost_data.list_alive_ghost.push(role);
            let mut ghost = crate::config::GhostConfig::new(role, spawn);
            ghost.direct_targeting = !shuffled;
            ghosts.push(ghost);
        }
        data.ghost_data.current_controlling_ghost = Some(GhostRole::Chaser);
        data.pacman_data.coordinate = layout.pacman_start.unwrap_or_default();
        data.pacman_data.direction = Direction::Left;
        let mut engine = GhostMazeEngine::new(
            MazeConfig::new(ghosts),
            layout.walls,
            MemoryStore::new(data),
            seed,
        )
        .expect("engine builds");
        engine.start_session(true);
        engine
    }

    fn trace(engine: &mut TestEngine, ticks: usize) -> Vec<Vec2> {
        let mut positions = Vec::new();
        for _ in 0..ticks {
            engine.frame();
            engine.step(FIXED_TICK_MS);
            positions.extend(GhostRole::ALL.into_iter().filter_map(|role| engine.ghost_position(role)));
        }
        positions
    }

    #[test]
    fn auto_ghost_leaves_its_spawn() {
        let mut engine = demo_engine(3, false);
        let start = engine.ghost_position(GhostRole::Ambusher).expect("pinky");
        run_ticks(&mut engine, 200);
        let now = engine.ghost_position(GhostRole::Ambusher).expect("pinky");
        assert!(!now.approx_eq(start));
    }

    #[test]
    fn recent_tiles_never_exceed_limit() {
        let mut engine = demo_engine(11, true);
        for _ in 0..400 {
            run_ticks(&mut engine, 1);
            for role in GhostRole::ALL {
                assert!(engine.recent_tiles(role).len() <= MAX_RECENT_TILES);
            }
        }
    }

    #[test]
    fn auto_ghosts_stay_on_lanes_and_out_of_walls() {
        let mut engine = demo_engine(5, true);
        let grid = *engine.grid();
        for position in trace(&mut engine, 300) {
            let center = grid.tile_center(position);
            let on_lane = (position.x - center.x).abs() < 1e-4 || (position.y - center.y).abs() < 1e-4;
            assert!(on_lane, "{position:?} left the tile lanes");
        }
        let bodies = engine.body_colliders();
        let probe = CollisionProbe::new(&engine.walls, &bodies, engine.config.collision_layers);
        for role in GhostRole::ALL {
            let position = engine.ghost_position(role).expect("ghost");
            assert!(probe.can_occupy(position, &engine.mover(role)));
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut first = demo_engine(42, true);
        let mut second = demo_engine(42, true);
        assert_eq!(trace(&mut first, 250), trace(&mut second, 250));
    }

    #[test]
    fn dead_end_stalls_then_backtracks_once_history_flushes() {
        let mut engine = engine_with(
            CORRIDOR,
            &[(GhostRole::Chaser, (1, 1)), (GhostRole::Ambusher, (4, 1))],
            0,
        );
        let grid = *engine.grid();
        let layout = MazeLayout::parse(CORRIDOR, &grid);
        let dead_end = cell(&grid, &layout, 5, 1);

        let mut reached_dead_end = false;
        let mut left_dead_end = false;
        for _ in 0..200 {
            run_ticks(&mut engine, 1);
            let position = engine.ghost_position(GhostRole::Ambusher).expect("pinky");
            if position.approx_eq(dead_end) {
                reached_dead_end = true;
            } else if reached_dead_end && position.x < dead_end.x - 0.05 {
                left_dead_end = true;
                break;
            }
        }
        assert!(reached_dead_end);
        assert!(left_dead_end);
    }

    #[test]
    fn decision_records_pursuit_target() {
        let mut engine = demo_engine(1, false);
        run_ticks(&mut engine, 1);
        let snapshot = engine.build_snapshot(true);
        let pinky = snapshot
            .ghosts
            .iter()
            .find(|ghost| ghost.role == GhostRole::Ambusher)
            .expect("pinky view");
        assert!(pinky.pursuit_target.is_some());
        assert_eq!(pinky.recent_tiles.len(), 1);
        assert!(!pinky.controlled);
    }
}
