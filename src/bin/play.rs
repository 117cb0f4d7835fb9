use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use ghost_maze::config::MazeConfig;
use ghost_maze::constants::{FIXED_TICK_MS, FRAME_MS};
use ghost_maze::engine::GhostMazeEngine;
use ghost_maze::grid::TileGrid;
use ghost_maze::input::InputAction;
use ghost_maze::layout::{MazeLayout, DEMO_MAZE};
use ghost_maze::logging::init_tracing;
use ghost_maze::store::{GameDataStore, JsonFileStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let verbose = std::env::var("GHOST_MAZE_VERBOSE").is_ok_and(|value| value == "1");
    init_tracing(verbose);

    let store_path = std::env::var("GHOST_MAZE_STORE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data/ghost-maze.json"));
    let seed = std::env::var("GHOST_MAZE_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1);

    let layout = MazeLayout::parse(DEMO_MAZE, &TileGrid::default());
    let config = MazeConfig::new(layout.ghost_configs());
    let mut store = JsonFileStore::new(store_path);
    let mut data = store.load()?;
    if layout.seed_game_data(&mut data, &config) {
        store.save(&data)?;
    }
    info!(path = %store.path().display(), seed, "ghost maze ready");

    let mut engine = GhostMazeEngine::new(config, layout.walls.clone(), store, seed)?;
    engine.start_session(true);
    println!("keys: w/a/s/d move, c changes ghost, q quits (press enter after keys)");

    let mut tick = interval(Duration::from_millis(FIXED_TICK_MS));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame = interval(Duration::from_millis(FRAME_MS));
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown_cooldown = String::new();

    loop {
        tokio::select! {
            _ = tick.tick() => {
                engine.step(FIXED_TICK_MS);
            }
            _ = frame.tick() => {
                let text = engine.frame();
                if text != shown_cooldown {
                    shown_cooldown = text.to_string();
                    if !shown_cooldown.is_empty() {
                        println!("switch cooldown {shown_cooldown}");
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                for key in line.trim().chars() {
                    let action = match key {
                        'w' => InputAction::FaceUp,
                        's' => InputAction::FaceDown,
                        'a' => InputAction::FaceLeft,
                        'd' => InputAction::FaceRight,
                        'c' => InputAction::ChangeGhost,
                        'q' => return Ok(()),
                        other => {
                            warn!(key = %other, "unknown key");
                            continue;
                        }
                    };
                    engine.handle_input(action);
                }
                let snapshot = engine.build_snapshot(true);
                println!("{}", serde_json::to_string(&snapshot.ghosts)?);
            }
        }
    }
    Ok(())
}
