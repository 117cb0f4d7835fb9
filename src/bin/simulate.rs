use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ghost_maze::config::MazeConfig;
use ghost_maze::constants::{FIXED_TICK_MS, FRAME_MS};
use ghost_maze::engine::GhostMazeEngine;
use ghost_maze::grid::TileGrid;
use ghost_maze::layout::{MazeLayout, DEMO_MAZE};
use ghost_maze::logging::init_tracing;
use ghost_maze::store::{GameDataStore, JsonFileStore, MemoryStore};
use ghost_maze::types::{Direction, GhostRole, MazeEvent, Vec2};
use serde::Serialize;
use tracing::{info, warn};

/// Ticks between pacman steps along its scripted route.
const PACMAN_STEP_TICKS: u64 = 12;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1_500)]
    ticks: u64,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// ASCII maze file; the built-in maze when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// JSON maze config; derived from the layout's spawn markers when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON game-data file; an in-memory record when omitted.
    #[arg(long)]
    store: Option<PathBuf>,
    /// Request a control switch every N ticks.
    #[arg(long)]
    switch_every: Option<u64>,
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: u64,
    #[serde(rename = "finalActive")]
    final_active: Option<GhostRole>,
    switches: u32,
    #[serde(rename = "rejectedSwitches")]
    rejected_switches: u32,
    #[serde(rename = "positionSaves")]
    position_saves: u32,
    #[serde(rename = "abortedMoves")]
    aborted_moves: u32,
    #[serde(rename = "animationChanges")]
    animation_changes: u32,
    #[serde(rename = "finalPositions")]
    final_positions: BTreeMap<String, Vec2>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rows = match cli.layout.as_ref() {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read layout {}", path.display()))?
            .lines()
            .map(str::to_string)
            .collect::<Vec<_>>(),
        None => DEMO_MAZE.iter().map(|row| row.to_string()).collect(),
    };
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

    let config = match cli.config.as_ref() {
        Some(path) => MazeConfig::from_json_file(path)?,
        None => MazeConfig::new(Vec::new()),
    };
    let grid = config.grid();
    let layout = MazeLayout::parse(&rows, &grid);
    let config = if config.ghosts.is_empty() {
        MazeConfig {
            ghosts: layout.ghost_configs(),
            ..config
        }
    } else {
        config
    };
    if config.ghosts.is_empty() {
        bail!("no ghosts configured and the layout has no spawn markers");
    }

    let summary = match cli.store.clone() {
        Some(path) => {
            info!(path = %path.display(), "using json game-data store");
            run(&cli, config, &layout, &rows, JsonFileStore::new(path))?
        }
        None => run(&cli, config, &layout, &rows, MemoryStore::default())?,
    };

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn run<S: GameDataStore>(
    cli: &Cli,
    config: MazeConfig,
    layout: &MazeLayout,
    rows: &[&str],
    mut store: S,
) -> Result<RunSummary> {
    let mut data = store.load()?;
    if layout.seed_game_data(&mut data, &config) {
        store.save(&data)?;
        info!(
            ghosts = data.ghost_data.list_alive_ghost.len(),
            "seeded empty game data"
        );
    }

    let grid = config.grid();
    let mut engine = GhostMazeEngine::new(config, layout.walls.clone(), store, cli.seed)?;
    let mut pacman = PacmanRoute::new(&grid, layout, rows, engine.data().pacman_data.coordinate);
    let mut summary = RunSummary {
        seed: cli.seed,
        ..RunSummary::default()
    };

    engine.start_session(true);
    let mut frame_budget_ms = 0;
    for tick in 1..=cli.ticks {
        if let Some(every) = cli.switch_every.filter(|every| *every > 0) {
            if tick % every == 0 {
                engine.request_cycle_switch();
            }
        }
        if tick % PACMAN_STEP_TICKS == 0 {
            let (position, direction) = pacman.advance();
            engine.update_pacman(position, direction);
        }

        frame_budget_ms += FIXED_TICK_MS;
        while frame_budget_ms >= FRAME_MS {
            frame_budget_ms -= FRAME_MS;
            engine.frame();
        }
        engine.step(FIXED_TICK_MS);

        for event in engine.build_snapshot(true).events {
            match event {
                MazeEvent::ControlSwitched { .. } => summary.switches += 1,
                MazeEvent::SwitchRejected { .. } => summary.rejected_switches += 1,
                MazeEvent::PositionSaved { .. } => summary.position_saves += 1,
                MazeEvent::MoveAborted { .. } => summary.aborted_moves += 1,
                MazeEvent::Animation { .. } => summary.animation_changes += 1,
            }
        }
    }

    let snapshot = engine.build_snapshot(true);
    if snapshot.active.is_none() {
        warn!("simulation finished with no controlled ghost");
    }
    summary.ticks = snapshot.tick;
    summary.elapsed_ms = snapshot.now_ms;
    summary.final_active = snapshot.active;
    summary.final_positions = snapshot
        .ghosts
        .iter()
        .map(|ghost| (ghost.role.name().to_string(), Vec2::new(ghost.x, ghost.y)))
        .collect();
    info!(
        ticks = summary.ticks,
        switches = summary.switches,
        saves = summary.position_saves,
        "simulation finished"
    );
    Ok(summary)
}

/// Pacman walks straight and turns clockwise whenever a wall is ahead.
struct PacmanRoute<'a> {
    grid: TileGrid,
    layout: &'a MazeLayout,
    rows: &'a [&'a str],
    position: Vec2,
    direction: Direction,
}

impl<'a> PacmanRoute<'a> {
    fn new(grid: &TileGrid, layout: &'a MazeLayout, rows: &'a [&'a str], start: Vec2) -> Self {
        Self {
            grid: *grid,
            layout,
            rows,
            position: grid.tile_center(start),
            direction: Direction::Left,
        }
    }

    fn advance(&mut self) -> (Vec2, Direction) {
        for _ in 0..Direction::ALL.len() {
            let next = self.grid.neighbor(self.position, self.direction);
            if self.is_open(next) {
                self.position = next;
                return (self.position, self.direction);
            }
            self.direction = turn_clockwise(self.direction);
        }
        (self.position, Direction::None)
    }

    fn is_open(&self, position: Vec2) -> bool {
        let (col, row) = self.layout.cell_of(&self.grid, position);
        if col < 0 || row < 0 {
            return false;
        }
        self.rows
            .get(row as usize)
            .and_then(|line| line.chars().nth(col as usize))
            .is_some_and(|cell| cell != '#')
    }
}

fn turn_clockwise(direction: Direction) -> Direction {
    match direction {
        Direction::Up => Direction::Right,
        Direction::Right => Direction::Down,
        Direction::Down => Direction::Left,
        Direction::Left | Direction::None => Direction::Up,
    }
}
