//! Maze Escape headless driver
//!
//! Runs a demo maze with a path-finding autopilot at the fixed timestep, then
//! the arcade stage with a simple dodge-and-shoot pilot, and logs the outcome.
//!
//! Usage: `maze-escape [tuning.json] [highscores.json]`

use std::collections::VecDeque;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;

use maze_escape::audio::{AudioManager, NullAudio};
use maze_escape::consts::{MAX_FRAME_STEPS, SIM_DT, TILE_SIZE};
use maze_escape::sim::{
    Arcade, ArcadeInput, ArcadeStatus, BlockKind, FrameInput, Maze, MazeLayout, MazeStatus,
    RngState, TileGrid,
};
use maze_escape::{HighScores, ScoreBoard, Tuning};

const DEMO_MAZE: &str = "\
###########
#E..#....X#
#.#.#.##..#
#.#...#...#
#.###.#.#.#
#..s..#.#z#
###.###.#.#
#K..h.m...#
###########";

/// Simulated wall-clock frame length (a 50 Hz display)
const FRAME_TIME: f32 = 0.02;
const MAX_MAZE_SECONDS: f32 = 120.0;
const MAX_ARCADE_SECONDS: f32 = 180.0;
const DEFAULT_SCORES_PATH: &str = "highscores.json";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Maze Escape (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let layout = match MazeLayout::from_ascii(DEMO_MAZE, TILE_SIZE, Vec2::ZERO) {
        Ok(layout) => layout,
        Err(e) => {
            log::error!("Demo maze is invalid: {e}");
            return ExitCode::FAILURE;
        }
    };

    let seed = RngState::new(0x5eed_cafe);
    let mut rng = seed.to_rng();
    let mut audio = AudioManager::new(NullAudio::default());
    let mut score = ScoreBoard::new();

    let mut maze = Maze::new(layout, tuning.clone());
    let maze_status = run_maze(&mut maze, &mut rng, &mut audio, &mut score);
    log::info!(
        "Maze ended {:?} at {:.1}s, score {}",
        maze_status,
        maze.elapsed,
        score.total
    );

    let mut escaped = maze_status == MazeStatus::Escaped;
    if maze_status == MazeStatus::LaunchArcade || escaped {
        let mut arcade = Arcade::new(tuning.arcade.clone());
        let arcade_status = run_arcade(&mut arcade, &mut rng, &mut audio, &mut score);
        log::info!(
            "Arcade ended {:?} at {:.1}s, score {}",
            arcade_status,
            arcade.elapsed,
            score.total
        );
        escaped = arcade_status == ArcadeStatus::Won;
    }

    let scores_path = args.next().unwrap_or_else(|| DEFAULT_SCORES_PATH.to_string());
    let mut high_scores = match HighScores::load(&scores_path) {
        Ok(scores) => scores,
        Err(e) => {
            log::warn!("Ignoring unreadable high scores in {scores_path}: {e}");
            HighScores::new()
        }
    };
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0);
    match high_scores.record(score.total, escaped, timestamp) {
        Some(rank) => {
            log::info!("Final score {} (rank #{rank})", score.total);
            if let Err(e) = high_scores.save(&scores_path) {
                log::error!("Failed to save high scores to {scores_path}: {e}");
                return ExitCode::FAILURE;
            }
        }
        None => log::info!("Final score {}", score.total),
    }
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on the web; the library is embedded by the host page
}

/// Fixed-step loop: accumulate frame time, step the maze in `SIM_DT` slices
fn run_maze(
    maze: &mut Maze,
    rng: &mut rand_pcg::Pcg32,
    audio: &mut AudioManager<NullAudio>,
    score: &mut ScoreBoard,
) -> MazeStatus {
    let mut accumulator = 0.0;
    let mut wall_time = 0.0;

    while maze.status() == MazeStatus::Playing && wall_time < MAX_MAZE_SECONDS {
        wall_time += FRAME_TIME;
        accumulator += FRAME_TIME;

        let mut steps = 0;
        while accumulator >= SIM_DT && steps < MAX_FRAME_STEPS {
            let input = autopilot(maze);
            maze.on_frame(SIM_DT, &input, rng, audio, score);
            accumulator -= SIM_DT;
            steps += 1;
        }
    }
    maze.status()
}

/// Walk toward the key, then the exit; shoot and swing at anything nearby
fn autopilot(maze: &Maze) -> FrameInput {
    let grid = &maze.grid;
    let player = &maze.player;
    let goal = if player.has_key {
        grid.find(BlockKind::Exit)
    } else {
        grid.find(BlockKind::Key)
    };

    let move_dir = match (player.cell, goal) {
        (Some(from), Some(to)) => next_step(grid, from, to)
            .map(|(col, row)| grid.cell_center(col, row) - player.center())
            .unwrap_or(Vec2::ZERO),
        _ => Vec2::ZERO,
    };

    let danger = maze
        .entities
        .iter()
        .filter(|e| e.is_mob())
        .any(|e| e.hitbox.center().distance(player.center()) < TILE_SIZE * 3.0);
    let ahead = player.facing.vector();
    let mob_ahead = maze.entities.iter().filter(|e| e.is_mob()).any(|e| {
        let to = e.hitbox.center() - player.center();
        to.length() < TILE_SIZE * 6.0 && to.normalize_or_zero().dot(ahead) > 0.9
    });

    FrameInput {
        move_dir,
        sprint: !danger,
        fire: mob_ahead || maze.boss.damage_hitbox().is_some(),
        activate_saber: danger,
    }
}

/// First cell on a shortest open path (breadth-first over cardinal moves)
fn next_step(grid: &TileGrid, from: (u32, u32), to: (u32, u32)) -> Option<(u32, u32)> {
    if from == to {
        return Some(to);
    }
    let (w, h) = (grid.width() as usize, grid.height() as usize);
    let index = |(c, r): (u32, u32)| r as usize * w + c as usize;
    let mut came_from: Vec<Option<(u32, u32)>> = vec![None; w * h];
    let mut queue = VecDeque::from([from]);
    came_from[index(from)] = Some(from);

    while let Some(cell) = queue.pop_front() {
        if cell == to {
            break;
        }
        let (c, r) = (cell.0 as i64, cell.1 as i64);
        for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let Some(block) = grid.block(c + dc, r + dr) else {
                continue;
            };
            let next = (block.col, block.row);
            if block.is_obstacle() || came_from[index(next)].is_some() {
                continue;
            }
            came_from[index(next)] = Some(cell);
            queue.push_back(next);
        }
    }

    // Walk back from the goal to the cell right after `from`
    let mut cell = to;
    loop {
        let prev = came_from[index(cell)]?;
        if prev == from {
            return Some(cell);
        }
        cell = prev;
    }
}

fn run_arcade(
    arcade: &mut Arcade,
    rng: &mut rand_pcg::Pcg32,
    audio: &mut AudioManager<NullAudio>,
    score: &mut ScoreBoard,
) -> ArcadeStatus {
    let mut status = arcade.status();
    while status == ArcadeStatus::Playing && arcade.elapsed < MAX_ARCADE_SECONDS {
        let input = arcade_pilot(arcade);
        status = arcade.update(SIM_DT, input, rng, audio, score);
    }
    status
}

/// Line up under the nearest target, sidestep incoming fire
fn arcade_pilot(arcade: &Arcade) -> ArcadeInput {
    let ship = arcade.ship.pos;
    let target_x = arcade
        .boss
        .as_ref()
        .map(|b| b.pos.x)
        .or_else(|| {
            arcade
                .enemies
                .iter()
                .min_by(|a, b| a.pos.distance(ship).total_cmp(&b.pos.distance(ship)))
                .map(|e| e.pos.x)
        })
        .unwrap_or(arcade.tuning.width * 0.5);

    let threat = arcade
        .enemy_bullets
        .iter()
        .find(|s| (s.pos.x - ship.x).abs() < 20.0 && (0.0..120.0).contains(&(ship.y - s.pos.y)));
    let dx = match threat {
        Some(shot) => -(shot.pos.x - ship.x).signum(),
        None => ((target_x - ship.x) / 40.0).clamp(-1.0, 1.0),
    };

    ArcadeInput {
        move_dir: Vec2::new(dx, 0.0),
        fire: !arcade.ship.is_overheated() && arcade.ship.heat < 0.9,
    }
}
