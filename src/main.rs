//! Headless driver: runs the engine on autopilot, manages level files and
//! the leaderboard.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use brick_breaker::levels::{LevelDir, LevelSource, Procedural, create_sample_levels};
use brick_breaker::{Engine, EngineConfig, GameEvent, GamePhase, HighScores, TickInput};

#[derive(Parser, Debug)]
#[command(name = "brick-breaker")]
#[command(about = "Deterministic brick breaker simulation")]
struct Cli {
    /// Engine config JSON (screen size and fps)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a seeded game on autopilot
    Run {
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Tick limit (18000 = five minutes at 60 fps)
        #[arg(long, default_value_t = 18_000)]
        ticks: u32,
        /// Directory of level-N.json files; procedural levels when absent
        #[arg(long)]
        levels: Option<PathBuf>,
        /// Leaderboard file to record the final score in
        #[arg(long)]
        scores: Option<PathBuf>,
        #[arg(long, default_value = "CPU")]
        name: String,
        /// Write the final state snapshot as JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Generate sample levels into a directory
    GenerateLevels {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, default_value_t = 10)]
        count: u32,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// List the levels stored in a directory
    ListLevels {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Print the leaderboard
    Scores {
        #[arg(long)]
        scores: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Run {
            seed,
            ticks,
            levels,
            scores,
            name,
            snapshot,
        } => run(config, seed, ticks, levels, scores, &name, snapshot),
        Commands::GenerateLevels { dir, count, seed } => {
            let mut source = LevelDir::new(&dir);
            let mut rng = Pcg32::seed_from_u64(seed);
            create_sample_levels(&mut source, count, config.screen_width, &mut rng)?;
            println!("Wrote {count} levels to {}", dir.display());
            Ok(())
        }
        Commands::ListLevels { dir } => {
            for level in LevelDir::new(dir).list()? {
                let tag = if level.is_editor_level { " [editor]" } else { "" };
                println!(
                    "{:>3}  {:<20} {:>3} bricks{}",
                    level.level_num, level.name, level.brick_count, tag
                );
            }
            Ok(())
        }
        Commands::Scores { scores } => {
            let board = HighScores::load(&scores)?;
            for (rank, entry) in board.entries.iter().enumerate() {
                println!(
                    "{:>2}. {:<10} {:>8}  level {}",
                    rank + 1,
                    entry.name,
                    entry.score,
                    entry.level
                );
            }
            Ok(())
        }
    }
}

fn run(
    config: EngineConfig,
    seed: u64,
    ticks: u32,
    levels: Option<PathBuf>,
    scores: Option<PathBuf>,
    name: &str,
    snapshot: Option<PathBuf>,
) -> Result<()> {
    let source: Box<dyn LevelSource> = match levels {
        Some(dir) => Box::new(LevelDir::new(dir)),
        None => Box::new(Procedural),
    };
    let mut engine = Engine::with_source(config, seed, source);
    let dt = 1.0 / config.fps as f32;
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut bricks_destroyed = 0u32;
    let mut tick = 0u32;
    while tick < ticks {
        engine.update(dt, &input);
        tick += 1;

        for event in engine.drain_events() {
            match event {
                GameEvent::BrickDestroyed { .. } => bricks_destroyed += 1,
                GameEvent::LifeLost { lives_left } => log::info!("tick {tick}: life lost, {lives_left} left"),
                _ => {}
            }
        }

        match engine.phase() {
            GamePhase::LevelComplete => engine.advance_to_next_level(),
            GamePhase::GameOver => break,
            _ => {}
        }
    }

    let state = engine.state();
    println!(
        "seed {seed}: {tick} ticks, level {}, score {}, lives {}, {} bricks destroyed",
        state.level, state.score, state.lives, bricks_destroyed
    );

    if let Some(path) = snapshot {
        let json = serde_json::to_string_pretty(&engine.snapshot())?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    if let Some(path) = scores {
        let mut board = HighScores::load(&path)?;
        match board.add_score(name, state.score, state.level, None) {
            Some(rank) => {
                board.save(&path)?;
                println!("New high score, rank {rank}");
            }
            None => println!("Score did not make the leaderboard"),
        }
    }

    Ok(())
}
