//! Headless match runner.
//!
//! This binary runs matches without graphics, controlled via JSON on
//! stdin/stdout. Designed for bots, CI testing, and replay verification.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p pitch_headless
//!
//! # Play one autopilot match and record it
//! cargo run -p pitch_headless -- simulate --seed 7 --record match.replay
//!
//! # Run a batch for tuning
//! cargo run -p pitch_headless -- batch --count 200 --output results/
//!
//! # Verify a replay
//! cargo run -p pitch_headless -- replay --file match.replay --verify
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pitch_core::config::SimConfig;
use pitch_core::input::TickInput;
use pitch_core::replay::{Replay, ReplayPlayer};
use pitch_core::simulation::Simulation;

use pitch_headless::{
    batch::{play_match, run_batch, verify_determinism, BatchConfig, DEFAULT_MAX_TICKS},
    runner::{load_match_config, HeadlessConfig, HeadlessRunner},
};

#[derive(Parser)]
#[command(name = "pitch_headless")]
#[command(about = "Headless football match runner for bots and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Match config (RON); defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive match over stdin/stdout
    Run {
        /// Match seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Play one match with the autopilot and print its report
    Simulate {
        /// Match seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum ticks (0 = unlimited)
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u64,

        /// Save a replay of the match
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Run a batch of matches for tuning
    Batch {
        /// Number of matches to run
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum ticks per match (0 = unlimited)
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u64,
    },

    /// Verify determinism by playing the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Replay a recorded match
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify replay produces identical hash
        #[arg(long)]
        verify: bool,
    },

    /// Run N AI-only ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "54000")]
        ticks: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let config = load_or_exit(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run { seed, auto_state }) => cmd_run(config, seed, auto_state),
        Some(Commands::Simulate {
            seed,
            max_ticks,
            record,
        }) => cmd_simulate(&config, seed, max_ticks, record),
        Some(Commands::Batch {
            count,
            parallel,
            output,
            seed,
            max_ticks,
        }) => cmd_batch(config, count, parallel, output, seed, max_ticks),
        Some(Commands::Verify { seed, runs }) => cmd_verify(&config, seed, runs),
        Some(Commands::Replay { file, verify }) => cmd_replay(&file, verify),
        Some(Commands::Benchmark { ticks }) => cmd_benchmark(config, ticks),
        None => {
            // Default: interactive mode
            cmd_run(config, 0, false);
        }
    }
}

fn load_or_exit(path: Option<&Path>) -> SimConfig {
    match load_match_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load match config");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            std::process::exit(1);
        }
    }
}

/// Run a single interactive match
fn cmd_run(config: SimConfig, seed: u64, auto_state: bool) {
    tracing::info!(seed, "Starting interactive session");

    let mut runner = HeadlessRunner::with_config(
        config,
        seed,
        HeadlessConfig {
            auto_state_output: auto_state,
        },
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = runner.run(stdin.lock(), stdout.lock()) {
        tracing::error!(error = %e, "Protocol stream failed");
        std::process::exit(1);
    }
}

/// Play one autopilot match
fn cmd_simulate(config: &SimConfig, seed: u64, max_ticks: u64, record: Option<PathBuf>) {
    let start = Instant::now();
    let mut replay = record.as_ref().map(|_| Replay::new(config.clone(), seed));

    let metrics = play_match(config, seed, max_ticks, |tick, input| {
        if let Some(replay) = replay.as_mut() {
            replay.record(tick, input);
        }
    });

    tracing::info!(
        seed,
        ticks = metrics.duration_ticks,
        score = ?metrics.score,
        penalties = ?metrics.penalties,
        winner = ?metrics.winner,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Match finished"
    );

    if let (Some(path), Some(mut replay)) = (record, replay) {
        replay.finalize(metrics.duration_ticks, metrics.final_state_hash);
        if let Err(e) = replay.save(&path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save replay");
            eprintln!("FATAL: Failed to save replay: {e}");
            std::process::exit(1);
        }
        tracing::info!(path = %path.display(), inputs = replay.input_count(), "Replay saved");
    }

    print_json(&metrics);
}

/// Run batch of matches for tuning
fn cmd_batch(
    match_config: SimConfig,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_ticks: u64,
) {
    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let config = BatchConfig {
        match_config,
        game_count: count,
        parallel_games: parallel,
        output_dir: output.clone(),
        seed_start: seed,
        max_ticks,
    };

    let results = match run_batch(config) {
        Ok(results) => results,
        Err(e) => {
            tracing::error!(error = %e, "Batch failed");
            std::process::exit(1);
        }
    };

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", summary.total_games);
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    for (side, rate) in &summary.win_rates {
        eprintln!("  {:<6} win rate: {:>5.1}%", side, rate * 100.0);
    }
    if summary.unfinished > 0 {
        eprintln!("  Unfinished: {}", summary.unfinished);
    }
    eprintln!("  Goals per match: {:.2}", summary.avg_goals);
    eprintln!("  Shootout rate: {:.1}%", summary.shootout_rate * 100.0);
    eprintln!("Results saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(config: &SimConfig, seed: u64, runs: u32) {
    tracing::info!(seed, runs, "Verifying determinism");

    if verify_determinism(config, seed, runs, DEFAULT_MAX_TICKS) {
        eprintln!("PASS: {} runs of seed {} are identical", runs, seed);
    } else {
        eprintln!("FAIL: runs of seed {} diverged", seed);
        std::process::exit(1);
    }
}

/// Replay a recorded match
fn cmd_replay(file: &Path, verify: bool) {
    let replay = match Replay::load(file) {
        Ok(replay) => replay,
        Err(e) => {
            tracing::error!(error = %e, path = %file.display(), "Failed to load replay");
            std::process::exit(1);
        }
    };
    tracing::info!(
        seed = replay.seed,
        ticks = replay.duration(),
        inputs = replay.input_count(),
        "Loaded replay"
    );

    let mut player = ReplayPlayer::new(replay);
    if verify {
        match player.verify() {
            Ok(hash) => eprintln!("PASS: replay reproduces final hash {hash:#018x}"),
            Err(e) => {
                tracing::error!(error = %e, "Replay verification failed");
                eprintln!("FAIL: {e}");
                std::process::exit(1);
            }
        }
    } else {
        while player.advance() {}
    }

    print_json(&player.simulation().snapshot());
}

/// Run AI-only ticks for benchmarking
fn cmd_benchmark(mut config: SimConfig, ticks: u64) {
    config.match_rules.human_side = None;
    let mut sim = Simulation::new(config, 0);

    let start = Instant::now();
    for _ in 0..ticks {
        if sim.is_over() {
            sim.reset(sim.seed().wrapping_add(1));
        }
        sim.tick(&TickInput::IDLE);
    }
    let elapsed = start.elapsed();

    let per_tick_us = elapsed.as_secs_f64() * 1_000_000.0 / ticks.max(1) as f64;
    eprintln!(
        "Ran {} ticks in {:.3}s ({:.2} µs/tick, {:.0} ticks/sec)",
        ticks,
        elapsed.as_secs_f64(),
        per_tick_us,
        ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
}
