//! Batch match runner for tuning.
//!
//! Runs many seeded matches in parallel using rayon and collects their
//! metrics. The human side, if the config has one, is driven by the
//! [`Autopilot`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pitch_core::config::SimConfig;
use pitch_core::error::SimError;
use pitch_core::input::TickInput;
use pitch_core::simulation::Simulation;

use crate::autopilot::Autopilot;
use crate::metrics::{BatchSummary, MatchMetrics, MetricsCollector};

/// Default tick cap per match. A regulation match lasts 5400 ticks; the
/// rest leaves room for a long shootout.
pub const DEFAULT_MAX_TICKS: u64 = 60_000;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Match configuration every game uses
    pub match_config: SimConfig,
    /// Number of matches to run
    pub game_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
    /// Maximum ticks per match (0 = unlimited)
    pub max_ticks: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            match_config: SimConfig::default(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl BatchConfig {
    /// Create config for a match setup
    pub fn new(match_config: SimConfig, game_count: u32) -> Self {
        Self {
            match_config,
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the per-match tick cap
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match metrics, in seed order
    pub games: Vec<MatchMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total matches
    pub total: u32,
    completed: AtomicU32,
    shootouts: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            shootouts: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed match
    pub fn record_completion(&self, went_to_shootout: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if went_to_shootout {
            self.shootouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let per_game = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Display progress to stderr
    pub fn display(&self) {
        let eta = self.eta();
        eprintln!(
            "Batch progress: {}/{} ({:.1}%), {} shootouts, ETA {}m {}s",
            self.current(),
            self.total,
            self.percentage(),
            self.shootouts.load(Ordering::Relaxed),
            eta.as_secs() / 60,
            eta.as_secs() % 60
        );
    }
}

/// Play one match to completion (or `max_ticks`, 0 = unlimited).
///
/// `on_tick` sees every tick number and the input applied to it, before the
/// tick runs; recording replays hooks in here.
pub fn play_match<F>(config: &SimConfig, seed: u64, max_ticks: u64, mut on_tick: F) -> MatchMetrics
where
    F: FnMut(u64, &TickInput),
{
    let mut sim = Simulation::new(config.clone(), seed);
    let mut autopilot = Autopilot::new(seed);
    let mut collector = MetricsCollector::new(&format!("game_{seed}"), seed);

    while !sim.is_over() && (max_ticks == 0 || sim.current_tick() < max_ticks) {
        let input = autopilot.decide(&sim);
        on_tick(sim.current_tick(), &input);
        collector.record(&sim.tick(&input));
    }

    if !sim.is_over() {
        debug!(seed, ticks = sim.current_tick(), "Match hit tick limit");
    }
    collector.finalize(sim.outcome(), sim.current_tick(), sim.state_hash())
}

/// Play one match without observing its inputs.
pub fn run_single_match(config: &SimConfig, seed: u64, max_ticks: u64) -> MatchMetrics {
    play_match(config, seed, max_ticks, |_, _| {})
}

/// Run a batch of matches.
///
/// The match config is validated once up front.
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, SimError> {
    config.match_config.validate()?;

    let start = Instant::now();
    let progress = BatchProgress::new(config.game_count);

    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        max_ticks = config.max_ticks,
        "Starting batch run"
    );

    // Configure thread pool if specified
    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let games: Vec<MatchMetrics> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let metrics = run_single_match(&config.match_config, seed, config.max_ticks);

            progress.record_completion(metrics.went_to_shootout());
            let completed = progress.current();
            if completed % 10 == 0 {
                debug!("Progress: {}/{}", completed, config.game_count);
            }
            if completed % 100 == 0 {
                progress.display();
            }
            metrics
        })
        .collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    Ok(BatchResults {
        config,
        games,
        summary,
        duration_seconds,
    })
}

/// Verify determinism by playing the same seed several times.
///
/// Every run must agree on the final hash, score, winner and length.
pub fn verify_determinism(config: &SimConfig, seed: u64, runs: u32, max_ticks: u64) -> bool {
    let results: Vec<MatchMetrics> = (0..runs.max(1))
        .map(|_| run_single_match(config, seed, max_ticks))
        .collect();

    let first = &results[0];
    results.iter().all(|r| {
        r.final_state_hash == first.final_state_hash
            && r.score == first.score
            && r.penalties == first.penalties
            && r.winner == first.winner
            && r.duration_ticks == first.duration_ticks
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::EndCondition;
    use pitch_core::replay::{Replay, ReplayPlayer};
    use pitch_test_utils::fixtures::{ai_only_config, short_match_config};

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.game_count, 100);
        assert_eq!(config.max_ticks, DEFAULT_MAX_TICKS);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(short_match_config(5), 500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_max_ticks(100);

        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.max_ticks, 100);
        assert_eq!(config.match_config.match_rules.duration_secs, 5);
    }

    #[test]
    fn test_progress_tracking() {
        let progress = BatchProgress::new(4);
        assert_eq!(progress.current(), 0);
        assert_eq!(progress.percentage(), 0.0);

        progress.record_completion(true);
        progress.record_completion(false);
        assert_eq!(progress.current(), 2);
        assert!((progress.percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_match_finishes() {
        let metrics = run_single_match(&short_match_config(5), 3, 0);
        assert!(metrics.winner.is_some());
        assert_ne!(metrics.end_condition, EndCondition::Timeout);
        assert_eq!(metrics.game_id, "game_3");
    }

    #[test]
    fn test_tick_limit_leaves_match_unfinished() {
        let metrics = run_single_match(&short_match_config(5), 3, 50);
        assert_eq!(metrics.duration_ticks, 50);
        assert!(metrics.winner.is_none());
        assert_eq!(metrics.end_condition, EndCondition::Timeout);
    }

    #[test]
    fn test_recorded_match_replays() {
        let config = short_match_config(5);
        let mut replay = Replay::new(config.clone(), 21);
        let metrics = play_match(&config, 21, 0, |tick, input| replay.record(tick, input));
        replay.finalize(metrics.duration_ticks, metrics.final_state_hash);

        let mut player = ReplayPlayer::new(replay);
        assert_eq!(player.verify().ok(), Some(metrics.final_state_hash));
    }

    #[test]
    fn test_run_batch_small() {
        let config = BatchConfig::new(short_match_config(5), 6).with_seed(100);
        let results = run_batch(config).unwrap();

        assert_eq!(results.games.len(), 6);
        assert_eq!(results.summary.total_games, 6);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (100..106).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_batch_ai_only() {
        let mut match_config = ai_only_config();
        match_config.match_rules.duration_secs = 5;
        let results = run_batch(BatchConfig::new(match_config, 4)).unwrap();
        assert_eq!(results.summary.unfinished, 0);
    }

    #[test]
    fn test_run_batch_rejects_invalid_config() {
        let mut match_config = short_match_config(5);
        match_config.match_rules.tick_rate = 0;
        let err = run_batch(BatchConfig::new(match_config, 2)).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&short_match_config(5), 12345, 3, 0));
    }

    #[test]
    fn test_batch_results_save_load() {
        let config = BatchConfig::new(short_match_config(3), 3);
        let results = run_batch(config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.config.match_config, results.config.match_config);
    }
}
