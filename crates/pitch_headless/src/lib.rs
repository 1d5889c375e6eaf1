//! Headless match runner for AI testing and CI verification.
//!
//! This crate drives a [`pitch_core::simulation::Simulation`] without any
//! graphics, controlled via JSON commands on stdin with match state on
//! stdout. This enables:
//!
//! - **Bot play**: An external controller can play the human side
//! - **Batch runs**: Many seeded AI matches in parallel for tuning
//! - **CI verification**: Determinism and replay checks
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (tick, input, query, ...)
//! - **stdout**: Responses (ready, events, state, game_over, ...)
//! - **stderr**: Logs (human-readable)
//!
//! See the [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Play interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p pitch_headless
//!
//! # Play one autopilot match and record it
//! cargo run -p pitch_headless -- simulate --seed 7 --record match.replay
//!
//! # Verify the recording
//! cargo run -p pitch_headless -- replay --file match.replay --verify
//! ```

pub mod autopilot;
pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod runner;

pub use autopilot::Autopilot;
pub use batch::{play_match, run_batch, run_single_match, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, MatchMetrics, MetricsCollector};
pub use protocol::{Command, Response};
pub use runner::{load_match_config, HeadlessConfig, HeadlessRunner};
