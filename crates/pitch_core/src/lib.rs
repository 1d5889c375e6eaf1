//! # Pitch Core
//!
//! Deterministic simulation core for a five-a-side arcade football match.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No input polling
//! - No ambient randomness (one seeded RNG owned by the simulation)
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! This separation enables:
//! - Headless batch runs and AI tuning
//! - Replays that re-simulate bit-for-bit
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`simulation`] - The match loop and its events
//! - [`player`], [`team`], [`ball`] - Bodies on the pitch
//! - [`ai`] - AI decision engine
//! - [`collision`] - Player separation
//! - [`match_state`] - Score, clock and goal handling
//! - [`shootout`] - Penalty shootout
//! - [`config`] - Tunables and rosters
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod ball;
pub mod collision;
pub mod config;
pub mod error;
pub mod input;
pub mod match_state;
pub mod math;
pub mod player;
pub mod replay;
pub mod rng;
pub mod shootout;
pub mod simulation;
pub mod snapshot;
pub mod team;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ball::{Ball, GoalLine};
    pub use crate::config::{Difficulty, DifficultyProfile, SimConfig};
    pub use crate::error::{ConfigError, Result, SimError};
    pub use crate::input::TickInput;
    pub use crate::match_state::GoalEvent;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::player::{AiState, Player, Role, Side};
    pub use crate::replay::{Replay, ReplayPlayer};
    pub use crate::shootout::{PenaltyOutcome, ShootoutEvent, ShootoutPhase};
    pub use crate::simulation::{MatchEvent, MatchOutcome, Simulation, TickEvents};
    pub use crate::snapshot::{MatchPhase, Snapshot};
    pub use crate::team::Team;
}
