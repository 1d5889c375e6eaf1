//! Read-only view of the match for renderers and protocol clients.
//!
//! Coordinates are converted to `f32` here and nowhere else. Nothing in a
//! snapshot feeds back into the simulation.

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::player::{AiState, Role, Side};
use crate::shootout::{PenaltyOutcome, ShootoutPhase};

/// Top-level match phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Open play with the clock running.
    Regulation,
    /// Regulation ended level; penalties are being taken.
    Shootout,
    /// Nothing left to play.
    FullTime,
}

/// One player as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Team.
    pub side: Side,
    /// Formation slot.
    pub slot: usize,
    /// Display name.
    pub name: String,
    /// Kit colour.
    pub color: [u8; 3],
    /// Tactical role.
    pub role: Role,
    /// Position.
    pub position: (f32, f32),
    /// Body radius.
    pub radius: f32,
    /// Stamina as a fraction of the cap.
    pub stamina: f32,
    /// Whether this is the team's controlled player.
    pub controllable: bool,
    /// Whether the player moved last tick.
    pub moving: bool,
    /// Current AI intent.
    pub ai_state: AiState,
}

/// The ball as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    /// Position.
    pub position: (f32, f32),
    /// Velocity per tick.
    pub velocity: (f32, f32),
    /// Radius.
    pub radius: f32,
}

/// Shootout overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShootoutView {
    /// Round in progress, starting at 1.
    pub round: u32,
    /// Converted kicks, home first.
    pub converted: [u32; 2],
    /// Side taking the current kick.
    pub shooting: Side,
    /// Kick phase.
    pub phase: ShootoutPhase,
    /// Current aim in `[-1, 1]`.
    pub aim: f32,
    /// Most recent outcome while on display.
    pub last_outcome: Option<PenaltyOutcome>,
}

/// Full match view at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Match phase.
    pub phase: MatchPhase,
    /// All ten players, home first, in slot order.
    pub players: Vec<PlayerView>,
    /// The ball.
    pub ball: BallView,
    /// Regulation score, home first.
    pub score: [u32; 2],
    /// Team names, home first.
    pub team_names: [String; 2],
    /// Seconds left in regulation.
    pub remaining_seconds: f32,
    /// Active AI difficulty.
    pub difficulty: Difficulty,
    /// Ticks until goals count again.
    pub goal_cooldown: u32,
    /// Shootout overlay, once penalties have started.
    pub shootout: Option<ShootoutView>,
    /// Winner once the match is over and decided.
    pub winner: Option<Side>,
}

impl Snapshot {
    /// Players of one side.
    pub fn team(&self, side: Side) -> impl Iterator<Item = &PlayerView> {
        self.players.iter().filter(move |p| p.side == side)
    }

    /// Whether the match is over.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::FullTime
    }
}
