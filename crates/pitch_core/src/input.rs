//! Per-tick input intents.
//!
//! Inputs are edge-free: the caller decides when a key press becomes a
//! `kick` or `switch_player` intent and sends it for exactly one tick.

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;

/// Everything a human can ask for in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    /// Desired movement direction per axis; only the sign is used.
    pub movement: (i8, i8),
    /// Kick, or pass when a teammate is ahead.
    pub kick: bool,
    /// Cycle to the next controlled player.
    pub switch_player: bool,
    /// Switch AI difficulty.
    pub difficulty: Option<Difficulty>,
    /// Shootout aim adjustment; only the sign is used.
    pub aim_delta: i8,
    /// Shootout: strike the ball.
    pub confirm_shot: bool,
}

impl TickInput {
    /// No intents at all.
    pub const IDLE: Self = Self {
        movement: (0, 0),
        kick: false,
        switch_player: false,
        difficulty: None,
        aim_delta: 0,
        confirm_shot: false,
    };

    /// Movement-only input.
    #[must_use]
    pub const fn moving(dx: i8, dy: i8) -> Self {
        Self {
            movement: (dx, dy),
            ..Self::IDLE
        }
    }

    /// Whether the input carries no intent.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }

    /// Movement with each axis reduced to -1, 0 or 1.
    #[must_use]
    pub fn direction(&self) -> (i8, i8) {
        (self.movement.0.signum(), self.movement.1.signum())
    }

    /// The held part of the input: movement and aim, without one-shot
    /// intents.
    #[must_use]
    pub const fn held(&self) -> Self {
        Self {
            movement: self.movement,
            aim_delta: self.aim_delta,
            ..Self::IDLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert!(TickInput::default().is_idle());
        assert!(!TickInput::moving(1, 0).is_idle());
    }

    #[test]
    fn test_held_drops_one_shot_intents() {
        let input = TickInput {
            movement: (1, -1),
            kick: true,
            switch_player: true,
            aim_delta: -1,
            confirm_shot: true,
            ..TickInput::IDLE
        };
        let held = input.held();
        assert_eq!(held.movement, (1, -1));
        assert_eq!(held.aim_delta, -1);
        assert!(!held.kick && !held.switch_player && !held.confirm_shot);
    }

    #[test]
    fn test_direction_uses_sign() {
        assert_eq!(TickInput::moving(-7, 3).direction(), (-1, 1));
    }
}
