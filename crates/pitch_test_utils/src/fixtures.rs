//! Test fixtures and helpers.
//!
//! Pre-built configs, matches and input scripts for consistent testing.

use fixed::types::I32F32;

use pitch_core::config::SimConfig;
use pitch_core::input::TickInput;
use pitch_core::player::Side;
use pitch_core::simulation::Simulation;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Default config with the home side under human control.
#[must_use]
pub fn test_config() -> SimConfig {
    SimConfig::default()
}

/// Default config with regulation shortened to `seconds`.
///
/// Zero seconds ends regulation at kickoff, which with a 0-0 score goes
/// straight to penalties.
#[must_use]
pub fn short_match_config(seconds: u32) -> SimConfig {
    let mut config = SimConfig::default();
    config.match_rules.duration_secs = seconds;
    config
}

/// Default config where the AI controls both teams.
#[must_use]
pub fn ai_only_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.match_rules.human_side = None;
    config
}

/// Default config loaded from RON text, for asset round-trip tests.
///
/// # Panics
///
/// Panics if the text does not parse.
#[must_use]
pub fn config_from_ron(text: &str) -> SimConfig {
    SimConfig::from_ron_str(text).expect("fixture RON must parse")
}

/// A default match at kickoff.
#[must_use]
pub fn seeded_sim(seed: u64) -> Simulation {
    Simulation::new(test_config(), seed)
}

/// Place the ball at the feet of one player, at rest.
pub fn ball_at_player(sim: &mut Simulation, side: Side, slot: usize) {
    let position = sim.team(side).players[slot].position();
    let ball = sim.ball_mut();
    ball.reset(position);
}

/// A repeatable, busy input script.
///
/// Runs up the pitch with a sideways weave, kicks every 45 ticks, switches
/// player every 300 ticks, and during penalties nudges the aim and shoots.
#[must_use]
pub fn scripted_input(tick: u64) -> TickInput {
    let weave = match (tick / 40) % 3 {
        0 => -1,
        1 => 0,
        _ => 1,
    };
    TickInput {
        movement: (weave, 1),
        kick: tick % 45 == 44,
        switch_player: tick % 300 == 299,
        difficulty: None,
        aim_delta: if (tick / 20) % 2 == 0 { 1 } else { -1 },
        confirm_shot: tick % 50 == 49,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_helpers() {
        assert_eq!(fixed(3), I32F32::from_num(3));
        assert_eq!(fixed_f(0.5), I32F32::from_num(1) / I32F32::from_num(2));
    }

    #[test]
    fn test_short_match_config() {
        let config = short_match_config(2);
        assert_eq!(config.match_rules.duration_ticks(), 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ai_only_config_has_no_human() {
        assert!(ai_only_config().match_rules.human_side.is_none());
    }

    #[test]
    fn test_ball_at_player() {
        let mut sim = seeded_sim(1);
        ball_at_player(&mut sim, Side::Away, 2);
        assert_eq!(
            sim.ball().position,
            sim.team(Side::Away).players[2].position()
        );
        assert!(sim.ball().velocity.is_zero());
    }

    #[test]
    fn test_scripted_input_is_busy() {
        let inputs: Vec<_> = (0..300).map(scripted_input).collect();
        assert!(inputs.iter().any(|i| i.kick));
        assert!(inputs.iter().any(|i| i.switch_player));
        assert!(inputs.iter().all(|i| !i.is_idle()));
    }

    #[test]
    fn test_config_from_ron_round_trip() {
        let text = test_config().to_ron().expect("serialize");
        assert_eq!(config_from_ron(&text), test_config());
    }
}
