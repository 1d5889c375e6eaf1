//! Scripted controller for the human side.
//!
//! The autopilot stands in for a person at the keyboard during batch runs
//! and recorded matches. It produces the same [`TickInput`] intents a
//! player would: steer toward the ball, kick it up-field, hand control to a
//! better placed teammate, and take penalties with a seeded aim.

use pitch_core::input::TickInput;
use pitch_core::math::{Fixed, Vec2Fixed};
use pitch_core::player::Side;
use pitch_core::rng::{self, SimRng};
use pitch_core::shootout::ShootoutPhase;
use pitch_core::simulation::Simulation;
use pitch_core::snapshot::MatchPhase;

/// Ticks between control switches.
const SWITCH_COOLDOWN: u32 = 12;
/// Ticks between kick presses.
const KICK_COOLDOWN: u32 = 15;

/// Seeded input generator for the configured human side.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: SimRng,
    aim_target: Option<Fixed>,
    switch_cooldown: u32,
    kick_cooldown: u32,
}

impl Autopilot {
    /// Create an autopilot. The seed only affects penalty aim.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rng::seeded(seed),
            aim_target: None,
            switch_cooldown: 0,
            kick_cooldown: 0,
        }
    }

    /// Input for the next tick of `sim`.
    ///
    /// Returns [`TickInput::IDLE`] when no side is human controlled or the
    /// match is over.
    pub fn decide(&mut self, sim: &Simulation) -> TickInput {
        self.switch_cooldown = self.switch_cooldown.saturating_sub(1);
        self.kick_cooldown = self.kick_cooldown.saturating_sub(1);

        let Some(side) = sim.config().match_rules.human_side else {
            return TickInput::IDLE;
        };
        match sim.phase() {
            MatchPhase::Regulation => self.play(sim, side),
            MatchPhase::Shootout => self.shoot(sim, side),
            MatchPhase::FullTime => TickInput::IDLE,
        }
    }

    // ========================================================================
    // Regulation
    // ========================================================================

    fn play(&mut self, sim: &Simulation, side: Side) -> TickInput {
        let config = sim.config();
        let team = sim.team(side);
        let ball = sim.ball().position;
        let Some(controlled) = team.controlled() else {
            return TickInput::IDLE;
        };

        let mut input = TickInput::IDLE;

        let own_distance = controlled.distance_to(ball);
        let closest = team
            .players
            .iter()
            .min_by_key(|p| p.distance_to(ball))
            .map_or(controlled.slot, |p| p.slot);
        if closest != controlled.slot
            && self.switch_cooldown == 0
            && own_distance > config.dribble_range()
        {
            self.switch_cooldown = SWITCH_COOLDOWN;
            input.switch_player = true;
        }

        // Come at the ball from behind so kicks travel up-field.
        let behind = config.ball.radius + config.player.radius;
        let approach = Vec2Fixed::new(ball.x, ball.y - side.forward_sign() * behind);
        let position = controlled.position();
        let dead_zone = config.ai.arrival_threshold;
        input.movement = (
            axis(approach.x - position.x, dead_zone),
            axis(approach.y - position.y, dead_zone),
        );

        if own_distance < config.kick_range()
            && !side.is_ahead(position, ball)
            && self.kick_cooldown == 0
        {
            self.kick_cooldown = KICK_COOLDOWN;
            input.kick = true;
        }

        input
    }

    // ========================================================================
    // Shootout
    // ========================================================================

    fn shoot(&mut self, sim: &Simulation, side: Side) -> TickInput {
        let Some(shootout) = sim.shootout() else {
            return TickInput::IDLE;
        };
        if shootout.shooting() != side || shootout.phase() != ShootoutPhase::Setup {
            self.aim_target = None;
            return TickInput::IDLE;
        }

        let config = &sim.config().shootout;
        let target = *self
            .aim_target
            .get_or_insert_with(|| rng::symmetric(&mut self.rng, config.ai_aim_range));

        let gap = target - shootout.aim();
        if gap.abs() > config.aim_step {
            TickInput {
                aim_delta: axis(gap, Fixed::ZERO),
                ..TickInput::IDLE
            }
        } else {
            self.aim_target = None;
            TickInput {
                confirm_shot: true,
                ..TickInput::IDLE
            }
        }
    }
}

/// Sign of `delta`, or zero inside the dead zone.
fn axis(delta: Fixed, dead_zone: Fixed) -> i8 {
    if delta > dead_zone {
        1
    } else if delta < -dead_zone {
        -1
    } else {
        0
    }
}
