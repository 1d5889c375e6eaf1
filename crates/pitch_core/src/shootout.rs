//! Penalty shootout.
//!
//! Entered when regulation ends level. Sides alternate kicks, home first,
//! each against the opposing goalkeeper. After every complete round the
//! shootout ends once `max_rounds` have been played and the converted
//! counts differ; until then it continues round by round.
//!
//! Each kick moves through three phases:
//!
//! 1. **Setup** - ball on the spot, keeper on the line with a possible
//!    pre-committed lean, taker aims (human) or waits for a random moment
//!    (AI).
//! 2. **Shooting** - the ball flies, the keeper tracks it, and the kick
//!    resolves as a goal, a save or a miss.
//! 3. **Result** - the outcome is held on screen, then the other side
//!    steps up.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::ball::{Ball, GoalLine};
use crate::config::{DifficultyProfile, FieldConfig, ShootoutConfig, SimConfig};
use crate::math::{decimal_serde, fixed_serde, Fixed, Vec2Fixed};
use crate::player::{Player, Side};
use crate::rng;
use crate::team::Team;

/// Ball speed above which the keeper reads the shot.
const TRACKING_SPEED: f64 = 0.3;
/// Vertical speed below which time-to-line is not estimated.
const FLAT_SHOT_SPEED: f64 = 0.1;
/// Time-to-line assumed for flat shots.
const FLAT_SHOT_TICKS: i32 = 10;
/// Extra ticks of lead on the predicted crossing point.
const LEAD_TICKS: f64 = 0.5;
/// Fraction of the half-width a committed keeper drifts toward.
const DRIFT_FACTOR: f64 = 0.8;
/// Bias magnitude below which the keeper stays central.
const DRIFT_THRESHOLD: f64 = 0.1;

/// Where the current kick is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShootoutPhase {
    /// Taker lining up.
    Setup,
    /// Ball in flight.
    Shooting,
    /// Outcome on display.
    Result,
}

/// How a kick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenaltyOutcome {
    /// Converted.
    Goal,
    /// Reached the goal but the keeper stopped it.
    Saved,
    /// Stopped or left the pitch without reaching the goal.
    Missed,
}

/// Something that happened in the shootout this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShootoutEvent {
    /// A taker struck the ball.
    PenaltyTaken {
        /// Shooting side.
        side: Side,
        /// Slot of the taker.
        taker: usize,
        /// Aim in `[-1, 1]`, negative toward smaller `x`.
        #[serde(with = "decimal_serde")]
        aim: Fixed,
    },
    /// A kick resolved.
    PenaltyResolved {
        /// Shooting side.
        side: Side,
        /// Result.
        outcome: PenaltyOutcome,
        /// Converted counts afterwards, home first.
        converted: [u32; 2],
    },
    /// The shootout is decided.
    Finished {
        /// Winning side.
        winner: Side,
        /// Final converted counts, home first.
        converted: [u32; 2],
    },
}

/// Taker input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShotControl {
    /// Whether the shooting side is human controlled.
    pub human: bool,
    /// Aim adjustment direction; only the sign is used.
    pub aim_delta: i8,
    /// Strike the ball now.
    pub confirm: bool,
}

/// Penalty spot for kicks at `goal`.
#[must_use]
pub fn penalty_spot(goal: GoalLine, config: &SimConfig) -> Vec2Fixed {
    let field = &config.field;
    let y = match goal {
        GoalLine::Top => field.min_y() + config.shootout.spot_distance,
        GoalLine::Bottom => field.max_y() - config.shootout.spot_distance,
    };
    Vec2Fixed::new(field.center().x, y)
}

/// Probability that a keeper stops a shot.
///
/// Starts from the base chance, adds a proximity bonus that falls off
/// linearly to zero at `save_range`, adds a bonus when the keeper's lean
/// matches where the ball crosses, and caps the total.
#[must_use]
pub fn save_probability(
    keeper: Vec2Fixed,
    keeper_bias: Fixed,
    ball: Vec2Fixed,
    field: &FieldConfig,
    config: &ShootoutConfig,
) -> Fixed {
    let mut chance = config.base_save_chance;

    let distance = keeper.distance(ball);
    if distance < config.save_range {
        let closeness = Fixed::ONE - distance / config.save_range;
        chance += closeness * config.proximity_bonus;
    }

    let ball_offset = (ball.x - field.center().x) / field.goal_half_width();
    if (keeper_bias - ball_offset).abs() < config.position_match_tolerance {
        chance += config.position_match_bonus;
    }

    chance.min(config.max_save_chance)
}

/// Shootout state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyShootout {
    round: u32,
    converted: [u32; 2],
    shooting: Side,
    phase: ShootoutPhase,
    #[serde(with = "fixed_serde")]
    aim: Fixed,
    result_timer: u32,
    last_outcome: Option<PenaltyOutcome>,
    prepared: bool,
    finished: bool,
}

impl Default for PenaltyShootout {
    fn default() -> Self {
        Self::new()
    }
}

impl PenaltyShootout {
    /// A shootout about to start with home's first kick.
    #[must_use]
    pub fn new() -> Self {
        Self {
            round: 0,
            converted: [0, 0],
            shooting: Side::Home,
            phase: ShootoutPhase::Setup,
            aim: Fixed::ZERO,
            result_timer: 0,
            last_outcome: None,
            prepared: false,
            finished: false,
        }
    }

    /// Completed rounds.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Converted kicks, home first.
    #[must_use]
    pub fn converted(&self) -> [u32; 2] {
        self.converted
    }

    /// Side taking the current kick.
    #[must_use]
    pub fn shooting(&self) -> Side {
        self.shooting
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ShootoutPhase {
        self.phase
    }

    /// Current aim in `[-1, 1]`.
    #[must_use]
    pub fn aim(&self) -> Fixed {
        self.aim
    }

    /// Outcome of the most recent kick while it is on display.
    #[must_use]
    pub fn last_outcome(&self) -> Option<PenaltyOutcome> {
        self.last_outcome
    }

    /// Ticks the current result has been shown.
    #[must_use]
    pub fn result_timer(&self) -> u32 {
        self.result_timer
    }

    /// Whether the shootout is decided.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Winner once decided.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        if !self.finished {
            return None;
        }
        match self.converted[0].cmp(&self.converted[1]) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Slot of the current taker: outfield players in turn, forward first.
    #[must_use]
    pub fn taker(&self, team: &Team) -> usize {
        let outfield: Vec<usize> = team
            .players
            .iter()
            .rev()
            .filter(|p| !p.is_goalkeeper())
            .map(|p| p.slot)
            .collect();
        if outfield.is_empty() {
            return 0;
        }
        outfield[self.round as usize % outfield.len()]
    }

    /// Advance one tick.
    pub fn step<R: RngCore + ?Sized>(
        &mut self,
        teams: &mut [Team; 2],
        ball: &mut Ball,
        control: ShotControl,
        profile: &DifficultyProfile,
        config: &SimConfig,
        rng: &mut R,
    ) -> Option<ShootoutEvent> {
        if self.finished {
            return None;
        }
        match self.phase {
            ShootoutPhase::Setup => self.step_setup(teams, ball, control, config, rng),
            ShootoutPhase::Shooting => self.step_shooting(teams, ball, profile, config, rng),
            ShootoutPhase::Result => self.step_result(&config.shootout),
        }
    }

    fn step_setup<R: RngCore + ?Sized>(
        &mut self,
        teams: &mut [Team; 2],
        ball: &mut Ball,
        control: ShotControl,
        config: &SimConfig,
        rng: &mut R,
    ) -> Option<ShootoutEvent> {
        if !self.prepared {
            self.prepare_kick(teams, ball, config, rng);
        }

        let strike = if control.human {
            let step = config.shootout.aim_step * Fixed::from_num(control.aim_delta.signum());
            self.aim = (self.aim + step).clamp(-Fixed::ONE, Fixed::ONE);
            control.confirm
        } else if rng::chance(rng, config.shootout.ai_shot_chance) {
            self.aim = rng::symmetric(rng, config.shootout.ai_aim_range);
            true
        } else {
            false
        };

        if !strike {
            return None;
        }

        let goal = self.shooting.attacks();
        let half = config.field.goal_half_width();
        let aim_point = goal.center(&config.field)
            + Vec2Fixed::new(self.aim * half * config.shootout.aim_width_factor, Fixed::ZERO);
        let straight = Vec2Fixed::new(Fixed::ZERO, self.shooting.forward_sign());
        ball.velocity = (aim_point - ball.position)
            .normalize_or(straight)
            .scale(config.shootout.kick_power);
        self.phase = ShootoutPhase::Shooting;

        let taker = self.taker(&teams[self.shooting.index()]);
        tracing::debug!(side = %self.shooting, taker, aim = %self.aim, "Penalty taken");
        Some(ShootoutEvent::PenaltyTaken {
            side: self.shooting,
            taker,
            aim: self.aim,
        })
    }

    fn prepare_kick<R: RngCore + ?Sized>(
        &mut self,
        teams: &mut [Team; 2],
        ball: &mut Ball,
        config: &SimConfig,
        rng: &mut R,
    ) {
        let goal = self.shooting.attacks();
        ball.reset(penalty_spot(goal, config));
        self.aim = Fixed::ZERO;
        self.last_outcome = None;

        let keepers = &mut teams[self.shooting.opponent().index()];
        if let Some(index) = keepers.goalkeeper_index() {
            let keeper = &mut keepers.players[index];
            keeper.place(goal.center(&config.field), config);
            keeper.moving = false;
            keeper.save_bias = if rng::chance(rng, config.shootout.keeper_commit_chance) {
                rng::symmetric(rng, config.shootout.keeper_bias_range)
            } else {
                Fixed::ZERO
            };
        }
        self.prepared = true;
    }

    fn step_shooting<R: RngCore + ?Sized>(
        &mut self,
        teams: &mut [Team; 2],
        ball: &mut Ball,
        profile: &DifficultyProfile,
        config: &SimConfig,
        rng: &mut R,
    ) -> Option<ShootoutEvent> {
        ball.update(std::iter::empty::<&Player>(), config);

        let goal = self.shooting.attacks();
        let keepers = &mut teams[self.shooting.opponent().index()];
        let keeper_index = keepers.goalkeeper_index();
        if let Some(index) = keeper_index {
            track_ball(&mut keepers.players[index], ball, goal, profile, config);
        }

        let outcome = if ball.check_goal(&config.field) == Some(goal) {
            let saved = keeper_index.is_some_and(|index| {
                let keeper = &keepers.players[index];
                let p = save_probability(
                    keeper.position(),
                    keeper.save_bias,
                    ball.position,
                    &config.field,
                    &config.shootout,
                );
                rng::chance(rng, p)
            });
            if saved {
                PenaltyOutcome::Saved
            } else {
                PenaltyOutcome::Goal
            }
        } else if ball.is_stopped(config.ball.stop_epsilon) || ball.is_out(&config.field) {
            PenaltyOutcome::Missed
        } else {
            return None;
        };

        if outcome == PenaltyOutcome::Goal {
            self.converted[self.shooting.index()] += 1;
        }
        self.last_outcome = Some(outcome);
        self.phase = ShootoutPhase::Result;
        self.result_timer = 0;

        tracing::info!(
            side = %self.shooting,
            outcome = ?outcome,
            home = self.converted[0],
            away = self.converted[1],
            "Penalty resolved"
        );
        Some(ShootoutEvent::PenaltyResolved {
            side: self.shooting,
            outcome,
            converted: self.converted,
        })
    }

    fn step_result(&mut self, config: &ShootoutConfig) -> Option<ShootoutEvent> {
        self.result_timer += 1;
        if self.result_timer < config.result_hold_ticks {
            return None;
        }
        self.result_timer = 0;
        self.phase = ShootoutPhase::Setup;
        self.prepared = false;

        match self.shooting {
            Side::Home => {
                self.shooting = Side::Away;
                None
            }
            Side::Away => {
                self.shooting = Side::Home;
                self.round += 1;
                if self.round >= config.max_rounds && self.converted[0] != self.converted[1] {
                    self.finished = true;
                    let winner = if self.converted[0] > self.converted[1] {
                        Side::Home
                    } else {
                        Side::Away
                    };
                    tracing::info!(winner = %winner, rounds = self.round, "Shootout finished");
                    return Some(ShootoutEvent::Finished {
                        winner,
                        converted: self.converted,
                    });
                }
                None
            }
        }
    }
}

/// Move the keeper toward where the shot will cross, or toward its
/// pre-committed lean while the ball is slow.
fn track_ball(keeper: &mut Player, ball: &Ball, goal: GoalLine, profile: &DifficultyProfile, config: &SimConfig) {
    let field = &config.field;
    let center = goal.center(field);
    let half = field.goal_half_width();
    let v = ball.velocity;
    let tracking = Fixed::from_num(TRACKING_SPEED);

    let target = if v.x.abs() > tracking || v.y.abs() > tracking {
        let ticks = if v.y.abs() > Fixed::from_num(FLAT_SHOT_SPEED) {
            ((center.y - ball.position.y) / v.y).abs()
        } else {
            Fixed::from_num(FLAT_SHOT_TICKS)
        };
        let lead = Fixed::from_num(LEAD_TICKS);
        let crossing = (ball.position.x + v.x * ticks + v.x * lead).clamp(center.x - half, center.x + half);
        keeper.save_bias = (crossing - center.x) / half;
        Vec2Fixed::new(crossing, center.y)
    } else if keeper.save_bias.abs() > Fixed::from_num(DRIFT_THRESHOLD) {
        let drift = keeper.save_bias * half * Fixed::from_num(DRIFT_FACTOR);
        Vec2Fixed::new(center.x + drift, center.y)
    } else {
        center
    };

    let offset = target - keeper.position();
    if offset.length() > Fixed::ONE {
        let speed = keeper.speed() * config.shootout.keeper_speed_multiplier * profile.speed_multiplier;
        keeper.move_by(offset.normalize().scale(speed), config);
    } else {
        keeper.moving = false;
    }
}
