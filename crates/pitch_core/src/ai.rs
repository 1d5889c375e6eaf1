//! AI decision engine.
//!
//! Each AI player runs a small state machine every tick. Deciding what to
//! do is a pure function of the player and a read-only view of the pitch
//! ([`decide`]); executing it (moving, kicking, passing) happens in
//! [`run_player`], which is the only part that mutates state.
//!
//! Timing follows the active [`DifficultyProfile`]: a full re-evaluation
//! happens every `decision_delay` ticks, sooner when the ball is close, and
//! immediately when it is very close.

use crate::ball::Ball;
use crate::config::{DifficultyProfile, SimConfig};
use crate::math::{Fixed, Vec2Fixed};
use crate::player::{AiState, Player, Side};
use crate::team::{find_pass_target, kickoff_position, Team};

/// How pressing the ball's proximity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    /// Ball beyond chase distance.
    Calm,
    /// Ball within chase distance.
    Urgent,
    /// Ball within the urgent distance.
    VeryUrgent,
}

impl Urgency {
    /// Classify a ball distance.
    #[must_use]
    pub fn from_distance(ball_distance: Fixed, config: &SimConfig) -> Self {
        if ball_distance < config.ai.urgent_distance {
            Self::VeryUrgent
        } else if ball_distance < config.ai.chase_distance {
            Self::Urgent
        } else {
            Self::Calm
        }
    }

    /// Movement speed boost.
    #[must_use]
    pub fn boost(self, config: &SimConfig) -> Fixed {
        match self {
            Self::Calm => Fixed::ONE,
            Self::Urgent => config.ai.chase_boost,
            Self::VeryUrgent => config.ai.urgent_boost,
        }
    }
}

/// Whether a player with `timer` ticks since its last decision decides now.
#[must_use]
pub fn should_reevaluate(timer: u32, urgency: Urgency, profile: &DifficultyProfile) -> bool {
    match urgency {
        Urgency::VeryUrgent => true,
        Urgency::Urgent => timer >= profile.decision_delay || timer >= profile.reaction_time.max(1),
        Urgency::Calm => timer >= profile.decision_delay,
    }
}

/// Whether a player may move this tick.
#[must_use]
pub fn can_move(timer: u32, urgency: Urgency, profile: &DifficultyProfile) -> bool {
    urgency != Urgency::Calm || timer >= profile.reaction_time
}

/// Read-only view of the pitch for one decision.
#[derive(Debug, Clone, Copy)]
pub struct PitchView<'a> {
    /// The ball.
    pub ball: &'a Ball,
    /// The deciding player's team, including the player.
    pub teammates: &'a [Player],
    /// The other team.
    pub opponents: &'a [Player],
    /// Configuration.
    pub config: &'a SimConfig,
}

/// Outcome of one re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// New intent.
    pub state: AiState,
    /// New movement target.
    pub target: Vec2Fixed,
    /// Pass the ball to this point instead of moving.
    pub pass_to: Option<Vec2Fixed>,
}

/// Decide what `player` should do next.
///
/// A carrier passes to the nearest teammate ahead when that teammate is
/// clearly closer to goal, otherwise dribbles at goal. Without the ball the
/// player supports a teammate carrier, presses an opposing carrier, chases a
/// free ball, or falls back to its kickoff slot.
#[must_use]
pub fn decide(player: &Player, view: &PitchView<'_>) -> Decision {
    let config = view.config;
    let ai = &config.ai;
    let ball = view.ball;
    let pos = player.position();
    let ball_distance = player.distance_to(ball.position);
    let dribble_range = config.dribble_range();

    if ball_distance < dribble_range {
        let goal = player.side.attacks().target(&config.field);
        let goal_distance = pos.distance(goal);

        if let Some(mate) = find_pass_target(player, view.teammates, config) {
            if mate.distance_to(goal) < goal_distance - ai.pass_advantage {
                return Decision {
                    state: AiState::Support,
                    target: player.ai.target,
                    pass_to: Some(mate.position()),
                };
            }
        }

        let target = if goal_distance < ai.attack_distance || goal_distance == Fixed::ZERO {
            goal
        } else {
            pos + (goal - pos).normalize().scale(ai.dribble_lookahead)
        };
        return Decision {
            state: AiState::Attack,
            target,
            pass_to: None,
        };
    }

    let home = kickoff_position(player.side, player.slot, config);
    let predicted = |horizon: Fixed| ball.position + ball.velocity.scale(horizon);
    let carrier_side = view
        .teammates
        .iter()
        .chain(view.opponents.iter())
        .find(|p| p.distance_to(ball.position) < dribble_range)
        .map(|p| p.side);

    let (state, target) = match carrier_side {
        Some(side) if side == player.side => {
            let ahead = Vec2Fixed::new(Fixed::ZERO, ai.support_offset * player.side.forward_sign());
            (AiState::Support, predicted(ai.support_horizon) + ahead)
        }
        Some(_) => {
            if ball_distance < ai.defend_distance {
                (AiState::Defend, predicted(ai.defend_horizon))
            } else {
                (AiState::Defend, home)
            }
        }
        None => {
            if ball_distance < ai.chase_distance {
                (AiState::ChaseBall, predicted(ai.chase_horizon))
            } else {
                (AiState::Idle, home)
            }
        }
    };

    Decision {
        state,
        target,
        pass_to: None,
    }
}

/// Displacement toward `target` this tick, or `None` once arrived.
#[must_use]
pub fn movement_step(
    player: &Player,
    target: Vec2Fixed,
    urgency: Urgency,
    profile: &DifficultyProfile,
    config: &SimConfig,
) -> Option<Vec2Fixed> {
    let offset = target - player.position();
    if offset.length() <= config.ai.arrival_threshold {
        return None;
    }
    let speed = player.speed() * profile.speed_multiplier * urgency.boost(config);
    Some(offset.normalize().scale(speed))
}

/// What an AI player did to the ball this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallAction {
    /// Passed to a teammate.
    Pass,
    /// Kicked it while running past.
    Kick,
}

/// Run one tick of AI for `teams[side].players[slot]`.
pub fn run_player(
    teams: &mut [Team; 2],
    side: Side,
    slot: usize,
    ball: &mut Ball,
    profile: &DifficultyProfile,
    config: &SimConfig,
) -> Option<BallAction> {
    let own = side.index();
    let other = side.opponent().index();

    let (ball_distance, timer) = {
        let player = teams[own].players.get_mut(slot)?;
        player.ai.decision_timer += 1;
        (player.distance_to(ball.position), player.ai.decision_timer)
    };
    let has_ball = ball_distance < config.dribble_range();
    let urgency = Urgency::from_distance(ball_distance, config);

    if should_reevaluate(timer, urgency, profile) {
        let decision = {
            let view = PitchView {
                ball: &*ball,
                teammates: &teams[own].players,
                opponents: &teams[other].players,
                config,
            };
            decide(&teams[own].players[slot], &view)
        };

        let player = &mut teams[own].players[slot];
        if timer >= profile.decision_delay {
            player.ai.decision_timer = 0;
        }
        if player.ai.state != decision.state {
            tracing::trace!(
                side = %side,
                player = %player.name,
                from = player.ai.state.key(),
                to = decision.state.key(),
                "AI state change"
            );
        }
        player.ai.state = decision.state;
        player.ai.target = decision.target;

        if let Some(receiver) = decision.pass_to {
            ball.pass_to(receiver, config);
            return Some(BallAction::Pass);
        }
    }

    let player = &mut teams[own].players[slot];
    if !can_move(player.ai.decision_timer, urgency, profile) {
        return None;
    }

    match movement_step(player, player.ai.target, urgency, profile, config) {
        Some(step) => {
            player.move_by(step, config);
            if !has_ball
                && ball_distance < config.kick_range()
                && ball.kick(player.position(), player.stats.shooting, config)
            {
                return Some(BallAction::Kick);
            }
        }
        None => player.moving = false,
    }
    None
}
