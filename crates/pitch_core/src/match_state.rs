//! Regulation match state: score, clock and goal cooldown.

use serde::{Deserialize, Serialize};

use crate::ball::{Ball, GoalLine};
use crate::config::{MatchRules, SimConfig};
use crate::math::Fixed;
use crate::player::Side;
use crate::team::Team;

/// A goal scored in regulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEvent {
    /// Side credited with the goal.
    pub scorer: Side,
    /// Goal the ball entered.
    pub goal: GoalLine,
    /// Score after the goal, home first.
    pub score: [u32; 2],
}

/// Score, clock and cooldown of regulation play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    scores: [u32; 2],
    remaining_ticks: u64,
    goal_cooldown: u32,
    ended: bool,
}

impl MatchState {
    /// Fresh match with the full regulation clock.
    #[must_use]
    pub fn new(rules: &MatchRules) -> Self {
        Self {
            scores: [0, 0],
            remaining_ticks: rules.duration_ticks(),
            goal_cooldown: 0,
            ended: rules.duration_ticks() == 0,
        }
    }

    /// Goals scored by `side`.
    #[must_use]
    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    /// Both scores, home first.
    #[must_use]
    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Ticks left in regulation.
    #[must_use]
    pub fn remaining_ticks(&self) -> u64 {
        self.remaining_ticks
    }

    /// Seconds left in regulation.
    #[must_use]
    pub fn remaining_seconds(&self, rules: &MatchRules) -> Fixed {
        let ticks = Fixed::from_num(self.remaining_ticks);
        ticks / Fixed::from_num(rules.tick_rate.max(1))
    }

    /// Ticks until goals count again.
    #[must_use]
    pub fn goal_cooldown(&self) -> u32 {
        self.goal_cooldown
    }

    /// Whether regulation is over.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether the scores are level.
    #[must_use]
    pub fn is_level(&self) -> bool {
        self.scores[0] == self.scores[1]
    }

    /// The side ahead, if any.
    #[must_use]
    pub fn leader(&self) -> Option<Side> {
        match self.scores[0].cmp(&self.scores[1]) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Credit a goal and start the cooldown.
    pub fn record_goal(&mut self, scorer: Side, cooldown: u32) {
        self.scores[scorer.index()] += 1;
        self.goal_cooldown = cooldown;
    }

    /// Count the cooldown down. Returns whether goals count this tick.
    pub fn tick_cooldown(&mut self) -> bool {
        if self.goal_cooldown > 0 {
            self.goal_cooldown -= 1;
        }
        self.goal_cooldown == 0
    }

    /// Run the clock one tick. Returns `true` on the tick regulation ends.
    pub fn advance_clock(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            self.ended = true;
            return true;
        }
        false
    }
}

/// Goal detection and kickoff reset.
///
/// When the cooldown allows and the ball sits in a goal, the goal is
/// credited, the ball returns to the centre spot, and both teams reset to
/// their kickoff formation.
pub fn evaluate_goal(
    state: &mut MatchState,
    ball: &mut Ball,
    teams: &mut [Team; 2],
    config: &SimConfig,
) -> Option<GoalEvent> {
    if !state.tick_cooldown() {
        return None;
    }
    let goal = ball.check_goal(&config.field)?;
    let scorer = goal.scorer();
    state.record_goal(scorer, config.match_rules.goal_cooldown);

    ball.reset(config.field.center());
    for team in teams.iter_mut() {
        team.reset_to_kickoff(config);
    }

    let event = GoalEvent {
        scorer,
        goal,
        score: state.scores(),
    };
    tracing::info!(
        scorer = %scorer,
        home = event.score[0],
        away = event.score[1],
        "Goal"
    );
    Some(event)
}
