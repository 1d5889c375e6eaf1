//! Match metrics collection for tuning analysis.
//!
//! A [`MetricsCollector`] consumes the [`TickEvents`] of one match and
//! produces a [`MatchMetrics`] record; [`BatchSummary`] aggregates many.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pitch_core::player::Side;
use pitch_core::shootout::{PenaltyOutcome, ShootoutEvent};
use pitch_core::simulation::{MatchEvent, MatchOutcome, TickEvents};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// Decided by the regulation score.
    Regulation,
    /// Decided by a shootout.
    Penalties,
    /// Tick limit reached before a result.
    #[default]
    Timeout,
}

/// Per-side counters for one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Regulation goals.
    pub goals: u32,
    /// Passes played.
    pub passes: u32,
    /// Kicks, including shots and clearances.
    pub kicks: u32,
    /// Control switches (human side only).
    pub switches: u32,
    /// Penalties taken.
    pub penalties_taken: u32,
    /// Penalties converted.
    pub penalties_scored: u32,
}

/// A goal with the tick it was scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecord {
    /// Tick of the goal.
    pub tick: u64,
    /// Side credited.
    pub scorer: Side,
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Unique match identifier.
    pub game_id: String,
    /// Random seed used.
    pub seed: u64,
    /// Total match duration in ticks.
    pub duration_ticks: u64,
    /// Regulation score, home first.
    pub score: [u32; 2],
    /// Converted penalties, home first, if there was a shootout.
    pub penalties: Option<[u32; 2]>,
    /// Winning side name (None = unfinished).
    pub winner: Option<String>,
    /// How the match ended.
    pub end_condition: EndCondition,
    /// Goals in order.
    pub goals: Vec<GoalRecord>,
    /// Counters keyed by side name.
    pub sides: BTreeMap<String, SideMetrics>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create a new match metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, seed: u64) -> Self {
        let sides = Side::BOTH
            .iter()
            .map(|side| (side.to_string(), SideMetrics::default()))
            .collect();
        Self {
            game_id: game_id.into(),
            seed,
            sides,
            ..Default::default()
        }
    }

    /// Counters for one side.
    pub fn side_mut(&mut self, side: Side) -> &mut SideMetrics {
        self.sides.entry(side.to_string()).or_default()
    }

    /// Counters for one side, if recorded.
    #[must_use]
    pub fn side(&self, side: Side) -> Option<&SideMetrics> {
        self.sides.get(&side.to_string())
    }

    /// Total regulation goals.
    #[must_use]
    pub fn total_goals(&self) -> u32 {
        self.score.iter().sum()
    }

    /// Whether penalties were needed.
    #[must_use]
    pub fn went_to_shootout(&self) -> bool {
        self.penalties.is_some()
    }
}

/// Summary statistics across multiple matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total matches played.
    pub total_games: u32,
    /// Matches won by each side.
    pub wins_by_side: BTreeMap<String, u32>,
    /// Win rates by side.
    pub win_rates: BTreeMap<String, f64>,
    /// Matches that hit the tick limit undecided.
    pub unfinished: u32,
    /// Average regulation goals per match.
    pub avg_goals: f64,
    /// Fraction of matches that needed penalties.
    pub shootout_rate: f64,
    /// Average match duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest match.
    pub min_duration_ticks: u64,
    /// Longest match.
    pub max_duration_ticks: u64,
}

impl BatchSummary {
    /// Calculate summary from a list of match metrics.
    #[must_use]
    pub fn from_games(games: &[MatchMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let total = games.len() as f64;
        let mut summary = Self {
            total_games: games.len() as u32,
            min_duration_ticks: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut goal_sum = 0u64;
        let mut shootouts = 0u32;

        for game in games {
            duration_sum += game.duration_ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(game.duration_ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(game.duration_ticks);
            goal_sum += u64::from(game.total_goals());
            if game.went_to_shootout() {
                shootouts += 1;
            }

            match &game.winner {
                Some(winner) => *summary.wins_by_side.entry(winner.clone()).or_default() += 1,
                None => summary.unfinished += 1,
            }
        }

        summary.avg_duration_ticks = duration_sum as f64 / total;
        summary.avg_goals = goal_sum as f64 / total;
        summary.shootout_rate = f64::from(shootouts) / total;
        for (side, wins) in &summary.wins_by_side {
            summary.win_rates.insert(side.clone(), f64::from(*wins) / total);
        }

        summary
    }

    /// Check if both sides win within `threshold` of an even split.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.win_rates
            .values()
            .all(|rate| (rate - 0.5).abs() <= threshold)
    }

    /// The side winning clearly more than half the matches, if any.
    #[must_use]
    pub fn dominant_side(&self, threshold: f64) -> Option<&str> {
        self.win_rates
            .iter()
            .find(|(_, rate)| **rate > 0.5 + threshold)
            .map(|(side, _)| side.as_str())
    }
}

/// Metrics collector that tracks events during a match.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: MatchMetrics,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new(game_id: &str, seed: u64) -> Self {
        Self {
            metrics: MatchMetrics::new(game_id, seed),
        }
    }

    /// Record everything that happened on one tick.
    pub fn record(&mut self, tick: &TickEvents) {
        for event in &tick.events {
            self.on_event(tick.tick, event);
        }
    }

    fn on_event(&mut self, tick: u64, event: &MatchEvent) {
        let m = &mut self.metrics;
        match *event {
            MatchEvent::Goal(goal) => {
                m.side_mut(goal.scorer).goals += 1;
                m.score = goal.score;
                m.goals.push(GoalRecord {
                    tick,
                    scorer: goal.scorer,
                });
            }
            MatchEvent::Pass { side, .. } => m.side_mut(side).passes += 1,
            MatchEvent::Kick { side, .. } => m.side_mut(side).kicks += 1,
            MatchEvent::ControlSwitched { side, .. } => m.side_mut(side).switches += 1,
            MatchEvent::Shootout(ShootoutEvent::PenaltyTaken { side, .. }) => {
                m.side_mut(side).penalties_taken += 1;
            }
            MatchEvent::Shootout(ShootoutEvent::PenaltyResolved {
                side,
                outcome,
                converted,
            }) => {
                if outcome == PenaltyOutcome::Goal {
                    m.side_mut(side).penalties_scored += 1;
                }
                m.penalties = Some(converted);
            }
            MatchEvent::RegulationEnded { score, .. } => m.score = score,
            MatchEvent::Shootout(ShootoutEvent::Finished { .. }) | MatchEvent::DifficultyChanged(_) => {}
        }
    }

    /// Finalize and return the metrics.
    ///
    /// `outcome` is `None` when the match was cut off by a tick limit.
    #[must_use]
    pub fn finalize(mut self, outcome: Option<MatchOutcome>, ticks: u64, state_hash: u64) -> MatchMetrics {
        let m = &mut self.metrics;
        m.duration_ticks = ticks;
        m.final_state_hash = state_hash;
        if let Some(outcome) = outcome {
            m.score = outcome.score;
            m.penalties = outcome.penalties;
            m.winner = outcome.winner.map(|side| side.to_string());
            m.end_condition = if outcome.penalties.is_some() {
                EndCondition::Penalties
            } else {
                EndCondition::Regulation
            };
        }
        self.metrics
    }

    /// Get current metrics (immutable).
    #[must_use]
    pub fn current(&self) -> &MatchMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_core::ball::GoalLine;
    use pitch_core::match_state::GoalEvent;

    fn game(winner: Option<&str>, score: [u32; 2], penalties: Option<[u32; 2]>, ticks: u64) -> MatchMetrics {
        MatchMetrics {
            winner: winner.map(String::from),
            score,
            penalties,
            duration_ticks: ticks,
            ..MatchMetrics::new("g", 0)
        }
    }

    #[test]
    fn test_new_metrics_have_both_sides() {
        let m = MatchMetrics::new("game_1", 5);
        assert_eq!(m.sides.len(), 2);
        assert_eq!(m.side(Side::Home), Some(&SideMetrics::default()));
        assert_eq!(m.end_condition, EndCondition::Timeout);
    }

    #[test]
    fn test_collector_counts_events() {
        let mut collector = MetricsCollector::new("game_1", 1);
        collector.record(&TickEvents {
            tick: 10,
            events: vec![
                MatchEvent::Pass {
                    side: Side::Home,
                    slot: 2,
                },
                MatchEvent::Kick {
                    side: Side::Away,
                    slot: 4,
                },
                MatchEvent::Goal(GoalEvent {
                    scorer: Side::Home,
                    goal: GoalLine::Bottom,
                    score: [1, 0],
                }),
            ],
        });
        collector.record(&TickEvents {
            tick: 20,
            events: vec![MatchEvent::Shootout(ShootoutEvent::PenaltyResolved {
                side: Side::Away,
                outcome: PenaltyOutcome::Goal,
                converted: [0, 1],
            })],
        });

        let m = collector.current();
        assert_eq!(m.score, [1, 0]);
        assert_eq!(m.goals, vec![GoalRecord { tick: 10, scorer: Side::Home }]);
        assert_eq!(m.side(Side::Home).unwrap().passes, 1);
        assert_eq!(m.side(Side::Away).unwrap().kicks, 1);
        assert_eq!(m.side(Side::Away).unwrap().penalties_scored, 1);
        assert_eq!(m.penalties, Some([0, 1]));
    }

    #[test]
    fn test_finalize_with_outcome() {
        let collector = MetricsCollector::new("game_2", 2);
        let m = collector.finalize(
            Some(MatchOutcome {
                score: [1, 1],
                penalties: Some([4, 3]),
                winner: Some(Side::Home),
                ticks: 6000,
            }),
            6000,
            99,
        );
        assert_eq!(m.winner.as_deref(), Some("home"));
        assert_eq!(m.end_condition, EndCondition::Penalties);
        assert_eq!(m.final_state_hash, 99);
        assert!(m.went_to_shootout());
    }

    #[test]
    fn test_finalize_without_outcome_is_timeout() {
        let m = MetricsCollector::new("game_3", 3).finalize(None, 100, 1);
        assert!(m.winner.is_none());
        assert_eq!(m.end_condition, EndCondition::Timeout);
        assert_eq!(m.duration_ticks, 100);
    }

    #[test]
    fn test_batch_summary() {
        let games = vec![
            game(Some("home"), [2, 1], None, 5400),
            game(Some("away"), [0, 0], Some([3, 4]), 6100),
            game(Some("home"), [1, 0], None, 5400),
            game(None, [0, 0], None, 9000),
        ];
        let summary = BatchSummary::from_games(&games);

        assert_eq!(summary.total_games, 4);
        assert_eq!(summary.wins_by_side["home"], 2);
        assert_eq!(summary.unfinished, 1);
        assert!((summary.win_rates["home"] - 0.5).abs() < f64::EPSILON);
        assert!((summary.avg_goals - 1.0).abs() < f64::EPSILON);
        assert!((summary.shootout_rate - 0.25).abs() < f64::EPSILON);
        assert_eq!(summary.min_duration_ticks, 5400);
        assert_eq!(summary.max_duration_ticks, 9000);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_games(&[]);
        assert_eq!(summary.total_games, 0);
        assert!(summary.is_balanced(0.0));
    }

    #[test]
    fn test_balance_checks() {
        let games = vec![
            game(Some("home"), [1, 0], None, 1),
            game(Some("home"), [1, 0], None, 1),
            game(Some("home"), [1, 0], None, 1),
            game(Some("away"), [0, 1], None, 1),
        ];
        let summary = BatchSummary::from_games(&games);
        assert!(!summary.is_balanced(0.1));
        assert!(summary.is_balanced(0.3));
        assert_eq!(summary.dominant_side(0.1), Some("home"));
        assert_eq!(summary.dominant_side(0.3), None);
    }
}
