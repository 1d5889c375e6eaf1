//! Core simulation loop.
//!
//! [`Simulation`] owns every piece of match state and advances it one fixed
//! tick at a time. A regulation tick runs, in order:
//!
//! 1. Human intents for the controlled player (difficulty, switching,
//!    movement, kick or pass).
//! 2. AI for every other player, home roster first.
//! 3. Player separation.
//! 4. Idle stamina regeneration for players that did not move.
//! 5. Ball physics, including dribble attraction.
//! 6. Goal detection, subject to the post-goal cooldown.
//! 7. The match clock, which may end regulation.
//!
//! A level score at the end of regulation starts a penalty shootout, whose
//! ticks run the shootout machine only. After full time ticks are no-ops.
//!
//! # Determinism
//!
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - All randomness comes from one seeded [`SimRng`]
//! - Players are always processed in side then slot order
//! - The same config, seed and inputs always produce the same state
//!
//! # Example
//!
//! ```
//! use pitch_core::config::SimConfig;
//! use pitch_core::input::TickInput;
//! use pitch_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(SimConfig::default(), 42);
//! let events = sim.tick(&TickInput::moving(0, 1));
//! assert_eq!(events.tick, 0);
//! assert_eq!(sim.current_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ai::{self, BallAction};
use crate::ball::Ball;
use crate::collision;
use crate::config::{Difficulty, SimConfig};
use crate::error::{Result, SimError};
use crate::input::TickInput;
use crate::match_state::{evaluate_goal, GoalEvent, MatchState};
use crate::math::{Fixed, Vec2Fixed};
use crate::player::Side;
use crate::rng::{self, SimRng};
use crate::shootout::{PenaltyShootout, ShootoutEvent, ShotControl};
use crate::snapshot::{BallView, MatchPhase, PlayerView, ShootoutView, Snapshot};
use crate::team::{find_pass_target, Team};

/// Something notable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A regulation goal.
    Goal(GoalEvent),
    /// A player passed the ball.
    Pass {
        /// Passing side.
        side: Side,
        /// Passer slot.
        slot: usize,
    },
    /// A player kicked the ball.
    Kick {
        /// Kicking side.
        side: Side,
        /// Kicker slot.
        slot: usize,
    },
    /// The human side switched its controlled player.
    ControlSwitched {
        /// Side that switched.
        side: Side,
        /// Newly controlled slot.
        slot: usize,
    },
    /// AI difficulty changed.
    DifficultyChanged(Difficulty),
    /// The regulation clock ran out.
    RegulationEnded {
        /// Final regulation score, home first.
        score: [u32; 2],
        /// Whether a shootout follows.
        shootout: bool,
    },
    /// Shootout progress.
    Shootout(ShootoutEvent),
}

/// Events produced by one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick the events happened on.
    pub tick: u64,
    /// Events in the order they happened.
    pub events: Vec<MatchEvent>,
}

impl TickEvents {
    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Goals scored this tick.
    pub fn goals(&self) -> impl Iterator<Item = &GoalEvent> {
        self.events.iter().filter_map(|e| match e {
            MatchEvent::Goal(goal) => Some(goal),
            _ => None,
        })
    }
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Regulation score, home first.
    pub score: [u32; 2],
    /// Converted penalties, home first, if there was a shootout.
    pub penalties: Option<[u32; 2]>,
    /// Winning side.
    pub winner: Option<Side>,
    /// Ticks played.
    pub ticks: u64,
}

/// The match simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: SimConfig,
    seed: u64,
    tick: u64,
    phase: MatchPhase,
    difficulty: Difficulty,
    teams: [Team; 2],
    ball: Ball,
    match_state: MatchState,
    shootout: Option<PenaltyShootout>,
    rng: SimRng,
}

impl Simulation {
    /// Create a match at kickoff.
    ///
    /// The config is trusted; call [`SimConfig::validate`] first if it came
    /// from outside.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let teams = [
            Team::from_sheet(&config.teams[0], Side::Home, &config),
            Team::from_sheet(&config.teams[1], Side::Away, &config),
        ];
        let ball = Ball::new(config.field.center(), config.ball.radius);
        let match_state = MatchState::new(&config.match_rules);
        let mut sim = Self {
            difficulty: config.match_rules.difficulty,
            seed,
            tick: 0,
            phase: MatchPhase::Regulation,
            teams,
            ball,
            match_state,
            shootout: None,
            rng: rng::seeded(seed),
            config,
        };
        if sim.match_state.is_ended() {
            sim.end_regulation(&mut Vec::new());
        }
        tracing::debug!(seed, "Simulation created");
        sim
    }

    /// Restart from kickoff with a new seed, keeping the config.
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(self.config.clone(), seed);
    }

    /// Advance one tick.
    pub fn tick(&mut self, input: &TickInput) -> TickEvents {
        let tick = self.tick;
        let mut events = Vec::new();

        match self.phase {
            MatchPhase::Regulation => self.tick_regulation(input, &mut events),
            MatchPhase::Shootout => self.tick_shootout(input, &mut events),
            MatchPhase::FullTime => {}
        }

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        TickEvents { tick, events }
    }

    fn tick_regulation(&mut self, input: &TickInput, events: &mut Vec<MatchEvent>) {
        for player in self.teams.iter_mut().flat_map(|t| t.players.iter_mut()) {
            player.begin_tick();
        }

        self.apply_controls(input, events);
        self.run_ai(events);
        collision::separate_players(&mut self.teams, &self.config);

        for player in self.teams.iter_mut().flat_map(|t| t.players.iter_mut()) {
            player.settle_stamina(&self.config.player);
        }

        self.ball
            .update(self.teams.iter().flat_map(|t| t.players.iter()), &self.config);

        if let Some(goal) = evaluate_goal(
            &mut self.match_state,
            &mut self.ball,
            &mut self.teams,
            &self.config,
        ) {
            events.push(MatchEvent::Goal(goal));
        }

        if self.match_state.advance_clock() {
            self.end_regulation(events);
        }
    }

    fn apply_controls(&mut self, input: &TickInput, events: &mut Vec<MatchEvent>) {
        if let Some(difficulty) = input.difficulty {
            if difficulty != self.difficulty {
                self.difficulty = difficulty;
                tracing::info!(difficulty = difficulty.key(), "Difficulty changed");
                events.push(MatchEvent::DifficultyChanged(difficulty));
            }
        }

        let Some(side) = self.config.match_rules.human_side else {
            return;
        };
        let config = &self.config;
        let ball = &mut self.ball;
        let team = &mut self.teams[side.index()];

        if input.switch_player {
            let slot = team.switch_controlled();
            tracing::debug!(side = %side, slot, "Switched controlled player");
            events.push(MatchEvent::ControlSwitched { side, slot });
        }

        let slot = team.controlled_index();
        let Some(player) = team.players.get_mut(slot) else {
            return;
        };

        let (dx, dy) = input.direction();
        if (dx, dy) == (0, 0) {
            player.moving = false;
        } else {
            let speed = player.speed();
            let delta = Vec2Fixed::new(speed * Fixed::from_num(dx), speed * Fixed::from_num(dy));
            player.move_by(delta, config);
            if player.distance_to(ball.position) > config.dribble_range()
                && ball.kick(player.position(), player.stats.shooting, config)
            {
                events.push(MatchEvent::Kick { side, slot });
            }
        }

        if input.kick {
            let player = &team.players[slot];
            if player.distance_to(ball.position) < config.kick_range() {
                let receiver = find_pass_target(player, &team.players, config).map(|m| m.position());
                match receiver {
                    Some(target) if ball.pass_to(target, config) => {
                        events.push(MatchEvent::Pass { side, slot });
                    }
                    _ => {
                        if ball.kick(player.position(), player.stats.shooting, config) {
                            events.push(MatchEvent::Kick { side, slot });
                        }
                    }
                }
            }
        }
    }

    fn run_ai(&mut self, events: &mut Vec<MatchEvent>) {
        let profile = *self.config.difficulty.get(self.difficulty);
        let human = self.config.match_rules.human_side;

        for side in Side::BOTH {
            let team = &self.teams[side.index()];
            let skip = (human == Some(side)).then(|| team.controlled_index());
            for slot in 0..team.players.len() {
                if skip == Some(slot) {
                    continue;
                }
                let action = ai::run_player(
                    &mut self.teams,
                    side,
                    slot,
                    &mut self.ball,
                    &profile,
                    &self.config,
                );
                match action {
                    Some(BallAction::Pass) => {
                        tracing::debug!(side = %side, slot, "AI pass");
                        events.push(MatchEvent::Pass { side, slot });
                    }
                    Some(BallAction::Kick) => events.push(MatchEvent::Kick { side, slot }),
                    None => {}
                }
            }
        }
    }

    fn end_regulation(&mut self, events: &mut Vec<MatchEvent>) {
        let score = self.match_state.scores();
        let shootout = self.match_state.is_level();
        tracing::info!(home = score[0], away = score[1], shootout, "Regulation ended");
        events.push(MatchEvent::RegulationEnded { score, shootout });

        if shootout {
            for team in &mut self.teams {
                team.reset_to_kickoff(&self.config);
            }
            self.ball.reset(self.config.field.center());
            self.shootout = Some(PenaltyShootout::new());
            self.phase = MatchPhase::Shootout;
            tracing::info!("Penalty shootout started");
        } else {
            self.phase = MatchPhase::FullTime;
        }
    }

    fn tick_shootout(&mut self, input: &TickInput, events: &mut Vec<MatchEvent>) {
        let Some(shootout) = self.shootout.as_mut() else {
            self.phase = MatchPhase::FullTime;
            return;
        };
        let control = ShotControl {
            human: self.config.match_rules.human_side == Some(shootout.shooting()),
            aim_delta: input.aim_delta,
            confirm: input.confirm_shot,
        };
        let profile = *self.config.difficulty.get(self.difficulty);

        if let Some(event) = shootout.step(
            &mut self.teams,
            &mut self.ball,
            control,
            &profile,
            &self.config,
            &mut self.rng,
        ) {
            if matches!(event, ShootoutEvent::Finished { .. }) {
                self.phase = MatchPhase::FullTime;
            }
            events.push(MatchEvent::Shootout(event));
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Ticks simulated so far.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Seed the simulation was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Whether nothing is left to play.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::FullTime
    }

    /// Active difficulty.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// A team.
    #[must_use]
    pub fn team(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    /// Mutable access to a team, for scenario setup.
    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        &mut self.teams[side.index()]
    }

    /// The ball.
    #[must_use]
    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    /// Mutable access to the ball, for scenario setup.
    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    /// Score, clock and cooldown.
    #[must_use]
    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    /// Shootout state, once penalties have started.
    #[must_use]
    pub fn shootout(&self) -> Option<&PenaltyShootout> {
        self.shootout.as_ref()
    }

    /// Winner after full time: regulation leader or shootout winner.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        if self.phase != MatchPhase::FullTime {
            return None;
        }
        match &self.shootout {
            Some(shootout) => shootout.winner(),
            None => self.match_state.leader(),
        }
    }

    /// Final result, once the match is over.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if self.phase != MatchPhase::FullTime {
            return None;
        }
        Some(MatchOutcome {
            score: self.match_state.scores(),
            penalties: self.shootout.as_ref().map(PenaltyShootout::converted),
            winner: self.winner(),
            ticks: self.tick,
        })
    }

    /// Read-only view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let players = self
            .teams
            .iter()
            .flat_map(|team| {
                team.players.iter().map(move |p| PlayerView {
                    side: p.side,
                    slot: p.slot,
                    name: p.name.clone(),
                    color: team.color,
                    role: p.role,
                    position: p.position().to_f32(),
                    radius: p.radius.to_num(),
                    stamina: p.stamina_ratio().to_num(),
                    controllable: p.controllable,
                    moving: p.moving,
                    ai_state: p.ai.state,
                })
            })
            .collect();

        Snapshot {
            tick: self.tick,
            phase: self.phase,
            players,
            ball: BallView {
                position: self.ball.position.to_f32(),
                velocity: self.ball.velocity.to_f32(),
                radius: self.ball.radius.to_num(),
            },
            score: self.match_state.scores(),
            team_names: [self.teams[0].name.clone(), self.teams[1].name.clone()],
            remaining_seconds: self
                .match_state
                .remaining_seconds(&self.config.match_rules)
                .to_num(),
            difficulty: self.difficulty,
            goal_cooldown: self.match_state.goal_cooldown(),
            shootout: self.shootout.as_ref().map(|s| ShootoutView {
                round: s.round() + 1,
                converted: s.converted(),
                shooting: s.shooting(),
                phase: s.phase(),
                aim: s.aim().to_num(),
                last_outcome: s.last_outcome(),
            }),
            winner: self.winner(),
        }
    }

    /// Compute a hash of the simulation state for desync detection.
    ///
    /// Covers the seed, tick, phase, clock, score, ball, every player's physical
    /// and AI state, the shootout and the RNG stream position.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.seed.hash(&mut hasher);
        self.tick.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.difficulty.hash(&mut hasher);
        self.match_state.hash(&mut hasher);
        self.ball.hash(&mut hasher);

        for team in &self.teams {
            team.controlled_index().hash(&mut hasher);
            for p in &team.players {
                p.position().hash(&mut hasher);
                p.stamina().to_bits().hash(&mut hasher);
                p.speed().to_bits().hash(&mut hasher);
                p.moving.hash(&mut hasher);
                p.ai.state.hash(&mut hasher);
                p.ai.target.hash(&mut hasher);
                p.ai.decision_timer.hash(&mut hasher);
                p.save_bias.to_bits().hash(&mut hasher);
            }
        }

        if let Some(s) = &self.shootout {
            s.round().hash(&mut hasher);
            s.converted().hash(&mut hasher);
            s.shooting().hash(&mut hasher);
            s.phase().hash(&mut hasher);
            s.aim().to_bits().hash(&mut hasher);
            s.result_timer().hash(&mut hasher);
            s.last_outcome().hash(&mut hasher);
            s.is_finished().hash(&mut hasher);
        }

        self.rng.get_word_pos().hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the simulation state to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SimError::Serialization(format!("simulation: {e}")))
    }

    /// Deserialize simulation state from bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| SimError::Serialization(format!("simulation: {e}")))
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for p in self.teams.iter().flat_map(|t| t.players.iter()) {
            debug_assert!(
                self.config.field.contains(p.position()),
                "{} left the pitch at {:?}",
                p.name,
                p.position()
            );
            debug_assert!(p.stamina() >= Fixed::ZERO && p.stamina() <= p.max_stamina());
        }
        for team in &self.teams {
            debug_assert_eq!(team.players.iter().filter(|p| p.controllable).count(), 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::AiState;

    fn short_match(seconds: u32) -> SimConfig {
        let mut config = SimConfig::default();
        config.match_rules.duration_secs = seconds;
        config
    }

    #[test]
    fn test_simulation_new() {
        let sim = Simulation::new(SimConfig::default(), 1);
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.phase(), MatchPhase::Regulation);
        assert_eq!(sim.match_state().remaining_ticks(), 5400);
        assert_eq!(sim.ball().position, Vec2Fixed::from_int(400, 300));
        assert_eq!(sim.team(Side::Home).controlled_index(), 0);
    }

    #[test]
    fn test_idle_tick_advances_clock() {
        let mut sim = Simulation::new(SimConfig::default(), 1);
        let events = sim.tick(&TickInput::default());
        assert_eq!(events.tick, 0);
        assert_eq!(sim.current_tick(), 1);
        assert_eq!(sim.match_state().remaining_ticks(), 5399);
    }

    #[test]
    fn test_human_player_moves() {
        let mut sim = Simulation::new(SimConfig::default(), 1);
        sim.team_mut(Side::Home).set_controlled(1);
        let before = sim.team(Side::Home).players[1].position();

        sim.tick(&TickInput::moving(1, 0));

        let after = sim.team(Side::Home).players[1].position();
        assert!(after.x > before.x);
        assert!(sim.team(Side::Home).players[1].moving);
    }

    #[test]
    fn test_controlled_player_skips_ai() {
        let mut sim = Simulation::new(SimConfig::default(), 1);
        sim.team_mut(Side::Home).set_controlled(4);
        for _ in 0..30 {
            sim.tick(&TickInput::default());
        }
        let messi = &sim.team(Side::Home).players[4];
        assert_eq!(messi.ai.decision_timer, 0);
        assert_eq!(messi.ai.state, AiState::Idle);
    }

    #[test]
    fn test_switch_player_event() {
        let mut sim = Simulation::new(SimConfig::default(), 1);
        let input = TickInput {
            switch_player: true,
            ..TickInput::default()
        };
        let events = sim.tick(&input);
        assert!(events
            .events
            .contains(&MatchEvent::ControlSwitched { side: Side::Home, slot: 1 }));
    }

    #[test]
    fn test_difficulty_change() {
        let mut sim = Simulation::new(SimConfig::default(), 1);
        let input = TickInput {
            difficulty: Some(Difficulty::Hard),
            ..TickInput::default()
        };
        let events = sim.tick(&input);
        assert_eq!(sim.difficulty(), Difficulty::Hard);
        assert!(events.events.contains(&MatchEvent::DifficultyChanged(Difficulty::Hard)));

        let again = sim.tick(&input);
        assert!(!again.events.contains(&MatchEvent::DifficultyChanged(Difficulty::Hard)));
    }

    #[test]
    fn test_regulation_end_decided_goes_full_time() {
        let mut sim = Simulation::new(short_match(1), 3);
        sim.match_state.record_goal(Side::Away, 0);
        sim.match_state.record_goal(Side::Away, 0);
        let mut ended = false;
        for _ in 0..60 {
            let events = sim.tick(&TickInput::default());
            ended |= events.events.iter().any(|e| {
                matches!(e, MatchEvent::RegulationEnded { shootout: false, .. })
            });
        }
        assert!(ended);
        assert!(sim.is_over());
        assert!(sim.outcome().is_some());
    }

    #[test]
    fn test_same_seed_same_hash() {
        let mut a = Simulation::new(SimConfig::default(), 77);
        let mut b = Simulation::new(SimConfig::default(), 77);
        for i in 0..300 {
            let input = TickInput::moving((i % 3) as i8 - 1, 1);
            a.tick(&input);
            b.tick(&input);
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_serialize_round_trip_preserves_hash() {
        let mut sim = Simulation::new(SimConfig::default(), 5);
        for _ in 0..100 {
            sim.tick(&TickInput::moving(0, 1));
        }
        let bytes = sim.serialize().expect("serialize");
        let mut restored = Simulation::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored.state_hash(), sim.state_hash());

        for _ in 0..100 {
            sim.tick(&TickInput::default());
            restored.tick(&TickInput::default());
        }
        assert_eq!(restored.state_hash(), sim.state_hash());
    }

    #[test]
    fn test_reset_restarts_match() {
        let mut sim = Simulation::new(SimConfig::default(), 5);
        for _ in 0..10 {
            sim.tick(&TickInput::default());
        }
        sim.reset(6);
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.seed(), 6);
    }

    #[test]
    fn test_snapshot_lists_all_players() {
        let sim = Simulation::new(SimConfig::default(), 1);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.players.len(), 10);
        assert_eq!(snapshot.team(Side::Away).count(), 5);
        assert_eq!(snapshot.players[0].name, "Neuer");
        assert_eq!(snapshot.remaining_seconds, 90.0);
        assert!(snapshot.shootout.is_none());
    }
}
