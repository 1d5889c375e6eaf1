//! Headless match runner implementation.

use std::io::{self, BufRead, Write};
use std::path::Path;

use pitch_core::config::SimConfig;
use pitch_core::error::SimError;
use pitch_core::input::TickInput;
use pitch_core::simulation::Simulation;

use crate::protocol::{Command, Response};

/// Load a match config from a RON file, or the defaults, and validate it.
pub fn load_match_config(path: Option<&Path>) -> Result<SimConfig, SimError> {
    let config = match path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every tick (vs only on query).
    pub auto_state_output: bool,
}

/// Headless runner for controller-driven matches.
///
/// Holds one simulation plus the input the controller last sent. Movement
/// and aim are held between ticks; one-shot intents are consumed by the
/// first tick they apply to.
#[derive(Debug)]
pub struct HeadlessRunner {
    sim: Simulation,
    config: HeadlessConfig,
    pending: TickInput,
    game_over_sent: bool,
}

impl HeadlessRunner {
    /// Create a runner with default config.
    pub fn new(match_config: SimConfig, seed: u64) -> Self {
        Self::with_config(match_config, seed, HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(match_config: SimConfig, seed: u64, config: HeadlessConfig) -> Self {
        Self {
            sim: Simulation::new(match_config, seed),
            config,
            pending: TickInput::IDLE,
            game_over_sent: false,
        }
    }

    /// The running match.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Input that the next tick will apply.
    pub fn pending_input(&self) -> &TickInput {
        &self.pending
    }

    /// The greeting sent before any command is read.
    pub fn ready(&self) -> Response {
        Response::ready(self.sim.current_tick(), self.sim.seed())
    }

    /// Process one command and return the responses, in output order.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let name = cmd.name();
        tracing::debug!(cmd = name, tick = self.sim.current_tick(), "Handling command");

        let mut responses = Vec::new();
        match cmd {
            Command::Tick { count, input } => {
                if let Some(input) = input {
                    self.pending = input;
                }
                for _ in 0..count {
                    if self.sim.is_over() {
                        break;
                    }
                    let events = self.sim.tick(&self.pending);
                    self.pending = self.pending.held();

                    if !events.is_empty() {
                        responses.push(Response::Events {
                            tick: events.tick,
                            events: events.events,
                        });
                    }
                    if self.config.auto_state_output {
                        responses.push(self.state());
                    }
                }
                responses.push(Response::ack(name));
            }
            Command::Input { input } => {
                self.pending = input;
                responses.push(Response::ack(name));
            }
            Command::Query => responses.push(self.state()),
            Command::Hash => responses.push(Response::StateHash {
                tick: self.sim.current_tick(),
                hash: self.sim.state_hash(),
            }),
            Command::Reset { seed } => {
                let seed = seed.unwrap_or_else(|| self.sim.seed());
                tracing::info!(seed, "Resetting match");
                self.sim.reset(seed);
                self.pending = TickInput::IDLE;
                self.game_over_sent = false;
                responses.push(self.ready());
            }
            Command::Quit => responses.push(Response::Bye),
        }

        if !self.game_over_sent {
            if let Some(outcome) = self.sim.outcome() {
                tracing::info!(
                    score = ?outcome.score,
                    penalties = ?outcome.penalties,
                    winner = ?outcome.winner,
                    "Match over"
                );
                self.game_over_sent = true;
                responses.push(Response::GameOver { outcome });
            }
        }

        responses
    }

    /// Run the JSON-lines loop until `quit` or end of input.
    ///
    /// Unparseable lines produce an error response and are otherwise
    /// ignored.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> io::Result<()> {
        writer.write_all(self.ready().to_json_line().as_bytes())?;
        writer.flush()?;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (responses, quit) = match Command::from_json(line) {
                Ok(cmd) => {
                    let quit = matches!(cmd, Command::Quit);
                    (self.handle(cmd), quit)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected command line");
                    (vec![Response::error(format!("Parse error: {e}"), None)], false)
                }
            };

            for response in &responses {
                writer.write_all(response.to_json_line().as_bytes())?;
            }
            writer.flush()?;

            if quit {
                break;
            }
        }
        Ok(())
    }

    fn state(&self) -> Response {
        Response::State {
            snapshot: self.sim.snapshot(),
            hash: self.sim.state_hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_core::player::Side;
    use pitch_test_utils::fixtures::{short_match_config, test_config};

    fn parse_lines(output: &[u8]) -> Vec<Response> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn tick(count: u32) -> Command {
        Command::Tick { count, input: None }
    }

    #[test]
    fn test_tick_advances_and_acks() {
        let mut runner = HeadlessRunner::new(test_config(), 1);
        let responses = runner.handle(tick(30));
        assert_eq!(runner.simulation().current_tick(), 30);
        assert_eq!(responses.last(), Some(&Response::ack("tick")));
    }

    #[test]
    fn test_query_and_hash_do_not_advance() {
        let mut runner = HeadlessRunner::new(test_config(), 1);
        runner.handle(tick(5));

        let query = runner.handle(Command::Query);
        let Response::State { snapshot, hash } = &query[0] else {
            panic!("expected state");
        };
        assert_eq!(snapshot.tick, 5);
        assert_eq!(*hash, runner.simulation().state_hash());

        let hash = runner.handle(Command::Hash);
        assert!(matches!(hash[0], Response::StateHash { tick: 5, .. }));
        assert_eq!(runner.simulation().current_tick(), 5);
    }

    #[test]
    fn test_held_input_keeps_moving_but_kicks_once() {
        let mut runner = HeadlessRunner::new(test_config(), 2);
        runner.handle(Command::Input {
            input: TickInput {
                movement: (1, 0),
                kick: true,
                ..TickInput::IDLE
            },
        });
        runner.handle(tick(1));

        let held = runner.pending_input();
        assert_eq!(held.movement, (1, 0));
        assert!(!held.kick);
    }

    #[test]
    fn test_tick_input_moves_controlled_player() {
        let mut runner = HeadlessRunner::new(test_config(), 3);
        let start = runner.simulation().team(Side::Home).players[0].position();
        runner.handle(Command::Tick {
            count: 10,
            input: Some(TickInput::moving(1, 0)),
        });
        let after = runner.simulation().team(Side::Home).players[0].position();
        assert!(after.x > start.x);
    }

    #[test]
    fn test_auto_state_output() {
        let config = HeadlessConfig {
            auto_state_output: true,
        };
        let mut runner = HeadlessRunner::with_config(test_config(), 1, config);
        let responses = runner.handle(tick(3));
        let states = responses
            .iter()
            .filter(|r| matches!(r, Response::State { .. }))
            .count();
        assert_eq!(states, 3);
    }

    #[test]
    fn test_game_over_sent_once() {
        let mut runner = HeadlessRunner::new(short_match_config(1), 4);
        // A one second match ends 0-0 unless someone scores; confirm shots
        // until the shootout is decided either way.
        let mut game_overs = 0;
        for _ in 0..2_000 {
            let responses = runner.handle(Command::Tick {
                count: 10,
                input: Some(TickInput {
                    confirm_shot: true,
                    ..TickInput::IDLE
                }),
            });
            game_overs += responses
                .iter()
                .filter(|r| matches!(r, Response::GameOver { .. }))
                .count();
        }
        assert!(runner.simulation().is_over());
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_reset_restarts_match() {
        let mut runner = HeadlessRunner::new(test_config(), 1);
        runner.handle(tick(50));
        let responses = runner.handle(Command::Reset { seed: Some(8) });

        assert_eq!(responses, vec![Response::ready(0, 8)]);
        assert_eq!(runner.simulation().current_tick(), 0);
        assert_eq!(runner.simulation().seed(), 8);
        assert_eq!(*runner.pending_input(), TickInput::IDLE);
    }

    #[test]
    fn test_run_loop_over_lines() {
        let input = b"{\"cmd\":\"tick\",\"count\":2}\n\nnonsense\n{\"cmd\":\"hash\"}\n{\"cmd\":\"quit\"}\n{\"cmd\":\"tick\"}\n";
        let mut output = Vec::new();
        let mut runner = HeadlessRunner::new(test_config(), 6);
        runner.run(&input[..], &mut output).unwrap();

        let responses = parse_lines(&output);
        assert!(matches!(responses[0], Response::Ready { tick: 0, seed: 6, .. }));
        assert!(responses
            .iter()
            .any(|r| matches!(r, Response::Error { cmd: None, .. })));
        assert!(responses
            .iter()
            .any(|r| matches!(r, Response::StateHash { tick: 2, .. })));
        assert_eq!(responses.last(), Some(&Response::Bye));
        // Nothing after quit is processed.
        assert_eq!(runner.simulation().current_tick(), 2);
    }

    #[test]
    fn test_load_match_config_default_and_file() {
        let config = load_match_config(None).unwrap();
        assert_eq!(config, SimConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.ron");
        std::fs::write(&path, short_match_config(30).to_ron().unwrap()).unwrap();
        let loaded = load_match_config(Some(&path)).unwrap();
        assert_eq!(loaded.match_rules.duration_secs, 30);
    }

    #[test]
    fn test_load_match_config_rejects_invalid() {
        let mut config = test_config();
        config.match_rules.tick_rate = 0;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ron");
        std::fs::write(&path, config.to_ron().unwrap()).unwrap();

        let err = load_match_config(Some(&path)).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        assert!(matches!(
            load_match_config(Some(&dir.path().join("missing.ron"))),
            Err(SimError::Io { .. })
        ));
    }
}
