//! JSON protocol for headless match communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Match updates and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0,"seed":..}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner outputs events while ticking, and state on `query` (or after
//!    every tick with auto state enabled)
//! 4. When the match is decided, outputs `{"type":"game_over","outcome":{..}}`
//!
//! Inputs are held: movement and aim persist across ticks until replaced,
//! while kick, switch, difficulty and shot intents fire on one tick only.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0,"seed":7}
//! -> {"cmd":"input","input":{"movement":[0,1]}}
//! <- {"type":"ack","cmd":"input"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"events","tick":42,"events":[{"Kick":{"side":"Home","slot":4}}]}
//! <- {"type":"ack","cmd":"tick"}
//! -> {"cmd":"query"}
//! <- {"type":"state","snapshot":{..},"hash":1234}
//! ```

use serde::{Deserialize, Serialize};

use pitch_core::input::TickInput;
use pitch_core::simulation::{MatchEvent, MatchOutcome};
use pitch_core::snapshot::Snapshot;

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the match by N ticks (default: 1).
    Tick {
        /// Ticks to run.
        #[serde(default = "default_tick_count")]
        count: u32,
        /// Replace the held input before ticking.
        #[serde(default)]
        input: Option<TickInput>,
    },

    /// Replace the held input without advancing time.
    Input {
        /// New input.
        input: TickInput,
    },

    /// Query current match state without advancing time.
    Query,

    /// Report the current state hash (for determinism verification).
    Hash,

    /// Restart the match, optionally with a new seed.
    Reset {
        /// Seed for the new match; keeps the current one when absent.
        #[serde(default)]
        seed: Option<u64>,
    },

    /// Quit the runner.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Current tick.
        tick: u64,
        /// Match seed.
        seed: u64,
    },

    /// Acknowledgment of a command.
    Ack {
        /// Command name.
        cmd: String,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command name, when the line parsed.
        cmd: Option<String>,
    },

    /// Current match state.
    State {
        /// Render-facing view of the match.
        snapshot: Snapshot,
        /// State hash at this tick.
        hash: u64,
    },

    /// Events produced by one tick.
    Events {
        /// Tick the events happened on.
        tick: u64,
        /// Events in order.
        events: Vec<MatchEvent>,
    },

    /// State hash for determinism verification.
    StateHash {
        /// Current tick.
        tick: u64,
        /// Hash value.
        hash: u64,
    },

    /// The match has been decided.
    GameOver {
        /// Final result.
        outcome: MatchOutcome,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64, seed: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
            seed,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Input { .. } => "input",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Reset { .. } => "reset",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_core::config::{Difficulty, SimConfig};
    use pitch_core::simulation::Simulation;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::Tick {
                count: 60,
                input: None
            }
        );
    }

    #[test]
    fn test_default_tick_count() {
        let json = r#"{"cmd":"tick"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(cmd, Command::Tick { count: 1, input: None }));
    }

    #[test]
    fn test_parse_partial_input() {
        let json = r#"{"cmd":"input","input":{"movement":[1,-1],"kick":true}}"#;
        let Command::Input { input } = Command::from_json(json).unwrap() else {
            panic!("expected input command");
        };
        assert_eq!(input.movement, (1, -1));
        assert!(input.kick);
        assert!(!input.switch_player);
        assert_eq!(input.difficulty, None);
    }

    #[test]
    fn test_parse_tick_with_input() {
        let json = r#"{"cmd":"tick","count":5,"input":{"difficulty":"Hard","aim_delta":1}}"#;
        let Command::Tick { count, input } = Command::from_json(json).unwrap() else {
            panic!("expected tick command");
        };
        let input = input.unwrap();
        assert_eq!(count, 5);
        assert_eq!(input.difficulty, Some(Difficulty::Hard));
        assert_eq!(input.aim_delta, 1);
    }

    #[test]
    fn test_parse_reset_without_seed() {
        let cmd = Command::from_json(r#"{"cmd":"reset"}"#).unwrap();
        assert_eq!(cmd, Command::Reset { seed: None });
        let cmd = Command::from_json(r#"{"cmd":"reset","seed":9}"#).unwrap();
        assert_eq!(cmd, Command::Reset { seed: Some(9) });
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Command::from_json(r#"{"cmd":"spawn"}"#).is_err());
        assert!(Command::from_json("not json").is_err());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Query.name(), "query");
        assert_eq!(Command::Reset { seed: None }.name(), "reset");
        assert_eq!(
            Command::Input {
                input: TickInput::IDLE
            }
            .name(),
            "input"
        );
    }

    #[test]
    fn test_serialize_ready_response() {
        let json = Response::ready(0, 7).to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"ready""#));
        assert!(json.contains(r#""seed":7"#));
    }

    #[test]
    fn test_state_response_round_trip() {
        let sim = Simulation::new(SimConfig::default(), 3);
        let resp = Response::State {
            snapshot: sim.snapshot(),
            hash: sim.state_hash(),
        };
        let json = resp.to_json_line();
        assert!(json.contains(r#""type":"state""#));

        let back: Response = serde_json::from_str(json.trim()).unwrap();
        let Response::State { snapshot, hash } = back else {
            panic!("expected state response");
        };
        assert_eq!(hash, sim.state_hash());
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.players.len(), 10);
    }
}
