//! Replay system for recording and playing back matches.
//!
//! A replay stores the configuration, the seed and every non-idle input
//! with the tick it applied to. Because the simulation is deterministic,
//! that is enough to recreate the whole match and check its final hash.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::input::TickInput;
use crate::simulation::Simulation;

/// A single recorded input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayInput {
    /// Tick the input applied to.
    pub tick: u64,
    /// The input.
    pub input: TickInput,
}

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Configuration the match ran with.
    pub config: SimConfig,
    /// Random seed.
    pub seed: u64,
    /// Non-idle inputs in tick order.
    pub inputs: Vec<ReplayInput>,
    /// Ticks played.
    pub final_tick: u64,
    /// State hash after the last tick.
    pub final_hash: u64,
}

impl Replay {
    /// Start recording a match.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            version: REPLAY_VERSION,
            config,
            seed,
            inputs: Vec::new(),
            final_tick: 0,
            final_hash: 0,
        }
    }

    /// Record the input applied at `tick`. Idle inputs are not stored.
    pub fn record(&mut self, tick: u64, input: &TickInput) {
        if !input.is_idle() {
            self.inputs.push(ReplayInput { tick, input: *input });
        }
    }

    /// Finalize the replay with end-of-match state.
    pub fn finalize(&mut self, final_tick: u64, final_hash: u64) {
        self.final_tick = final_tick;
        self.final_hash = final_hash;
    }

    /// Save the replay to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self)
            .map_err(|e| SimError::Serialization(format!("replay: {e}")))?;
        std::fs::write(path, bytes).map_err(|e| SimError::io(path, e))?;
        Ok(())
    }

    /// Load a replay from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SimError::io(path, e))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| SimError::Serialization(format!("replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(SimError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }

    /// Input for a tick, idle if none was recorded.
    #[must_use]
    pub fn input_at(&self, tick: u64) -> TickInput {
        self.inputs
            .binary_search_by_key(&tick, |r| r.tick)
            .map_or(TickInput::IDLE, |i| self.inputs[i].input)
    }

    /// Ticks in the replay.
    #[must_use]
    pub const fn duration(&self) -> u64 {
        self.final_tick
    }

    /// Number of recorded inputs.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    simulation: Simulation,
    input_index: usize,
}

impl ReplayPlayer {
    /// Start playback from kickoff.
    #[must_use]
    pub fn new(replay: Replay) -> Self {
        let simulation = Simulation::new(replay.config.clone(), replay.seed);
        Self {
            replay,
            simulation,
            input_index: 0,
        }
    }

    /// Advance by one tick.
    ///
    /// Returns true if there are more ticks to play.
    pub fn advance(&mut self) -> bool {
        let tick = self.simulation.current_tick();
        if tick >= self.replay.final_tick {
            return false;
        }

        let mut input = TickInput::IDLE;
        if let Some(record) = self.replay.inputs.get(self.input_index) {
            if record.tick == tick {
                input = record.input;
                self.input_index += 1;
            }
        }
        self.simulation.tick(&input);

        self.simulation.current_tick() < self.replay.final_tick
    }

    /// Restart and play up to `target_tick`.
    pub fn seek(&mut self, target_tick: u64) {
        self.simulation = Simulation::new(self.replay.config.clone(), self.replay.seed);
        self.input_index = 0;
        while self.simulation.current_tick() < target_tick.min(self.replay.final_tick) {
            self.advance();
        }
    }

    /// Current tick.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.simulation.current_tick()
    }

    /// The simulation being played.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Whether playback reached the end.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_tick() >= self.replay.final_tick
    }

    /// Replay from the start and compare the final hash.
    pub fn verify(&mut self) -> Result<u64> {
        self.seek(self.replay.final_tick);
        let actual = self.simulation.state_hash();
        if actual != self.replay.final_hash {
            return Err(SimError::Desync {
                tick: self.current_tick(),
                expected: self.replay.final_hash,
                actual,
            });
        }
        Ok(actual)
    }
}
