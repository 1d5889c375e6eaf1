//! Error types for the match simulation.
//!
//! The per-tick path never fails: degenerate geometry and unknown keys
//! fall back to defaults. Errors only arise at the boundaries where
//! configuration, simulation state or replays cross into files and bytes.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// A configuration value that breaks a simulation precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid config value `{field}`: {reason}")]
pub struct ConfigError {
    /// Dotted path of the offending field, e.g. `field.goal_width`.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl ConfigError {
    /// Create a new configuration error.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration failed validation.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Failed to read or write a file.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file parsing error.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Config serialization error.
    #[error("Failed to write config: {0}")]
    ConfigWrite(#[from] ron::Error),

    /// Binary (de)serialization failure of state or replays.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Replay written by an incompatible format version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersion {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Replayed state diverged from the recording.
    #[error("Desync detected at tick {tick}: expected hash {expected}, got {actual}")]
    Desync {
        /// Tick where the comparison was made.
        tick: u64,
        /// Recorded hash.
        expected: u64,
        /// Hash produced by playback.
        actual: u64,
    },
}

impl SimError {
    /// Wrap an IO error with the path it concerned.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
