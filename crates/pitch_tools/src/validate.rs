//! Config validation utilities.

use std::path::{Path, PathBuf};

use thiserror::Error;

use pitch_core::config::SimConfig;
use pitch_core::error::{ConfigError, SimError};

/// Why a config file was rejected.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The file could not be read or parsed.
    #[error(transparent)]
    Load(#[from] SimError),

    /// The file parsed but breaks a precondition.
    #[error("{}: {source}", path.display())]
    Invalid {
        /// Offending file.
        path: PathBuf,
        /// First violated precondition.
        #[source]
        source: ConfigError,
    },

    /// A directory held no `.ron` files.
    #[error("no .ron files in {}", .0.display())]
    NoConfigs(PathBuf),

    /// Listing a directory failed.
    #[error("cannot read directory {}: {source}", path.display())]
    Directory {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Load one RON config file and check it.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or fails
/// [`SimConfig::validate`].
pub fn validate_config_file(path: &Path) -> Result<SimConfig, ValidateError> {
    let config = SimConfig::load(path)?;
    config.validate().map_err(|source| ValidateError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Config valid");
    Ok(config)
}

/// Validate a config file, or every `.ron` file in a directory.
///
/// Returns the number of files checked.
///
/// # Errors
///
/// Returns the first file that fails, or [`ValidateError::NoConfigs`] for a
/// directory without configs.
pub fn validate_path(path: &Path) -> Result<usize, ValidateError> {
    if !path.is_dir() {
        validate_config_file(path)?;
        return Ok(1);
    }

    let entries = std::fs::read_dir(path).map_err(|source| ValidateError::Directory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ValidateError::NoConfigs(path.to_path_buf()));
    }
    for file in &files {
        tracing::info!(path = %file.display(), "Validating");
        validate_config_file(file)?;
    }
    Ok(files.len())
}

/// The default config rendered as RON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn default_config_ron() -> Result<String, SimError> {
    SimConfig::default().to_ron()
}
