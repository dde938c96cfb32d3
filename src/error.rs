//! Error types for configuration loading and scene lookup
//!
//! Invalid phase transitions are deliberately absent: they are silent no-ops,
//! not errors.

use thiserror::Error;

/// Configuration failures. All of these fail fast before any layout or
/// session state is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown scene archetype '{0}'")]
    UnknownArchetype(String),
    #[error("scene archetype '{id}' is invalid: {reason}")]
    InvalidArchetype { id: String, reason: String },
    #[error("unknown vehicle '{0}'")]
    UnknownVehicle(String),
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
}
