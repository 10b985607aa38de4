//! Error types for the form guard.

use crate::signals::Signal;
use thiserror::Error;

/// Startup-time configuration failures.
///
/// None of these can occur while scoring: a [`crate::Scorer`] only exists
/// once its configuration has been validated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weight table has no entry for signal `{0}`")]
    MissingWeight(Signal),

    #[error("bot threshold must be greater than zero")]
    InvalidThreshold,

    #[error("signal weights sum past {}", u32::MAX)]
    WeightOverflow,

    #[error("no detector decides signal `{0}`")]
    MissingDetector(Signal),

    #[error("more than one detector decides signal `{0}`")]
    DuplicateDetector(Signal),

    #[error("invalid timing setting `{name}`: {reason}")]
    InvalidTiming {
        name: &'static str,
        reason: &'static str,
    },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A field identifier outside the tracked set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown form field `{0}`")]
    UnknownField(String),
}
