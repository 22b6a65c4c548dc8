//! Error types for task enqueueing, parameter decoding and configuration.

use registry_core::DomainError;
use registry_infra::QueueError;
use thiserror::Error;

/// Failure to schedule a deferred task.
///
/// Either way the deferred action was **not** scheduled; callers must
/// compensate (typically by failing the enclosing flow).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnqueueError {
    /// The caller asked for an impossible schedule (e.g. a resave in the past).
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// The queue refused the task, or kept failing transiently until the
    /// retry policy gave up.
    #[error("task submission failed: {0}")]
    Queue(#[from] QueueError),
}

impl EnqueueError {
    pub fn invalid_schedule(msg: impl Into<String>) -> Self {
        Self::InvalidSchedule(msg.into())
    }
}

/// Failure to decode a task's parameters on the handler side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing required parameter: {0}")]
    Missing(String),

    #[error("parameter {key} is not a valid instant: {value}")]
    InvalidInstant { key: String, value: String },

    #[error("parameter {key} is not a boolean: {value}")]
    InvalidBool { key: String, value: String },

    #[error("parameter {key} is not a valid key: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: DomainError,
    },
}

/// Invalid configuration value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}
