//! Error types for the rollout orchestrator and failover controller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RolloutError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Apply failed for {group} in wave {wave} of target {target}: {reason}")]
    ApplyFailed {
        target: String,
        wave: String,
        group: String,
        reason: String,
    },
    #[error("Unknown target: {0}")]
    UnknownTarget(String),
    #[error("Unknown gate {gate} for target {target}")]
    UnknownGate { target: String, gate: String },
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("Hosted zone not found for environment {0}")]
    ZoneNotFound(String),
    #[error("Record set invariant violated for {name}: {reason}")]
    RecordSetInvariant { name: String, reason: String },
    #[error("Rollout cancelled for target {target}")]
    Cancelled { target: String },
    #[error("State transition error: {0}")]
    StateTransition(String),
}

impl RolloutError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// True for errors that stop a rollout before any apply happens
    pub fn is_plan_time(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }
}

impl From<serde_json::Error> for RolloutError {
    fn from(error: serde_json::Error) -> Self {
        RolloutError::ConfigurationError(format!("JSON serialization error: {error}"))
    }
}

impl From<crate::config::ConfigurationError> for RolloutError {
    fn from(error: crate::config::ConfigurationError) -> Self {
        RolloutError::ConfigurationError(error.to_string())
    }
}

impl From<crate::state_machine::StateMachineError> for RolloutError {
    fn from(error: crate::state_machine::StateMachineError) -> Self {
        RolloutError::StateTransition(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RolloutError>;
