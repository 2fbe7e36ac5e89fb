use thiserror::Error;

/// Error types for target lifecycle transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Invalid state transition from {from} on {event} for target {target}")]
    InvalidTransition {
        target: String,
        from: String,
        event: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
