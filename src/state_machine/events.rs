use serde::{Deserialize, Serialize};

/// Events that move a target pipeline between states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TargetEvent {
    /// The next wave is blocked on the listed gates
    BlockOnGates(Vec<String>),
    /// All gates for the named wave cleared; applies begin
    BeginWave(String),
    /// The final wave finished
    Complete,
    /// A resource group failed to converge
    Fail(String),
    /// Operator abandoned the target
    Cancel,
}

impl TargetEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::BlockOnGates(_) => "block_on_gates",
            Self::BeginWave(_) => "begin_wave",
            Self::Complete => "complete",
            Self::Fail(_) => "fail",
            Self::Cancel => "cancel",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn fail_with_error(error: impl Into<String>) -> Self {
        Self::Fail(error.into())
    }
}
