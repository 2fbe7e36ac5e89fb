use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    errors::{StateMachineError, StateMachineResult},
    events::TargetEvent,
    states::TargetState,
};

/// One recorded state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTransition {
    pub from: TargetState,
    pub to: TargetState,
    pub event: TargetEvent,
    pub at: DateTime<Utc>,
}

/// In-memory lifecycle tracker for one target's pipeline
#[derive(Debug, Clone)]
pub struct TargetStateMachine {
    target_id: String,
    current: TargetState,
    history: Vec<TargetTransition>,
}

impl TargetStateMachine {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            current: TargetState::default(),
            history: Vec::new(),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn current_state(&self) -> TargetState {
        self.current
    }

    pub fn history(&self) -> &[TargetTransition] {
        &self.history
    }

    /// Apply an event, recording the transition
    pub fn transition(&mut self, event: TargetEvent) -> StateMachineResult<TargetState> {
        let target_state = self.determine_target_state(self.current, &event)?;

        debug!(
            target_id = %self.target_id,
            from = %self.current,
            to = %target_state,
            event = event.event_type(),
            "Target state transition"
        );

        self.history.push(TargetTransition {
            from: self.current,
            to: target_state,
            event,
            at: Utc::now(),
        });
        self.current = target_state;

        Ok(target_state)
    }

    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        &self,
        current_state: TargetState,
        event: &TargetEvent,
    ) -> StateMachineResult<TargetState> {
        let target = match (current_state, event) {
            (
                TargetState::Pending | TargetState::Applying | TargetState::AwaitingApproval,
                TargetEvent::BlockOnGates(_),
            ) => TargetState::AwaitingApproval,

            (
                TargetState::Pending | TargetState::AwaitingApproval | TargetState::Applying,
                TargetEvent::BeginWave(_),
            ) => TargetState::Applying,

            (TargetState::Applying, TargetEvent::Complete) => TargetState::Succeeded,

            (
                TargetState::Pending | TargetState::AwaitingApproval | TargetState::Applying,
                TargetEvent::Fail(_),
            ) => TargetState::Failed,

            (from, TargetEvent::Cancel) if !from.is_terminal() => TargetState::Cancelled,

            (from_state, _) => {
                return Err(StateMachineError::InvalidTransition {
                    target: self.target_id.clone(),
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}
