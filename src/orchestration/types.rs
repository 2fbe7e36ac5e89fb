//! # Orchestration Types
//!
//! Core types shared by the planner, the gate evaluator, the stage executor
//! and the rollout coordinator: waves and their gates, per-target outcomes,
//! rollout reports and lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DeploymentTarget, Phase, ResourceGroup, RolloutMode};
use crate::registry::GroupOutputs;
use crate::state_machine::TargetState;

/// Precondition that must clear before a wave starts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateCondition {
    AlwaysOpen,
    /// Cleared only by an operator approval signal
    ManualApproval { gate_id: String, reason: String },
}

impl GateCondition {
    pub fn manual(gate_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManualApproval {
            gate_id: gate_id.into(),
            reason: reason.into(),
        }
    }

    pub fn gate_id(&self) -> Option<&str> {
        match self {
            Self::AlwaysOpen => None,
            Self::ManualApproval { gate_id, .. } => Some(gate_id),
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Self::ManualApproval { .. })
    }
}

/// Approval state of a manual gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pending,
    Approved,
}

/// Result of an approval signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutcome {
    Approved,
    /// The gate was already approved; nothing changed
    AlreadyApproved,
}

/// Resource groups applied together as one schedulable step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub index: usize,
    pub phase: Phase,
    pub groups: Vec<ResourceGroup>,
    pub gates: Vec<GateCondition>,
}

impl Wave {
    pub fn name(&self) -> &'static str {
        self.phase.as_str()
    }

    pub fn group_ids(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.id.as_str()).collect()
    }

    pub fn manual_gate_ids(&self) -> Vec<&str> {
        self.gates.iter().filter_map(GateCondition::gate_id).collect()
    }
}

/// Ordered wave list for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPlan {
    pub target: DeploymentTarget,
    pub mode: RolloutMode,
    pub waves: Vec<Wave>,
}

impl TargetPlan {
    pub fn target_id(&self) -> String {
        self.target.id()
    }

    /// Every distinct manual gate id in first-use order
    pub fn gate_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for wave in &self.waves {
            for gate_id in wave.manual_gate_ids() {
                if !ids.iter().any(|known| known == gate_id) {
                    ids.push(gate_id.to_string());
                }
            }
        }
        ids
    }
}

/// How one target's pipeline ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TargetOutcome {
    Succeeded {
        waves_applied: usize,
    },
    Failed {
        wave: String,
        group: String,
        reason: String,
    },
    Cancelled {
        /// Wave the pipeline was parked on or about to start
        wave: Option<String>,
    },
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn final_state(&self) -> TargetState {
        match self {
            Self::Succeeded { .. } => TargetState::Succeeded,
            Self::Failed { .. } => TargetState::Failed,
            Self::Cancelled { .. } => TargetState::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target_id: String,
    pub outcome: TargetOutcome,
    /// Groups that converged, in apply-completion order per wave
    pub applied_groups: Vec<String>,
    pub outputs: GroupOutputs,
}

impl TargetReport {
    /// Failure as a crate error, carrying target, wave and group identifiers
    pub fn error(&self) -> Option<crate::error::RolloutError> {
        match &self.outcome {
            TargetOutcome::Failed {
                wave,
                group,
                reason,
            } => Some(crate::error::RolloutError::ApplyFailed {
                target: self.target_id.clone(),
                wave: wave.clone(),
                group: group.clone(),
                reason: reason.clone(),
            }),
            TargetOutcome::Cancelled { .. } => Some(crate::error::RolloutError::Cancelled {
                target: self.target_id.clone(),
            }),
            TargetOutcome::Succeeded { .. } => None,
        }
    }
}

/// Outcome of one triggered rollout across every target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutReport {
    pub rollout_id: Uuid,
    pub revision: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub targets: Vec<TargetReport>,
}

impl RolloutReport {
    pub fn target(&self, target_id: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|report| report.target_id == target_id)
    }

    pub fn all_succeeded(&self) -> bool {
        self.targets.iter().all(|report| report.outcome.is_success())
    }

    pub fn failed(&self) -> Vec<&TargetReport> {
        self.targets
            .iter()
            .filter(|report| matches!(report.outcome, TargetOutcome::Failed { .. }))
            .collect()
    }

    pub fn count_in(&self, state: TargetState) -> usize {
        self.targets
            .iter()
            .filter(|report| report.outcome.final_state() == state)
            .count()
    }
}

/// Point-in-time view of one pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetStatus {
    pub target_id: String,
    pub state: TargetState,
    pub current_wave: Option<String>,
    pub pending_gates: Vec<String>,
    pub applied_groups: Vec<String>,
}

/// Rollout lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RolloutEvent {
    RolloutStarted {
        rollout_id: Uuid,
        revision: String,
        targets: usize,
    },
    WaveStarted {
        target_id: String,
        wave: String,
        index: usize,
    },
    GateBlocked {
        target_id: String,
        wave: String,
        gates: Vec<String>,
    },
    GateApproved {
        target_id: String,
        gate_id: String,
    },
    GroupApplied {
        target_id: String,
        wave: String,
        group: String,
        attempts: u32,
    },
    GroupFailed {
        target_id: String,
        wave: String,
        group: String,
        reason: String,
    },
    WaveCompleted {
        target_id: String,
        wave: String,
    },
    TargetFinished {
        target_id: String,
        state: TargetState,
    },
    RolloutFinished {
        rollout_id: Uuid,
        succeeded: usize,
        failed: usize,
        cancelled: usize,
    },
}

impl RolloutEvent {
    /// Event name for structured logs
    pub fn event_name(&self) -> &'static str {
        use crate::constants::events;
        match self {
            Self::RolloutStarted { .. } => events::ROLLOUT_STARTED,
            Self::WaveStarted { .. } => events::WAVE_STARTED,
            Self::GateBlocked { .. } => events::GATE_BLOCKED,
            Self::GateApproved { .. } => events::GATE_APPROVED,
            Self::GroupApplied { .. } => events::GROUP_APPLIED,
            Self::GroupFailed { .. } => events::GROUP_FAILED,
            Self::WaveCompleted { .. } => events::WAVE_COMPLETED,
            Self::TargetFinished { .. } => events::TARGET_FINISHED,
            Self::RolloutFinished { .. } => events::ROLLOUT_FINISHED,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::WaveStarted { target_id, .. }
            | Self::GateBlocked { target_id, .. }
            | Self::GateApproved { target_id, .. }
            | Self::GroupApplied { target_id, .. }
            | Self::GroupFailed { target_id, .. }
            | Self::WaveCompleted { target_id, .. }
            | Self::TargetFinished { target_id, .. } => Some(target_id),
            Self::RolloutStarted { .. } | Self::RolloutFinished { .. } => None,
        }
    }
}
