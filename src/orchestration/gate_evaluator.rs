//! # Gate Evaluator
//!
//! Decides whether a wave may start. Manual gates move `Pending → Approved`
//! exactly once through [`GateEvaluator::approve`]; they never expire and never
//! re-lock within a rollout. A pipeline parked on a gate awaits a watch channel
//! and consumes no compute until an approval or a cancellation arrives.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Result, RolloutError};
use crate::orchestration::types::{
    ApprovalOutcome, GateCondition, GateStatus, TargetPlan, Wave,
};
use crate::utils::CancellationSignal;

#[derive(Debug, Clone)]
struct GateEntry {
    reason: String,
    status: GateStatus,
    approved_at: Option<DateTime<Utc>>,
}

/// Gate state for one target's pipeline
#[derive(Debug)]
pub struct GateEvaluator {
    target_id: String,
    gates: RwLock<HashMap<String, GateEntry>>,
    /// Bumped on every state-changing approval
    approvals: watch::Sender<u64>,
}

impl GateEvaluator {
    pub fn new(target_id: impl Into<String>) -> Self {
        let (approvals, _) = watch::channel(0);
        Self {
            target_id: target_id.into(),
            gates: RwLock::new(HashMap::new()),
            approvals,
        }
    }

    /// Evaluator with every manual gate of the plan registered as pending
    pub fn for_plan(plan: &TargetPlan) -> Self {
        let evaluator = Self::new(plan.target_id());
        for wave in &plan.waves {
            for gate in &wave.gates {
                evaluator.register(gate);
            }
        }
        evaluator
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Register a gate; an already known gate keeps its state
    pub fn register(&self, gate: &GateCondition) {
        if let GateCondition::ManualApproval { gate_id, reason } = gate {
            self.gates
                .write()
                .entry(gate_id.clone())
                .or_insert_with(|| GateEntry {
                    reason: reason.clone(),
                    status: GateStatus::Pending,
                    approved_at: None,
                });
        }
    }

    /// True iff every gate of the wave is open or approved
    pub fn can_proceed(&self, wave: &Wave) -> bool {
        let gates = self.gates.read();
        wave.gates.iter().all(|gate| match gate {
            GateCondition::AlwaysOpen => true,
            GateCondition::ManualApproval { gate_id, .. } => gates
                .get(gate_id)
                .is_some_and(|entry| entry.status == GateStatus::Approved),
        })
    }

    /// Manual gates of the wave still waiting for approval
    pub fn pending_gates(&self, wave: &Wave) -> Vec<String> {
        let gates = self.gates.read();
        wave.manual_gate_ids()
            .into_iter()
            .filter(|gate_id| {
                gates
                    .get(*gate_id)
                    .map_or(true, |entry| entry.status == GateStatus::Pending)
            })
            .map(str::to_string)
            .collect()
    }

    pub fn status(&self, gate_id: &str) -> Option<GateStatus> {
        self.gates.read().get(gate_id).map(|entry| entry.status)
    }

    pub fn approved_at(&self, gate_id: &str) -> Option<DateTime<Utc>> {
        self.gates.read().get(gate_id).and_then(|entry| entry.approved_at)
    }

    /// Approve a manual gate. Approving twice is a no-op, not an error.
    pub fn approve(&self, gate_id: &str) -> Result<ApprovalOutcome> {
        let outcome = {
            let mut gates = self.gates.write();
            let entry = gates.get_mut(gate_id).ok_or_else(|| RolloutError::UnknownGate {
                target: self.target_id.clone(),
                gate: gate_id.to_string(),
            })?;

            match entry.status {
                GateStatus::Approved => ApprovalOutcome::AlreadyApproved,
                GateStatus::Pending => {
                    entry.status = GateStatus::Approved;
                    entry.approved_at = Some(Utc::now());
                    info!(
                        target_id = %self.target_id,
                        gate_id = %gate_id,
                        reason = %entry.reason,
                        "✅ Approval gate cleared"
                    );
                    ApprovalOutcome::Approved
                }
            }
        };

        if outcome == ApprovalOutcome::Approved {
            self.approvals.send_modify(|version| *version += 1);
        } else {
            debug!(target_id = %self.target_id, gate_id = %gate_id, "Gate already approved");
        }

        Ok(outcome)
    }

    /// Park until the wave may proceed, or fail with `Cancelled`
    pub async fn wait_until_open(&self, wave: &Wave, cancel: &CancellationSignal) -> Result<()> {
        // Subscribe before checking so an approval between check and await is seen
        let mut approvals = self.approvals.subscribe();

        loop {
            if cancel.is_cancelled() {
                return Err(RolloutError::Cancelled {
                    target: self.target_id.clone(),
                });
            }
            if self.can_proceed(wave) {
                return Ok(());
            }

            tokio::select! {
                changed = approvals.changed() => {
                    if changed.is_err() {
                        return Err(RolloutError::Cancelled {
                            target: self.target_id.clone(),
                        });
                    }
                }
                _ = cancel.cancelled() => {
                    return Err(RolloutError::Cancelled {
                        target: self.target_id.clone(),
                    });
                }
            }
        }
    }
}
