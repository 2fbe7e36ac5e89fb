//! # Stage Executor
//!
//! Drives one target's pipeline through its waves.
//!
//! For each wave, in order:
//! 1. Stop with `Cancelled` if the target was cancelled.
//! 2. Park on the gate evaluator until every gate of the wave is open.
//! 3. Apply all of the wave's resource groups concurrently.
//! 4. Halt with `Failed` on the first failing group (in wave order); the
//!    remaining waves never start.
//!
//! A failed apply is reconciled with `describe` before it counts: a group
//! that reports `Converged` is treated as applied, otherwise the apply is
//! retried with capped exponential backoff up to `max_apply_attempts`.
//!
//! Pipelines for different targets share nothing mutable except the event
//! publisher, so one target's failure never blocks another target.

use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ExecutionConfig;
use crate::logging::log_rollout_operation;
use crate::models::ResourceGroup;
use crate::orchestration::event_publisher::EventPublisher;
use crate::orchestration::gate_evaluator::GateEvaluator;
use crate::orchestration::output_wiring::OutputWiring;
use crate::orchestration::types::{
    RolloutEvent, TargetOutcome, TargetPlan, TargetReport, TargetStatus, Wave,
};
use crate::registry::{ApplyRequest, GroupOutputs, GroupState, ProviderRegistry};
use crate::state_machine::{StateMachineResult, TargetEvent, TargetState, TargetStateMachine};
use crate::utils::CancellationSignal;

#[derive(Debug)]
struct TrackerState {
    machine: TargetStateMachine,
    current_wave: Option<String>,
    pending_gates: Vec<String>,
    applied_groups: Vec<String>,
}

/// Live, shareable view of one pipeline for status queries
#[derive(Debug)]
pub struct PipelineTracker {
    inner: Mutex<TrackerState>,
}

impl PipelineTracker {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(TrackerState {
                machine: TargetStateMachine::new(target_id),
                current_wave: None,
                pending_gates: Vec::new(),
                applied_groups: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> TargetState {
        self.inner.lock().machine.current_state()
    }

    pub fn transition(&self, event: TargetEvent) -> StateMachineResult<TargetState> {
        let mut inner = self.inner.lock();
        let state = inner.machine.transition(event)?;
        if state != TargetState::AwaitingApproval {
            inner.pending_gates.clear();
        }
        Ok(state)
    }

    fn enter_wave(&self, wave: &Wave) {
        self.inner.lock().current_wave = Some(wave.name().to_string());
    }

    fn block_on(&self, gates: Vec<String>) {
        self.inner.lock().pending_gates = gates;
    }

    fn record_applied(&self, group_id: &str) {
        self.inner.lock().applied_groups.push(group_id.to_string());
    }

    pub fn snapshot(&self) -> TargetStatus {
        let inner = self.inner.lock();
        TargetStatus {
            target_id: inner.machine.target_id().to_string(),
            state: inner.machine.current_state(),
            current_wave: inner.current_wave.clone(),
            pending_gates: inner.pending_gates.clone(),
            applied_groups: inner.applied_groups.clone(),
        }
    }
}

/// Successful group apply
#[derive(Debug, Clone)]
struct GroupApplied {
    outputs: GroupOutputs,
    attempts: u32,
}

#[derive(Debug, Clone)]
pub struct StageExecutor {
    registry: ProviderRegistry,
    execution: ExecutionConfig,
    events: EventPublisher,
}

impl StageExecutor {
    pub fn new(registry: ProviderRegistry, execution: ExecutionConfig, events: EventPublisher) -> Self {
        Self {
            registry,
            execution,
            events,
        }
    }

    /// Run every wave of the plan and report how the pipeline ended
    #[instrument(skip_all, fields(target_id = %plan.target_id(), revision = %revision))]
    pub async fn run(
        &self,
        plan: &TargetPlan,
        revision: &str,
        gates: &GateEvaluator,
        cancel: &CancellationSignal,
        tracker: &PipelineTracker,
    ) -> TargetReport {
        let target_id = plan.target_id();
        let mut wiring = OutputWiring::new();
        let mut applied_groups = Vec::new();

        info!(mode = ?plan.mode, waves = plan.waves.len(), "🚀 Target pipeline starting");

        let mut outcome = TargetOutcome::Succeeded {
            waves_applied: plan.waves.len(),
        };

        for wave in &plan.waves {
            tracker.enter_wave(wave);

            if cancel.is_cancelled() {
                outcome = TargetOutcome::Cancelled {
                    wave: Some(wave.name().to_string()),
                };
                break;
            }

            if !gates.can_proceed(wave) {
                let pending = gates.pending_gates(wave);
                tracker.block_on(pending.clone());
                self.advance(tracker, TargetEvent::BlockOnGates(pending.clone()));

                info!(wave = wave.name(), gates = ?pending, "⏸️ Wave blocked on approval");
                self.events.publish(RolloutEvent::GateBlocked {
                    target_id: target_id.clone(),
                    wave: wave.name().to_string(),
                    gates: pending,
                });

                if gates.wait_until_open(wave, cancel).await.is_err() {
                    outcome = TargetOutcome::Cancelled {
                        wave: Some(wave.name().to_string()),
                    };
                    break;
                }
            }

            self.advance(tracker, TargetEvent::BeginWave(wave.name().to_string()));
            self.events.publish(RolloutEvent::WaveStarted {
                target_id: target_id.clone(),
                wave: wave.name().to_string(),
                index: wave.index,
            });

            if let Err((group, reason)) = self
                .apply_wave(plan, wave, revision, &mut wiring, tracker, &mut applied_groups)
                .await
            {
                self.advance(tracker, TargetEvent::fail_with_error(reason.clone()));
                outcome = TargetOutcome::Failed {
                    wave: wave.name().to_string(),
                    group,
                    reason,
                };
                break;
            }

            self.events.publish(RolloutEvent::WaveCompleted {
                target_id: target_id.clone(),
                wave: wave.name().to_string(),
            });
        }

        match &outcome {
            TargetOutcome::Succeeded { .. } => {
                self.advance(tracker, TargetEvent::Complete);
                info!("✅ Target pipeline succeeded");
            }
            TargetOutcome::Cancelled { wave } => {
                self.advance(tracker, TargetEvent::Cancel);
                warn!(wave = ?wave, "🛑 Target pipeline cancelled");
            }
            TargetOutcome::Failed { wave, group, reason } => {
                error!(wave = %wave, group = %group, reason = %reason, "❌ Target pipeline failed");
            }
        }

        self.events.publish(RolloutEvent::TargetFinished {
            target_id: target_id.clone(),
            state: outcome.final_state(),
        });

        TargetReport {
            target_id,
            outcome,
            applied_groups,
            outputs: wiring.values().clone(),
        }
    }

    /// Apply all groups of a wave concurrently; `Err` names the first failed group
    async fn apply_wave(
        &self,
        plan: &TargetPlan,
        wave: &Wave,
        revision: &str,
        wiring: &mut OutputWiring,
        tracker: &PipelineTracker,
        applied_groups: &mut Vec<String>,
    ) -> Result<(), (String, String)> {
        let target_id = plan.target_id();

        let applies = wave.groups.iter().map(|group| {
            let inputs = wiring.inputs_for(&target_id, group);
            async move {
                let inputs = inputs.map_err(|e| e.to_string())?;
                let request = ApplyRequest {
                    group: group.clone(),
                    target: plan.target.clone(),
                    revision: revision.to_string(),
                    inputs,
                };
                self.apply_group(request).await
            }
        });
        let results = join_all(applies).await;

        let mut first_failure = None;
        for (group, result) in wave.groups.iter().zip(results) {
            match result {
                Ok(applied) => {
                    wiring.record(group, &applied.outputs);
                    tracker.record_applied(&group.id);
                    applied_groups.push(group.id.clone());
                    self.events.publish(RolloutEvent::GroupApplied {
                        target_id: target_id.clone(),
                        wave: wave.name().to_string(),
                        group: group.id.clone(),
                        attempts: applied.attempts,
                    });
                }
                Err(reason) => {
                    log_rollout_operation(
                        "apply_group",
                        &target_id,
                        Some(wave.name()),
                        Some(&group.id),
                        "failed",
                        Some(&reason),
                    );
                    self.events.publish(RolloutEvent::GroupFailed {
                        target_id: target_id.clone(),
                        wave: wave.name().to_string(),
                        group: group.id.clone(),
                        reason: reason.clone(),
                    });
                    if first_failure.is_none() {
                        first_failure = Some((group.id.clone(), reason));
                    }
                }
            }
        }

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    async fn apply_group(&self, request: ApplyRequest) -> Result<GroupApplied, String> {
        let provider = self
            .registry
            .resolve(&request.group.id)
            .map_err(|e| e.to_string())?;
        let max_attempts = self.execution.max_apply_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(
                group = %request.group.id,
                provider = provider.provider_name(),
                attempt = attempt,
                "Applying resource group"
            );

            let failure = match provider.apply(&request).await {
                Ok(outputs) => return Self::check_outputs(&request.group, outputs, attempt),
                Err(apply_error) => apply_error.message,
            };

            // The apply may have converged before reporting an error
            match provider.describe(&request.group, &request.target).await {
                GroupState::Converged(outputs) => {
                    info!(
                        group = %request.group.id,
                        error = %failure,
                        "🔁 Apply reported an error but the group converged"
                    );
                    return Self::check_outputs(&request.group, outputs, attempt);
                }
                state => {
                    warn!(
                        group = %request.group.id,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        observed = ?state,
                        error = %failure,
                        "⚠️ Resource group apply failed"
                    );
                }
            }

            if attempt >= max_attempts {
                return Err(failure);
            }

            tokio::time::sleep(self.execution.backoff_for(attempt)).await;
            attempt += 1;
        }
    }

    fn check_outputs(
        group: &ResourceGroup,
        outputs: GroupOutputs,
        attempts: u32,
    ) -> Result<GroupApplied, String> {
        let missing = OutputWiring::missing_outputs(group, &outputs);
        if missing.is_empty() {
            Ok(GroupApplied { outputs, attempts })
        } else {
            Err(format!("missing declared outputs: {}", missing.join(", ")))
        }
    }

    fn advance(&self, tracker: &PipelineTracker, event: TargetEvent) {
        if let Err(e) = tracker.transition(event) {
            warn!(error = %e, "Ignoring invalid target state transition");
        }
    }
}

/// Shared handle type used by the coordinator
pub type SharedTracker = Arc<PipelineTracker>;
