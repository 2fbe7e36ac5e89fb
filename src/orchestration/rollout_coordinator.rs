//! # Rollout Coordinator
//!
//! Entry point of the deployment side. `trigger` resolves every target,
//! plans its waves, validates output wiring and provider coverage, and only
//! then spawns one independent pipeline task per target. Any plan-time error
//! aborts the whole rollout before a single apply.
//!
//! The returned [`RolloutHandle`] is the operator surface of a running
//! rollout: approval signals, cancellation, status queries, and the final
//! [`RolloutReport`].
//!
//! ```rust,no_run
//! use platform_rollout::config::ConfigManager;
//! use platform_rollout::orchestration::RolloutCoordinator;
//! use platform_rollout::registry::{ProviderRegistry, ResourceGroupProvider};
//! use std::sync::Arc;
//!
//! # async fn example(provider: Arc<dyn ResourceGroupProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::load(None)?.shared();
//! let coordinator = RolloutCoordinator::new(config, ProviderRegistry::with_fallback(provider))?;
//!
//! let handle = coordinator.trigger("9f3c2e1")?;
//! handle.approve("prod/us-east-1", "prod/us-east-1/data-identity-approval")?;
//! let report = handle.wait().await;
//! println!("all succeeded: {}", report.all_succeeded());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::PlatformConfig;
use crate::error::{Result, RolloutError};
use crate::orchestration::event_publisher::EventPublisher;
use crate::orchestration::gate_evaluator::GateEvaluator;
use crate::orchestration::output_wiring::validate_plan;
use crate::orchestration::stage_executor::{PipelineTracker, SharedTracker, StageExecutor};
use crate::orchestration::target_resolver::TargetResolver;
use crate::orchestration::types::{
    ApprovalOutcome, GateStatus, RolloutEvent, RolloutReport, TargetOutcome, TargetPlan,
    TargetReport, TargetStatus,
};
use crate::orchestration::wave_planner::WavePlanner;
use crate::registry::ProviderRegistry;
use crate::state_machine::TargetState;
use crate::utils::CancellationSignal;

#[derive(Debug)]
pub struct RolloutCoordinator {
    config: Arc<PlatformConfig>,
    planner: WavePlanner,
    registry: ProviderRegistry,
    events: EventPublisher,
}

impl RolloutCoordinator {
    pub fn new(config: Arc<PlatformConfig>, registry: ProviderRegistry) -> Result<Self> {
        config.validate()?;
        let planner = WavePlanner::new(config.resource_groups.clone())?;
        Ok(Self {
            config,
            planner,
            registry,
            events: EventPublisher::new(),
        })
    }

    pub fn with_event_publisher(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Plan every target without side effects
    pub fn plan(&self) -> Result<Vec<TargetPlan>> {
        let targets = TargetResolver::from_config(&self.config)?;
        self.registry.ensure_covers(self.planner.catalog())?;

        targets
            .iter()
            .map(|target| {
                let plan = self
                    .planner
                    .plan(target, self.config.mode_for(&target.region.name));
                validate_plan(&plan)?;
                Ok(plan)
            })
            .collect()
    }

    /// Start a rollout of `revision` to every resolved target
    pub fn trigger(&self, revision: impl Into<String>) -> Result<RolloutHandle> {
        let revision = revision.into();
        if revision.trim().is_empty() {
            return Err(RolloutError::configuration("revision must not be empty"));
        }

        let plans = self.plan()?;
        let rollout_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(
            rollout_id = %rollout_id,
            revision = %revision,
            targets = plans.len(),
            "🚀 Triggering rollout"
        );
        self.events.publish(RolloutEvent::RolloutStarted {
            rollout_id,
            revision: revision.clone(),
            targets: plans.len(),
        });

        let executor = StageExecutor::new(
            self.registry.clone(),
            self.config.execution.clone(),
            self.events.clone(),
        );

        let pipelines = plans
            .into_iter()
            .map(|plan| {
                let pipeline = Arc::new(TargetPipeline {
                    target_id: plan.target_id(),
                    gates: GateEvaluator::for_plan(&plan),
                    cancel: CancellationSignal::new(),
                    tracker: Arc::new(PipelineTracker::new(plan.target_id())),
                    plan,
                });

                let task = {
                    let executor = executor.clone();
                    let pipeline = Arc::clone(&pipeline);
                    let revision = revision.clone();
                    tokio::spawn(async move {
                        executor
                            .run(
                                &pipeline.plan,
                                &revision,
                                &pipeline.gates,
                                &pipeline.cancel,
                                &pipeline.tracker,
                            )
                            .await
                    })
                };

                (pipeline, task)
            })
            .collect();

        Ok(RolloutHandle {
            rollout_id,
            revision,
            started_at,
            pipelines,
            events: self.events.clone(),
        })
    }
}

#[derive(Debug)]
struct TargetPipeline {
    target_id: String,
    plan: TargetPlan,
    gates: GateEvaluator,
    cancel: CancellationSignal,
    tracker: SharedTracker,
}

/// Operator handle onto a running rollout
#[derive(Debug)]
pub struct RolloutHandle {
    rollout_id: Uuid,
    revision: String,
    started_at: DateTime<Utc>,
    pipelines: Vec<(Arc<TargetPipeline>, JoinHandle<TargetReport>)>,
    events: EventPublisher,
}

impl RolloutHandle {
    pub fn rollout_id(&self) -> Uuid {
        self.rollout_id
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Target ids in resolution order
    pub fn target_ids(&self) -> Vec<String> {
        self.pipelines
            .iter()
            .map(|(pipeline, _)| pipeline.target_id.clone())
            .collect()
    }

    fn pipeline(&self, target_id: &str) -> Result<&TargetPipeline> {
        self.pipelines
            .iter()
            .map(|(pipeline, _)| pipeline.as_ref())
            .find(|pipeline| pipeline.target_id == target_id)
            .ok_or_else(|| RolloutError::UnknownTarget(target_id.to_string()))
    }

    /// Deliver an approval signal. Approving an approved gate is a no-op.
    pub fn approve(&self, target_id: &str, gate_id: &str) -> Result<ApprovalOutcome> {
        let pipeline = self.pipeline(target_id)?;
        let outcome = pipeline.gates.approve(gate_id)?;

        if outcome == ApprovalOutcome::Approved {
            self.events.publish(RolloutEvent::GateApproved {
                target_id: target_id.to_string(),
                gate_id: gate_id.to_string(),
            });
        }
        Ok(outcome)
    }

    /// Gates of the target's plan that still need an approval
    pub fn pending_gates(&self, target_id: &str) -> Result<Vec<String>> {
        let pipeline = self.pipeline(target_id)?;
        Ok(pipeline
            .plan
            .gate_ids()
            .into_iter()
            .filter(|gate_id| pipeline.gates.status(gate_id) == Some(GateStatus::Pending))
            .collect())
    }

    /// Stop one target at its next wave boundary
    pub fn cancel_target(&self, target_id: &str) -> Result<()> {
        let pipeline = self.pipeline(target_id)?;
        info!(rollout_id = %self.rollout_id, target_id = %target_id, "🛑 Cancelling target");
        pipeline.cancel.cancel();
        Ok(())
    }

    pub fn cancel(&self) {
        info!(rollout_id = %self.rollout_id, "🛑 Cancelling rollout");
        for (pipeline, _) in &self.pipelines {
            pipeline.cancel.cancel();
        }
    }

    pub fn status(&self, target_id: &str) -> Result<TargetStatus> {
        Ok(self.pipeline(target_id)?.tracker.snapshot())
    }

    pub fn statuses(&self) -> Vec<TargetStatus> {
        self.pipelines
            .iter()
            .map(|(pipeline, _)| pipeline.tracker.snapshot())
            .collect()
    }

    /// True once every pipeline task has returned
    pub fn is_finished(&self) -> bool {
        self.pipelines.iter().all(|(_, task)| task.is_finished())
    }

    /// Wait for every pipeline and collect the report
    pub async fn wait(self) -> RolloutReport {
        let mut targets = Vec::with_capacity(self.pipelines.len());

        for (pipeline, task) in self.pipelines {
            let report = match task.await {
                Ok(report) => report,
                Err(join_error) => {
                    error!(
                        target_id = %pipeline.target_id,
                        error = %join_error,
                        "❌ Target pipeline task aborted"
                    );
                    let snapshot = pipeline.tracker.snapshot();
                    TargetReport {
                        target_id: pipeline.target_id.clone(),
                        outcome: TargetOutcome::Failed {
                            wave: snapshot.current_wave.unwrap_or_default(),
                            group: String::new(),
                            reason: format!("pipeline task aborted: {join_error}"),
                        },
                        applied_groups: snapshot.applied_groups,
                        outputs: Default::default(),
                    }
                }
            };
            targets.push(report);
        }

        let report = RolloutReport {
            rollout_id: self.rollout_id,
            revision: self.revision,
            started_at: self.started_at,
            finished_at: Utc::now(),
            targets,
        };

        info!(
            rollout_id = %report.rollout_id,
            succeeded = report.count_in(TargetState::Succeeded),
            failed = report.count_in(TargetState::Failed),
            cancelled = report.count_in(TargetState::Cancelled),
            "🏁 Rollout finished"
        );
        self.events.publish(RolloutEvent::RolloutFinished {
            rollout_id: report.rollout_id,
            succeeded: report.count_in(TargetState::Succeeded),
            failed: report.count_in(TargetState::Failed),
            cancelled: report.count_in(TargetState::Cancelled),
        });

        report
    }
}
