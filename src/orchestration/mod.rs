//! # Deployment Orchestration
//!
//! Rolls one source revision out to every environment × region target as a
//! fixed sequence of gated waves.
//!
//! ## Architecture
//!
//! ```text
//! RolloutCoordinator::trigger(revision)
//! ├── TargetResolver        environments × regions → DeploymentTarget + account
//! ├── WavePlanner           target + mode → ordered waves with gates
//! ├── output_wiring         every input produced by an earlier wave
//! └── per target (independent tokio task)
//!     ├── GateEvaluator     manual approvals, watch-channel wakeups
//!     └── StageExecutor     concurrent group applies, halt on first failure
//! ```
//!
//! ## Core Components
//!
//! - **TargetResolver**: deterministic target expansion and account binding
//! - **WavePlanner**: phase order `core-ingest → storage → insights → cross-cutting → data-identity`
//! - **GateEvaluator**: `Pending → Approved` manual gates, idempotent approvals
//! - **StageExecutor**: drives one pipeline through its waves
//! - **RolloutCoordinator / RolloutHandle**: operator surface of a running rollout
//! - **EventPublisher**: broadcast of [`types::RolloutEvent`]s

pub mod event_publisher;
pub mod gate_evaluator;
pub mod output_wiring;
pub mod rollout_coordinator;
pub mod stage_executor;
pub mod target_resolver;
pub mod types;
pub mod wave_planner;

pub use event_publisher::{EventPublisher, EventPublisherConfig, EventPublisherStats};
pub use gate_evaluator::GateEvaluator;
pub use output_wiring::{validate_plan, OutputWiring};
pub use rollout_coordinator::{RolloutCoordinator, RolloutHandle};
pub use stage_executor::{PipelineTracker, StageExecutor};
pub use target_resolver::TargetResolver;
pub use types::{
    ApprovalOutcome, GateCondition, GateStatus, RolloutEvent, RolloutReport, TargetOutcome,
    TargetPlan, TargetReport, TargetStatus, Wave,
};
pub use wave_planner::WavePlanner;
