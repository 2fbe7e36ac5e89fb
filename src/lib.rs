#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Platform Rollout
//!
//! Deployment-wave orchestration and regional DNS failover for a
//! multi-region, multi-environment platform.
//!
//! ## Overview
//!
//! Two independent subsystems share only region and environment identities:
//!
//! - **Rollout orchestration** expands environments × regions into
//!   deployment targets and walks each target through a fixed sequence of
//!   gated waves (`core-ingest → storage → insights → cross-cutting →
//!   data-identity`). Each target runs its own pipeline; a failure halts
//!   only that target.
//! - **Failover routing** probes each region's public endpoint and keeps the
//!   environment's failover record pointed at the primary region while it is
//!   healthy, otherwise at a deterministic healthy secondary.
//!
//! ## Module Organization
//!
//! - [`config`] - Validated platform configuration and its loader
//! - [`models`] - Targets, regions, accounts, endpoints, resource groups
//! - [`orchestration`] - Target resolution, wave planning, gates, execution
//! - [`registry`] - Resource group provider contract and registry
//! - [`state_machine`] - Per-target pipeline lifecycle
//! - [`failover`] - Health checks, routing derivation, hosted zones, probes
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use platform_rollout::config::ConfigManager;
//! use platform_rollout::orchestration::RolloutCoordinator;
//! use platform_rollout::registry::{ProviderRegistry, ResourceGroupProvider};
//! use std::sync::Arc;
//!
//! # async fn example(provider: Arc<dyn ResourceGroupProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! platform_rollout::logging::init_structured_logging("development", Default::default());
//!
//! let config = ConfigManager::load(None)?.shared();
//! let coordinator = RolloutCoordinator::new(config, ProviderRegistry::with_fallback(provider))?;
//!
//! for plan in coordinator.plan()? {
//!     println!("{}: {} waves", plan.target_id(), plan.waves.len());
//! }
//!
//! let handle = coordinator.trigger("9f3c2e1")?;
//! let report = handle.wait().await;
//! println!("all succeeded: {}", report.all_succeeded());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod failover;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod state_machine;
pub mod utils;

pub use config::{ConfigManager, PlatformConfig};
pub use error::{Result, RolloutError};
pub use failover::{FailoverController, HealthMonitor, HostedZoneRegistrar, RoutingDecision};
pub use models::{DeploymentTarget, Endpoint, EndpointRole, Phase, Region, ResourceGroup, RolloutMode};
pub use orchestration::{RolloutCoordinator, RolloutHandle, RolloutReport};
pub use registry::{ProviderRegistry, ResourceGroupProvider};
