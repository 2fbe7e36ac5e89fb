//! # Domain Models
//!
//! Configuration-derived identities shared by the rollout orchestrator and the
//! failover controller. Everything here is immutable once built for a run.

pub mod deployment_target;
pub mod endpoint;
pub mod environment;
pub mod region;
pub mod resource_group;

pub use deployment_target::DeploymentTarget;
pub use endpoint::{Endpoint, EndpointRole};
pub use environment::{AccountId, Environment};
pub use region::{Region, RolloutMode};
pub use resource_group::{default_catalog, Phase, ResourceGroup};
