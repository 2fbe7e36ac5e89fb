use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{DeploymentTarget, ResourceGroup};

/// Named values a resource group publishes once applied
pub type GroupOutputs = BTreeMap<String, String>;

/// Failure to converge a resource group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApplyError {
    pub message: String,
}

impl ApplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Observed state of a resource group for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum GroupState {
    /// Nothing exists yet
    Absent,
    /// Real infrastructure matches the description; outputs are current
    Converged(GroupOutputs),
    /// Exists but does not match
    Drifted(String),
    /// Provider could not tell
    Unknown,
}

impl GroupState {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }
}

/// Everything a provider needs to converge one group for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub group: ResourceGroup,
    pub target: DeploymentTarget,
    /// Source revision the rollout was triggered with
    pub revision: String,
    /// Declared inputs resolved from earlier waves' outputs
    pub inputs: BTreeMap<String, String>,
}

/// Converges one named resource group for one target.
///
/// Implementations must be idempotent: applying an already converged group is
/// a no-op, and both calls are safe to retry after an [`ApplyError`].
#[async_trait]
pub trait ResourceGroupProvider: Send + Sync {
    async fn apply(&self, request: &ApplyRequest) -> Result<GroupOutputs, ApplyError>;

    async fn describe(&self, group: &ResourceGroup, target: &DeploymentTarget) -> GroupState;

    /// Provider name for logging
    fn provider_name(&self) -> &str {
        "resource_group_provider"
    }
}
