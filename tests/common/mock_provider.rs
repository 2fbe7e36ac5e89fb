//! In-memory resource group provider that records every apply

use async_trait::async_trait;
use parking_lot::Mutex;
use platform_rollout::models::{DeploymentTarget, ResourceGroup};
use platform_rollout::registry::{
    ApplyError, ApplyRequest, GroupOutputs, GroupState, ProviderRegistry, ResourceGroupProvider,
};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RecordedApply {
    pub target_id: String,
    pub group_id: String,
    pub revision: String,
    pub inputs: GroupOutputs,
}

#[derive(Default)]
pub struct MockProvider {
    /// (target id, group id) pairs whose apply always fails
    failing: Mutex<HashSet<(String, String)>>,
    applies: Mutex<Vec<RecordedApply>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, target_id: &str, group_id: &str) {
        self.failing
            .lock()
            .insert((target_id.to_string(), group_id.to_string()));
    }

    pub fn registry(self: &Arc<Self>) -> ProviderRegistry {
        ProviderRegistry::with_fallback(Arc::clone(self) as Arc<dyn ResourceGroupProvider>)
    }

    pub fn applies(&self) -> Vec<RecordedApply> {
        self.applies.lock().clone()
    }

    /// Groups applied for one target, in call order
    pub fn applied_groups(&self, target_id: &str) -> Vec<String> {
        self.applies
            .lock()
            .iter()
            .filter(|apply| apply.target_id == target_id)
            .map(|apply| apply.group_id.clone())
            .collect()
    }

    pub fn outputs_for(group: &ResourceGroup, target: &DeploymentTarget) -> GroupOutputs {
        group
            .outputs
            .iter()
            .map(|name| (name.clone(), format!("{}:{}", target.id(), name)))
            .collect()
    }
}

#[async_trait]
impl ResourceGroupProvider for MockProvider {
    async fn apply(&self, request: &ApplyRequest) -> Result<GroupOutputs, ApplyError> {
        let target_id = request.target.id();
        self.applies.lock().push(RecordedApply {
            target_id: target_id.clone(),
            group_id: request.group.id.clone(),
            revision: request.revision.clone(),
            inputs: request.inputs.clone(),
        });

        if self
            .failing
            .lock()
            .contains(&(target_id, request.group.id.clone()))
        {
            return Err(ApplyError::new(format!(
                "{} failed to converge",
                request.group.id
            )));
        }

        tokio::task::yield_now().await;
        Ok(Self::outputs_for(&request.group, &request.target))
    }

    async fn describe(&self, _group: &ResourceGroup, _target: &DeploymentTarget) -> GroupState {
        GroupState::Absent
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
