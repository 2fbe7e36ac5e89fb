//! # Provider Registry
//!
//! Thread-safe mapping from resource group ids to the provider that converges
//! them. Lookups happen at plan time so a missing provider stops the rollout
//! before any apply.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::provider::ResourceGroupProvider;
use crate::error::{Result, RolloutError};
use crate::models::ResourceGroup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_providers: usize,
    pub has_fallback: bool,
    pub group_ids: Vec<String>,
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Arc<DashMap<String, Arc<dyn ResourceGroupProvider>>>,
    fallback: Option<Arc<dyn ResourceGroupProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that serves every group with one provider unless overridden
    pub fn with_fallback(fallback: Arc<dyn ResourceGroupProvider>) -> Self {
        Self {
            providers: Arc::new(DashMap::new()),
            fallback: Some(fallback),
        }
    }

    pub fn register(&self, group_id: impl Into<String>, provider: Arc<dyn ResourceGroupProvider>) {
        let group_id = group_id.into();
        info!(
            group_id = %group_id,
            provider = provider.provider_name(),
            "📚 Resource group provider registered"
        );
        self.providers.insert(group_id, provider);
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.providers.contains_key(group_id) || self.fallback.is_some()
    }

    pub fn resolve(&self, group_id: &str) -> Result<Arc<dyn ResourceGroupProvider>> {
        if let Some(provider) = self.providers.get(group_id) {
            return Ok(Arc::clone(provider.value()));
        }
        if let Some(fallback) = &self.fallback {
            debug!(group_id = %group_id, "Using fallback provider");
            return Ok(Arc::clone(fallback));
        }
        Err(RolloutError::configuration(format!(
            "no provider registered for resource group '{group_id}'"
        )))
    }

    /// Fail when any group lacks a provider
    pub fn ensure_covers<'a>(&self, groups: impl IntoIterator<Item = &'a ResourceGroup>) -> Result<()> {
        for group in groups {
            self.resolve(&group.id)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> RegistryStats {
        let mut group_ids: Vec<String> = self.providers.iter().map(|e| e.key().clone()).collect();
        group_ids.sort();
        RegistryStats {
            total_providers: group_ids.len(),
            has_fallback: self.fallback.is_some(),
            group_ids,
        }
    }
}
