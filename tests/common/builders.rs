//! Configuration builders for integration tests

use platform_rollout::config::{
    AccountsConfig, ExecutionConfig, FailoverConfig, PlatformConfig, RegionConfig,
};
use platform_rollout::models::{default_catalog, RolloutMode};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PRIMARY: &str = "us-east-1";
pub const SECONDARY_A: &str = "us-west-2";
pub const SECONDARY_B: &str = "eu-west-1";

pub struct PlatformConfigBuilder {
    environments: Vec<String>,
    regions: Vec<RegionConfig>,
    accounts: AccountsConfig,
    execution: ExecutionConfig,
    failover: FailoverConfig,
}

impl PlatformConfigBuilder {
    /// dev and prod across one primary and two secondary regions
    pub fn new() -> Self {
        Self {
            environments: vec!["dev".into(), "prod".into()],
            regions: [PRIMARY, SECONDARY_A, SECONDARY_B]
                .iter()
                .map(|name| RegionConfig {
                    name: name.to_string(),
                    primary: *name == PRIMARY,
                    mode: RolloutMode::Standard,
                })
                .collect(),
            accounts: AccountsConfig {
                default: Some("111111111111".into()),
                overrides: BTreeMap::from([("prod".to_string(), "999999999999".to_string())]),
            },
            execution: ExecutionConfig {
                max_apply_attempts: 1,
                retry_base_delay_ms: 1,
                retry_max_delay_ms: 5,
            },
            failover: FailoverConfig::default(),
        }
    }

    pub fn with_environments(mut self, environments: &[&str]) -> Self {
        self.environments = environments.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_regions(mut self, regions: &[&str]) -> Self {
        self.regions.retain(|region| regions.contains(&region.name.as_str()));
        self
    }

    pub fn with_disaster_recovery(mut self, region: &str) -> Self {
        for candidate in &mut self.regions {
            if candidate.name == region {
                candidate.mode = RolloutMode::DisasterRecovery;
            }
        }
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failover.failure_threshold = threshold;
        self
    }

    pub fn build(self) -> PlatformConfig {
        PlatformConfig {
            environments: self.environments,
            regions: self.regions,
            accounts: self.accounts,
            resource_groups: default_catalog(),
            execution: self.execution,
            failover: self.failover,
        }
    }

    pub fn shared(self) -> Arc<PlatformConfig> {
        Arc::new(self.build())
    }
}

impl Default for PlatformConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
