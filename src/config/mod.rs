//! # Platform Configuration
//!
//! One explicit, validated configuration object built once at startup and
//! handed by reference to the target resolver, the wave planner and the
//! failover side. Nothing reads the process environment after load.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use platform_rollout::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(None)?;
//! let primary = manager.config().primary_region()?;
//! println!("primary region: {}", primary.name);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::constants::defaults;
use crate::models::{default_catalog, Phase, Region, ResourceGroup, RolloutMode};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub environments: Vec<String>,
    pub regions: Vec<RegionConfig>,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default = "default_catalog")]
    pub resource_groups: Vec<ResourceGroup>,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub failover: FailoverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub mode: RolloutMode,
}

/// Per-environment account overrides with an optional default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Apply attempts per resource group before the wave is considered failed
    pub max_apply_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_apply_attempts: defaults::MAX_APPLY_ATTEMPTS,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: defaults::RETRY_MAX_DELAY_MS,
        }
    }
}

impl ExecutionConfig {
    /// Capped exponential backoff before retry number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .retry_base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.retry_max_delay_ms);
        Duration::from_millis(delay)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig {
    pub zone_domain: String,
    pub record_name: String,
    pub failure_threshold: u32,
    pub probe_interval_seconds: u64,
    pub probe_port: u16,
    pub probe_path: String,
    pub probe_timeout_ms: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            zone_domain: defaults::ZONE_DOMAIN.to_string(),
            record_name: defaults::RECORD_NAME.to_string(),
            failure_threshold: defaults::FAILURE_THRESHOLD,
            probe_interval_seconds: defaults::PROBE_INTERVAL_SECONDS,
            probe_port: defaults::PROBE_PORT,
            probe_path: defaults::PROBE_PATH.to_string(),
            probe_timeout_ms: defaults::PROBE_TIMEOUT_MS,
        }
    }
}

impl FailoverConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl PlatformConfig {
    /// The single region flagged `primary`
    pub fn primary_region(&self) -> ConfigResult<&RegionConfig> {
        let mut primaries = self.regions.iter().filter(|region| region.primary);
        match (primaries.next(), primaries.next()) {
            (Some(primary), None) => Ok(primary),
            (None, _) => Err(ConfigurationError::missing_required_field(
                "regions[].primary",
                "exactly one region must be flagged primary",
            )),
            (Some(_), Some(_)) => Err(ConfigurationError::invalid_value(
                "regions[].primary",
                "multiple",
                "exactly one region must be flagged primary",
            )),
        }
    }

    pub fn regions(&self) -> Vec<Region> {
        self.regions
            .iter()
            .map(|region| Region::new(region.name.clone(), region.primary))
            .collect()
    }

    /// Rollout mode for a region; unknown regions roll out in standard mode
    pub fn mode_for(&self, region: &str) -> RolloutMode {
        self.regions
            .iter()
            .find(|candidate| candidate.name == region)
            .map(|candidate| candidate.mode)
            .unwrap_or_default()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.environments.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "environments",
                "platform configuration",
            ));
        }
        ensure_unique_names("environments", self.environments.iter().map(String::as_str))?;

        if self.regions.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "regions",
                "platform configuration",
            ));
        }
        ensure_unique_names("regions", self.regions.iter().map(|r| r.name.as_str()))?;
        self.primary_region()?;

        if let Some(default) = &self.accounts.default {
            if default.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "accounts.default",
                    default.clone(),
                    "default account id must not be empty",
                ));
            }
        }
        for (environment, account) in &self.accounts.overrides {
            if account.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    format!("accounts.overrides.{environment}"),
                    account.clone(),
                    "account id must not be empty",
                ));
            }
        }

        ensure_unique_names(
            "resource_groups",
            self.resource_groups.iter().map(|g| g.id.as_str()),
        )?;
        for phase in Phase::ALL {
            if !self.resource_groups.iter().any(|group| group.phase == phase) {
                return Err(ConfigurationError::invalid_value(
                    "resource_groups",
                    phase.as_str(),
                    "every phase needs at least one resource group",
                ));
            }
        }

        if self.execution.max_apply_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "execution.max_apply_attempts",
                "0",
                "at least one apply attempt is required",
            ));
        }
        if self.failover.failure_threshold == 0 {
            return Err(ConfigurationError::invalid_value(
                "failover.failure_threshold",
                "0",
                "failure threshold must be greater than 0",
            ));
        }
        if self.failover.probe_interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "failover.probe_interval_seconds",
                "0",
                "probe interval must be greater than 0",
            ));
        }

        Ok(())
    }
}

fn ensure_unique_names<'a>(
    field: &str,
    names: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                field,
                name,
                "names must not be empty",
            ));
        }
        if !seen.insert(name) {
            return Err(ConfigurationError::invalid_value(
                field,
                name,
                "names must be unique",
            ));
        }
    }
    Ok(())
}
