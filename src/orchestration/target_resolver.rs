//! # Target Resolver
//!
//! Expands configured environments and regions into concrete deployment
//! targets in environment-major, region-minor order, binding each to exactly
//! one account. Account precedence: explicit environment mapping, then the
//! configured default, otherwise a `ConfigurationError`.

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{ConfigurationError, PlatformConfig};
use crate::error::{Result, RolloutError};
use crate::models::{AccountId, DeploymentTarget, Environment, Region};

pub struct TargetResolver;

impl TargetResolver {
    /// Resolve every target named by the configuration
    pub fn from_config(config: &PlatformConfig) -> Result<Vec<DeploymentTarget>> {
        Self::resolve(
            &config.environments,
            &config.regions(),
            &config.accounts.overrides,
            config.accounts.default.as_deref(),
        )
    }

    pub fn resolve(
        environments: &[String],
        regions: &[Region],
        account_overrides: &BTreeMap<String, String>,
        default_account: Option<&str>,
    ) -> Result<Vec<DeploymentTarget>> {
        let environments =
            Self::resolve_environments(environments, account_overrides, default_account)?;
        let mut targets = Vec::with_capacity(environments.len() * regions.len());

        for environment in environments {
            for region in regions {
                let target = DeploymentTarget::new(
                    environment.name.clone(),
                    region.clone(),
                    environment.account.clone(),
                );
                debug!(target_id = %target.id(), account = %environment.account.masked(), "Resolved deployment target");
                targets.push(target);
            }
        }

        Ok(targets)
    }

    /// Bind every environment to its account, failing on the first one without
    pub fn resolve_environments(
        environments: &[String],
        account_overrides: &BTreeMap<String, String>,
        default_account: Option<&str>,
    ) -> Result<Vec<Environment>> {
        environments
            .iter()
            .map(|name| {
                Self::resolve_account(name, account_overrides, default_account)
                    .map(|account| Environment::new(name.clone(), account))
            })
            .collect()
    }

    pub fn resolve_account(
        environment: &str,
        account_overrides: &BTreeMap<String, String>,
        default_account: Option<&str>,
    ) -> Result<AccountId> {
        let raw = account_overrides
            .get(environment)
            .map(String::as_str)
            .or(default_account)
            .ok_or_else(|| {
                RolloutError::from(ConfigurationError::UnresolvedAccount {
                    environment: environment.to_string(),
                })
            })?;

        AccountId::new(raw).map_err(|_| {
            RolloutError::configuration(format!(
                "account id resolved for environment '{environment}' is empty"
            ))
        })
    }
}
