use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AccountId, Region};
use crate::constants::ids;

/// One (environment, region, account) combination, scheduled independently
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub environment: String,
    pub region: Region,
    pub account: AccountId,
}

impl DeploymentTarget {
    pub fn new(environment: impl Into<String>, region: Region, account: AccountId) -> Self {
        Self {
            environment: environment.into(),
            region,
            account,
        }
    }

    /// Stable identifier of the form `environment/region`
    pub fn id(&self) -> String {
        ids::target_id(&self.environment, &self.region.name)
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.account.masked())
    }
}
