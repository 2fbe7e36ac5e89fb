use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RolloutError};

/// Account identifier bound to an environment (billing/security isolation boundary)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Build an account id, rejecting empty or whitespace-only values
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RolloutError::configuration(
                "account id must not be empty",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Account id safe for log output: only the last four characters survive
    pub fn masked(&self) -> String {
        let visible: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{visible}")
    }
}

impl TryFrom<String> for AccountId {
    type Error = RolloutError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical deployment tier with its resolved account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub account: AccountId,
}

impl Environment {
    pub fn new(name: impl Into<String>, account: AccountId) -> Self {
        Self {
            name: name.into(),
            account,
        }
    }
}
