use serde::{Deserialize, Serialize};
use std::fmt;

/// Rollout mode configured per region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutMode {
    #[default]
    Standard,
    /// Every wave of the target waits on one shared operator approval
    DisasterRecovery,
}

impl fmt::Display for RolloutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::DisasterRecovery => write!(f, "disaster_recovery"),
        }
    }
}

impl std::str::FromStr for RolloutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "disaster_recovery" | "dr" => Ok(Self::DisasterRecovery),
            _ => Err(format!("Invalid rollout mode: {s}")),
        }
    }
}

/// Geographic deployment location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub is_primary: bool,
}

impl Region {
    pub fn new(name: impl Into<String>, is_primary: bool) -> Self {
        Self {
            name: name.into(),
            is_primary,
        }
    }

    pub fn primary(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn secondary(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }
}
