use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one deployment target's wave pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// Planned, no wave started yet
    #[default]
    Pending,
    /// Parked on one or more manual approval gates
    AwaitingApproval,
    /// A wave's resource groups are being applied
    Applying,
    /// Every wave applied
    Succeeded,
    /// A resource group failed to converge; later waves never start
    Failed,
    /// Abandoned by an operator
    Cancelled,
}

impl TargetState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Check if the pipeline is parked without consuming compute
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::AwaitingApproval)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Applying)
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::AwaitingApproval => write!(f, "awaiting_approval"),
            Self::Applying => write!(f, "applying"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TargetState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "awaiting_approval" => Ok(Self::AwaitingApproval),
            "applying" => Ok(Self::Applying),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid target state: {s}")),
        }
    }
}
