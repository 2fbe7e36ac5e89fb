use serde::{Deserialize, Serialize};
use std::fmt;

/// Rollout phases in their fixed data-flow order.
///
/// Later phases read resources produced by earlier ones (insights reads from
/// storage, identity reads the catalog), so the derived `Ord` is the apply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    CoreIngest,
    Storage,
    Insights,
    CrossCutting,
    DataIdentity,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::CoreIngest,
        Phase::Storage,
        Phase::Insights,
        Phase::CrossCutting,
        Phase::DataIdentity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoreIngest => "core-ingest",
            Self::Storage => "storage",
            Self::Insights => "insights",
            Self::CrossCutting => "cross-cutting",
            Self::DataIdentity => "data-identity",
        }
    }

    /// Identity and analytics changes are always human-gated
    pub fn requires_dedicated_approval(&self) -> bool {
        matches!(self, Self::DataIdentity)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| format!("Invalid phase: {s}"))
    }
}

/// Named unit of infrastructure with a declared output/input contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub phase: Phase,
    /// Named values this group needs from groups in earlier waves
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Named values this group publishes once applied
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl ResourceGroup {
    pub fn new(id: impl Into<String>, phase: Phase) -> Self {
        Self {
            id: id.into(),
            phase,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }
}

/// Built-in resource group catalog used when the configuration does not supply one
pub fn default_catalog() -> Vec<ResourceGroup> {
    vec![
        ResourceGroup::new("core-ingest", Phase::CoreIngest)
            .with_outputs(["ingest_stream_name", "ingest_endpoint"]),
        ResourceGroup::new("storage", Phase::Storage)
            .with_inputs(["ingest_stream_name"])
            .with_outputs(["data_bucket_name"]),
        ResourceGroup::new("insights", Phase::Insights)
            .with_inputs(["data_bucket_name"])
            .with_outputs(["catalog_name"]),
        ResourceGroup::new("cross-cutting", Phase::CrossCutting)
            .with_inputs(["ingest_endpoint"])
            .with_outputs(["operations_dashboard_id"]),
        ResourceGroup::new("cost-dashboard", Phase::CrossCutting)
            .with_outputs(["cost_dashboard_id"]),
        ResourceGroup::new("data-identity", Phase::DataIdentity)
            .with_inputs(["catalog_name", "data_bucket_name"])
            .with_outputs(["identity_pool_id"]),
    ]
}
