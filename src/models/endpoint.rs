use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointRole {
    Primary,
    Secondary,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY"),
            Self::Secondary => write!(f, "SECONDARY"),
        }
    }
}

/// A region's public ingress address, bound to one health check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub domain: String,
    pub region: String,
    pub role: EndpointRole,
    pub health_check_id: String,
}

impl Endpoint {
    pub fn new(
        domain: impl Into<String>,
        region: impl Into<String>,
        role: EndpointRole,
        health_check_id: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            region: region.into(),
            role,
            health_check_id: health_check_id.into(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == EndpointRole::Primary
    }
}
