//! # Routing Derivation
//!
//! Pure function from endpoint health to the authoritative region:
//!
//! 1. Primary healthy → primary.
//! 2. Otherwise the healthy secondary with the lowest region name.
//! 3. Nothing healthy → keep the last decision.
//!
//! There is no stickiness: a recovered primary always wins again.

use serde::{Deserialize, Serialize};

use super::health_check::EndpointHealth;
use crate::models::EndpointRole;

/// Health of one endpoint as seen by the derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointState {
    pub region: String,
    pub role: EndpointRole,
    pub health: EndpointHealth,
}

/// Which region the failover record currently resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub active_region: String,
    pub role: EndpointRole,
}

pub fn derive_routing(
    endpoints: &[EndpointState],
    last: Option<&RoutingDecision>,
) -> Option<RoutingDecision> {
    let primary = endpoints
        .iter()
        .find(|endpoint| endpoint.role == EndpointRole::Primary && endpoint.health.is_healthy());

    let chosen = primary.or_else(|| {
        endpoints
            .iter()
            .filter(|endpoint| {
                endpoint.role == EndpointRole::Secondary && endpoint.health.is_healthy()
            })
            .min_by(|a, b| a.region.cmp(&b.region))
    });

    match chosen {
        Some(endpoint) => Some(RoutingDecision {
            active_region: endpoint.region.clone(),
            role: endpoint.role,
        }),
        None => last.cloned(),
    }
}
