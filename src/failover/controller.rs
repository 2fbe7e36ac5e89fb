//! # Failover Controller
//!
//! Owns the health checks of one environment's regional endpoints and the
//! failover record set in that environment's hosted zone. Probe results are
//! the only input that mutates health or routing state.
//!
//! Locking: each endpoint's health check sits behind its own mutex, so a
//! probe result is folded in atomically per endpoint. Routing recomputation
//! holds the routing mutex while it reads the checks and writes the zone, so
//! readers never observe a decision that disagrees with the zone.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::health_check::{HealthCheck, HealthSnapshot, HealthTransition};
use super::hosted_zone::{DnsRecord, DnsRecordSet, HostedZone, HostedZoneRegistrar};
use super::routing::{derive_routing, EndpointState, RoutingDecision};
use crate::config::PlatformConfig;
use crate::constants::{events, ids};
use crate::error::{Result, RolloutError};
use crate::logging::log_routing_operation;
use crate::models::{Endpoint, EndpointRole};

/// Result of one routing recomputation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum RoutingUpdate {
    /// Derived routing equals the current routing; the zone was not touched
    Unchanged { routing: RoutingDecision },
    Switched {
        from: RoutingDecision,
        to: RoutingDecision,
    },
    /// No endpoint is healthy; the last routing stays in place
    Retained { routing: RoutingDecision },
}

impl RoutingUpdate {
    pub fn routing(&self) -> &RoutingDecision {
        match self {
            Self::Unchanged { routing } | Self::Retained { routing } => routing,
            Self::Switched { to, .. } => to,
        }
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Switched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub endpoint: Endpoint,
    pub health: HealthSnapshot,
}

/// Point-in-time view of an environment's failover state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverSnapshot {
    pub environment: String,
    pub record_name: String,
    pub routing: RoutingDecision,
    pub zone_version: u64,
    pub endpoints: Vec<EndpointStatus>,
}

#[derive(Debug)]
struct MonitoredEndpoint {
    endpoint: Endpoint,
    check: Mutex<HealthCheck>,
}

#[derive(Debug)]
pub struct FailoverController {
    environment: String,
    record_name: String,
    zone: Arc<HostedZone>,
    /// Keyed by region name
    endpoints: BTreeMap<String, MonitoredEndpoint>,
    routing: Mutex<RoutingDecision>,
}

impl FailoverController {
    /// Build a controller and publish the initial record set, routed to primary
    pub fn new(
        environment: impl Into<String>,
        record_name: impl Into<String>,
        endpoints: Vec<Endpoint>,
        failure_threshold: u32,
        zone: Arc<HostedZone>,
    ) -> Result<Self> {
        let environment = environment.into();
        let record_name = record_name.into();

        let primary = {
            let mut primaries = endpoints.iter().filter(|endpoint| endpoint.is_primary());
            match (primaries.next(), primaries.next()) {
                (Some(primary), None) => primary.clone(),
                _ => {
                    return Err(RolloutError::RecordSetInvariant {
                        name: record_name,
                        reason: "exactly one PRIMARY endpoint is required".to_string(),
                    })
                }
            }
        };

        let mut monitored = BTreeMap::new();
        for endpoint in endpoints {
            let region = endpoint.region.clone();
            let check = HealthCheck::new(endpoint.health_check_id.clone(), failure_threshold);
            let duplicate = monitored
                .insert(
                    region.clone(),
                    MonitoredEndpoint {
                        endpoint,
                        check: Mutex::new(check),
                    },
                )
                .is_some();
            if duplicate {
                return Err(RolloutError::configuration(format!(
                    "endpoint region '{region}' is declared more than once"
                )));
            }
        }

        let mut records: Vec<DnsRecord> = monitored
            .values()
            .map(|monitored| DnsRecord {
                set_identifier: monitored.endpoint.region.clone(),
                role: monitored.endpoint.role,
                target_domain: monitored.endpoint.domain.clone(),
                health_check_id: monitored.endpoint.health_check_id.clone(),
            })
            .collect();

        let routing = match zone.record_set(&record_name) {
            Some(existing) => Self::attach(&record_name, existing, &mut records, &monitored)?,
            None => {
                zone.upsert_record_set(DnsRecordSet {
                    name: record_name.clone(),
                    records,
                    active_region: Some(primary.region.clone()),
                })?;
                RoutingDecision {
                    active_region: primary.region.clone(),
                    role: EndpointRole::Primary,
                }
            }
        };

        info!(
            environment = %environment,
            record = %record_name,
            zone = %zone.name(),
            primary = %primary.region,
            active_region = %routing.active_region,
            endpoints = monitored.len(),
            "🛡️ Failover controller initialized"
        );

        Ok(Self {
            environment,
            record_name,
            zone,
            endpoints: monitored,
            routing: Mutex::new(routing),
        })
    }

    /// Adopt the routing of a record set that is already published.
    ///
    /// The zone is left untouched; its records must describe the same
    /// endpoints this controller monitors.
    fn attach(
        record_name: &str,
        existing: DnsRecordSet,
        records: &mut [DnsRecord],
        monitored: &BTreeMap<String, MonitoredEndpoint>,
    ) -> Result<RoutingDecision> {
        let mut published = existing.records;
        published.sort_by(|a, b| a.set_identifier.cmp(&b.set_identifier));
        records.sort_by(|a, b| a.set_identifier.cmp(&b.set_identifier));
        if published.as_slice() != &*records {
            return Err(RolloutError::RecordSetInvariant {
                name: record_name.to_string(),
                reason: "published records do not match the monitored endpoints".to_string(),
            });
        }

        let active_region = existing
            .active_region
            .ok_or_else(|| RolloutError::RecordSetInvariant {
                name: record_name.to_string(),
                reason: "published record set has no active region".to_string(),
            })?;
        let role = monitored
            .get(&active_region)
            .map(|monitored| monitored.endpoint.role)
            .ok_or_else(|| RolloutError::UnknownEndpoint(format!("{record_name}/{active_region}")))?;

        debug!(record = %record_name, active_region = %active_region, "Attached to published record set");
        Ok(RoutingDecision { active_region, role })
    }

    /// Controller for one configured environment, one endpoint per region
    pub fn for_environment(
        config: &PlatformConfig,
        environment: &str,
        registrar: &HostedZoneRegistrar,
    ) -> Result<Self> {
        let primary = config.primary_region()?;
        let failover = &config.failover;
        if registrar.primary_region() != primary.name
            || registrar.zone_domain() != failover.zone_domain
        {
            return Err(RolloutError::configuration(format!(
                "hosted zone registrar ({} in {}) does not match configuration ({} in {})",
                registrar.zone_domain(),
                registrar.primary_region(),
                failover.zone_domain,
                primary.name
            )));
        }
        let zone = registrar.ensure_zone(environment, &primary.name)?;

        let endpoints = config
            .regions
            .iter()
            .map(|region| {
                Endpoint::new(
                    ids::endpoint_domain(
                        &failover.record_name,
                        &region.name,
                        environment,
                        &failover.zone_domain,
                    ),
                    region.name.clone(),
                    if region.primary {
                        EndpointRole::Primary
                    } else {
                        EndpointRole::Secondary
                    },
                    ids::health_check_id(environment, &region.name),
                )
            })
            .collect();

        Self::new(
            environment,
            ids::record_name(&failover.record_name, environment, &failover.zone_domain),
            endpoints,
            failover.failure_threshold,
            zone,
        )
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    pub fn zone(&self) -> &Arc<HostedZone> {
        &self.zone
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints
            .values()
            .map(|monitored| monitored.endpoint.clone())
            .collect()
    }

    pub fn current_routing(&self) -> RoutingDecision {
        self.routing.lock().clone()
    }

    /// Fold one probe result into the region's health check.
    ///
    /// A health transition triggers a routing recomputation; anything else
    /// only moves counters.
    pub fn record_probe(&self, region: &str, passed: bool) -> Result<Option<HealthTransition>> {
        let monitored = self
            .endpoints
            .get(region)
            .ok_or_else(|| RolloutError::UnknownEndpoint(format!("{}/{region}", self.environment)))?;

        let transition = monitored.check.lock().record(passed);

        if let Some(transition) = transition {
            info!(
                event = events::HEALTH_TRANSITION,
                environment = %self.environment,
                region = %region,
                from = %transition.from,
                to = %transition.to,
                "Endpoint health changed"
            );
            self.recompute()?;
        }

        Ok(transition)
    }

    /// Derive routing from current health and write it to the zone if it changed
    pub fn recompute(&self) -> Result<RoutingUpdate> {
        let mut routing = self.routing.lock();

        let states: Vec<EndpointState> = self
            .endpoints
            .values()
            .map(|monitored| EndpointState {
                region: monitored.endpoint.region.clone(),
                role: monitored.endpoint.role,
                health: monitored.check.lock().health(),
            })
            .collect();

        let any_healthy = states.iter().any(|state| state.health.is_healthy());
        let derived = derive_routing(&states, Some(&*routing)).unwrap_or_else(|| routing.clone());

        if !any_healthy {
            warn!(
                event = events::ROUTING_RETAINED,
                environment = %self.environment,
                active_region = %routing.active_region,
                "⚠️ No healthy endpoint, keeping last routing"
            );
            return Ok(RoutingUpdate::Retained {
                routing: routing.clone(),
            });
        }

        if derived == *routing {
            debug!(environment = %self.environment, "Routing unchanged");
            return Ok(RoutingUpdate::Unchanged { routing: derived });
        }

        self.zone
            .set_active_region(&self.record_name, &derived.active_region)?;

        info!(
            event = events::ROUTING_SWITCHED,
            environment = %self.environment,
            record = %self.record_name,
            from = %routing.active_region,
            to = %derived.active_region,
            role = %derived.role,
            zone_version = self.zone.version(),
            "🔀 Failover routing switched"
        );

        log_routing_operation(
            "switch",
            &self.record_name,
            Some(&derived.active_region),
            "applied",
            Some(&format!("from {}", routing.active_region)),
        );

        let from = std::mem::replace(&mut *routing, derived.clone());
        Ok(RoutingUpdate::Switched { from, to: derived })
    }

    pub fn snapshot(&self) -> FailoverSnapshot {
        let routing = self.routing.lock();
        FailoverSnapshot {
            environment: self.environment.clone(),
            record_name: self.record_name.clone(),
            routing: routing.clone(),
            zone_version: self.zone.version(),
            endpoints: self
                .endpoints
                .values()
                .map(|monitored| EndpointStatus {
                    endpoint: monitored.endpoint.clone(),
                    health: monitored.check.lock().snapshot(),
                })
                .collect(),
        }
    }
}
