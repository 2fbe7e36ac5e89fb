//! # Hosted Zone Registrar
//!
//! One authoritative zone per environment, created only from the primary
//! region and referenced everywhere else. Zone creation is idempotent.
//!
//! A zone owns the failover record sets. Every record set holds exactly one
//! `PRIMARY` record and any number of `SECONDARY` records, all sharing one
//! name. Writes that change nothing leave the zone version untouched, which
//! is how callers observe "no DNS mutation".

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PlatformConfig;
use crate::constants::ids;
use crate::error::{Result, RolloutError};
use crate::models::EndpointRole;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsRecord {
    pub set_identifier: String,
    pub role: EndpointRole,
    pub target_domain: String,
    pub health_check_id: String,
}

/// Failover routing policy for one domain name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordSet {
    pub name: String,
    pub records: Vec<DnsRecord>,
    /// Region the name currently resolves to
    pub active_region: Option<String>,
}

impl DnsRecordSet {
    pub fn primary(&self) -> Option<&DnsRecord> {
        self.records
            .iter()
            .find(|record| record.role == EndpointRole::Primary)
    }

    pub fn validate(&self) -> Result<()> {
        let primaries = self
            .records
            .iter()
            .filter(|record| record.role == EndpointRole::Primary)
            .count();
        if primaries != 1 {
            return Err(RolloutError::RecordSetInvariant {
                name: self.name.clone(),
                reason: format!("expected exactly one PRIMARY record, found {primaries}"),
            });
        }

        if let Some(active) = &self.active_region {
            if !self.records.iter().any(|record| &record.set_identifier == active) {
                return Err(RolloutError::RecordSetInvariant {
                    name: self.name.clone(),
                    reason: format!("active region '{active}' has no record"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct HostedZone {
    id: String,
    name: String,
    environment: String,
    created_in_region: String,
    created_at: DateTime<Utc>,
    record_sets: RwLock<BTreeMap<String, DnsRecordSet>>,
    version: AtomicU64,
}

impl HostedZone {
    fn new(environment: &str, region: &str, zone_domain: &str) -> Self {
        Self {
            id: format!("zone-{}", &Uuid::new_v4().simple().to_string()[..12]),
            name: ids::zone_name(environment, zone_domain),
            environment: environment.to_string(),
            created_in_region: region.to_string(),
            created_at: Utc::now(),
            record_sets: RwLock::new(BTreeMap::new()),
            version: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn created_in_region(&self) -> &str {
        &self.created_in_region
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when `name` is the zone apex or a name below it
    pub fn owns_name(&self, name: &str) -> bool {
        name == self.name
            || name
                .strip_suffix(self.name.as_str())
                .is_some_and(|label| label.len() > 1 && label.ends_with('.'))
    }

    /// Number of record mutations applied so far
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn record_set(&self, name: &str) -> Option<DnsRecordSet> {
        self.record_sets.read().get(name).cloned()
    }

    pub fn record_set_names(&self) -> Vec<String> {
        self.record_sets.read().keys().cloned().collect()
    }

    /// Create or replace a record set; returns whether anything changed
    pub fn upsert_record_set(&self, record_set: DnsRecordSet) -> Result<bool> {
        record_set.validate()?;
        if !self.owns_name(&record_set.name) {
            return Err(RolloutError::RecordSetInvariant {
                name: record_set.name,
                reason: format!("name is outside hosted zone '{}'", self.name),
            });
        }

        let mut sets = self.record_sets.write();
        if sets.get(&record_set.name) == Some(&record_set) {
            return Ok(false);
        }

        debug!(zone = %self.name, record = %record_set.name, "Upserting record set");
        sets.insert(record_set.name.clone(), record_set);
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(true)
    }

    /// Point a record set at one of its regions; returns whether anything changed
    pub fn set_active_region(&self, name: &str, region: &str) -> Result<bool> {
        let mut sets = self.record_sets.write();
        let record_set = sets.get_mut(name).ok_or_else(|| RolloutError::RecordSetInvariant {
            name: name.to_string(),
            reason: "record set does not exist".to_string(),
        })?;

        if !record_set
            .records
            .iter()
            .any(|record| record.set_identifier == region)
        {
            return Err(RolloutError::UnknownEndpoint(format!("{name}/{region}")));
        }
        if record_set.active_region.as_deref() == Some(region) {
            return Ok(false);
        }

        record_set.active_region = Some(region.to_string());
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(true)
    }
}

/// Zones keyed by environment
#[derive(Debug)]
pub struct HostedZoneRegistrar {
    primary_region: String,
    zone_domain: String,
    zones: DashMap<String, Arc<HostedZone>>,
}

impl HostedZoneRegistrar {
    pub fn new(primary_region: impl Into<String>, zone_domain: impl Into<String>) -> Self {
        Self {
            primary_region: primary_region.into(),
            zone_domain: zone_domain.into(),
            zones: DashMap::new(),
        }
    }

    /// Registrar for the configured primary region and zone domain
    pub fn from_config(config: &PlatformConfig) -> Result<Self> {
        let primary = config.primary_region()?;
        Ok(Self::new(primary.name.clone(), config.failover.zone_domain.clone()))
    }

    pub fn primary_region(&self) -> &str {
        &self.primary_region
    }

    pub fn zone_domain(&self) -> &str {
        &self.zone_domain
    }

    /// Zone for `environment` as seen from `region`.
    ///
    /// The primary region creates the zone on first call and returns the same
    /// zone afterwards. Other regions only reference an existing zone.
    pub fn ensure_zone(&self, environment: &str, region: &str) -> Result<Arc<HostedZone>> {
        if region != self.primary_region {
            return self.zone_for(environment);
        }

        let zone = match self.zones.entry(environment.to_string()) {
            Entry::Occupied(existing) => Arc::clone(existing.get()),
            Entry::Vacant(vacant) => {
                let zone = Arc::new(HostedZone::new(environment, region, &self.zone_domain));
                info!(
                    zone_id = %zone.id(),
                    zone = %zone.name(),
                    environment = %environment,
                    region = %region,
                    "🌐 Hosted zone created"
                );
                vacant.insert(Arc::clone(&zone));
                zone
            }
        };
        Ok(zone)
    }

    pub fn zone_for(&self, environment: &str) -> Result<Arc<HostedZone>> {
        self.zones
            .get(environment)
            .map(|zone| Arc::clone(zone.value()))
            .ok_or_else(|| RolloutError::ZoneNotFound(environment.to_string()))
    }

    pub fn environments(&self) -> Vec<String> {
        let mut environments: Vec<String> = self.zones.iter().map(|e| e.key().clone()).collect();
        environments.sort();
        environments
    }
}
