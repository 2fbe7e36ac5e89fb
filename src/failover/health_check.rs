//! # Endpoint Health Check
//!
//! Per-endpoint `HEALTHY ⇄ UNHEALTHY` state machine with asymmetric
//! hysteresis: `failure_threshold` consecutive failed probes are needed to
//! degrade, a single passing probe recovers. Probe failures never raise
//! errors; they only move counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Derived health of one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointHealth {
    Healthy,
    Unhealthy,
}

impl EndpointHealth {
    pub fn is_healthy(self) -> bool {
        self == Self::Healthy
    }
}

impl fmt::Display for EndpointHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "HEALTHY"),
            Self::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

/// A state change produced by one probe result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthTransition {
    pub from: EndpointHealth,
    pub to: EndpointHealth,
}

/// Read-only copy of a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub health_check_id: String,
    pub health: EndpointHealth,
    pub consecutive_failures: u32,
    pub total_passes: u64,
    pub total_failures: u64,
    pub last_probe_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    id: String,
    failure_threshold: u32,
    health: EndpointHealth,
    consecutive_failures: u32,
    total_passes: u64,
    total_failures: u64,
    last_probe_at: Option<DateTime<Utc>>,
}

impl HealthCheck {
    /// New checks start healthy; a threshold of zero is treated as one
    pub fn new(id: impl Into<String>, failure_threshold: u32) -> Self {
        Self {
            id: id.into(),
            failure_threshold: failure_threshold.max(1),
            health: EndpointHealth::Healthy,
            consecutive_failures: 0,
            total_passes: 0,
            total_failures: 0,
            last_probe_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn health(&self) -> EndpointHealth {
        self.health
    }

    pub fn is_healthy(&self) -> bool {
        self.health.is_healthy()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Fold one probe result in; returns the transition if health changed
    pub fn record(&mut self, passed: bool) -> Option<HealthTransition> {
        self.last_probe_at = Some(Utc::now());
        let from = self.health;

        if passed {
            self.total_passes += 1;
            self.consecutive_failures = 0;
            self.health = EndpointHealth::Healthy;
        } else {
            self.total_failures += 1;
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            debug!(
                health_check_id = %self.id,
                consecutive_failures = self.consecutive_failures,
                failure_threshold = self.failure_threshold,
                "Probe failed"
            );
            if self.consecutive_failures >= self.failure_threshold {
                self.health = EndpointHealth::Unhealthy;
            }
        }

        if from == self.health {
            return None;
        }

        match self.health {
            EndpointHealth::Unhealthy => warn!(
                health_check_id = %self.id,
                consecutive_failures = self.consecutive_failures,
                "🔴 Endpoint marked unhealthy"
            ),
            EndpointHealth::Healthy => info!(health_check_id = %self.id, "🟢 Endpoint recovered"),
        }

        Some(HealthTransition {
            from,
            to: self.health,
        })
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            health_check_id: self.id.clone(),
            health: self.health,
            consecutive_failures: self.consecutive_failures,
            total_passes: self.total_passes,
            total_failures: self.total_failures,
            last_probe_at: self.last_probe_at,
        }
    }
}
