//! # System Constants
//!
//! Defaults, event names, and identifier formats that define the operational
//! boundaries of the rollout orchestrator and the failover controller.

/// Rollout lifecycle event names, used as the `event` field of structured logs
pub mod events {
    pub const ROLLOUT_STARTED: &str = "rollout.started";
    pub const ROLLOUT_FINISHED: &str = "rollout.finished";
    pub const TARGET_FINISHED: &str = "rollout.target_finished";
    pub const WAVE_STARTED: &str = "wave.started";
    pub const WAVE_COMPLETED: &str = "wave.completed";
    pub const GATE_BLOCKED: &str = "gate.blocked";
    pub const GATE_APPROVED: &str = "gate.approved";
    pub const GROUP_APPLIED: &str = "group.applied";
    pub const GROUP_FAILED: &str = "group.failed";

    pub const HEALTH_TRANSITION: &str = "failover.health_transition";
    pub const ROUTING_SWITCHED: &str = "failover.routing_switched";
    pub const ROUTING_RETAINED: &str = "failover.routing_retained";
    pub const ZONE_CREATED: &str = "failover.zone_created";
}

/// Default values applied when the configuration omits a setting
pub mod defaults {
    /// Consecutive failed probes before an endpoint is marked unhealthy
    pub const FAILURE_THRESHOLD: u32 = 3;
    pub const PROBE_INTERVAL_SECONDS: u64 = 30;
    pub const PROBE_PORT: u16 = 443;
    pub const PROBE_PATH: &str = "/health";
    pub const PROBE_TIMEOUT_MS: u64 = 5_000;

    pub const MAX_APPLY_ATTEMPTS: u32 = 1;
    pub const RETRY_BASE_DELAY_MS: u64 = 1_000;
    pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

    pub const RECORD_NAME: &str = "ingest";
    pub const ZONE_DOMAIN: &str = "platform.internal";

    /// Capacity of the rollout event broadcast channel
    pub const EVENT_BUFFER_SIZE: usize = 1_024;

    pub const CONFIG_ENV_PREFIX: &str = "ROLLOUT";
    pub const CONFIG_ENV_SEPARATOR: &str = "__";
    pub const CONFIG_FILE: &str = "config/rollout.yaml";
}

/// Identifier formats shared by the planner, the gate evaluator and the failover side
pub mod ids {
    pub fn target_id(environment: &str, region: &str) -> String {
        format!("{environment}/{region}")
    }

    pub fn dr_gate_id(target_id: &str) -> String {
        format!("{target_id}/dr-approval")
    }

    pub fn data_identity_gate_id(target_id: &str) -> String {
        format!("{target_id}/data-identity-approval")
    }

    pub fn health_check_id(environment: &str, region: &str) -> String {
        format!("hc-{environment}-{region}")
    }

    pub fn zone_name(environment: &str, zone_domain: &str) -> String {
        format!("{environment}.{zone_domain}")
    }

    pub fn record_name(record: &str, environment: &str, zone_domain: &str) -> String {
        format!("{record}.{environment}.{zone_domain}")
    }

    pub fn endpoint_domain(record: &str, region: &str, environment: &str, zone_domain: &str) -> String {
        format!("{record}.{region}.{environment}.{zone_domain}")
    }
}
