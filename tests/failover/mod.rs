//! Failover Integration Tests
//!
//! Health hysteresis, routing derivation, and hosted zone ownership driven
//! through the controller built from platform configuration.

pub mod failover_scenarios_test;
pub mod health_monitor_test;
