//! Orchestration Integration Tests
//!
//! Full rollouts through the coordinator with in-memory providers.

pub mod gating_test;
pub mod resolver_properties;
pub mod rollout_integration_test;
