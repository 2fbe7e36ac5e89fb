//! Configuration Integration Tests

pub mod loader_test;
