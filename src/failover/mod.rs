//! # Failover Routing
//!
//! Keeps client traffic pointed at a healthy region. Runs continuously and
//! independently of rollouts; the two sides share only region and
//! environment identities.
//!
//! ```text
//! HealthMonitor (one loop per endpoint)
//!   └── HealthProbe::probe ──► FailoverController::record_probe
//!                                ├── HealthCheck (HEALTHY ⇄ UNHEALTHY)
//!                                ├── routing::derive_routing
//!                                └── HostedZone record set (via HostedZoneRegistrar)
//! ```

pub mod controller;
pub mod health_check;
pub mod hosted_zone;
pub mod probe;
pub mod routing;

pub use controller::{EndpointStatus, FailoverController, FailoverSnapshot, RoutingUpdate};
pub use health_check::{EndpointHealth, HealthCheck, HealthSnapshot, HealthTransition};
pub use hosted_zone::{DnsRecord, DnsRecordSet, HostedZone, HostedZoneRegistrar};
pub use probe::{HealthMonitor, HealthProbe, HttpsHealthProbe, ProbeResult};
pub use routing::{derive_routing, EndpointState, RoutingDecision};
