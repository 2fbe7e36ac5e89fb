use async_trait::async_trait;
use parking_lot::Mutex;
use platform_rollout::failover::{
    FailoverController, HealthMonitor, HealthProbe, HostedZoneRegistrar, ProbeResult,
};
use platform_rollout::models::Endpoint;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{PlatformConfigBuilder, PRIMARY, SECONDARY_B};

/// Probe whose set of unreachable regions can change mid-test
#[derive(Default)]
struct ScriptedProbe {
    down: Mutex<HashSet<String>>,
}

impl ScriptedProbe {
    fn set_down(&self, region: &str, down: bool) {
        let mut regions = self.down.lock();
        if down {
            regions.insert(region.to_string());
        } else {
            regions.remove(region);
        }
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        if self.down.lock().contains(&endpoint.region) {
            ProbeResult::Fail("timed out".into())
        } else {
            ProbeResult::Pass
        }
    }

    fn probe_name(&self) -> &str {
        "scripted"
    }
}

#[tokio::test(start_paused = true)]
async fn test_monitor_drives_failover_and_recovery() {
    let config = PlatformConfigBuilder::new().build();
    let registrar = HostedZoneRegistrar::from_config(&config).unwrap();
    let controller =
        Arc::new(FailoverController::for_environment(&config, "prod", &registrar).unwrap());
    let probe = Arc::new(ScriptedProbe::default());
    probe.set_down(PRIMARY, true);

    let monitor = HealthMonitor::new(
        Arc::clone(&controller),
        Arc::clone(&probe) as Arc<dyn HealthProbe>,
        config.failover.probe_interval(),
    );
    monitor.start();

    // Probes at 0s and 30s: two failures, still below the threshold of 3
    tokio::time::sleep(Duration::from_secs(45)).await;
    assert_eq!(controller.current_routing().active_region, PRIMARY);

    // Third failure at 60s
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(controller.current_routing().active_region, SECONDARY_B);

    probe.set_down(PRIMARY, false);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(controller.current_routing().active_region, PRIMARY);

    monitor.stop().await;
    assert!(!monitor.is_running());

    // Nothing probes after stop
    let version = controller.zone().version();
    probe.set_down(PRIMARY, true);
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(controller.zone().version(), version);
}
