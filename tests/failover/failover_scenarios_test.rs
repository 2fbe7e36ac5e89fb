use platform_rollout::failover::{
    EndpointHealth, FailoverController, HostedZoneRegistrar, RoutingUpdate,
};
use platform_rollout::models::EndpointRole;
use platform_rollout::RolloutError;
use proptest::prelude::*;

use crate::common::strategies::probe_sequence_strategy;
use crate::common::{PlatformConfigBuilder, PRIMARY, SECONDARY_A, SECONDARY_B};

fn controller_for(environment: &str, threshold: u32) -> (HostedZoneRegistrar, FailoverController) {
    let config = PlatformConfigBuilder::new()
        .with_failure_threshold(threshold)
        .build();
    let registrar = HostedZoneRegistrar::from_config(&config).unwrap();
    let controller = FailoverController::for_environment(&config, environment, &registrar).unwrap();
    (registrar, controller)
}

#[test]
fn test_controller_publishes_record_set_in_primary_zone() {
    let (registrar, controller) = controller_for("prod", 3);

    let zone = registrar.zone_for("prod").unwrap();
    assert_eq!(zone.name(), "prod.platform.internal");
    assert_eq!(zone.created_in_region(), PRIMARY);
    assert_eq!(controller.record_name(), "ingest.prod.platform.internal");

    let record_set = zone.record_set("ingest.prod.platform.internal").unwrap();
    assert_eq!(record_set.records.len(), 3);
    assert_eq!(record_set.primary().unwrap().set_identifier, PRIMARY);
    assert_eq!(
        record_set.primary().unwrap().target_domain,
        "ingest.us-east-1.prod.platform.internal"
    );
    assert_eq!(record_set.primary().unwrap().health_check_id, "hc-prod-us-east-1");
    assert_eq!(record_set.active_region.as_deref(), Some(PRIMARY));
}

#[test]
fn test_three_failures_switch_and_one_pass_switches_back() {
    let (_registrar, controller) = controller_for("prod", 3);

    controller.record_probe(PRIMARY, false).unwrap();
    controller.record_probe(PRIMARY, false).unwrap();
    assert_eq!(controller.current_routing().active_region, PRIMARY);

    let transition = controller.record_probe(PRIMARY, false).unwrap().unwrap();
    assert_eq!(transition.to, EndpointHealth::Unhealthy);

    let routing = controller.current_routing();
    assert_eq!(routing.role, EndpointRole::Secondary);
    // Lowest region name among healthy secondaries
    assert_eq!(routing.active_region, SECONDARY_B);
    let zone_set = controller
        .zone()
        .record_set(controller.record_name())
        .unwrap();
    assert_eq!(zone_set.active_region.as_deref(), Some(SECONDARY_B));

    controller.record_probe(PRIMARY, true).unwrap();
    assert_eq!(controller.current_routing().active_region, PRIMARY);
    assert_eq!(controller.current_routing().role, EndpointRole::Primary);
}

#[test]
fn test_all_endpoints_unhealthy_keeps_last_record() {
    let (_registrar, controller) = controller_for("dev", 1);

    controller.record_probe(PRIMARY, false).unwrap();
    controller.record_probe(SECONDARY_B, false).unwrap();
    assert_eq!(controller.current_routing().active_region, SECONDARY_A);

    let before = controller.zone().record_set(controller.record_name()).unwrap();
    let version = controller.zone().version();

    controller.record_probe(SECONDARY_A, false).unwrap();

    assert_eq!(controller.zone().record_set(controller.record_name()).unwrap(), before);
    assert_eq!(controller.zone().version(), version);
    assert!(matches!(
        controller.recompute().unwrap(),
        RoutingUpdate::Retained { ref routing } if routing.active_region == SECONDARY_A
    ));

    // A secondary coming back is picked up while the primary stays down
    controller.record_probe(SECONDARY_B, true).unwrap();
    assert_eq!(controller.current_routing().active_region, SECONDARY_B);
}

#[test]
fn test_secondary_regions_reference_the_same_zone() {
    let registrar = HostedZoneRegistrar::new(PRIMARY, "platform.internal");
    assert!(matches!(
        registrar.ensure_zone("dev", SECONDARY_A),
        Err(RolloutError::ZoneNotFound(_))
    ));

    let created = registrar.ensure_zone("dev", PRIMARY).unwrap();
    let prod = registrar.ensure_zone("prod", PRIMARY).unwrap();
    for region in [PRIMARY, SECONDARY_A, SECONDARY_B] {
        assert_eq!(registrar.ensure_zone("dev", region).unwrap().id(), created.id());
    }
    assert_ne!(created.id(), prod.id());
    assert_eq!(registrar.environments(), vec!["dev", "prod"]);
}

#[test]
fn test_controller_attached_to_failed_over_zone_keeps_routing() {
    let config = PlatformConfigBuilder::new().with_failure_threshold(1).build();
    let registrar = HostedZoneRegistrar::from_config(&config).unwrap();
    let primary_side = FailoverController::for_environment(&config, "prod", &registrar).unwrap();
    primary_side.record_probe(PRIMARY, false).unwrap();

    let zone = registrar.zone_for("prod").unwrap();
    let version = zone.version();
    let published = zone.record_set(primary_side.record_name()).unwrap();
    assert_eq!(published.active_region.as_deref(), Some(SECONDARY_B));

    let secondary_side = FailoverController::for_environment(&config, "prod", &registrar).unwrap();

    assert_eq!(zone.version(), version);
    assert_eq!(zone.record_set(primary_side.record_name()).unwrap(), published);
    assert_eq!(secondary_side.current_routing().active_region, SECONDARY_B);
    assert_eq!(secondary_side.current_routing().role, EndpointRole::Secondary);
}

#[test]
fn test_registrar_must_match_configuration() {
    let config = PlatformConfigBuilder::new().build();

    let other_domain = HostedZoneRegistrar::new(PRIMARY, "example.com");
    assert!(matches!(
        FailoverController::for_environment(&config, "dev", &other_domain),
        Err(RolloutError::ConfigurationError(_))
    ));

    let other_primary = HostedZoneRegistrar::new(SECONDARY_A, config.failover.zone_domain.clone());
    assert!(matches!(
        FailoverController::for_environment(&config, "dev", &other_primary),
        Err(RolloutError::ConfigurationError(_))
    ));

    assert!(other_domain.environments().is_empty());
    assert!(other_primary.environments().is_empty());
}

#[test]
fn test_snapshot_reports_counters() {
    let (_registrar, controller) = controller_for("dev", 3);
    controller.record_probe(SECONDARY_A, false).unwrap();
    controller.record_probe(SECONDARY_A, true).unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.routing.active_region, PRIMARY);
    let secondary = snapshot
        .endpoints
        .iter()
        .find(|status| status.endpoint.region == SECONDARY_A)
        .unwrap();
    assert_eq!(secondary.health.total_failures, 1);
    assert_eq!(secondary.health.total_passes, 1);
    assert_eq!(secondary.health.health, EndpointHealth::Healthy);
}

proptest! {
    /// Property: recomputing with no new probes never mutates the zone
    #[test]
    fn recompute_is_idempotent(probes in probe_sequence_strategy(3), threshold in 1u32..4) {
        let (_registrar, controller) = controller_for("dev", threshold);
        let regions = [PRIMARY, SECONDARY_A, SECONDARY_B];

        for (index, passed) in probes {
            controller.record_probe(regions[index], passed).unwrap();
        }

        let version = controller.zone().version();
        let routing = controller.current_routing();
        prop_assert!(!controller.recompute().unwrap().is_switch());
        prop_assert!(!controller.recompute().unwrap().is_switch());
        prop_assert_eq!(controller.zone().version(), version);
        prop_assert_eq!(controller.current_routing(), routing);

        // A healthy primary always owns the record
        let snapshot = controller.snapshot();
        let primary_healthy = snapshot
            .endpoints
            .iter()
            .any(|status| status.endpoint.is_primary() && status.health.health == EndpointHealth::Healthy);
        if primary_healthy {
            prop_assert_eq!(snapshot.routing.active_region.as_str(), PRIMARY);
        }
    }
}
