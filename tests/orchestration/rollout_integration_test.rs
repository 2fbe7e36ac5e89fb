use platform_rollout::models::{default_catalog, Phase};
use platform_rollout::orchestration::{RolloutCoordinator, RolloutEvent, TargetOutcome};
use platform_rollout::state_machine::TargetState;
use std::collections::HashMap;

use crate::common::{MockProvider, PlatformConfigBuilder};

fn approve_all_identity_gates(handle: &platform_rollout::RolloutHandle) {
    for target_id in handle.target_ids() {
        handle
            .approve(&target_id, &format!("{target_id}/data-identity-approval"))
            .unwrap();
    }
}

#[tokio::test]
async fn test_two_environments_three_regions_yield_six_independent_targets() {
    let provider = MockProvider::new();
    provider.fail("dev/us-west-2", "storage");

    let coordinator =
        RolloutCoordinator::new(PlatformConfigBuilder::new().shared(), provider.registry()).unwrap();
    let handle = coordinator.trigger("a1b2c3d").unwrap();

    assert_eq!(
        handle.target_ids(),
        vec![
            "dev/us-east-1",
            "dev/us-west-2",
            "dev/eu-west-1",
            "prod/us-east-1",
            "prod/us-west-2",
            "prod/eu-west-1",
        ]
    );

    approve_all_identity_gates(&handle);
    let report = handle.wait().await;

    assert_eq!(report.targets.len(), 6);
    assert_eq!(report.count_in(TargetState::Succeeded), 5);
    assert_eq!(report.count_in(TargetState::Failed), 1);

    let failed = report.target("dev/us-west-2").unwrap();
    assert_eq!(
        failed.outcome,
        TargetOutcome::Failed {
            wave: "storage".into(),
            group: "storage".into(),
            reason: "storage failed to converge".into(),
        }
    );
    assert_eq!(provider.applied_groups("dev/us-west-2"), vec!["core-ingest", "storage"]);

    let prod_primary = report.target("prod/us-east-1").unwrap();
    assert!(prod_primary.outcome.is_success());
    assert_eq!(prod_primary.applied_groups.len(), 6);

    let error = failed.error().unwrap().to_string();
    assert!(error.contains("dev/us-west-2"));
    assert!(error.contains("storage"));
}

#[tokio::test]
async fn test_waves_apply_in_fixed_phase_order() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new()
            .with_environments(&["dev"])
            .with_disaster_recovery("eu-west-1")
            .shared(),
        provider.registry(),
    )
    .unwrap();

    let handle = coordinator.trigger("a1b2c3d").unwrap();
    handle.approve("dev/eu-west-1", "dev/eu-west-1/dr-approval").unwrap();
    approve_all_identity_gates(&handle);
    assert!(handle.wait().await.all_succeeded());

    let phase_of: HashMap<String, Phase> = default_catalog()
        .into_iter()
        .map(|group| (group.id, group.phase))
        .collect();

    for target_id in ["dev/us-east-1", "dev/us-west-2", "dev/eu-west-1"] {
        let phases: Vec<Phase> = provider
            .applied_groups(target_id)
            .iter()
            .map(|group| phase_of[group])
            .collect();
        assert_eq!(phases.len(), 6);
        assert!(phases.windows(2).all(|pair| pair[0] <= pair[1]), "{target_id}: {phases:?}");
    }
}

#[tokio::test]
async fn test_outputs_flow_into_later_waves() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new()
            .with_environments(&["dev"])
            .with_regions(&["us-east-1"])
            .shared(),
        provider.registry(),
    )
    .unwrap();

    let handle = coordinator.trigger("rev-42").unwrap();
    approve_all_identity_gates(&handle);
    let report = handle.wait().await;
    assert!(report.all_succeeded());
    assert_eq!(report.revision, "rev-42");

    let applies = provider.applies();
    let identity = applies
        .iter()
        .find(|apply| apply.group_id == "data-identity")
        .unwrap();
    assert_eq!(identity.revision, "rev-42");
    assert_eq!(
        identity.inputs.get("catalog_name").map(String::as_str),
        Some("dev/us-east-1:catalog_name")
    );
    assert_eq!(
        identity.inputs.get("data_bucket_name").map(String::as_str),
        Some("dev/us-east-1:data_bucket_name")
    );

    let target = report.target("dev/us-east-1").unwrap();
    assert!(target.outputs.contains_key("identity_pool_id"));
}

#[tokio::test]
async fn test_lifecycle_events_are_published() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new()
            .with_environments(&["dev"])
            .with_regions(&["us-east-1"])
            .shared(),
        provider.registry(),
    )
    .unwrap();
    let mut events = coordinator.events().subscribe();

    let handle = coordinator.trigger("rev-1").unwrap();
    approve_all_identity_gates(&handle);
    handle.wait().await;

    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.event_name());
        if let RolloutEvent::RolloutFinished { succeeded, failed, .. } = event {
            assert_eq!((succeeded, failed), (1, 0));
        }
    }

    assert_eq!(names.first(), Some(&"rollout.started"));
    assert_eq!(names.last(), Some(&"rollout.finished"));
    assert_eq!(names.iter().filter(|name| **name == "wave.completed").count(), 5);
    assert_eq!(names.iter().filter(|name| **name == "group.applied").count(), 6);
}
