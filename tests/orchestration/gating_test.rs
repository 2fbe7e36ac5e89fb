use platform_rollout::orchestration::{ApprovalOutcome, RolloutCoordinator, TargetOutcome};
use platform_rollout::state_machine::TargetState;
use platform_rollout::RolloutError;
use std::time::Duration;

use crate::common::{wait_for, MockProvider, PlatformConfigBuilder};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_disaster_recovery_target_applies_nothing_before_shared_approval() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new()
            .with_environments(&["dev"])
            .with_regions(&["us-east-1", "us-west-2"])
            .with_disaster_recovery("us-west-2")
            .shared(),
        provider.registry(),
    )
    .unwrap();

    let handle = coordinator.trigger("rev-1").unwrap();
    let dr_target = "dev/us-west-2";

    assert!(
        wait_for(WAIT, || {
            let status = handle.status(dr_target).unwrap();
            status.state == TargetState::AwaitingApproval
                && status.pending_gates == vec![format!("{dr_target}/dr-approval")]
        })
        .await
    );
    // The standard target keeps going while the DR target is parked
    assert!(
        wait_for(WAIT, || provider.applied_groups("dev/us-east-1").len() == 5).await
    );
    assert!(provider.applied_groups(dr_target).is_empty());

    handle.approve(dr_target, &format!("{dr_target}/dr-approval")).unwrap();

    assert!(
        wait_for(WAIT, || {
            handle.status(dr_target).unwrap().pending_gates
                == vec![format!("{dr_target}/data-identity-approval")]
        })
        .await
    );
    assert_eq!(provider.applied_groups(dr_target).len(), 5);
    assert!(!provider
        .applied_groups(dr_target)
        .contains(&"data-identity".to_string()));

    for target_id in handle.target_ids() {
        handle
            .approve(&target_id, &format!("{target_id}/data-identity-approval"))
            .unwrap();
    }
    let report = handle.wait().await;
    assert!(report.all_succeeded());
}

#[tokio::test]
async fn test_data_identity_needs_its_own_approval_in_standard_mode() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new()
            .with_environments(&["prod"])
            .with_regions(&["us-east-1"])
            .shared(),
        provider.registry(),
    )
    .unwrap();

    let handle = coordinator.trigger("rev-1").unwrap();
    let target = "prod/us-east-1";
    let gate = "prod/us-east-1/data-identity-approval";

    assert!(
        wait_for(WAIT, || {
            let status = handle.status(target).unwrap();
            status.state == TargetState::AwaitingApproval
                && status.current_wave.as_deref() == Some("data-identity")
        })
        .await
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.applied_groups(target).len(), 5);
    assert_eq!(handle.pending_gates(target).unwrap(), vec![gate]);

    assert_eq!(handle.approve(target, gate).unwrap(), ApprovalOutcome::Approved);
    assert_eq!(
        handle.approve(target, gate).unwrap(),
        ApprovalOutcome::AlreadyApproved
    );
    assert!(handle.pending_gates(target).unwrap().is_empty());

    let report = handle.wait().await;
    assert!(report.all_succeeded());
    let identity_applies = provider
        .applied_groups(target)
        .iter()
        .filter(|group| *group == "data-identity")
        .count();
    assert_eq!(identity_applies, 1);
}

#[tokio::test]
async fn test_cancelling_a_parked_target_leaves_others_alone() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new()
            .with_environments(&["dev"])
            .with_regions(&["us-east-1", "eu-west-1"])
            .with_disaster_recovery("eu-west-1")
            .shared(),
        provider.registry(),
    )
    .unwrap();

    let handle = coordinator.trigger("rev-1").unwrap();
    assert!(
        wait_for(WAIT, || {
            handle.status("dev/eu-west-1").unwrap().state == TargetState::AwaitingApproval
        })
        .await
    );

    handle.cancel_target("dev/eu-west-1").unwrap();
    handle
        .approve("dev/us-east-1", "dev/us-east-1/data-identity-approval")
        .unwrap();

    let report = handle.wait().await;
    assert_eq!(
        report.target("dev/eu-west-1").unwrap().outcome,
        TargetOutcome::Cancelled {
            wave: Some("core-ingest".into())
        }
    );
    assert!(report.target("dev/us-east-1").unwrap().outcome.is_success());
    assert!(provider.applied_groups("dev/eu-west-1").is_empty());
}

#[tokio::test]
async fn test_operator_errors() {
    let provider = MockProvider::new();
    let coordinator = RolloutCoordinator::new(
        PlatformConfigBuilder::new().with_environments(&["dev"]).shared(),
        provider.registry(),
    )
    .unwrap();
    let handle = coordinator.trigger("rev-1").unwrap();

    assert!(matches!(
        handle.approve("staging/us-east-1", "staging/us-east-1/dr-approval"),
        Err(RolloutError::UnknownTarget(_))
    ));
    assert!(matches!(
        handle.approve("dev/us-east-1", "dev/us-east-1/dr-approval"),
        Err(RolloutError::UnknownGate { .. })
    ));
    assert!(matches!(
        handle.cancel_target("staging/us-east-1"),
        Err(RolloutError::UnknownTarget(_))
    ));

    handle.cancel();
    let report = handle.wait().await;
    assert_eq!(report.count_in(TargetState::Succeeded), 0);
}

#[test]
fn test_missing_account_aborts_before_any_apply() {
    let mut config = PlatformConfigBuilder::new().build();
    config.accounts.default = None;
    config.accounts.overrides.clear();

    let provider = MockProvider::new();
    let coordinator =
        RolloutCoordinator::new(std::sync::Arc::new(config), provider.registry()).unwrap();

    assert!(matches!(
        coordinator.trigger("rev-1"),
        Err(RolloutError::ConfigurationError(_))
    ));
    assert!(provider.applies().is_empty());
}
