use platform_rollout::models::{
    default_catalog, AccountId, DeploymentTarget, Phase, Region, RolloutMode,
};
use platform_rollout::orchestration::{validate_plan, TargetResolver, WavePlanner};
use proptest::prelude::*;
use std::collections::BTreeMap;

use crate::common::strategies::{environment_names_strategy, region_names_strategy};

fn regions(names: &[String]) -> Vec<Region> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Region::new(name.clone(), i == 0))
        .collect()
}

proptest! {
    /// Property: resolving the same configuration twice yields the same ordered targets
    #[test]
    fn resolution_is_deterministic(
        environments in environment_names_strategy(),
        region_names in region_names_strategy(),
    ) {
        let regions = regions(&region_names);
        let overrides = BTreeMap::new();

        let first = TargetResolver::resolve(&environments, &regions, &overrides, Some("123456789012")).unwrap();
        let second = TargetResolver::resolve(&environments, &regions, &overrides, Some("123456789012")).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), environments.len() * regions.len());

        // Environment-major, region-minor
        for (i, target) in first.iter().enumerate() {
            prop_assert_eq!(&target.environment, &environments[i / regions.len()]);
            prop_assert_eq!(&target.region, &regions[i % regions.len()]);
        }
    }

    /// Property: every plan has the fixed phase order and valid wiring in both modes
    #[test]
    fn plans_keep_phase_order(dr in any::<bool>(), environment in "[a-z]{2,8}") {
        let planner = WavePlanner::new(default_catalog()).unwrap();
        let target = DeploymentTarget::new(
            environment,
            Region::secondary("eu-west-1"),
            AccountId::new("123456789012").unwrap(),
        );
        let mode = if dr { RolloutMode::DisasterRecovery } else { RolloutMode::Standard };

        let plan = planner.plan(&target, mode);
        let phases: Vec<Phase> = plan.waves.iter().map(|wave| wave.phase).collect();
        prop_assert_eq!(phases, Phase::ALL.to_vec());
        prop_assert!(validate_plan(&plan).is_ok());

        let identity_gates = plan.waves[4].manual_gate_ids();
        let expected_gate = format!("{}/data-identity-approval", target.id());
        prop_assert!(identity_gates.contains(&expected_gate.as_str()));
        prop_assert_eq!(plan.waves[0].manual_gate_ids().len(), usize::from(dr));
    }
}
