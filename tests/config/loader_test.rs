use platform_rollout::config::{ConfigManager, ConfigurationError};
use platform_rollout::models::RolloutMode;
use platform_rollout::orchestration::TargetResolver;
use std::io::Write;
use std::path::PathBuf;

fn sample_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/rollout.yaml")
}

#[test]
fn test_shipped_sample_config_resolves_six_targets() {
    let manager = ConfigManager::load(Some(&sample_config_path())).unwrap();
    let config = manager.config();

    assert_eq!(config.primary_region().unwrap().name, "us-east-1");
    assert_eq!(config.mode_for("eu-west-1"), RolloutMode::DisasterRecovery);

    let targets = TargetResolver::from_config(config).unwrap();
    assert_eq!(targets.len(), 6);
    assert!(targets
        .iter()
        .filter(|target| target.environment == "prod")
        .all(|target| target.account.as_str() == "222222222222"));
}

#[test]
fn test_environment_overrides_file_values() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(
        br#"
environments: [dev]
regions:
  - name: us-east-1
    primary: true
accounts:
  default: "111111111111"
"#,
    )
    .unwrap();

    std::env::set_var("ROLLOUT__FAILOVER__FAILURE_THRESHOLD", "5");
    let loaded = ConfigManager::load(Some(file.path()));
    std::env::remove_var("ROLLOUT__FAILOVER__FAILURE_THRESHOLD");

    let manager = loaded.unwrap();
    assert_eq!(manager.config().failover.failure_threshold, 5);
    assert_eq!(manager.config().failover.probe_interval_seconds, 30);
}

#[test]
fn test_two_primaries_are_rejected() {
    let result = ConfigManager::from_yaml_str(
        r#"
environments: [dev]
regions:
  - name: us-east-1
    primary: true
  - name: us-west-2
    primary: true
"#,
    );
    assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
}
