//! Configuration Loader
//!
//! Layered loading: a YAML (or TOML/JSON, by extension) base file overlaid by
//! `ROLLOUT__*` environment variables, deserialized into [`PlatformConfig`]
//! and validated before anything else sees it.

use super::error::{ConfigResult, ConfigurationError};
use super::PlatformConfig;
use crate::constants::defaults;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Owner of the validated configuration for one orchestrator run
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<PlatformConfig>,
    source: PathBuf,
}

impl ConfigManager {
    /// Load from `path` (or the default location) plus environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let source = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_FILE));

        if !source.is_file() {
            return Err(ConfigurationError::ConfigFileNotFound { path: source });
        }

        debug!(path = %source.display(), "Loading platform configuration");

        let settings = Config::builder()
            .add_source(File::from(source.as_path()).required(true))
            .add_source(Self::environment_source())
            .build()
            .map_err(|e| ConfigurationError::load_error(source.display().to_string(), e))?;

        Self::finish(settings, source)
    }

    /// Load from an in-memory YAML document, without environment overrides
    pub fn from_yaml_str(document: &str) -> ConfigResult<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(document, FileFormat::Yaml))
            .build()
            .map_err(|e| ConfigurationError::load_error("<inline>", e))?;

        Self::finish(settings, PathBuf::from("<inline>"))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: PlatformConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            source: PathBuf::from("<programmatic>"),
        })
    }

    fn environment_source() -> Environment {
        Environment::with_prefix(defaults::CONFIG_ENV_PREFIX)
            .prefix_separator(defaults::CONFIG_ENV_SEPARATOR)
            .separator(defaults::CONFIG_ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("environments")
    }

    fn finish(settings: Config, source: PathBuf) -> ConfigResult<Self> {
        let config: PlatformConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigurationError::DeserializeError {
                    error: e.to_string(),
                })?;

        config.validate()?;

        info!(
            source = %source.display(),
            environments = config.environments.len(),
            regions = config.regions.len(),
            resource_groups = config.resource_groups.len(),
            "✅ Platform configuration loaded"
        );

        Ok(Self {
            config: Arc::new(config),
            source,
        })
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Shared handle for components that outlive the manager
    pub fn shared(&self) -> Arc<PlatformConfig> {
        Arc::clone(&self.config)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// JSON form of the configuration with account identifiers masked
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self.config.as_ref())
            .unwrap_or(serde_json::Value::Null);
        Self::sanitize_json_recursive(&mut value, false);
        value
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive: bool) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let nested_sensitive = sensitive || key.to_lowercase().contains("account");
                    Self::sanitize_json_recursive(val, nested_sensitive);
                }
            }
            serde_json::Value::Array(items) => {
                for item in items.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive);
                }
            }
            serde_json::Value::String(s) if sensitive => {
                let tail: String = s
                    .chars()
                    .skip(s.chars().count().saturating_sub(4))
                    .collect();
                *value = serde_json::Value::String(format!("[MASKED: ****{tail}]"));
            }
            _ => {}
        }
    }
}
