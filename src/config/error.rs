//! Configuration Error Types
//!
//! Errors raised while loading and validating the platform configuration.
//! Every variant is fatal at plan time: a rollout never starts on a bad config.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Configuration file not found at the given location
    #[error("Configuration file not found: {path:?}")]
    ConfigFileNotFound { path: PathBuf },

    /// The layered sources could not be read or merged
    #[error("Failed to load configuration from '{source_name}': {error}")]
    LoadError { source_name: String, error: String },

    /// The merged document does not match the expected shape
    #[error("Failed to deserialize configuration: {error}")]
    DeserializeError { error: String },

    /// Missing required configuration field
    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// No account could be resolved for an environment
    #[error("No account mapping for environment '{environment}' and no default account configured")]
    UnresolvedAccount { environment: String },

    /// A resource group consumes a value nothing earlier produces
    #[error("Resource group '{group}' in target {target} consumes '{input}' which no earlier wave produces")]
    UnresolvedInput {
        target: String,
        group: String,
        input: String,
    },
}

impl ConfigurationError {
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    pub fn load_error(source_name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::LoadError {
            source_name: source_name.into(),
            error: error.to_string(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
