//! # Structured Logging Module
//!
//! Environment-aware structured logging for rollout pipelines and the
//! failover controller. Console output is always on; JSON output can be
//! requested for log shipping.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output format for the console layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize structured logging once per process.
///
/// `RUST_LOG` wins when set; otherwise the level follows `deployment_environment`.
pub fn init_structured_logging(deployment_environment: &str, format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level_for(deployment_environment)));

        let console = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .boxed(),
        };

        let subscriber = tracing_subscriber::registry().with(console.with_filter(filter));

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %deployment_environment,
            format = ?format,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Log level based on deployment environment
fn log_level_for(environment: &str) -> &'static str {
    match environment {
        "production" | "prod" => "info",
        _ => "debug",
    }
}

/// Log structured data for rollout pipeline operations
pub fn log_rollout_operation(
    operation: &str,
    target_id: &str,
    wave: Option<&str>,
    group: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        target_id = %target_id,
        wave = wave,
        group = group,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🚀 ROLLOUT_OPERATION"
    );
}

/// Log structured data for DNS routing operations
pub fn log_routing_operation(
    operation: &str,
    record_name: &str,
    region: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        record_name = %record_name,
        region = region,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🌐 ROUTING_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
