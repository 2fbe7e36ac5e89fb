//! # Health Probes
//!
//! [`HealthProbe`] is the consumed reachability check; [`HttpsHealthProbe`]
//! implements it over HTTPS. [`HealthMonitor`] runs one perpetual loop per
//! endpoint on a fixed interval, independent of any rollout, and feeds every
//! result into the [`FailoverController`].
//!
//! An unreachable endpoint, a timeout, or a non-2xx status all count as a
//! failed probe. None of them is an error.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::controller::FailoverController;
use crate::config::FailoverConfig;
use crate::error::{Result, RolloutError};
use crate::logging::log_error;
use crate::models::Endpoint;
use crate::utils::CancellationSignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Pass,
    Fail(String),
}

impl ProbeResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;

    /// Probe name for logging
    fn probe_name(&self) -> &str {
        "health_probe"
    }
}

/// `GET https://{domain}:{port}{path}`, pass on any 2xx
#[derive(Debug, Clone)]
pub struct HttpsHealthProbe {
    client: reqwest::Client,
    port: u16,
    path: String,
}

impl HttpsHealthProbe {
    pub fn new(port: u16, path: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RolloutError::configuration(format!("failed to build probe client: {e}")))?;

        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }

        Ok(Self { client, port, path })
    }

    pub fn from_config(config: &FailoverConfig) -> Result<Self> {
        Self::new(config.probe_port, config.probe_path.clone(), config.probe_timeout())
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("https://{}:{}{}", endpoint.domain, self.port, self.path)
    }
}

#[async_trait]
impl HealthProbe for HttpsHealthProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let url = self.url_for(endpoint);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => ProbeResult::Pass,
            Ok(response) => ProbeResult::Fail(format!("{url} returned {}", response.status())),
            Err(e) => ProbeResult::Fail(format!("{url} unreachable: {e}")),
        }
    }

    fn probe_name(&self) -> &str {
        "https"
    }
}

/// Perpetual per-endpoint probe loops for one controller
pub struct HealthMonitor {
    controller: Arc<FailoverController>,
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
    shutdown: CancellationSignal,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("environment", &self.controller.environment())
            .field("probe", &self.probe.probe_name())
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl HealthMonitor {
    pub fn new(
        controller: Arc<FailoverController>,
        probe: Arc<dyn HealthProbe>,
        interval: Duration,
    ) -> Self {
        Self {
            controller,
            probe,
            interval: interval.max(Duration::from_millis(1)),
            shutdown: CancellationSignal::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn controller(&self) -> &Arc<FailoverController> {
        &self.controller
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().iter().any(|task| !task.is_finished())
    }

    /// Spawn one loop per endpoint; the first probe fires immediately.
    /// Calling start on a running or stopped monitor does nothing.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() || self.shutdown.is_cancelled() {
            return;
        }

        info!(
            environment = %self.controller.environment(),
            probe = self.probe.probe_name(),
            interval = ?self.interval,
            "🩺 Starting health monitor"
        );

        for endpoint in self.controller.endpoints() {
            let controller = Arc::clone(&self.controller);
            let probe = Arc::clone(&self.probe);
            let shutdown = self.shutdown.clone();
            let interval = self.interval;

            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = ticker.tick() => {}
                    }

                    let result = tokio::select! {
                        _ = shutdown.cancelled() => break,
                        result = probe.probe(&endpoint) => result,
                    };

                    if let ProbeResult::Fail(reason) = &result {
                        debug!(region = %endpoint.region, reason = %reason, "Probe failed");
                    }
                    if let Err(e) = controller.record_probe(&endpoint.region, result.is_pass()) {
                        log_error(
                            "health_monitor",
                            "record_probe",
                            &e.to_string(),
                            Some(&endpoint.region),
                        );
                    }
                }

                debug!(region = %endpoint.region, "Probe loop stopped");
            }));
        }
    }

    /// Stop every loop and wait for them to exit
    pub async fn stop(&self) {
        self.shutdown.cancel();
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Probe loop panicked");
            }
        }
        info!(environment = %self.controller.environment(), "🛑 Health monitor stopped");
    }
}
