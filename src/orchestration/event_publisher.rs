//! # Rollout Event Publisher
//!
//! Broadcasts [`RolloutEvent`]s to any number of subscribers and mirrors each
//! one into the structured log. Publishing never fails a pipeline: with no
//! subscribers the event is only logged.
//!
//! ## Usage
//!
//! ```rust
//! use platform_rollout::orchestration::event_publisher::EventPublisher;
//! use platform_rollout::orchestration::types::RolloutEvent;
//!
//! # async fn example() {
//! let publisher = EventPublisher::new();
//! let mut events = publisher.subscribe();
//!
//! publisher.publish(RolloutEvent::WaveCompleted {
//!     target_id: "dev/us-east-1".to_string(),
//!     wave: "storage".to_string(),
//! });
//!
//! let received = events.recv().await.unwrap();
//! assert_eq!(received.event_name(), "wave.completed");
//! # }
//! ```

use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::defaults;
use crate::orchestration::types::RolloutEvent;

#[derive(Debug, Clone)]
pub struct EventPublisherConfig {
    /// Maximum number of events buffered per subscriber
    pub buffer_size: usize,
    /// Correlation ID for distributed tracing
    pub correlation_id: Option<String>,
}

impl Default for EventPublisherConfig {
    fn default() -> Self {
        Self {
            buffer_size: defaults::EVENT_BUFFER_SIZE,
            correlation_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPublisherStats {
    pub buffer_size: usize,
    pub subscriber_count: usize,
    pub correlation_id: String,
}

/// Cloneable handle onto one broadcast channel
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<RolloutEvent>,
    buffer_size: usize,
    correlation_id: String,
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_config(EventPublisherConfig::default())
    }

    pub fn with_config(config: EventPublisherConfig) -> Self {
        let (sender, _) = broadcast::channel(config.buffer_size.max(1));
        let correlation_id = config
            .correlation_id
            .unwrap_or_else(|| format!("pub_{}", &Uuid::new_v4().simple().to_string()[..8]));

        debug!(
            correlation_id = %correlation_id,
            buffer_size = config.buffer_size,
            "EventPublisher initialized"
        );

        Self {
            sender,
            buffer_size: config.buffer_size,
            correlation_id,
        }
    }

    pub fn publish(&self, event: RolloutEvent) {
        info!(
            event = event.event_name(),
            target_id = event.target_id(),
            correlation_id = %self.correlation_id,
            "📣 {}",
            event.event_name()
        );

        if self.sender.send(event).is_err() {
            debug!(correlation_id = %self.correlation_id, "No event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RolloutEvent> {
        self.sender.subscribe()
    }

    pub fn stats(&self) -> EventPublisherStats {
        EventPublisherStats {
            buffer_size: self.buffer_size,
            subscriber_count: self.sender.receiver_count(),
            correlation_id: self.correlation_id.clone(),
        }
    }
}
