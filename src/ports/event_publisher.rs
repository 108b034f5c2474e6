//! EventPublisher port - Interface for publishing domain events.
//!
//! Handlers record events while they run; the mediator publishes them once
//! the request has succeeded. The transport (in-memory, broker) is hidden
//! behind this port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::EventEnvelope;

/// Delivery failure reported by a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to publish event '{event_type}': {reason}")]
pub struct PublishError {
    pub event_type: String,
    pub reason: String,
}

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may receive duplicates)
/// - Errors are propagated to the caller
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), PublishError>;

    /// Publish multiple events in order.
    ///
    /// Adapters without atomic delivery publish sequentially and stop at
    /// the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), PublishError>;
}
