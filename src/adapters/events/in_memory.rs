//! In-memory event bus.
//!
//! Captures published events in order for later inspection. Used by tests
//! and by deployments with no external broker.

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::EventEnvelope;
use crate::ports::{EventPublisher, PublishError};

/// In-memory event bus.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// mediator.send(&ctx, command).await?;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event("user.created.v1"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
    /// When set, every publish fails with this reason.
    failure: RwLock<Option<String>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus that rejects every event with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            published: RwLock::default(),
            failure: RwLock::new(Some(reason.into())),
        }
    }

    // === Inspection ===

    /// All published events, oldest first.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), PublishError> {
        let failure = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(reason) = failure {
            return Err(PublishError {
                event_type: event.event_type,
                reason,
            });
        }

        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), PublishError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
