//! Per-dispatch event recording.

use std::sync::Mutex;

use crate::domain::foundation::EventEnvelope;

/// Collects the events a handler emits during one dispatch.
///
/// Events are only published after the handler succeeded, so a failed or
/// rolled back request never announces changes that did not happen.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<EventEnvelope>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: EventEnvelope) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    /// Removes and returns everything recorded so far, in order.
    pub fn take(&self) -> Vec<EventEnvelope> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SerializableDomainEvent, UserId};
    use crate::domain::user::UserActivated;

    #[test]
    fn take_drains_in_order() {
        let recorder = EventRecorder::new();
        let first = UserActivated::new(UserId::new(), UserId::new()).to_envelope();
        let second = UserActivated::new(UserId::new(), UserId::new()).to_envelope();
        recorder.record(first.clone());
        recorder.record(second.clone());

        let taken = recorder.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].event_id, first.event_id);
        assert_eq!(taken[1].event_id, second.event_id);
        assert!(recorder.is_empty());
    }
}
