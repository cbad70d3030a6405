//! Cache invalidation notifications.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::entities::CacheEvent;

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Fan-out channel for [`CacheEvent`]s.
///
/// Views subscribe to learn when a displayed image must be refetched. Slow
/// subscribers that fall behind see `RecvError::Lagged` and should treat it as
/// a full clear.
#[derive(Debug, Clone)]
pub struct CacheEventBus {
    tx: broadcast::Sender<CacheEvent>,
}

impl CacheEventBus {
    /// Creates a bus buffering `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Registers a new listener.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of live listeners.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Delivers an event to every current listener.
    pub fn publish(&self, event: CacheEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(delivered, "Published cache event");
    }
}

impl Default for CacheEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fingerprint;

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let bus = CacheEventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let event = CacheEvent::Invalidated {
            key: "k".to_string(),
            fingerprint: fingerprint("k"),
        };

        bus.publish(event.clone());

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_listeners_is_silent() {
        let bus = CacheEventBus::new(0);
        bus.publish(CacheEvent::Cleared);
        assert_eq!(bus.receiver_count(), 0);
    }
}
