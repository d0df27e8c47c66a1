//! Session lifecycle event fan-out
//!
//! The notifier is the only channel by which UI, logging or billing systems
//! observe session starts and ends. Listeners are registered explicitly;
//! there is no ambient global event bus.

use std::sync::Arc;

use async_trait::async_trait;
use fieldarc_domain::{Result, SessionEvent};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Observer port for session lifecycle events
#[async_trait]
pub trait SessionListener: Send + Sync {
    /// Handle one lifecycle event
    async fn on_session_event(&self, event: &SessionEvent) -> Result<()>;
}

/// Fan-out of session lifecycle events to registered listeners
///
/// Delivery is at-least-once per registered listener. A failing listener is
/// logged and skipped; it never blocks delivery to the others and never
/// reaches back into the state machine.
#[derive(Clone, Default)]
pub struct EventNotifier {
    listeners: Arc<RwLock<Vec<Arc<dyn SessionListener>>>>,
}

impl EventNotifier {
    /// Create a notifier with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for all future events
    pub async fn subscribe(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.write().await.push(listener);
    }

    /// Number of currently registered listeners
    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Deliver an event to every registered listener
    pub async fn publish(&self, event: &SessionEvent) {
        // Snapshot the list so delivery happens outside the lock
        let listeners = self.listeners.read().await.clone();
        debug!(
            worker_id = %event.worker_id,
            action = ?event.action,
            listeners = listeners.len(),
            "Publishing session event"
        );
        for listener in listeners {
            if let Err(err) = listener.on_session_event(event).await {
                warn!(
                    worker_id = %event.worker_id,
                    error = %err,
                    "Session listener failed; continuing fan-out"
                );
            }
        }
    }
}
