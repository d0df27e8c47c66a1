//! Session event listener adapters

use async_trait::async_trait;
use fieldarc_core::events::SessionListener;
use fieldarc_domain::{Result, SessionAction, SessionEvent};
use tracing::info;

/// Listener that logs every session lifecycle event through `tracing`
///
/// The default observer wiring: registered on the notifier so operators see
/// session starts and ends without any UI attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSessionListener;

impl TracingSessionListener {
    /// Create a new tracing listener
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionListener for TracingSessionListener {
    async fn on_session_event(&self, event: &SessionEvent) -> Result<()> {
        match event.action {
            SessionAction::Started => info!(
                worker_id = %event.worker_id,
                session_id = %event.session.id,
                reason = %event.session.start_reason,
                "Work session started"
            ),
            SessionAction::Ended => {
                let reason = event.session.end_reason.map(|r| r.to_string()).unwrap_or_default();
                info!(
                    worker_id = %event.worker_id,
                    session_id = %event.session.id,
                    reason = %reason,
                    duration_ms = event.session.duration_ms,
                    "Work session ended"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fieldarc_domain::{SessionStartReason, WorkSession};

    use super::*;

    #[tokio::test]
    async fn logging_a_started_event_succeeds() {
        let listener = TracingSessionListener::new();
        let event = SessionEvent {
            worker_id: "w-1".into(),
            action: SessionAction::Started,
            session: WorkSession::open(Utc::now(), SessionStartReason::Manual, None),
            timestamp: Utc::now(),
        };
        listener.on_session_event(&event).await.expect("logging never fails");
    }
}
