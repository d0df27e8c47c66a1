//! Mock session listeners for testing

use std::sync::Mutex;

use async_trait::async_trait;
use fieldarc_core::events::SessionListener;
use fieldarc_domain::{Result as DomainResult, SessionEvent};

/// Listener that records every event it receives.
#[derive(Default)]
pub struct CapturingListener {
    events: Mutex<Vec<SessionEvent>>,
}

impl CapturingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().expect("listener mutex poisoned").clone()
    }
}

#[async_trait]
impl SessionListener for CapturingListener {
    async fn on_session_event(&self, event: &SessionEvent) -> DomainResult<()> {
        self.events.lock().expect("listener mutex poisoned").push(event.clone());
        Ok(())
    }
}
