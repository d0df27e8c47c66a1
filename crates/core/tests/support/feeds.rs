//! Mock position feed for testing
//!
//! An in-memory feed the test driver pushes updates into, enabling
//! deterministic tracking tests without any GPS hardware.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fieldarc_core::tracking::ports::{PositionFeed, PositionUpdate};
use fieldarc_domain::Result as DomainResult;
use fieldarc_domain::constants::FEED_CHANNEL_CAPACITY;
use tokio::sync::mpsc;

/// In-memory mock for `PositionFeed`.
///
/// Each subscription opens a fresh channel; the test pushes samples or
/// errors through `push`. Dropping the worker-side receiver makes `push`
/// report a closed feed, which the tests use to assert teardown.
#[derive(Default)]
pub struct MockPositionFeed {
    senders: Mutex<HashMap<String, mpsc::Sender<PositionUpdate>>>,
}

impl MockPositionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one update to a subscribed worker.
    ///
    /// Returns false when the worker has no live subscription (never
    /// subscribed, or its receiver was dropped during teardown).
    pub async fn push(&self, worker_id: &str, update: PositionUpdate) -> bool {
        let sender = {
            let senders = self.senders.lock().expect("mock feed mutex poisoned");
            senders.get(worker_id).cloned()
        };
        match sender {
            Some(sender) => sender.send(update).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl PositionFeed for MockPositionFeed {
    async fn subscribe(&self, worker_id: &str) -> DomainResult<mpsc::Receiver<PositionUpdate>> {
        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        self.senders
            .lock()
            .expect("mock feed mutex poisoned")
            .insert(worker_id.to_string(), tx);
        Ok(rx)
    }
}
