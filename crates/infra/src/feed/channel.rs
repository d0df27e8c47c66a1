//! Push-based position feed
//!
//! Bridges an external position producer (a device GPS callback, a replay
//! driver, a test) into the engine's `PositionFeed` port. Each subscribed
//! worker gets its own bounded channel; producers push updates by worker id.

use async_trait::async_trait;
use dashmap::DashMap;
use fieldarc_core::tracking::ports::{PositionFeed, PositionUpdate};
use fieldarc_domain::constants::FEED_CHANNEL_CAPACITY;
use fieldarc_domain::{FieldArcError, PositionSample, Result};
use tokio::sync::mpsc;
use tracing::debug;

/// Feed adapter fed by explicit `push` calls
#[derive(Default)]
pub struct ChannelPositionFeed {
    senders: DashMap<String, mpsc::Sender<PositionUpdate>>,
}

impl ChannelPositionFeed {
    /// Create a feed with no subscriptions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.senders.len()
    }

    /// Push one update to a subscribed worker
    ///
    /// # Errors
    /// - `FieldArcError::NotTracking` when the worker never subscribed
    /// - `FieldArcError::PositionFeed` when the worker's subscription has
    ///   been torn down (its receiver was dropped); the stale sender is
    ///   removed so later pushes fail fast
    pub async fn push(&self, worker_id: &str, update: PositionUpdate) -> Result<()> {
        let sender = self
            .senders
            .get(worker_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FieldArcError::NotTracking(worker_id.to_string()))?;

        if sender.send(update).await.is_err() {
            self.senders.remove(worker_id);
            return Err(FieldArcError::PositionFeed(format!(
                "subscription for {worker_id} is closed"
            )));
        }
        Ok(())
    }

    /// Convenience wrapper for pushing a good sample
    ///
    /// # Errors
    /// Same as [`ChannelPositionFeed::push`].
    pub async fn push_sample(&self, worker_id: &str, sample: PositionSample) -> Result<()> {
        self.push(worker_id, Ok(sample)).await
    }

    /// Convenience wrapper for pushing a positioning error
    ///
    /// # Errors
    /// Same as [`ChannelPositionFeed::push`].
    pub async fn push_error(&self, worker_id: &str, message: impl Into<String>) -> Result<()> {
        self.push(worker_id, Err(FieldArcError::PositionFeed(message.into()))).await
    }
}

#[async_trait]
impl PositionFeed for ChannelPositionFeed {
    async fn subscribe(&self, worker_id: &str) -> Result<mpsc::Receiver<PositionUpdate>> {
        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        // A re-subscription supersedes any stale sender for the worker
        self.senders.insert(worker_id.to_string(), tx);
        debug!(worker_id, "Position feed subscription opened");
        Ok(rx)
    }
}
