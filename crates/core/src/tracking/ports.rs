//! Port interfaces for position tracking
//!
//! These traits define the boundary between core tracking logic and the
//! infrastructure that produces position data (device GPS, simulated demo
//! feeds, replay files).

use async_trait::async_trait;
use fieldarc_domain::{FieldArcError, PositionSample, Result};
use tokio::sync::mpsc;

/// One feed delivery: a position sample, or a positioning error for that tick
///
/// An error is transient by contract - the engine logs it and keeps using the
/// last known position until a good sample arrives.
pub type PositionUpdate = std::result::Result<PositionSample, FieldArcError>;

/// Trait for sources of per-worker position samples
#[async_trait]
pub trait PositionFeed: Send + Sync {
    /// Open a stream of position updates for one worker
    ///
    /// The subscription lives until the returned receiver is dropped; the
    /// feed must tolerate that at any moment. Delivery cadence is not
    /// guaranteed - updates may be arbitrarily delayed or missing.
    ///
    /// # Errors
    /// Returns `FieldArcError::PositionFeed` when the source cannot provide
    /// positions for this worker at all.
    async fn subscribe(&self, worker_id: &str) -> Result<mpsc::Receiver<PositionUpdate>>;
}
