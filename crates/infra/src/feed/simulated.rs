//! Simulated position feed
//!
//! Walks each subscribed worker toward a zone, lets it dwell inside, then
//! walks it back out, over and over. Stands in for device GPS in demos and
//! soak tests; cadence and geometry are configurable, with a little random
//! jitter so samples look like real fixes.

use std::f64::consts::PI;
use std::time::Duration;

use async_trait::async_trait;
use fieldarc_core::tracking::ports::{PositionFeed, PositionUpdate};
use fieldarc_domain::constants::{EARTH_RADIUS_METERS, FEED_CHANNEL_CAPACITY};
use fieldarc_domain::{GeoPoint, PositionSample, Result};
use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Geometry and cadence of the simulated walk
#[derive(Debug, Clone)]
pub struct SimulatedFeedConfig {
    /// Zone center the walk converges on
    pub zone_center: GeoPoint,
    /// Time between samples
    pub sample_interval: Duration,
    /// Meters covered per sample while walking
    pub step_m: f64,
    /// Offset east of the center where the walk begins and turns around
    pub start_offset_m: f64,
    /// How many samples the worker lingers at the center before heading out
    pub dwell_samples: u32,
    /// Random jitter applied to each sample, in meters
    pub jitter_m: f64,
    /// Reported fix accuracy
    pub accuracy_m: f64,
}

impl Default for SimulatedFeedConfig {
    fn default() -> Self {
        Self {
            zone_center: GeoPoint::new(0.0, 0.0),
            sample_interval: Duration::from_secs(1),
            step_m: 40.0,
            start_offset_m: 600.0,
            dwell_samples: 10,
            jitter_m: 3.0,
            accuracy_m: 8.0,
        }
    }
}

/// Demo feed producing a synthetic walk per subscription
pub struct SimulatedPositionFeed {
    config: SimulatedFeedConfig,
    cancellation: CancellationToken,
}

impl SimulatedPositionFeed {
    /// Create a feed with the given walk parameters
    #[must_use]
    pub fn new(config: SimulatedFeedConfig) -> Self {
        Self { config, cancellation: CancellationToken::new() }
    }

    /// Stop every walker task spawned by this feed
    pub fn shutdown(&self) {
        self.cancellation.cancel();
    }
}

impl Drop for SimulatedPositionFeed {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

#[async_trait]
impl PositionFeed for SimulatedPositionFeed {
    async fn subscribe(&self, worker_id: &str) -> Result<mpsc::Receiver<PositionUpdate>> {
        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        let config = self.config.clone();
        let cancellation = self.cancellation.clone();
        let worker_id = worker_id.to_string();
        tokio::spawn(async move {
            walk_loop(&worker_id, &config, &tx, &cancellation).await;
        });
        Ok(rx)
    }
}

/// Walk phases: approach the center, linger, head back out
enum Phase {
    Inbound,
    Dwelling(u32),
    Outbound,
}

async fn walk_loop(
    worker_id: &str,
    config: &SimulatedFeedConfig,
    tx: &mpsc::Sender<PositionUpdate>,
    cancellation: &CancellationToken,
) {
    let mut interval = tokio::time::interval(config.sample_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut offset_m = config.start_offset_m;
    let mut phase = Phase::Inbound;

    loop {
        tokio::select! {
            () = cancellation.cancelled() => {
                debug!(worker_id, "Simulated walk cancelled");
                break;
            }
            _ = interval.tick() => {}
        }

        let jitter = rand::thread_rng().gen_range(-config.jitter_m..=config.jitter_m);
        let point = offset_east(&config.zone_center, offset_m + jitter);
        let sample = PositionSample::new(point, config.accuracy_m);
        if tx.send(Ok(sample)).await.is_err() {
            // Receiver dropped: the worker stopped tracking
            debug!(worker_id, "Simulated walk subscriber gone");
            break;
        }

        phase = match phase {
            Phase::Inbound => {
                offset_m = (offset_m - config.step_m).max(0.0);
                if offset_m == 0.0 { Phase::Dwelling(config.dwell_samples) } else { Phase::Inbound }
            }
            Phase::Dwelling(remaining) => {
                if remaining == 0 { Phase::Outbound } else { Phase::Dwelling(remaining - 1) }
            }
            Phase::Outbound => {
                offset_m = (offset_m + config.step_m).min(config.start_offset_m);
                if offset_m >= config.start_offset_m { Phase::Inbound } else { Phase::Outbound }
            }
        };
    }
}

/// Point `meters` east of `origin` on the spherical model
///
/// Good enough for demo walks; degrades near the poles where a degree of
/// longitude shrinks toward zero.
fn offset_east(origin: &GeoPoint, meters: f64) -> GeoPoint {
    let meters_per_degree = EARTH_RADIUS_METERS * origin.latitude.to_radians().cos() * PI / 180.0;
    GeoPoint::new(origin.latitude, origin.longitude + meters / meters_per_degree)
}
