//! Position feed adapters
//!
//! Implementations of the `PositionFeed` port: a push-based channel feed for
//! bridging device callbacks or tests, and a simulated walker for demos.

pub mod channel;
pub mod simulated;

pub use channel::ChannelPositionFeed;
pub use simulated::{SimulatedFeedConfig, SimulatedPositionFeed};
