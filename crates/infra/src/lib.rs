//! # FieldArc Infra
//!
//! Infrastructure adapters for the tracking engine.
//!
//! This crate contains:
//! - Position feed adapters (push-based channel feed, simulated demo feed)
//! - Session event listener adapters
//! - Configuration loading (environment variables and config files)
//!
//! ## Architecture
//! - Implements the ports defined in `fieldarc-core`
//! - All adapters are constructed explicitly and torn down explicitly;
//!   there is no ambient global state

pub mod config;
pub mod feed;
pub mod listeners;

// Re-export commonly used items
pub use config::{load, load_from_env, load_from_file, TrackerSettings};
pub use feed::{ChannelPositionFeed, SimulatedFeedConfig, SimulatedPositionFeed};
pub use listeners::TracingSessionListener;
