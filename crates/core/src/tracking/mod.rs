//! Automatic work-session tracking
//!
//! The per-worker state machine, the manager that owns one isolated task per
//! tracked worker, and the port through which position samples arrive.

pub mod machine;
pub mod manager;
pub mod ports;

pub use machine::{Transition, Trigger, WorkSessionStateMachine};
pub use manager::TrackingSessionManager;
pub use ports::{PositionFeed, PositionUpdate};
