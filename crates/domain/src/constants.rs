//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Geometry
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// A position sample counts as movement only when it lands farther than this
// from the previous sample; GPS jitter below the floor must not reset the
// inactivity window.
pub const MOVEMENT_NOISE_FLOOR_METERS: f64 = 10.0;

// Tracking configuration defaults
pub const DEFAULT_AUTO_START_THRESHOLD_METERS: f64 = 100.0;
pub const DEFAULT_AUTO_STOP_THRESHOLD_METERS: f64 = 300.0;
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 900_000; // 15 minutes
pub const DEFAULT_MINIMUM_SESSION_TIME_MS: u64 = 300_000; // 5 minutes
pub const DEFAULT_WORKING_HOURS_START: u32 = 5;
pub const DEFAULT_WORKING_HOURS_END: u32 = 22;

// Per-worker watchdog cadence for the inactivity check
pub const WATCHDOG_INTERVAL_MS: u64 = 5_000;

// Channel capacities for the per-worker task
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;
pub const FEED_CHANNEL_CAPACITY: usize = 64;

// Inactive-worker estimation heuristics
pub const ESTIMATE_CONFIDENCE: f64 = 0.75;
pub const DEFAULT_WEEKDAY_SHIFT_MS: i64 = 8 * 3_600_000;
pub const DEFAULT_WEEKEND_SHIFT_MS: i64 = 4 * 3_600_000;
