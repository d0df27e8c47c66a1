//! Tracking configuration
//!
//! Per-worker configuration supplied at `start_tracking` time. A config is
//! immutable for the lifetime of the tracking session it was started with;
//! different workers may track with different configs.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_START_THRESHOLD_METERS, DEFAULT_AUTO_STOP_THRESHOLD_METERS,
    DEFAULT_INACTIVITY_TIMEOUT_MS, DEFAULT_MINIMUM_SESSION_TIME_MS, DEFAULT_WORKING_HOURS_END,
    DEFAULT_WORKING_HOURS_START,
};
use crate::errors::{FieldArcError, Result};

fn default_timezone() -> Tz {
    Tz::UTC
}

/// Configuration for one worker's automatic tracking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum distance from a zone boundary at which a session auto-starts
    pub auto_start_threshold_m: f64,

    /// Minimum distance from all zone boundaries at which a session
    /// auto-stops; kept larger than the start threshold so the boundary
    /// cannot flap a session on and off
    pub auto_stop_threshold_m: f64,

    /// Maximum elapsed time without detected movement before an open session
    /// is force-ended
    pub inactivity_timeout_ms: u64,

    /// Sessions shorter than this are discarded from history and totals
    pub minimum_session_time_ms: u64,

    /// First local hour-of-day (inclusive) during which auto-start may fire
    pub working_hours_start: u32,

    /// Last local hour-of-day (inclusive) during which auto-start may fire
    pub working_hours_end: u32,

    /// Timezone used to resolve the local hour-of-day for working hours
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            auto_start_threshold_m: DEFAULT_AUTO_START_THRESHOLD_METERS,
            auto_stop_threshold_m: DEFAULT_AUTO_STOP_THRESHOLD_METERS,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            minimum_session_time_ms: DEFAULT_MINIMUM_SESSION_TIME_MS,
            working_hours_start: DEFAULT_WORKING_HOURS_START,
            working_hours_end: DEFAULT_WORKING_HOURS_END,
            timezone: default_timezone(),
        }
    }
}

impl TrackerConfig {
    /// Validate the configuration invariants
    ///
    /// # Errors
    /// Returns `FieldArcError::InvalidInput` if:
    /// - either distance threshold is negative or non-finite
    /// - `auto_stop_threshold_m` is smaller than `auto_start_threshold_m`
    /// - either working hour lies outside `0..=23`
    /// - the working-hours window is inverted
    pub fn validate(&self) -> Result<()> {
        if !self.auto_start_threshold_m.is_finite() || self.auto_start_threshold_m < 0.0 {
            return Err(FieldArcError::InvalidInput(format!(
                "auto_start_threshold_m must be finite and non-negative, got {}",
                self.auto_start_threshold_m
            )));
        }
        if !self.auto_stop_threshold_m.is_finite() || self.auto_stop_threshold_m < 0.0 {
            return Err(FieldArcError::InvalidInput(format!(
                "auto_stop_threshold_m must be finite and non-negative, got {}",
                self.auto_stop_threshold_m
            )));
        }
        if self.auto_stop_threshold_m < self.auto_start_threshold_m {
            return Err(FieldArcError::InvalidInput(format!(
                "auto_stop_threshold_m ({}) must not be smaller than auto_start_threshold_m ({})",
                self.auto_stop_threshold_m, self.auto_start_threshold_m
            )));
        }
        if self.working_hours_start > 23 || self.working_hours_end > 23 {
            return Err(FieldArcError::InvalidInput(format!(
                "working hours must lie in 0..=23, got [{}, {}]",
                self.working_hours_start, self.working_hours_end
            )));
        }
        if self.working_hours_start > self.working_hours_end {
            return Err(FieldArcError::InvalidInput(format!(
                "working-hours window is inverted: [{}, {}]",
                self.working_hours_start, self.working_hours_end
            )));
        }
        Ok(())
    }

    /// Inactivity timeout as a chrono duration
    #[must_use]
    pub fn inactivity_timeout(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.inactivity_timeout_ms as i64)
    }

    /// Minimum retained session length as a chrono duration
    #[must_use]
    pub fn minimum_session_time(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.minimum_session_time_ms as i64)
    }
}
