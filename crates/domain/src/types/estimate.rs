//! Inactive-worker estimation types
//!
//! Fallback figures for workers who never activate GPS tracking. Estimates
//! are derived from shift-schedule heuristics and are always flagged as such
//! so downstream consumers cannot mistake them for measured time.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_WEEKDAY_SHIFT_MS, DEFAULT_WEEKEND_SHIFT_MS};

/// Shift-schedule parameters for estimation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub weekday_shift_ms: i64,
    pub weekend_shift_ms: i64,
}

impl Default for ScheduleInfo {
    fn default() -> Self {
        Self {
            weekday_shift_ms: DEFAULT_WEEKDAY_SHIFT_MS,
            weekend_shift_ms: DEFAULT_WEEKEND_SHIFT_MS,
        }
    }
}

/// How an estimate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateMethod {
    #[serde(rename = "schedule-heuristic")]
    ScheduleHeuristic,
}

impl fmt::Display for EstimateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScheduleHeuristic => write!(f, "schedule-heuristic"),
        }
    }
}

/// Estimated work time for a worker on a given date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTimeEstimate {
    pub worker_id: String,
    pub date: NaiveDate,
    pub estimated_work_time_ms: i64,
    pub method: EstimateMethod,
    /// Fixed heuristic score; carries no statistical meaning
    pub confidence: f64,
    /// Always true; estimates are never measured time
    pub is_estimate: bool,
}
