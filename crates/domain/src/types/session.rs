//! Work session types
//!
//! A work session is one continuous interval treated as billable time for a
//! worker. Sessions are created and closed by the tracking state machine;
//! consumers only ever see them through status snapshots, summaries and
//! lifecycle events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::{GeoPoint, PositionSample};

/// Why a session was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStartReason {
    /// Worker came within the auto-start threshold of a zone during working
    /// hours
    #[serde(rename = "Auto-start: near work zone")]
    AutoNearZone,

    /// Explicit manual trigger; bypasses geofence and working-hours gating
    #[serde(rename = "Manual start")]
    Manual,
}

impl fmt::Display for SessionStartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoNearZone => write!(f, "Auto-start: near work zone"),
            Self::Manual => write!(f, "Manual start"),
        }
    }
}

/// Why a session was ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEndReason {
    /// Worker moved beyond the auto-stop threshold from every zone
    #[serde(rename = "Auto-stop: left work zone")]
    AutoLeftZone,

    /// No movement above the noise floor for longer than the inactivity
    /// timeout
    #[serde(rename = "Auto-stop: inactivity timeout")]
    AutoInactivity,

    /// Explicit manual trigger, including forced closure by `stop_tracking`
    #[serde(rename = "Manual stop")]
    Manual,
}

impl fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoLeftZone => write!(f, "Auto-stop: left work zone"),
            Self::AutoInactivity => write!(f, "Auto-stop: inactivity timeout"),
            Self::Manual => write!(f, "Manual stop"),
        }
    }
}

/// One continuous billable interval for a worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_reason: SessionStartReason,
    pub end_reason: Option<SessionEndReason>,
    /// None only for a manual start before the first GPS fix
    pub start_position: Option<GeoPoint>,
    pub end_position: Option<GeoPoint>,
    pub duration_ms: i64,
}

impl WorkSession {
    /// Open a new session
    #[must_use]
    pub fn open(
        start_time: DateTime<Utc>,
        start_reason: SessionStartReason,
        start_position: Option<GeoPoint>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            start_time,
            end_time: None,
            start_reason,
            end_reason: None,
            start_position,
            end_position: None,
            duration_ms: 0,
        }
    }

    /// True while the session has not been closed
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Per-worker tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    Idle,
    Working,
}

/// Session lifecycle action carried by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Started,
    Ended,
}

/// Lifecycle notification delivered to registered listeners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub worker_id: String,
    pub action: SessionAction,
    pub session: WorkSession,
    pub timestamp: DateTime<Utc>,
}

/// Read-only snapshot of one worker's tracking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub worker_id: String,
    pub state: TrackingState,
    pub started_at: DateTime<Utc>,
    pub current_session: Option<WorkSession>,
    pub last_position: Option<PositionSample>,
    /// Last detected movement; initialized to the tracking start instant
    pub last_movement_at: DateTime<Utc>,
    pub total_work_time_ms: i64,
    pub session_history: Vec<WorkSession>,
}

/// Aggregate returned when tracking is stopped for a worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSummary {
    pub worker_id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub total_work_time_ms: i64,
    pub sessions: Vec<WorkSession>,
}
