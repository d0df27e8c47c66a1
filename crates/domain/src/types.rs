//! Common data types used throughout the engine

pub mod estimate;
pub mod geo;
pub mod session;

pub use estimate::{EstimateMethod, ScheduleInfo, WorkTimeEstimate};
pub use geo::{GeoPoint, PositionSample, WorkZone};
pub use session::{
    SessionAction, SessionEndReason, SessionEvent, SessionStartReason, TrackingState,
    TrackingStatus, WorkSession, WorkSummary,
};
