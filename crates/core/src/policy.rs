//! Working-hours policy
//!
//! Gates automatic session starts only. A session begun inside the window is
//! always allowed to run past its end and close naturally via distance or
//! inactivity.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

/// True iff the hour-of-day of `ts`, resolved in `tz`, lies in
/// `[start_hour, end_hour]` inclusive
#[must_use]
pub fn is_within_working_hours(ts: DateTime<Utc>, start_hour: u32, end_hour: u32, tz: Tz) -> bool {
    let hour = ts.with_timezone(&tz).hour();
    (start_hour..=end_hour).contains(&hour)
}
