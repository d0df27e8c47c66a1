//! Inactive-worker estimation
//!
//! Fallback work-time figures for workers who never activate tracking,
//! derived from shift-schedule heuristics. This component never touches live
//! GPS data and runs outside the position-feed path, typically during
//! end-of-day reconciliation.

use chrono::{Datelike, NaiveDate, Weekday};
use fieldarc_domain::constants::ESTIMATE_CONFIDENCE;
use fieldarc_domain::{EstimateMethod, ScheduleInfo, WorkTimeEstimate};
use tracing::debug;

/// Deterministic schedule-based work-time estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct InactiveWorkerEstimator;

impl InactiveWorkerEstimator {
    /// Create a new estimator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Estimate work time for a worker on a date from schedule heuristics
    ///
    /// Weekend dates yield the (shorter) weekend shift length, weekdays the
    /// weekday shift length. The confidence score is a fixed heuristic
    /// constant, not a statistical measure.
    #[must_use]
    pub fn estimate_work_time(
        &self,
        worker_id: &str,
        date: NaiveDate,
        schedule: &ScheduleInfo,
    ) -> WorkTimeEstimate {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let estimated_work_time_ms =
            if weekend { schedule.weekend_shift_ms } else { schedule.weekday_shift_ms };

        debug!(worker_id, %date, weekend, estimated_work_time_ms, "Estimated work time from schedule");

        WorkTimeEstimate {
            worker_id: worker_id.to_string(),
            date,
            estimated_work_time_ms,
            method: EstimateMethod::ScheduleHeuristic,
            confidence: ESTIMATE_CONFIDENCE,
            is_estimate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn weekday_uses_weekday_shift() {
        let estimator = InactiveWorkerEstimator::new();
        // 2026-08-03 is a Monday
        let estimate =
            estimator.estimate_work_time("w-1", date(2026, 8, 3), &ScheduleInfo::default());
        assert_eq!(estimate.estimated_work_time_ms, 8 * 3_600_000);
        assert!(estimate.is_estimate);
        assert_eq!(estimate.method, EstimateMethod::ScheduleHeuristic);
    }

    #[test]
    fn weekend_uses_shorter_shift() {
        let estimator = InactiveWorkerEstimator::new();
        // 2026-08-01 is a Saturday, 2026-08-02 a Sunday
        let saturday =
            estimator.estimate_work_time("w-1", date(2026, 8, 1), &ScheduleInfo::default());
        let sunday =
            estimator.estimate_work_time("w-1", date(2026, 8, 2), &ScheduleInfo::default());
        assert_eq!(saturday.estimated_work_time_ms, 4 * 3_600_000);
        assert_eq!(sunday.estimated_work_time_ms, 4 * 3_600_000);
        assert!(saturday.estimated_work_time_ms < 8 * 3_600_000);
    }

    #[test]
    fn confidence_is_the_fixed_heuristic_score() {
        let estimator = InactiveWorkerEstimator::new();
        let estimate =
            estimator.estimate_work_time("w-1", date(2026, 8, 3), &ScheduleInfo::default());
        assert!((estimate.confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_schedule_is_respected() {
        let estimator = InactiveWorkerEstimator::new();
        let schedule = ScheduleInfo { weekday_shift_ms: 6 * 3_600_000, weekend_shift_ms: 0 };
        let monday = estimator.estimate_work_time("w-1", date(2026, 8, 3), &schedule);
        let saturday = estimator.estimate_work_time("w-1", date(2026, 8, 1), &schedule);
        assert_eq!(monday.estimated_work_time_ms, 6 * 3_600_000);
        assert_eq!(saturday.estimated_work_time_ms, 0);
    }
}
