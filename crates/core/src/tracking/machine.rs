//! Per-worker work-session state machine
//!
//! Two states, `Idle` and `Working`, with no terminal state - the machine
//! runs until the manager tears it down. Sample-driven and timer-driven
//! evaluation funnel through one `evaluate` function so the two trigger
//! paths can never drift apart.

use chrono::{DateTime, Utc};
use fieldarc_domain::constants::MOVEMENT_NOISE_FLOOR_METERS;
use fieldarc_domain::{
    GeoPoint, PositionSample, SessionEndReason, SessionStartReason, TrackerConfig, TrackingState,
    TrackingStatus, WorkSession, WorkSummary,
};
use tracing::{debug, info};

use crate::geo::distance_meters;
use crate::geofence::GeofenceEvaluator;
use crate::policy::is_within_working_hours;

/// A trigger into the state machine
#[derive(Debug, Clone)]
pub enum Trigger {
    /// A fresh position sample arrived from the feed
    Sample(PositionSample),
    /// The periodic watchdog fired; evaluates with the last known position
    Tick,
    /// Explicit manual start; bypasses geofence and working-hours gating
    ManualStart,
    /// Explicit manual stop
    ManualStop,
}

/// Outcome of one transition evaluation
#[derive(Debug, Clone)]
pub enum Transition {
    /// A new session was opened
    Started(WorkSession),
    /// The open session was closed (whether or not it was retained)
    Ended(WorkSession),
    /// No state change; also the answer to a redundant manual trigger
    Unchanged,
}

impl Transition {
    /// True when the evaluation changed the Working/Idle state
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Idle/Working state machine for one tracked worker
///
/// Time is injected by the caller on every evaluation, which keeps the
/// machine synchronous and deterministic under test. The manager supplies
/// `Utc::now()` in production.
pub struct WorkSessionStateMachine {
    worker_id: String,
    config: TrackerConfig,
    geofence: GeofenceEvaluator,
    state: TrackingState,
    started_at: DateTime<Utc>,
    current_session: Option<WorkSession>,
    last_position: Option<PositionSample>,
    last_movement_at: DateTime<Utc>,
    total_work_time_ms: i64,
    history: Vec<WorkSession>,
}

impl WorkSessionStateMachine {
    /// Create a machine in the `Idle` state
    #[must_use]
    pub fn new(
        worker_id: impl Into<String>,
        config: TrackerConfig,
        geofence: GeofenceEvaluator,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            config,
            geofence,
            state: TrackingState::Idle,
            started_at: now,
            current_session: None,
            last_position: None,
            last_movement_at: now,
            total_work_time_ms: 0,
            history: Vec::new(),
        }
    }

    /// The worker this machine tracks
    #[must_use]
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Current Working/Idle state
    #[must_use]
    pub const fn state(&self) -> TrackingState {
        self.state
    }

    /// Read-only snapshot of the tracking session
    #[must_use]
    pub fn status(&self) -> TrackingStatus {
        TrackingStatus {
            worker_id: self.worker_id.clone(),
            state: self.state,
            started_at: self.started_at,
            current_session: self.current_session.clone(),
            last_position: self.last_position.clone(),
            last_movement_at: self.last_movement_at,
            total_work_time_ms: self.total_work_time_ms,
            session_history: self.history.clone(),
        }
    }

    /// Aggregate summary for teardown
    #[must_use]
    pub fn summary(&self, stopped_at: DateTime<Utc>) -> WorkSummary {
        WorkSummary {
            worker_id: self.worker_id.clone(),
            started_at: self.started_at,
            stopped_at,
            total_work_time_ms: self.total_work_time_ms,
            sessions: self.history.clone(),
        }
    }

    /// Evaluate one trigger against the current state
    ///
    /// All trigger kinds pass through here. A redundant manual trigger
    /// (start while `Working`, stop while `Idle`) yields
    /// `Transition::Unchanged` - a no-op, never an error.
    pub fn evaluate(&mut self, trigger: Trigger, now: DateTime<Utc>) -> Transition {
        match trigger {
            Trigger::Sample(sample) => {
                self.observe(sample);
                self.evaluate_position(now)
            }
            Trigger::Tick => self.evaluate_position(now),
            Trigger::ManualStart => match self.state {
                TrackingState::Working => Transition::Unchanged,
                TrackingState::Idle => {
                    let position = self.last_position.as_ref().map(|s| s.point);
                    self.start_session(SessionStartReason::Manual, position, now)
                }
            },
            Trigger::ManualStop => match self.state {
                TrackingState::Idle => Transition::Unchanged,
                TrackingState::Working => self.end_session(SessionEndReason::Manual, now),
            },
        }
    }

    /// Fold a fresh sample into movement tracking
    ///
    /// Samples are applied in arrival order. `last_movement_at` only ever
    /// moves forward, so duplicate or out-of-order timestamps cannot roll
    /// the inactivity window back.
    fn observe(&mut self, sample: PositionSample) {
        let moved = match self.last_position.as_ref() {
            Some(prev) => {
                distance_meters(&prev.point, &sample.point) > MOVEMENT_NOISE_FLOOR_METERS
            }
            // The first fix counts as movement
            None => true,
        };
        if moved {
            self.last_movement_at = self.last_movement_at.max(sample.observed_at);
        }
        self.last_position = Some(sample);
    }

    /// Geofence and inactivity evaluation using the last known position
    fn evaluate_position(&mut self, now: DateTime<Utc>) -> Transition {
        let distance = self
            .last_position
            .as_ref()
            .map(|sample| self.geofence.distance_to_nearest_zone(&sample.point));

        match self.state {
            TrackingState::Idle => {
                let Some(distance) = distance else { return Transition::Unchanged };
                let in_hours = is_within_working_hours(
                    now,
                    self.config.working_hours_start,
                    self.config.working_hours_end,
                    self.config.timezone,
                );
                if distance <= self.config.auto_start_threshold_m && in_hours {
                    let position = self.last_position.as_ref().map(|s| s.point);
                    self.start_session(SessionStartReason::AutoNearZone, position, now)
                } else {
                    Transition::Unchanged
                }
            }
            TrackingState::Working => {
                if let Some(distance) = distance {
                    if distance > self.config.auto_stop_threshold_m {
                        return self.end_session(SessionEndReason::AutoLeftZone, now);
                    }
                }
                let deadline = self.last_movement_at + self.config.inactivity_timeout();
                if now > deadline {
                    // The session stops counting when movement stopped, not
                    // when the watchdog happens to notice.
                    return self.end_session(SessionEndReason::AutoInactivity, deadline);
                }
                Transition::Unchanged
            }
        }
    }

    fn start_session(
        &mut self,
        reason: SessionStartReason,
        position: Option<GeoPoint>,
        now: DateTime<Utc>,
    ) -> Transition {
        let session = WorkSession::open(now, reason, position);
        self.state = TrackingState::Working;
        // Arm the inactivity window from the session start so a stale fix
        // cannot expire a session the moment it opens
        self.last_movement_at = self.last_movement_at.max(now);
        self.current_session = Some(session.clone());
        info!(worker_id = %self.worker_id, reason = %reason, "Work session started");
        Transition::Started(session)
    }

    fn end_session(&mut self, reason: SessionEndReason, end_time: DateTime<Utc>) -> Transition {
        let Some(mut session) = self.current_session.take() else {
            return Transition::Unchanged;
        };
        let end_time = end_time.max(session.start_time);
        session.end_time = Some(end_time);
        session.end_reason = Some(reason);
        session.end_position = self.last_position.as_ref().map(|s| s.point);
        session.duration_ms = (end_time - session.start_time).num_milliseconds();
        self.state = TrackingState::Idle;

        let retained = session.duration_ms >= self.config.minimum_session_time_ms as i64;
        if retained {
            self.total_work_time_ms += session.duration_ms;
            self.history.push(session.clone());
        } else {
            debug!(
                worker_id = %self.worker_id,
                duration_ms = session.duration_ms,
                "Session below minimum length; discarded from history"
            );
        }
        info!(
            worker_id = %self.worker_id,
            reason = %reason,
            duration_ms = session.duration_ms,
            retained,
            "Work session ended"
        );
        Transition::Ended(session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use fieldarc_domain::{GeoPoint, WorkZone};

    use super::*;

    // One degree of longitude on the equator under the spherical model
    const DEGREE_M: f64 = 111_194.9;

    /// Point `meters` east of the origin, on the equator
    fn point_at(meters: f64) -> GeoPoint {
        GeoPoint::new(0.0, meters / DEGREE_M)
    }

    fn sample_at(meters: f64, at: DateTime<Utc>) -> PositionSample {
        PositionSample::observed(point_at(meters), 5.0, at)
    }

    /// Zero-radius zone at the origin, so distance-to-boundary equals
    /// distance-to-center
    fn geofence() -> GeofenceEvaluator {
        GeofenceEvaluator::new(vec![WorkZone::new(
            "depot",
            "Depot",
            GeoPoint::new(0.0, 0.0),
            0.0,
        )])
    }

    /// Reference configuration: 100 m start, 300 m stop, 15 min
    /// inactivity, 5 min minimum, working hours [5, 22] UTC
    fn config() -> TrackerConfig {
        TrackerConfig {
            auto_start_threshold_m: 100.0,
            auto_stop_threshold_m: 300.0,
            inactivity_timeout_ms: 900_000,
            minimum_session_time_ms: 300_000,
            working_hours_start: 5,
            working_hours_end: 22,
            timezone: chrono_tz::Tz::UTC,
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).single().expect("valid timestamp")
    }

    fn machine() -> WorkSessionStateMachine {
        WorkSessionStateMachine::new("w-1", config(), geofence(), at(7, 0))
    }

    #[test]
    fn auto_start_fires_near_zone_during_working_hours() {
        let mut m = machine();
        let t = at(8, 0);
        let transition = m.evaluate(Trigger::Sample(sample_at(50.0, t)), t);

        assert!(matches!(transition, Transition::Started(_)));
        assert_eq!(m.state(), TrackingState::Working);
        let status = m.status();
        let session = status.current_session.expect("session open");
        assert_eq!(session.start_reason, SessionStartReason::AutoNearZone);
        assert_eq!(session.start_position, Some(point_at(50.0)));
    }

    #[test]
    fn auto_start_does_not_fire_outside_working_hours() {
        let mut m = machine();
        let t = at(23, 50);
        let transition = m.evaluate(Trigger::Sample(sample_at(0.0, t)), t);

        assert!(!transition.changed());
        assert_eq!(m.state(), TrackingState::Idle);
    }

    #[test]
    fn auto_start_does_not_fire_beyond_threshold() {
        let mut m = machine();
        let t = at(8, 0);
        let transition = m.evaluate(Trigger::Sample(sample_at(150.0, t)), t);

        assert!(!transition.changed());
        assert_eq!(m.state(), TrackingState::Idle);
    }

    #[test]
    fn hysteresis_band_does_not_flap() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);
        assert_eq!(m.state(), TrackingState::Working);

        // 200 m is past the start threshold but inside the stop threshold
        let t1 = at(8, 5);
        let transition = m.evaluate(Trigger::Sample(sample_at(200.0, t1)), t1);
        assert!(!transition.changed());
        assert_eq!(m.state(), TrackingState::Working);
    }

    #[test]
    fn leaving_the_zone_closes_with_duration_and_reason() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        let t1 = at(8, 20);
        let transition = m.evaluate(Trigger::Sample(sample_at(350.0, t1)), t1);

        let Transition::Ended(session) = transition else { panic!("expected Ended") };
        assert_eq!(session.end_reason, Some(SessionEndReason::AutoLeftZone));
        assert_eq!(session.duration_ms, 20 * 60 * 1000);
        assert_eq!(session.end_position, Some(point_at(350.0)));
        assert_eq!(m.status().total_work_time_ms, 20 * 60 * 1000);
        assert_eq!(m.status().session_history.len(), 1);
    }

    #[test]
    fn inactivity_closes_at_last_movement_plus_timeout() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        // Stationary samples (below the noise floor) until 08:10
        for minute in [5u32, 10] {
            let t = at(8, minute);
            let transition = m.evaluate(Trigger::Sample(sample_at(52.0, t)), t);
            assert!(!transition.changed());
        }

        // Watchdog fires at 08:16 - one minute after the deadline
        let t_tick = at(8, 16);
        let transition = m.evaluate(Trigger::Tick, t_tick);

        let Transition::Ended(session) = transition else { panic!("expected Ended") };
        assert_eq!(session.end_reason, Some(SessionEndReason::AutoInactivity));
        assert_eq!(session.end_time, Some(at(8, 15)));
        assert_eq!(session.duration_ms, 15 * 60 * 1000);
        assert_eq!(m.status().total_work_time_ms, 15 * 60 * 1000);
    }

    #[test]
    fn inactivity_fires_with_zero_new_samples() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        // No further samples at all; only the watchdog
        let transition = m.evaluate(Trigger::Tick, at(8, 14));
        assert!(!transition.changed());

        let transition = m.evaluate(Trigger::Tick, at(8, 16));
        assert!(matches!(transition, Transition::Ended(_)));
        assert_eq!(m.state(), TrackingState::Idle);
    }

    #[test]
    fn movement_above_noise_floor_resets_inactivity() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        // 30 m jump at 08:10 counts as movement
        let t1 = at(8, 10);
        m.evaluate(Trigger::Sample(sample_at(80.0, t1)), t1);

        // 08:20 is inside the refreshed window (deadline 08:25)
        let transition = m.evaluate(Trigger::Tick, at(8, 20));
        assert!(!transition.changed());
        assert_eq!(m.state(), TrackingState::Working);
    }

    #[test]
    fn out_of_order_timestamps_do_not_roll_movement_back() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        // Real movement at 08:10
        m.evaluate(Trigger::Sample(sample_at(100.0, at(8, 10))), at(8, 10));
        // A delayed sample stamped 08:02 arrives afterwards, far enough to
        // count as movement; it must not rewind the window
        m.evaluate(Trigger::Sample(sample_at(50.0, at(8, 2))), at(8, 11));

        assert_eq!(m.status().last_movement_at, at(8, 10));
    }

    #[test]
    fn short_session_is_discarded_but_still_ends() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        // Leaves after two minutes - below the five-minute minimum
        let t1 = at(8, 2);
        let transition = m.evaluate(Trigger::Sample(sample_at(400.0, t1)), t1);

        let Transition::Ended(session) = transition else { panic!("expected Ended") };
        assert_eq!(session.duration_ms, 2 * 60 * 1000);
        assert!(m.status().session_history.is_empty());
        assert_eq!(m.status().total_work_time_ms, 0);
    }

    #[test]
    fn manual_start_is_idempotent() {
        let mut m = machine();
        let first = m.evaluate(Trigger::ManualStart, at(8, 0));
        assert!(matches!(first, Transition::Started(_)));
        let open_id = m.status().current_session.expect("open").id;

        let second = m.evaluate(Trigger::ManualStart, at(8, 1));
        assert!(!second.changed());
        assert_eq!(m.status().current_session.expect("still open").id, open_id);
    }

    #[test]
    fn manual_start_works_outside_hours_and_zone() {
        let mut m = machine();
        let transition = m.evaluate(Trigger::ManualStart, at(23, 50));

        let Transition::Started(session) = transition else { panic!("expected Started") };
        assert_eq!(session.start_reason, SessionStartReason::Manual);
        // No fix yet, so no start position
        assert!(session.start_position.is_none());
    }

    #[test]
    fn manual_stop_when_idle_is_a_no_op() {
        let mut m = machine();
        let transition = m.evaluate(Trigger::ManualStop, at(8, 0));
        assert!(!transition.changed());
    }

    #[test]
    fn session_started_in_hours_survives_past_window_end() {
        let mut m = machine();
        let t0 = at(21, 30);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);
        assert_eq!(m.state(), TrackingState::Working);

        // Still near the zone at 23:10, moving enough to stay active - the
        // working-hours window never stops a session
        let t1 = at(23, 10);
        m.evaluate(Trigger::Sample(sample_at(80.0, t1)), t1);
        assert_eq!(m.state(), TrackingState::Working);

        // It closes normally via distance
        let t2 = at(23, 40);
        let transition = m.evaluate(Trigger::Sample(sample_at(400.0, t2)), t2);
        let Transition::Ended(session) = transition else { panic!("expected Ended") };
        assert_eq!(session.end_reason, Some(SessionEndReason::AutoLeftZone));
    }

    #[test]
    fn idle_after_inactivity_restart_cannot_go_negative() {
        let mut m = machine();
        let t0 = at(8, 0);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);

        // Inactivity closes the first session at 08:15
        let transition = m.evaluate(Trigger::Tick, at(8, 20));
        assert!(matches!(transition, Transition::Ended(_)));

        // A stationary sample restarts a session at 08:21; the stale
        // movement timestamp must not expire it into the past
        let t1 = at(8, 21);
        let transition = m.evaluate(Trigger::Sample(sample_at(50.0, t1)), t1);
        assert!(matches!(transition, Transition::Started(_)));

        let transition = m.evaluate(Trigger::Tick, at(8, 40));
        let Transition::Ended(session) = transition else { panic!("expected Ended") };
        assert_eq!(session.end_time, Some(at(8, 36)));
        assert!(session.duration_ms > 0);
    }

    #[test]
    fn totals_match_retained_history() {
        let mut m = machine();
        let mut expected = 0i64;

        for (start_min, stop_min) in [(0u32, 10u32), (20, 22), (30, 45)] {
            let t0 = at(8, start_min);
            m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);
            let t1 = at(8, stop_min);
            m.evaluate(Trigger::Sample(sample_at(400.0, t1)), t1);

            let duration = i64::from(stop_min - start_min) * 60 * 1000;
            if duration >= 300_000 {
                expected += duration;
            }
        }

        let status = m.status();
        assert_eq!(status.total_work_time_ms, expected);
        let history_sum: i64 = status.session_history.iter().map(|s| s.duration_ms).sum();
        assert_eq!(status.total_work_time_ms, history_sum);
    }

    #[test]
    fn at_most_one_session_is_open_after_any_transition() {
        let mut m = machine();
        let mut t = at(8, 0);
        let triggers = [
            Trigger::Sample(sample_at(50.0, t)),
            Trigger::ManualStart,
            Trigger::Tick,
            Trigger::Sample(sample_at(400.0, at(8, 5))),
            Trigger::ManualStart,
            Trigger::ManualStop,
            Trigger::ManualStop,
        ];
        for trigger in triggers {
            t += Duration::minutes(1);
            let _ = m.evaluate(trigger, t);
            let status = m.status();
            let open = status.current_session.map_or(0, |s| usize::from(s.is_open()));
            match status.state {
                TrackingState::Working => assert_eq!(open, 1),
                TrackingState::Idle => assert_eq!(open, 0),
            }
            assert!(status.session_history.iter().all(|s| !s.is_open()));
        }
    }

    #[test]
    fn tick_with_last_known_position_can_auto_start() {
        let mut m = machine();
        // Sample arrives outside working hours; no session
        let t0 = at(4, 50);
        m.evaluate(Trigger::Sample(sample_at(50.0, t0)), t0);
        assert_eq!(m.state(), TrackingState::Idle);

        // The window opens at 05:00; the next tick auto-starts from the
        // last known position without a fresh sample
        let transition = m.evaluate(Trigger::Tick, at(5, 0));
        assert!(matches!(transition, Transition::Started(_)));
    }
}
