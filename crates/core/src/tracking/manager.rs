//! Tracking session manager
//!
//! Owns one isolated tokio task per tracked worker. Commands, feed updates
//! and the inactivity watchdog are multiplexed into each worker's state
//! machine through a single `tokio::select!` loop, so one worker's
//! processing can never block or corrupt another's. The worker map is the
//! only cross-worker shared state besides the read-only zone registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fieldarc_domain::constants::{COMMAND_CHANNEL_CAPACITY, WATCHDOG_INTERVAL_MS};
use fieldarc_domain::{
    FieldArcError, Result, SessionAction, SessionEvent, TrackerConfig, TrackingStatus, WorkSummary,
    WorkZone,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::events::EventNotifier;
use crate::geofence::GeofenceEvaluator;
use crate::tracking::machine::{Transition, Trigger, WorkSessionStateMachine};
use crate::tracking::ports::{PositionFeed, PositionUpdate};

/// Commands routed into a worker task
enum WorkerCommand {
    ManualStart { reply: oneshot::Sender<Transition> },
    ManualStop { reply: oneshot::Sender<Transition> },
    Status { reply: oneshot::Sender<TrackingStatus> },
    Stop { reply: oneshot::Sender<WorkSummary> },
}

/// Handle to one worker's running task
struct WorkerHandle {
    commands: mpsc::Sender<WorkerCommand>,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

/// Manages automatic work-session tracking across many workers
pub struct TrackingSessionManager {
    geofence: GeofenceEvaluator,
    feed: Arc<dyn PositionFeed>,
    notifier: EventNotifier,
    workers: DashMap<String, WorkerHandle>,
    watchdog_interval: Duration,
    join_timeout: Duration,
}

impl TrackingSessionManager {
    /// Create a manager over the given zone registry
    ///
    /// # Errors
    /// Returns `FieldArcError::InvalidInput` when any zone fails validation.
    pub fn new(
        zones: Vec<WorkZone>,
        feed: Arc<dyn PositionFeed>,
        notifier: EventNotifier,
    ) -> Result<Self> {
        for zone in &zones {
            zone.validate()?;
        }
        Ok(Self {
            geofence: GeofenceEvaluator::new(zones),
            feed,
            notifier,
            workers: DashMap::new(),
            watchdog_interval: Duration::from_millis(WATCHDOG_INTERVAL_MS),
            join_timeout: Duration::from_secs(5),
        })
    }

    /// Override the watchdog cadence
    ///
    /// The default of a few seconds suits production; tests shrink it.
    #[must_use]
    pub fn with_watchdog_interval(mut self, interval: Duration) -> Self {
        self.watchdog_interval = interval;
        self
    }

    /// The event notifier this manager publishes through
    #[must_use]
    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    /// True when a tracking session exists for the worker
    #[must_use]
    pub fn is_tracking(&self, worker_id: &str) -> bool {
        self.workers.contains_key(worker_id)
    }

    /// Begin tracking a worker with its own configuration
    ///
    /// Subscribes to the position feed and spawns the worker task with its
    /// inactivity watchdog.
    ///
    /// # Errors
    /// - `FieldArcError::InvalidInput` when the config fails validation
    /// - `FieldArcError::AlreadyTracking` when a session already exists
    /// - `FieldArcError::PositionFeed` when the feed subscription fails
    #[instrument(skip(self, config))]
    pub async fn start_tracking(&self, worker_id: &str, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        if self.workers.contains_key(worker_id) {
            return Err(FieldArcError::AlreadyTracking(worker_id.to_string()));
        }

        let feed_rx = self.feed.subscribe(worker_id).await?;

        // The subscribe await is a race window; re-check under the shard lock
        match self.workers.entry(worker_id.to_string()) {
            Entry::Occupied(_) => Err(FieldArcError::AlreadyTracking(worker_id.to_string())),
            Entry::Vacant(entry) => {
                let machine = WorkSessionStateMachine::new(
                    worker_id,
                    config,
                    self.geofence.clone(),
                    Utc::now(),
                );
                let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
                let cancellation = CancellationToken::new();
                let task = tokio::spawn(worker_loop(
                    machine,
                    cmd_rx,
                    feed_rx,
                    self.notifier.clone(),
                    cancellation.clone(),
                    self.watchdog_interval,
                ));
                entry.insert(WorkerHandle { commands: cmd_tx, cancellation, task });
                info!(worker_id, "Tracking started");
                Ok(())
            }
        }
    }

    /// Stop tracking a worker and return its aggregate summary
    ///
    /// Force-closes any open session with a manual-stop reason, cancels the
    /// worker task and awaits its termination. After this returns, no
    /// further position samples are processed for the worker and its
    /// watchdog timer is gone.
    ///
    /// # Errors
    /// - `FieldArcError::NotTracking` when no session exists
    /// - `FieldArcError::Internal` when the worker task died before
    ///   reporting a summary
    #[instrument(skip(self))]
    pub async fn stop_tracking(&self, worker_id: &str) -> Result<WorkSummary> {
        let (_, handle) = self
            .workers
            .remove(worker_id)
            .ok_or_else(|| FieldArcError::NotTracking(worker_id.to_string()))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let summary = if handle.commands.send(WorkerCommand::Stop { reply: reply_tx }).await.is_ok()
        {
            reply_rx.await.ok()
        } else {
            None
        };

        handle.cancellation.cancel();
        match tokio::time::timeout(self.join_timeout, handle.task).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(worker_id, error = %err, "Worker task panicked during shutdown"),
            Err(_) => warn!(worker_id, "Worker task did not stop within timeout"),
        }

        let summary = summary.ok_or_else(|| {
            FieldArcError::Internal(format!(
                "worker task for {worker_id} terminated before reporting a summary"
            ))
        })?;
        info!(worker_id, total_work_time_ms = summary.total_work_time_ms, "Tracking stopped");
        Ok(summary)
    }

    /// Manually force a session start for a worker
    ///
    /// Returns `Transition::Unchanged` when the worker is already working.
    ///
    /// # Errors
    /// Returns `FieldArcError::NotTracking` when no session exists.
    pub async fn manual_start_work(&self, worker_id: &str) -> Result<Transition> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(worker_id, WorkerCommand::ManualStart { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| task_gone(worker_id))
    }

    /// Manually end the open session for a worker
    ///
    /// Returns `Transition::Unchanged` when the worker is already idle.
    ///
    /// # Errors
    /// Returns `FieldArcError::NotTracking` when no session exists.
    pub async fn manual_stop_work(&self, worker_id: &str) -> Result<Transition> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(worker_id, WorkerCommand::ManualStop { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| task_gone(worker_id))
    }

    /// Read-only snapshot of one worker's tracking session
    ///
    /// # Errors
    /// Returns `FieldArcError::NotTracking` when no session exists.
    pub async fn status(&self, worker_id: &str) -> Result<TrackingStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(worker_id, WorkerCommand::Status { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| task_gone(worker_id))
    }

    /// Snapshot across all currently tracked workers
    pub async fn all_statuses(&self) -> HashMap<String, TrackingStatus> {
        let ids: Vec<String> = self.workers.iter().map(|entry| entry.key().clone()).collect();
        let mut statuses = HashMap::with_capacity(ids.len());
        for id in ids {
            // A worker may stop between the listing and the query; skip it
            if let Ok(status) = self.status(&id).await {
                statuses.insert(id, status);
            }
        }
        statuses
    }

    async fn send(&self, worker_id: &str, command: WorkerCommand) -> Result<()> {
        let commands = {
            let handle = self
                .workers
                .get(worker_id)
                .ok_or_else(|| FieldArcError::NotTracking(worker_id.to_string()))?;
            handle.commands.clone()
            // Shard lock released here, before the await below
        };
        commands.send(command).await.map_err(|_| task_gone(worker_id))
    }
}

fn task_gone(worker_id: &str) -> FieldArcError {
    FieldArcError::Internal(format!("worker task for {worker_id} terminated unexpectedly"))
}

/// Best-effort cleanup: cancel every worker task still running
impl Drop for TrackingSessionManager {
    fn drop(&mut self) {
        for entry in self.workers.iter() {
            if !entry.cancellation.is_cancelled() {
                warn!(worker_id = %entry.key(), "Manager dropped while tracking; cancelling worker task");
                entry.cancellation.cancel();
            }
        }
    }
}

/// Receive from the feed when it is still open, otherwise park forever
async fn recv_update(feed: Option<&mut mpsc::Receiver<PositionUpdate>>) -> Option<PositionUpdate> {
    match feed {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Publish the lifecycle event for a state change, if any
async fn publish_transition(notifier: &EventNotifier, worker_id: &str, transition: &Transition) {
    let (action, session) = match transition {
        Transition::Started(session) => (SessionAction::Started, session.clone()),
        Transition::Ended(session) => (SessionAction::Ended, session.clone()),
        Transition::Unchanged => return,
    };
    let event = SessionEvent {
        worker_id: worker_id.to_string(),
        action,
        session,
        timestamp: Utc::now(),
    };
    notifier.publish(&event).await;
}

/// The isolated per-worker loop
///
/// Everything that can change this worker's state arrives here: feed
/// updates, manual commands, the watchdog tick and cancellation.
async fn worker_loop(
    mut machine: WorkSessionStateMachine,
    mut commands: mpsc::Receiver<WorkerCommand>,
    feed: mpsc::Receiver<PositionUpdate>,
    notifier: EventNotifier,
    cancellation: CancellationToken,
    watchdog_interval: Duration,
) {
    let mut feed = Some(feed);
    let mut watchdog = tokio::time::interval(watchdog_interval);
    watchdog.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancellation.cancelled() => {
                debug!(worker_id = machine.worker_id(), "Worker loop cancelled");
                break;
            }
            command = commands.recv() => {
                match command {
                    Some(WorkerCommand::ManualStart { reply }) => {
                        let transition = machine.evaluate(Trigger::ManualStart, Utc::now());
                        publish_transition(&notifier, machine.worker_id(), &transition).await;
                        let _ = reply.send(transition);
                    }
                    Some(WorkerCommand::ManualStop { reply }) => {
                        let transition = machine.evaluate(Trigger::ManualStop, Utc::now());
                        publish_transition(&notifier, machine.worker_id(), &transition).await;
                        let _ = reply.send(transition);
                    }
                    Some(WorkerCommand::Status { reply }) => {
                        let _ = reply.send(machine.status());
                    }
                    Some(WorkerCommand::Stop { reply }) => {
                        let now = Utc::now();
                        let transition = machine.evaluate(Trigger::ManualStop, now);
                        publish_transition(&notifier, machine.worker_id(), &transition).await;
                        let _ = reply.send(machine.summary(now));
                        break;
                    }
                    // Manager dropped the handle; treat like cancellation
                    None => break,
                }
            }
            update = recv_update(feed.as_mut()), if feed.is_some() => {
                match update {
                    Some(Ok(sample)) => {
                        let transition = machine.evaluate(Trigger::Sample(sample), Utc::now());
                        publish_transition(&notifier, machine.worker_id(), &transition).await;
                    }
                    Some(Err(err)) => {
                        // Transient by contract: keep the last known position
                        warn!(
                            worker_id = machine.worker_id(),
                            error = %err,
                            "Position feed error; keeping last known position"
                        );
                    }
                    None => {
                        info!(
                            worker_id = machine.worker_id(),
                            "Position feed closed; continuing on watchdog ticks"
                        );
                        feed = None;
                    }
                }
            }
            _ = watchdog.tick() => {
                let transition = machine.evaluate(Trigger::Tick, Utc::now());
                publish_transition(&notifier, machine.worker_id(), &transition).await;
            }
        }
    }
}
