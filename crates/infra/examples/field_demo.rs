//! Example: end-to-end automatic tracking with a simulated GPS walk
//!
//! Wires the zone registry, the tracking manager, the simulated position
//! feed and the tracing listener together, then lets one worker walk into
//! the depot zone, dwell there and walk back out.
//!
//! Run it with: ```bash cargo run --example field_demo ```

use std::sync::Arc;
use std::time::Duration;

use fieldarc_core::{EventNotifier, TrackingSessionManager};
use fieldarc_domain::{GeoPoint, TrackerConfig, WorkZone};
use fieldarc_infra::{SimulatedFeedConfig, SimulatedPositionFeed, TracingSessionListener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("FieldArc Tracking Demo");
    println!("======================\n");

    let depot = GeoPoint::new(59.9139, 10.7522);
    let zones = vec![WorkZone::new("depot", "Central Depot", depot, 150.0)];

    let feed = Arc::new(SimulatedPositionFeed::new(SimulatedFeedConfig {
        zone_center: depot,
        sample_interval: Duration::from_millis(250),
        step_m: 60.0,
        start_offset_m: 800.0,
        dwell_samples: 20,
        ..SimulatedFeedConfig::default()
    }));

    let notifier = EventNotifier::new();
    notifier.subscribe(Arc::new(TracingSessionListener::new())).await;

    let manager = TrackingSessionManager::new(zones, feed.clone(), notifier)?
        .with_watchdog_interval(Duration::from_millis(500));

    // Whole-day working hours so the demo behaves the same at any hour;
    // a short inactivity timeout keeps the dwell phase interesting
    let config = TrackerConfig {
        auto_start_threshold_m: 100.0,
        auto_stop_threshold_m: 300.0,
        inactivity_timeout_ms: 10_000,
        minimum_session_time_ms: 0,
        working_hours_start: 0,
        working_hours_end: 23,
        ..TrackerConfig::default()
    };

    manager.start_tracking("plow-17", config).await?;
    println!("Tracking started for plow-17; walking toward the depot...\n");

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let status = manager.status("plow-17").await?;
        println!(
            "  state={:?} sessions={} total_work_time_ms={}",
            status.state,
            status.session_history.len(),
            status.total_work_time_ms
        );
    }

    let summary = manager.stop_tracking("plow-17").await?;
    feed.shutdown();

    println!("\nFinal summary for {}:", summary.worker_id);
    println!("  retained sessions: {}", summary.sessions.len());
    println!("  total work time:   {} ms", summary.total_work_time_ms);
    for session in &summary.sessions {
        println!(
            "  - {} -> {:?} ({} ms, ended: {})",
            session.start_reason,
            session.end_reason,
            session.duration_ms,
            session.end_time.map(|t| t.to_rfc3339()).unwrap_or_default()
        );
    }

    Ok(())
}
