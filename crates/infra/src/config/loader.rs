//! Configuration loader
//!
//! Loads tracker settings from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FIELDARC_AUTO_START_THRESHOLD_M`: Auto-start distance in meters
//! - `FIELDARC_AUTO_STOP_THRESHOLD_M`: Auto-stop distance in meters
//! - `FIELDARC_INACTIVITY_TIMEOUT_MS`: Inactivity timeout in milliseconds
//! - `FIELDARC_MINIMUM_SESSION_TIME_MS`: Minimum retained session length
//! - `FIELDARC_WORKING_HOURS_START`: First auto-start hour (inclusive)
//! - `FIELDARC_WORKING_HOURS_END`: Last auto-start hour (inclusive)
//! - `FIELDARC_TIMEZONE`: IANA timezone name (optional, defaults to UTC)
//! - `FIELDARC_ZONES`: Work-zone registry as a JSON array (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./fieldarc.toml` or `./fieldarc.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)

use std::path::{Path, PathBuf};

use fieldarc_domain::{FieldArcError, Result, TrackerConfig, WorkZone};
use serde::{Deserialize, Serialize};

/// Tracker configuration plus the work-zone registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub zones: Vec<WorkZone>,
}

impl TrackerSettings {
    /// Validate the tracker config and every zone
    ///
    /// # Errors
    /// Returns `FieldArcError::InvalidInput` on the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        for zone in &self.zones {
            zone.validate()?;
        }
        Ok(())
    }
}

/// Load settings with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `FieldArcError::Config` if settings cannot be loaded from either
/// source, or `FieldArcError::InvalidInput` if they fail validation.
pub fn load() -> Result<TrackerSettings> {
    match load_from_env() {
        Ok(settings) => {
            tracing::info!("Tracker settings loaded from environment variables");
            Ok(settings)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load settings from environment variables
///
/// All required variables must be present; the zone registry and timezone
/// are optional.
///
/// # Errors
/// Returns `FieldArcError::Config` if required variables are missing or have
/// invalid values, or `FieldArcError::InvalidInput` if validation fails.
pub fn load_from_env() -> Result<TrackerSettings> {
    let auto_start_threshold_m = env_f64("FIELDARC_AUTO_START_THRESHOLD_M")?;
    let auto_stop_threshold_m = env_f64("FIELDARC_AUTO_STOP_THRESHOLD_M")?;
    let inactivity_timeout_ms = env_u64("FIELDARC_INACTIVITY_TIMEOUT_MS")?;
    let minimum_session_time_ms = env_u64("FIELDARC_MINIMUM_SESSION_TIME_MS")?;
    let working_hours_start = env_u32("FIELDARC_WORKING_HOURS_START")?;
    let working_hours_end = env_u32("FIELDARC_WORKING_HOURS_END")?;

    let timezone = match std::env::var("FIELDARC_TIMEZONE") {
        Ok(name) => name
            .parse()
            .map_err(|e| FieldArcError::Config(format!("Invalid timezone: {e}")))?,
        Err(_) => chrono_tz::Tz::UTC,
    };

    let zones = match std::env::var("FIELDARC_ZONES") {
        Ok(json) => serde_json::from_str(&json)
            .map_err(|e| FieldArcError::Config(format!("Invalid zone registry JSON: {e}")))?,
        Err(_) => Vec::new(),
    };

    let settings = TrackerSettings {
        tracker: TrackerConfig {
            auto_start_threshold_m,
            auto_stop_threshold_m,
            inactivity_timeout_ms,
            minimum_session_time_ms,
            working_hours_start,
            working_hours_end,
            timezone,
        },
        zones,
    };
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a file
///
/// Probes the default path list when no explicit path is given. The format
/// is inferred from the extension: `.json` is parsed as JSON, everything
/// else as TOML.
///
/// # Errors
/// Returns `FieldArcError::Config` if no file is found or the contents fail
/// to parse, or `FieldArcError::InvalidInput` if validation fails.
pub fn load_from_file(path: Option<&Path>) -> Result<TrackerSettings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            FieldArcError::Config("No config file found in any probed location".to_string())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        FieldArcError::Config(format!("Failed to read {}: {e}", path.display()))
    })?;

    let settings: TrackerSettings = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&contents)
            .map_err(|e| FieldArcError::Config(format!("Invalid JSON in {}: {e}", path.display())))?
    } else {
        toml::from_str(&contents)
            .map_err(|e| FieldArcError::Config(format!("Invalid TOML in {}: {e}", path.display())))?
    };

    settings.validate()?;
    tracing::info!(path = %path.display(), zones = settings.zones.len(), "Tracker settings loaded from file");
    Ok(settings)
}

fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "config.toml",
        "config.json",
        "fieldarc.toml",
        "fieldarc.json",
        "../config.toml",
        "../config.json",
    ];
    CANDIDATES.iter().map(PathBuf::from).find(|p| p.is_file())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| FieldArcError::Config(format!("Missing environment variable: {name}")))
}

fn env_f64(name: &str) -> Result<f64> {
    env_var(name)?
        .parse()
        .map_err(|e| FieldArcError::Config(format!("Invalid value for {name}: {e}")))
}

fn env_u64(name: &str) -> Result<u64> {
    env_var(name)?
        .parse()
        .map_err(|e| FieldArcError::Config(format!("Invalid value for {name}: {e}")))
}

fn env_u32(name: &str) -> Result<u32> {
    env_var(name)?
        .parse()
        .map_err(|e| FieldArcError::Config(format!("Invalid value for {name}: {e}")))
}
