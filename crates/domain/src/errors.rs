//! Error types used throughout the engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FieldArc
///
/// Every variant is scoped to a single worker's tracking session; nothing in
/// the engine treats these as fatal to the process.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FieldArcError {
    #[error("Already tracking worker: {0}")]
    AlreadyTracking(String),

    #[error("Not tracking worker: {0}")]
    NotTracking(String),

    #[error("Position feed error: {0}")]
    PositionFeed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for FieldArc operations
pub type Result<T> = std::result::Result<T, FieldArcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_serialization_is_tagged() {
        let err = FieldArcError::NotTracking("w-17".into());
        let json = serde_json::to_value(&err).expect("serializes");
        assert_eq!(json["type"], "NotTracking");
        assert_eq!(json["message"], "w-17");
    }

    #[test]
    fn error_display_includes_worker() {
        let err = FieldArcError::AlreadyTracking("plow-3".into());
        assert_eq!(err.to_string(), "Already tracking worker: plow-3");
    }
}
