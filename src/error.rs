//! Error types for snapshot processing.
//!
//! All errors implement `std::error::Error` and carry enough structured context
//! to tell a caller which snapshot or field failed and whether retrying makes sense.
//!
//! ## Error Categories
//!
//! - **Validation Errors**: a required counter of a snapshot is missing or mistyped
//! - **No Data**: the background reader has not mirrored a topic yet
//! - **Provider Errors**: the mirror source failed to attach or to produce an update
//! - **Replay Errors**: a recorded session could not be opened or parsed
//! - **Config Errors**: a configuration document could not be parsed
//!
//! Torn reads and mismatched optional fields are deliberately absent from this
//! list: the former are retried and surfaced as stale snapshots, the latter
//! resolve to absent fields.
//!
//! ```rust
//! use rf2_pitwall::TelemetryError;
//!
//! let error = TelemetryError::validation("Scoring", "mVersionUpdateBegin", "integer", "missing");
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::types::Topic;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Validation failed for {record}.{field}: expected {expected}, found {found}")]
    Validation { record: String, field: String, expected: &'static str, found: String },

    #[error("No {topic} snapshot available yet")]
    NoData { topic: Topic },

    #[error("Provider failure: {reason}")]
    Provider {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Replay file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Unknown endpoint '{path}'")]
    UnknownEndpoint { path: String },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::NoData { .. } => true,
            TelemetryError::Provider { .. } => true,
            TelemetryError::Timeout { .. } => true,
            TelemetryError::Validation { .. } => false,
            TelemetryError::File { .. } => false,
            TelemetryError::Parse { .. } => false,
            TelemetryError::UnknownEndpoint { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Validation { .. } => vec![
                "Check that the shared-memory plugin matches the expected layout version",
                "Verify the reader exposes the version counters on the top-level record",
                "Retry once the simulator has finished loading the session",
            ],
            TelemetryError::NoData { .. } => vec![
                "Ensure rFactor 2 is running with the shared-memory plugin enabled",
                "Wait for the background reader to attach",
                "Check the reader logs for attach failures",
            ],
            TelemetryError::Provider { .. } => vec![
                "Ensure rFactor 2 is running",
                "Check permissions for shared memory access",
                "Restart the background reader",
            ],
            TelemetryError::File { .. } => vec![
                "Check the recording exists and is readable",
                "Check file permissions",
            ],
            TelemetryError::Parse { .. } => vec![
                "Check data format compatibility",
                "Verify source data integrity",
            ],
            TelemetryError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Verify the simulator is responding",
            ],
            TelemetryError::UnknownEndpoint { .. } => vec![
                "Use one of /, /healthz, /scoring/, /telemetry/, /running/, /session/",
            ],
        }
    }

    /// Helper constructor for validation errors on required fields.
    pub fn validation(
        record: impl Into<String>,
        field: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        TelemetryError::Validation {
            record: record.into(),
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// Helper constructor for provider failures.
    pub fn provider_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Provider { reason: reason.into(), source: None }
    }

    /// Helper constructor for provider failures with source.
    pub fn provider_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Provider { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Parse { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Parse { context: "JSON".to_string(), details: err.to_string() }
    }
}
