//! Runtime configuration
//!
//! Every section has defaults, so an empty document is a valid configuration.
//!
//! ```rust
//! use rf2_pitwall::PitwallConfig;
//!
//! let config = PitwallConfig::from_yaml("snapshot:\n  max_attempts: 8\n").unwrap();
//! assert_eq!(config.snapshot.max_attempts, 8);
//! assert_eq!(config.driver.max_errors, 10);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::snapshot::{DEFAULT_MAX_ATTEMPTS, SnapshotReader};
use crate::{Result, TelemetryError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitwallConfig {
    pub snapshot: SnapshotConfig,
    pub driver: DriverConfig,
    pub replay: ReplayConfig,
}

/// Torn-read retry policy of the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Decode attempts before a torn snapshot is served as stale.
    pub max_attempts: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl SnapshotConfig {
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(self.max_attempts)
    }
}

/// Error budget of the background reader task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Consecutive provider errors before the reader gives up.
    pub max_errors: u32,
    /// First backoff delay, doubled per consecutive error.
    pub backoff_base_ms: u64,
    /// Upper bound on the backoff delay.
    pub backoff_max_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { max_errors: 10, backoff_base_ms: 50, backoff_max_ms: 1600 }
    }
}

impl DriverConfig {
    /// Backoff after the `error_count`-th consecutive error: 50ms, 100ms, 200ms, ...
    pub fn backoff(&self, error_count: u32) -> Duration {
        let factor = 1u64 << error_count.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor).min(self.backoff_max_ms))
    }
}

/// Pacing of recorded mirror updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Updates per second.
    pub tick_rate: f64,
    /// Playback speed multiplier.
    pub speed: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { tick_rate: 50.0, speed: 1.0 }
    }
}

impl PitwallConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::parse_error("configuration", e.to_string()))
    }

    /// Read and parse a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(PitwallConfig::from_yaml("{}").unwrap(), PitwallConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PitwallConfig::from_yaml("driver:\n  max_errors: 3\nreplay:\n  speed: 4.0\n")
            .unwrap();
        assert_eq!(config.driver.max_errors, 3);
        assert_eq!(config.driver.backoff_base_ms, 50);
        assert_eq!(config.replay.speed, 4.0);
        assert_eq!(config.replay.tick_rate, 50.0);
        assert_eq!(config.snapshot.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let error = PitwallConfig::from_yaml("snapshot: [").unwrap_err();
        assert!(matches!(error, TelemetryError::Parse { .. }));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let driver = DriverConfig::default();
        assert_eq!(driver.backoff(1), Duration::from_millis(50));
        assert_eq!(driver.backoff(2), Duration::from_millis(100));
        assert_eq!(driver.backoff(3), Duration::from_millis(200));
        assert_eq!(driver.backoff(30), Duration::from_millis(1600));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let error = PitwallConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(error, TelemetryError::File { .. }));
    }
}
