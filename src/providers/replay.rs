//! Replay provider for recorded mirror updates
//!
//! A recording is a JSON-lines file, one serialized [`MirrorUpdate`] per line.
//! Blank lines are skipped. Updates are released at the configured tick rate
//! scaled by the playback speed.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::config::ReplayConfig;
use crate::provider::{MirrorUpdate, Provider};
use crate::{Result, TelemetryError};

const MIN_SPEED: f64 = 0.1;
const MAX_SPEED: f64 = 100.0;

/// Replay provider that reads recorded mirror updates
pub struct ReplayProvider {
    /// Where the recording came from, for logs and errors
    origin: String,

    lines: Box<dyn BufRead + Send>,

    /// 1-based number of the last line read
    line: usize,

    tick_rate: f64,

    /// Playback speed multiplier (1.0 = normal, 2.0 = double speed)
    speed: f64,

    interval: Interval,
}

impl ReplayProvider {
    /// Open a recording file.
    pub fn open<P: AsRef<Path>>(path: P, config: &ReplayConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TelemetryError::file_error(PathBuf::from(path), e))?;
        info!("Opened recording: {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), path.display().to_string(), config))
    }

    /// Replay from any buffered reader.
    pub fn from_reader<R>(reader: R, origin: impl Into<String>, config: &ReplayConfig) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let tick_rate = if config.tick_rate.is_finite() && config.tick_rate > 0.0 {
            config.tick_rate
        } else {
            ReplayConfig::default().tick_rate
        };
        let speed = clamp_speed(config.speed);

        Self {
            origin: origin.into(),
            lines: Box::new(reader),
            line: 0,
            tick_rate,
            speed,
            interval: pacing(tick_rate, speed),
        }
    }

    /// Change playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
        self.interval = pacing(self.tick_rate, self.speed);
        debug!("Playback speed set to {}x", self.speed);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Number of lines consumed so far.
    pub fn position(&self) -> usize {
        self.line
    }

    /// Next non-blank line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            let read = self.lines.read_line(&mut buffer).map_err(|e| {
                TelemetryError::parse_error(
                    format!("{} line {}", self.origin, self.line + 1),
                    e.to_string(),
                )
            })?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;
            if !buffer.trim().is_empty() {
                return Ok(Some(buffer));
            }
        }
    }
}

fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() { 1.0 } else { speed.clamp(MIN_SPEED, MAX_SPEED) }
}

fn pacing(tick_rate: f64, speed: f64) -> Interval {
    let mut interval = interval(Duration::from_secs_f64(1.0 / (tick_rate * speed)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn attach(&mut self) -> Result<()> {
        info!("Replaying {} at {}Hz ({}x)", self.origin, self.tick_rate, self.speed);
        Ok(())
    }

    async fn next_update(&mut self) -> Result<Option<MirrorUpdate>> {
        let Some(line) = self.read_line()? else {
            debug!("Reached end of recording after {} lines", self.line);
            return Ok(None);
        };

        let update: MirrorUpdate = serde_json::from_str(&line).map_err(|e| {
            TelemetryError::parse_error(format!("{} line {}", self.origin, self.line), e.to_string())
        })?;

        self.interval.tick().await;
        trace!(line = self.line, paused = update.paused, "Replayed update");
        Ok(Some(update))
    }

    async fn detach(&mut self) {
        debug!("Replay of {} detached at line {}", self.origin, self.line);
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }
}
