//! Request-side connection to the mirrored simulator state
//!
//! A [`Pitwall`] owns the background reader task and answers requests from
//! whatever the mirror holds at the time of the call. Requests are synchronous
//! and stateless: every call takes a fresh versioned snapshot, binds it, and
//! derives its view from scratch.

mod endpoint;

use futures::{Stream, StreamExt};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::FromSnapshot;
use crate::config::PitwallConfig;
use crate::driver::Driver;
use crate::mirror::Mirror;
use crate::provider::Provider;
use crate::providers::ReplayProvider;
use crate::schema::{Scoring, Telemetry};
use crate::session::Session;
use crate::snapshot::{Snapshot, SnapshotReader};
use crate::types::{RawNode, Topic};
use crate::{Result, TelemetryError};

pub use endpoint::{Endpoint, Health, Response, Running};

/// Connection to a mirrored rFactor 2 session.
///
/// ```rust,no_run
/// use rf2_pitwall::{Pitwall, PitwallConfig};
///
/// # #[tokio::main]
/// # async fn main() -> rf2_pitwall::Result<()> {
/// let pitwall = Pitwall::replay("race.jsonl", &PitwallConfig::default()).await?;
/// let session = pitwall.session()?;
/// println!("{} players on {:?}", session.value.players.len(), session.value.track_name);
/// pitwall.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Pitwall {
    mirror: Mirror,
    reader: SnapshotReader,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    source_hz: f64,
}

impl Pitwall {
    /// Spawn the background reader for `provider` and connect to its mirror.
    pub fn start<P>(provider: P, config: &PitwallConfig) -> Self
    where
        P: Provider,
    {
        let source_hz = provider.tick_rate();
        let channels = Driver::spawn(provider, config.driver.clone());
        info!("Pitwall started ({}Hz source)", source_hz);

        Self {
            mirror: channels.mirror,
            reader: config.snapshot.reader(),
            cancel: channels.cancel,
            task: Some(channels.handle),
            source_hz,
        }
    }

    /// Replay a recording and wait until its first update is mirrored.
    pub async fn replay<P: AsRef<Path>>(path: P, config: &PitwallConfig) -> Result<Self> {
        let provider = ReplayProvider::open(path, &config.replay)?;
        let pitwall = Self::start(provider, config);

        if let Err(e) = pitwall.wait_for_data(Duration::from_secs(5)).await {
            warn!("No update mirrored from recording: {}", e);
        }
        Ok(pitwall)
    }

    /// Serve requests from a mirror fed by someone else.
    pub fn from_mirror(mirror: Mirror, config: &PitwallConfig) -> Self {
        Self {
            mirror,
            reader: config.snapshot.reader(),
            cancel: CancellationToken::new(),
            task: None,
            source_hz: 0.0,
        }
    }

    /// Wait until at least one update has been mirrored.
    pub async fn wait_for_data(&self, timeout: Duration) -> Result<()> {
        let mut mirror = self.mirror.clone();
        let wait = async {
            while mirror.state().generation == 0 {
                if mirror.changed().await.is_err() {
                    return Err(TelemetryError::provider_failed("Background reader stopped"));
                }
            }
            Ok(())
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| TelemetryError::Timeout { duration: timeout })?
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Refresh rate of the underlying source in Hz, 0 when unknown.
    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }

    /// Take a versioned snapshot of `T`'s topic and bind it.
    pub fn read<T: FromSnapshot>(&self) -> Result<Snapshot<T>> {
        self.reader
            .read(&self.mirror.source(T::TOPIC))
            .ok_or(TelemetryError::NoData { topic: T::TOPIC })?
            .try_map(|value| T::from_snapshot(&value))
    }

    pub fn scoring(&self) -> Result<Snapshot<Scoring>> {
        self.read()
    }

    pub fn telemetry(&self) -> Result<Snapshot<Telemetry>> {
        self.read()
    }

    /// Session view of the current scoring snapshot.
    pub fn session(&self) -> Result<Snapshot<Session>> {
        let active = !self.mirror.is_paused();
        Ok(self.scoring()?.map(|scoring| Session::new(&scoring, active)))
    }

    pub fn running(&self) -> Running {
        Running { active: !self.mirror.is_paused() }
    }

    pub fn health(&self) -> Health {
        Health { alive: true }
    }

    /// Session views, one per mirror publish that carries a bindable scoring block.
    pub fn session_updates(&self) -> impl Stream<Item = Session> + 'static {
        let reader = self.reader;
        WatchStream::new(self.mirror.receiver()).filter_map(move |state| async move {
            let node = state.get(Topic::Scoring)?;
            let snapshot = reader.read::<RawNode>(node)?;
            match Scoring::from_snapshot(&snapshot.value) {
                Ok(scoring) => Some(Session::new(&scoring, !state.paused)),
                Err(e) => {
                    debug!("Skipping session update: {}", e);
                    None
                }
            }
        })
    }

    /// Stop the background reader and wait for it to detach.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Background reader ended abnormally: {}", e);
            }
        }
        info!("Pitwall shut down");
    }
}

impl Drop for Pitwall {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
