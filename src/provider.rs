//! Provider trait for mirror sources

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::RawNode;

/// One refresh of the in-process mirror.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorUpdate {
    /// Raw scoring buffer, if mapped.
    #[serde(default)]
    pub scoring: Option<RawNode>,
    /// Raw telemetry buffer, if mapped.
    #[serde(default)]
    pub telemetry: Option<RawNode>,
    /// The simulator is paused or not writing.
    #[serde(default)]
    pub paused: bool,
}

/// Trait for sources that keep the shared-memory mirror up to date
///
/// A provider owns whatever is needed to reach the simulator's buffers (an
/// OS shared-memory mapping, a recording, ...) and handles its own polling
/// cadence. The driver calls `attach` once, then `next_update` until it
/// returns `None` or the driver is cancelled, then `detach` exactly once.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Locate the simulator and map its buffers.
    async fn attach(&mut self) -> Result<()>;

    /// Get the next mirror refresh
    ///
    /// Returns:
    /// - `Ok(Some(update))` - New buffer contents available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - Transient failure, the driver backs off and retries
    async fn next_update(&mut self) -> Result<Option<MirrorUpdate>>;

    /// Release the mapping. Called on every driver exit path.
    async fn detach(&mut self);

    /// Native refresh rate in Hz
    fn tick_rate(&self) -> f64;
}
