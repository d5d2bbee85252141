//! Consistent reads of versioned shared-memory blocks
//!
//! The simulator bumps `mVersionUpdateBegin` before writing a buffer and
//! `mVersionUpdateEnd` after. A decode bracketed by equal counters is a
//! consistent view; anything else was taken mid-write and is retried.
//!
//! Counter wrap-around within a single read is not detected.

use serde_json::Value;
use tracing::{trace, warn};

use crate::types::RawNode;

/// Counter incremented before the simulator writes a buffer.
pub const VERSION_BEGIN: &str = "mVersionUpdateBegin";
/// Counter incremented after the simulator finished writing a buffer.
pub const VERSION_END: &str = "mVersionUpdateEnd";
/// Number of bytes touched by the last write.
pub const BYTES_UPDATED_HINT: &str = "mBytesUpdatedHint";

/// Default number of decode attempts before a torn snapshot is served as stale.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A live block whose contents may change between any two reads.
pub trait VersionedSource {
    /// Current value of the begin counter, if the block is mapped.
    fn version_begin(&self) -> Option<u32>;

    /// Current value of the end counter, if the block is mapped.
    fn version_end(&self) -> Option<u32>;

    /// Run `f` over the current raw structure. The borrow ends with the call,
    /// so nothing read from the live block can outlive the read.
    fn with_raw<R>(&self, f: impl FnOnce(&RawNode) -> R) -> Option<R>;
}

/// A block that is no longer written to, such as a published mirror state.
impl VersionedSource for RawNode {
    fn version_begin(&self) -> Option<u32> {
        self.counter(VERSION_BEGIN)
    }

    fn version_end(&self) -> Option<u32> {
        self.counter(VERSION_END)
    }

    fn with_raw<R>(&self, f: impl FnOnce(&RawNode) -> R) -> Option<R> {
        Some(f(self))
    }
}

/// Outcome of a versioned read.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub value: T,
    /// Every attempt was torn; `value` is the latest decode.
    pub stale: bool,
    pub attempts: u32,
}

impl<T> Snapshot<T> {
    /// Transform the value, keeping the read metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Snapshot<U> {
        Snapshot { value: f(self.value), stale: self.stale, attempts: self.attempts }
    }

    /// Fallible [`Snapshot::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Snapshot<U>, E> {
        Ok(Snapshot { value: f(self.value)?, stale: self.stale, attempts: self.attempts })
    }
}

/// Reads versioned blocks with bounded optimistic retries.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotReader {
    max_attempts: u32,
}

impl Default for SnapshotReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl SnapshotReader {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decode the current contents of `source`.
    ///
    /// Returns `None` when nothing is mapped. When every attempt is torn the
    /// latest decode comes back flagged as stale instead of blocking.
    pub fn read<S: VersionedSource>(&self, source: &S) -> Option<Snapshot<Value>> {
        let mut latest = None;

        for attempt in 1..=self.max_attempts {
            let begin = source.version_begin();
            let value = source.with_raw(crate::decode::decode)?;
            let end = source.version_end();

            if begin == end && counters_agree(&value) {
                trace!(attempt, version = ?begin, "Consistent snapshot");
                return Some(Snapshot { value, stale: false, attempts: attempt });
            }

            trace!(attempt, ?begin, ?end, "Torn snapshot, retrying");
            latest = Some(value);
            std::thread::yield_now();
        }

        warn!(attempts = self.max_attempts, "Snapshot still torn after retries, serving stale");
        latest.map(|value| Snapshot { value, stale: true, attempts: self.max_attempts })
    }
}

/// The decoded block must not carry mismatched counters of its own.
fn counters_agree(value: &Value) -> bool {
    match (value.get(VERSION_BEGIN), value.get(VERSION_END)) {
        (Some(begin), Some(end)) => begin == end,
        _ => true,
    }
}
