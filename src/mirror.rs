//! In-process mirror of the simulator's shared-memory buffers
//!
//! The background driver is the only writer. Request handlers hold read-only
//! [`Mirror`] handles and never lock the mirror for a whole decode: each read
//! goes through the versioned snapshot protocol instead.

use std::sync::Arc;
use tokio::sync::watch;

use crate::provider::MirrorUpdate;
use crate::snapshot::{VERSION_BEGIN, VERSION_END, VersionedSource};
use crate::types::{RawNode, Topic};

/// Latest contents published by the background reader.
#[derive(Debug, Clone, Default)]
pub struct MirrorState {
    pub scoring: Option<Arc<RawNode>>,
    pub telemetry: Option<Arc<RawNode>>,
    pub paused: bool,
    /// A provider is currently attached.
    pub attached: bool,
    /// Number of updates applied so far.
    pub generation: u64,
}

impl MirrorState {
    pub fn get(&self, topic: Topic) -> Option<&Arc<RawNode>> {
        match topic {
            Topic::Scoring => self.scoring.as_ref(),
            Topic::Telemetry => self.telemetry.as_ref(),
        }
    }
}

/// Create a connected writer and reader pair.
pub fn channel() -> (MirrorWriter, Mirror) {
    let (tx, rx) = watch::channel(Arc::new(MirrorState::default()));
    (MirrorWriter { tx }, Mirror { rx })
}

/// Write side, owned by the driver task.
#[derive(Debug)]
pub struct MirrorWriter {
    tx: watch::Sender<Arc<MirrorState>>,
}

impl MirrorWriter {
    /// Apply a refresh. Buffers missing from `update` keep their previous contents.
    pub fn apply(&self, update: MirrorUpdate) {
        self.tx.send_modify(|state| {
            let next = Arc::make_mut(state);
            if let Some(scoring) = update.scoring {
                next.scoring = Some(Arc::new(scoring));
            }
            if let Some(telemetry) = update.telemetry {
                next.telemetry = Some(Arc::new(telemetry));
            }
            next.paused = update.paused;
            next.generation += 1;
        });
    }

    /// Record attach or detach. A detached simulator counts as paused.
    pub fn set_attached(&self, attached: bool) {
        self.tx.send_modify(|state| {
            let next = Arc::make_mut(state);
            next.attached = attached;
            if !attached {
                next.paused = true;
            }
        });
    }

    /// Whether any [`Mirror`] handle is still alive.
    pub fn has_readers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

/// Read side, cheap to clone into request handlers.
#[derive(Debug, Clone)]
pub struct Mirror {
    rx: watch::Receiver<Arc<MirrorState>>,
}

impl Mirror {
    /// Current state. Later publishes do not affect the returned value.
    pub fn state(&self) -> Arc<MirrorState> {
        Arc::clone(&self.rx.borrow())
    }

    pub fn current_scoring(&self) -> Option<Arc<RawNode>> {
        self.state().scoring.clone()
    }

    pub fn current_telemetry(&self) -> Option<Arc<RawNode>> {
        self.state().telemetry.clone()
    }

    pub fn current(&self, topic: Topic) -> Option<Arc<RawNode>> {
        self.state().get(topic).cloned()
    }

    pub fn is_paused(&self) -> bool {
        self.rx.borrow().paused
    }

    pub fn is_attached(&self) -> bool {
        self.rx.borrow().attached
    }

    /// Versioned view of one buffer for the snapshot reader.
    pub fn source(&self, topic: Topic) -> MirrorSource<'_> {
        MirrorSource { mirror: self, topic }
    }

    /// Wait for the next publish. Errors once the writer is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<Arc<MirrorState>> {
        self.rx.clone()
    }
}

/// One mirrored buffer, re-read from the mirror on every access so that
/// counters and contents reflect whatever the writer published last.
#[derive(Debug, Clone, Copy)]
pub struct MirrorSource<'a> {
    mirror: &'a Mirror,
    topic: Topic,
}

impl VersionedSource for MirrorSource<'_> {
    fn version_begin(&self) -> Option<u32> {
        self.mirror.current(self.topic)?.counter(VERSION_BEGIN)
    }

    fn version_end(&self) -> Option<u32> {
        self.mirror.current(self.topic)?.counter(VERSION_END)
    }

    fn with_raw<R>(&self, f: impl FnOnce(&RawNode) -> R) -> Option<R> {
        let node = self.mirror.current(self.topic)?;
        Some(f(&node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawRecord;

    fn block(begin: i64, end: i64) -> RawNode {
        RawRecord::new()
            .with(VERSION_BEGIN, RawNode::int(begin))
            .with(VERSION_END, RawNode::int(end))
            .into()
    }

    #[test]
    fn updates_merge_per_topic() {
        let (writer, mirror) = channel();
        assert!(mirror.current_scoring().is_none());

        writer.apply(MirrorUpdate { scoring: Some(block(1, 1)), ..Default::default() });
        writer.apply(MirrorUpdate { telemetry: Some(block(2, 2)), paused: true, ..Default::default() });

        let state = mirror.state();
        assert_eq!(state.generation, 2);
        assert!(state.paused);
        assert_eq!(mirror.source(Topic::Scoring).version_begin(), Some(1));
        assert_eq!(mirror.source(Topic::Telemetry).version_end(), Some(2));
    }

    #[test]
    fn detaching_pauses() {
        let (writer, mirror) = channel();
        writer.set_attached(true);
        writer.apply(MirrorUpdate::default());
        assert!(mirror.is_attached());
        assert!(!mirror.is_paused());

        writer.set_attached(false);
        assert!(!mirror.is_attached());
        assert!(mirror.is_paused());
    }

    #[test]
    fn unmapped_topic_has_no_source_data() {
        let (_writer, mirror) = channel();
        let source = mirror.source(Topic::Telemetry);
        assert_eq!(source.version_begin(), None);
        assert!(source.with_raw(|_| ()).is_none());
    }

    #[tokio::test]
    async fn readers_are_notified() {
        let (writer, mut mirror) = channel();
        let handle = tokio::spawn(async move {
            mirror.changed().await.unwrap();
            mirror.state().generation
        });

        tokio::task::yield_now().await;
        writer.apply(MirrorUpdate::default());
        assert_eq!(handle.await.unwrap(), 1);
    }
}
