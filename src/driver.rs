//! Driver spawns and manages the background mirror reader

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::DriverConfig;
use crate::mirror::{self, Mirror, MirrorWriter};
use crate::provider::Provider;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Read side of the mirror the task keeps up to date
    pub mirror: Mirror,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
    /// Completes once the provider has been detached
    pub handle: JoinHandle<()>,
}

/// Driver spawns and manages the mirror reader task
///
/// The task owns the provider and is the only writer of the mirror. Request
/// handlers never wait on it; they read whatever was published last.
pub struct Driver;

impl Driver {
    /// Spawn the reader task for the given provider
    pub fn spawn<P>(provider: P, config: DriverConfig) -> DriverChannels
    where
        P: Provider,
    {
        let (writer, mirror) = mirror::channel();
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let handle = tokio::spawn(async move {
            Self::mirror_reader_task(provider, writer, config, cancel_task).await;
        });

        DriverChannels { mirror, cancel, handle }
    }

    async fn mirror_reader_task<P>(
        mut provider: P,
        writer: MirrorWriter,
        config: DriverConfig,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        info!("Mirror reader task started");

        let attached = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Mirror reader cancelled before attach");
                false
            }
            result = provider.attach() => match result {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to attach to simulator: {}", e);
                    for hint in e.recovery_suggestions() {
                        debug!("Hint: {}", hint);
                    }
                    false
                }
            },
        };

        if attached {
            writer.set_attached(true);
            let updates = Self::read_updates(&mut provider, &writer, &config, &cancel).await;
            info!("Mirror reader task ended (applied {} updates)", updates);
        }

        provider.detach().await;
        writer.set_attached(false);
        debug!("Provider detached");
    }

    /// Poll the provider until it ends, fails too often, or is cancelled.
    async fn read_updates<P>(
        provider: &mut P,
        writer: &MirrorWriter,
        config: &DriverConfig,
        cancel: &CancellationToken,
    ) -> u64
    where
        P: Provider,
    {
        let mut update_count = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Mirror reader cancelled");
                    break;
                }
                result = provider.next_update() => result,
            };

            match result {
                Ok(Some(update)) => {
                    update_count += 1;
                    error_count = 0;
                    trace!(update = update_count, paused = update.paused, "Mirror update");
                    writer.apply(update);

                    if !writer.has_readers() {
                        debug!("All mirror readers dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Provider stream ended after {} updates", update_count);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    if !e.is_retryable() {
                        error!("Provider error is not retryable: {}", e);
                        break;
                    }
                    warn!("Provider error ({}/{}): {}", error_count, config.max_errors, e);

                    if error_count >= config.max_errors {
                        error!("Too many provider errors, shutting down");
                        break;
                    }

                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(config.backoff(error_count)) => {}
                    }
                }
            }
        }

        update_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MirrorUpdate;
    use crate::{Result, TelemetryError};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Plays back a fixed script of provider results.
    struct ScriptedProvider {
        script: VecDeque<Result<Option<MirrorUpdate>>>,
        attach_fails: bool,
        detached: Arc<AtomicBool>,
        pending_when_empty: bool,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<Option<MirrorUpdate>>>) -> (Self, Arc<AtomicBool>) {
            let detached = Arc::new(AtomicBool::new(false));
            let provider = Self {
                script: script.into(),
                attach_fails: false,
                detached: Arc::clone(&detached),
                pending_when_empty: false,
            };
            (provider, detached)
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        async fn attach(&mut self) -> Result<()> {
            if self.attach_fails {
                Err(TelemetryError::provider_failed("simulator not running"))
            } else {
                Ok(())
            }
        }

        async fn next_update(&mut self) -> Result<Option<MirrorUpdate>> {
            match self.script.pop_front() {
                Some(result) => result,
                None if self.pending_when_empty => std::future::pending().await,
                None => Ok(None),
            }
        }

        async fn detach(&mut self) {
            self.detached.store(true, Ordering::SeqCst);
        }

        fn tick_rate(&self) -> f64 {
            50.0
        }
    }

    fn paused(paused: bool) -> Result<Option<MirrorUpdate>> {
        Ok(Some(MirrorUpdate { paused, ..Default::default() }))
    }

    #[tokio::test]
    async fn publishes_updates_and_detaches_at_end() {
        let (provider, detached) = ScriptedProvider::new(vec![paused(false), paused(true)]);
        let channels = Driver::spawn(provider, DriverConfig::default());

        channels.handle.await.unwrap();
        let state = channels.mirror.state();
        assert_eq!(state.generation, 2);
        assert!(!state.attached);
        assert!(state.paused);
        assert!(detached.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let (provider, _) = ScriptedProvider::new(vec![
            Err(TelemetryError::provider_failed("hiccup")),
            Err(TelemetryError::Timeout { duration: std::time::Duration::from_millis(10) }),
            paused(false),
        ]);
        let channels = Driver::spawn(provider, DriverConfig::default());

        channels.handle.await.unwrap();
        assert_eq!(channels.mirror.state().generation, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_errors() {
        let errors =
            (0..5).map(|_| Err(TelemetryError::provider_failed("gone"))).collect::<Vec<_>>();
        let (mut provider, detached) = ScriptedProvider::new(errors);
        provider.script.push_back(paused(false));

        let config = DriverConfig { max_errors: 3, ..Default::default() };
        let channels = Driver::spawn(provider, config);

        channels.handle.await.unwrap();
        assert_eq!(channels.mirror.state().generation, 0);
        assert!(detached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_attach_still_detaches() {
        let (mut provider, detached) = ScriptedProvider::new(vec![paused(false)]);
        provider.attach_fails = true;

        let channels = Driver::spawn(provider, DriverConfig::default());
        channels.handle.await.unwrap();

        assert_eq!(channels.mirror.state().generation, 0);
        assert!(channels.mirror.is_paused());
        assert!(detached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_stops_a_blocked_reader() {
        let (mut provider, detached) = ScriptedProvider::new(vec![paused(false)]);
        provider.pending_when_empty = true;

        let channels = Driver::spawn(provider, DriverConfig::default());
        let mut mirror = channels.mirror.clone();
        while mirror.state().generation == 0 {
            mirror.changed().await.unwrap();
        }

        channels.cancel.cancel();
        channels.handle.await.unwrap();
        assert!(detached.load(Ordering::SeqCst));
        assert!(!channels.mirror.is_attached());
    }
}
