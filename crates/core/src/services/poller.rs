use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Recurring scheduler for the price feed: start/stop around an async
/// tick callback.
///
/// Guarantees:
/// - ticks never overlap — each tick is awaited to completion before the
///   next interval fires, and a missed deadline is skipped, not queued;
/// - `stop()` (or dropping the poller) cancels deterministically — no
///   tick starts after cancellation.
///
/// The tick itself is an ordinary async closure, so tests can drive the
/// feed directly without timers and only exercise the scheduler when
/// they mean to.
#[derive(Debug)]
pub struct FeedPoller {
    handle: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl FeedPoller {
    pub fn new() -> Self {
        Self {
            handle: None,
            shutdown: None,
        }
    }

    /// Start firing `tick` every `interval`. The first tick fires
    /// immediately. Restarting an already-running poller stops the old
    /// loop first.
    pub fn start<F, Fut>(&mut self, interval: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = timer.tick() => tick().await,
                }
            }
        });

        self.handle = Some(handle);
        self.shutdown = Some(shutdown_tx);
        tracing::debug!(?interval, "feed poller started");
    }

    /// Stop the loop. Idempotent; returns once no further tick can fire.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = self.handle.take() {
            // A tick already in flight may still be running on the
            // executor; abort rather than orphan it.
            handle.abort();
            tracing::debug!("feed poller stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for FeedPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FeedPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
