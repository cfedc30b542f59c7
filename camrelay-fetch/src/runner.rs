//! Scheduled background refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use camrelay_cache::ImageCache;
use camrelay_core::traits::SnapshotFetcher;

/// Background loop driving one refresh pass per interval.
///
/// The first pass runs immediately, so the cache's readiness gate opens as
/// soon as the initial sweep finishes. Transient per-source failures are
/// not retried within a pass; the next tick is the retry mechanism.
pub struct RefreshRunner {
    cache: Arc<ImageCache>,
    fetcher: Arc<dyn SnapshotFetcher>,
    interval: Duration,
    cancel: CancellationToken,
}

impl RefreshRunner {
    /// Creates a runner; nothing executes until [`spawn`](Self::spawn).
    pub fn new(
        cache: Arc<ImageCache>,
        fetcher: Arc<dyn SnapshotFetcher>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            fetcher,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the loop and aborts any in-flight pass.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Starts the background loop.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "Starting refresh runner");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        info!("Refresh runner stopped");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                let stats = self
                    .cache
                    .refresh_pass(self.fetcher.clone(), self.cancel.child_token())
                    .await;

                if stats.errors > 0 {
                    warn!(
                        errors = stats.errors,
                        changed = stats.changed,
                        "Scheduled pass finished with errors"
                    );
                } else {
                    debug!(
                        changed = stats.changed,
                        unchanged = stats.unchanged,
                        "Scheduled pass finished"
                    );
                }
            }
        })
    }
}
