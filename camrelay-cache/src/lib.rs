//! # camrelay Cache
//!
//! In-memory mirror of per-source image state with a concurrent refresh
//! engine.
//!
//! ## Design
//!
//! - **Cell per source**: Each source's state lives behind its own lock;
//!   readers take lock-free [`Snapshot`]s and never block writers for more
//!   than a few instructions
//! - **Probe then transfer**: A pass issues a cheap metadata probe per
//!   source and transfers bytes only when the origin's validation token
//!   rules out a match
//! - **Readiness gate**: Lookups suspend until the first pass completes,
//!   then never suspend again
//! - **Live reload**: A new registry swaps in atomically, keeping cached
//!   content for every source whose origin URL is unchanged
//!
//! ## Example
//!
//! ```rust,ignore
//! use camrelay_cache::ImageCache;
//! use camrelay_fetch::HttpFetcher;
//!
//! let cache = Arc::new(ImageCache::new(registry));
//! cache.refresh_pass(fetcher, CancellationToken::new()).await;
//!
//! let snapshot = cache.lookup("north-pier").await.unwrap();
//! println!("serving {} bytes", snapshot.image.unwrap().len());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cell;
mod engine;
mod index;

pub use cell::{CameraCell, RefreshTarget, Snapshot};
pub use engine::{PassObserver, PassStats};
pub use index::CacheIndex;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use camrelay_core::traits::SnapshotFetcher;
use camrelay_core::types::{Group, Source};
use camrelay_registry::SourceRegistry;

/// Counts over the cache's current state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheStats {
    /// Cells tracked by the current index
    pub cells: usize,
    /// Cells a refresh has populated
    pub populated: usize,
    /// Refresh passes completed since construction
    pub passes: u64,
}

/// The image cache: index, cells, refresh entry point, and reload.
///
/// Explicitly constructed and explicitly passed (share it behind an `Arc`);
/// there is no global instance, so tests build as many independent caches
/// as they need.
pub struct ImageCache {
    index: RwLock<Arc<CacheIndex>>,
    observers: RwLock<Vec<PassObserver>>,
    ready_tx: watch::Sender<bool>,
    passes: AtomicU64,
}

impl ImageCache {
    /// Builds the cache from a validated registry.
    ///
    /// Identifier validation (duplicate/empty ids and slugs) happens in
    /// [`SourceRegistry::build`]; by the time a registry value exists, every
    /// identifier is unambiguous.
    pub fn new(registry: SourceRegistry) -> Self {
        let index = CacheIndex::build(&registry, None);
        let (ready_tx, _) = watch::channel(false);
        Self {
            index: RwLock::new(Arc::new(index)),
            observers: RwLock::new(Vec::new()),
            ready_tx,
            passes: AtomicU64::new(0),
        }
    }

    /// Resolves a snapshot by source id or slug.
    ///
    /// Suspends until the first refresh pass completes, never afterwards.
    /// An unknown key is `None`, not an error; response disposition is the
    /// caller's business.
    pub async fn lookup(&self, key: &str) -> Option<Snapshot> {
        self.wait_ready().await;
        let index = self.index.read().clone();
        index.cell(key).map(|cell| cell.snapshot())
    }

    /// Returns true once the first refresh pass has completed.
    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Suspends until the first refresh pass completes.
    pub async fn wait_ready(&self) {
        if self.is_ready() {
            return;
        }
        let mut ready_rx = self.ready_tx.subscribe();
        let _ = ready_rx.wait_for(|ready| *ready).await;
    }

    /// Runs one refresh pass over every cell.
    ///
    /// Safe concurrently with lookups and with itself; overlapping passes
    /// are tolerated, not deduplicated. The first completed pass releases
    /// the readiness gate regardless of per-cell outcomes.
    pub async fn refresh_pass(
        &self,
        fetcher: Arc<dyn SnapshotFetcher>,
        cancel: CancellationToken,
    ) -> PassStats {
        let index = self.index.read().clone();
        let stats = engine::run_pass(index.cells().to_vec(), fetcher, cancel).await;

        self.passes.fetch_add(1, Ordering::SeqCst);
        self.ready_tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });

        info!(
            changed = stats.changed,
            unchanged = stats.unchanged,
            errors = stats.errors,
            skipped = stats.skipped,
            cancelled = stats.cancelled,
            duration_ms = stats.duration_ms,
            "Refresh pass complete"
        );

        for observer in self.observers.read().iter() {
            observer(&stats);
        }
        stats
    }

    /// Swaps in a new registry, preserving unaffected content.
    ///
    /// Cells whose origin URL survives the reconfiguration keep their cached
    /// image and headers under their new source descriptor; removed sources
    /// drop their cells; new sources start empty and populate on the next
    /// pass. The swap happens under one exclusive section, so in-flight
    /// lookups observe fully-old or fully-new state.
    #[instrument(skip_all)]
    pub fn reload(&self, registry: SourceRegistry) {
        let mut guard = self.index.write();
        let previous = guard.clone();

        let old_ids: HashSet<&str> = previous.ids().collect();
        let new_index = CacheIndex::build(&registry, Some(previous.as_ref()));
        let kept = new_index.ids().filter(|id| old_ids.contains(id)).count();
        info!(
            kept,
            added = new_index.len() - kept,
            dropped = old_ids.len() - kept,
            "Reloaded configuration"
        );

        *guard = Arc::new(new_index);
    }

    /// A named group's current source list, status feed, and fingerprint.
    pub fn group(&self, name: &str) -> Option<Group> {
        self.index.read().group(name).cloned()
    }

    /// All groups, in registry order.
    pub fn groups(&self) -> Vec<Group> {
        self.index.read().groups().to_vec()
    }

    /// Current source descriptors, in registry order.
    pub fn sources(&self) -> Vec<Arc<Source>> {
        self.index
            .read()
            .cells()
            .iter()
            .map(|cell| cell.source())
            .collect()
    }

    /// Number of cells currently tracked.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Returns true if no cells are tracked.
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Registers a per-pass statistics callback.
    pub fn on_pass_complete(&self, observer: PassObserver) {
        self.observers.write().push(observer);
    }

    /// Counts over the current state.
    pub fn stats(&self) -> CacheStats {
        let index = self.index.read().clone();
        let populated = index.cells().iter().filter(|c| c.has_image()).count();
        CacheStats {
            cells: index.len(),
            populated,
            passes: self.passes.load(Ordering::SeqCst),
        }
    }
}
