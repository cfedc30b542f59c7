//! The refresh engine.
//!
//! One pass brings every cell up to date concurrently: a cheap metadata
//! probe per source, a full transfer only when the origin's validation token
//! rules out a match, and an atomic swap of the cell's values at the end.
//! Failures stay isolated to their cell; the pass itself always completes.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use camrelay_core::traits::SnapshotFetcher;
use camrelay_core::types::ImageData;

use crate::cell::CameraCell;

/// Aggregate outcome of one refresh pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PassStats {
    /// Cells whose content was replaced
    pub changed: u64,
    /// Cells whose validation token matched (no transfer issued)
    pub unchanged: u64,
    /// Cells that hit a network or origin error and kept prior content
    pub errors: u64,
    /// Cells with nothing to fetch (embedded frames)
    pub skipped: u64,
    /// Cells aborted by cancellation; prior content retained
    pub cancelled: u64,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
    /// When the pass finished
    pub completed_at: DateTime<Utc>,
}

impl PassStats {
    /// Total cells the pass visited.
    pub fn total(&self) -> u64 {
        self.changed + self.unchanged + self.errors + self.skipped + self.cancelled
    }
}

/// Per-pass statistics callback.
pub type PassObserver = Box<dyn Fn(&PassStats) + Send + Sync>;

/// What happened to one cell during a pass.
enum CellOutcome {
    Changed,
    Unchanged,
    Error,
    Skipped,
    Cancelled,
}

#[derive(Default)]
struct Tally {
    changed: u64,
    unchanged: u64,
    errors: u64,
    skipped: u64,
    cancelled: u64,
}

impl Tally {
    fn record(&mut self, outcome: CellOutcome) {
        match outcome {
            CellOutcome::Changed => self.changed += 1,
            CellOutcome::Unchanged => self.unchanged += 1,
            CellOutcome::Error => self.errors += 1,
            CellOutcome::Skipped => self.skipped += 1,
            CellOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Runs one pass over the given cells, one concurrent unit of work per cell.
///
/// The pass completes when every unit finishes (barrier join). Fan-out is
/// unbounded (one task per cell), fine at tens of sources; a semaphore in
/// front of the spawn is the drop-in bound for larger fleets.
#[instrument(skip_all, fields(cells = cells.len()))]
pub(crate) async fn run_pass(
    cells: Vec<Arc<CameraCell>>,
    fetcher: Arc<dyn SnapshotFetcher>,
    cancel: CancellationToken,
) -> PassStats {
    let started = Instant::now();
    let mut tasks = JoinSet::new();

    for cell in cells {
        let fetcher = fetcher.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move { refresh_cell(&cell, fetcher.as_ref(), &cancel).await });
    }

    let mut tally = Tally::default();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(outcome) => tally.record(outcome),
            Err(e) => {
                warn!(error = %e, "Refresh task failed to join");
                tally.errors += 1;
            }
        }
    }

    PassStats {
        changed: tally.changed,
        unchanged: tally.unchanged,
        errors: tally.errors,
        skipped: tally.skipped,
        cancelled: tally.cancelled,
        duration_ms: started.elapsed().as_millis() as u64,
        completed_at: Utc::now(),
    }
}

/// Brings one cell up to date: probe, token compare, transfer, swap.
///
/// Every failure leaves the cell's prior content untouched; the next
/// scheduled pass is the retry mechanism.
async fn refresh_cell(
    cell: &CameraCell,
    fetcher: &dyn SnapshotFetcher,
    cancel: &CancellationToken,
) -> CellOutcome {
    let target = cell.refresh_target();
    if !target.fetchable {
        return CellOutcome::Skipped;
    }

    let probe = tokio::select! {
        biased;
        _ = cancel.cancelled() => return CellOutcome::Cancelled,
        result = fetcher.probe(&target.url) => result,
    };
    let probe = match probe {
        Ok(probe) => probe,
        Err(e) => {
            warn!(id = cell.id(), url = %target.url, error = %e, "Probe failed");
            return CellOutcome::Error;
        }
    };

    if probe.token_matches(target.cached_token.as_deref()) {
        debug!(id = cell.id(), "Validation token unchanged");
        return CellOutcome::Unchanged;
    }

    let fetched = tokio::select! {
        biased;
        _ = cancel.cancelled() => return CellOutcome::Cancelled,
        result = fetcher.fetch(&target.url) => result,
    };
    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(id = cell.id(), url = %target.url, error = %e, "Transfer failed");
            return CellOutcome::Error;
        }
    };
    if !fetched.headers.is_success() {
        warn!(
            id = cell.id(),
            url = %target.url,
            status = fetched.headers.status,
            "Origin returned non-success status"
        );
        return CellOutcome::Error;
    }

    let image = ImageData::new(&target.url, fetched.body);
    debug!(
        id = cell.id(),
        bytes = image.len(),
        fingerprint = %format!("{:016x}", image.fingerprint),
        "Content changed"
    );
    cell.store(image, fetched.headers);
    CellOutcome::Changed
}
