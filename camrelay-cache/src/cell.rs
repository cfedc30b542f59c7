//! Per-source cache cells and snapshots.
//!
//! Each cell guards exactly one source's state with its own lock; there is
//! no global lock anywhere on the image path. The current image and header
//! metadata are immutable values behind `Arc`s: a refresh constructs new
//! values and swaps both references in under the exclusive lock, so a
//! snapshot taken at any earlier instant keeps referencing complete, frozen
//! data for as long as it lives.

use std::sync::Arc;

use parking_lot::RwLock;

use camrelay_core::types::{HeaderData, ImageData, Source};

/// Mutable per-source container guarded by its own lock.
pub struct CameraCell {
    id: String,
    state: RwLock<CellState>,
}

struct CellState {
    source: Arc<Source>,
    image: Option<Arc<ImageData>>,
    headers: Option<Arc<HeaderData>>,
}

/// Lock-free immutable copy of a cell's current state.
///
/// Taking one clones three `Arc`s under a brief shared lock; the values
/// themselves are never copied. The image and headers always form one
/// complete pair that existed at a real instant: either both are from the
/// same refresh, or the cell has not been populated yet and both are absent.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// The cell's stable id
    pub id: String,
    /// Source descriptor current at snapshot time
    pub source: Arc<Source>,
    /// Cached payload, if a refresh has populated this cell
    pub image: Option<Arc<ImageData>>,
    /// Transport metadata paired with the payload
    pub headers: Option<Arc<HeaderData>>,
}

/// What the refresh engine needs from a cell, copied under one brief read
/// section so no lock is held across network I/O.
#[derive(Clone, Debug)]
pub struct RefreshTarget {
    /// Origin URL to probe and transfer from
    pub url: String,
    /// Validation token of the currently cached content, if any
    pub cached_token: Option<String>,
    /// False for sources with nothing to fetch (embedded frames)
    pub fetchable: bool,
}

impl CameraCell {
    /// Creates an empty cell for a source.
    pub fn new(source: Source) -> Self {
        Self {
            id: source.id.clone(),
            state: RwLock::new(CellState {
                source: Arc::new(source),
                image: None,
                headers: None,
            }),
        }
    }

    /// The cell's stable id (derived from the origin URL).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Takes a lock-free snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot {
            id: self.id.clone(),
            source: state.source.clone(),
            image: state.image.clone(),
            headers: state.headers.clone(),
        }
    }

    /// The current source descriptor.
    pub fn source(&self) -> Arc<Source> {
        self.state.read().source.clone()
    }

    /// Copies what a refresh needs under one brief read section.
    pub fn refresh_target(&self) -> RefreshTarget {
        let state = self.state.read();
        RefreshTarget {
            url: state.source.url.clone(),
            cached_token: state
                .headers
                .as_ref()
                .and_then(|h| h.validation_token.clone()),
            fetchable: state.source.is_fetchable(),
        }
    }

    /// Atomically replaces the cached image and header metadata.
    ///
    /// Both values are swapped in under one exclusive section; readers see
    /// the old pair or the new pair, never a mixture.
    pub fn store(&self, image: ImageData, headers: HeaderData) {
        let mut state = self.state.write();
        state.image = Some(Arc::new(image));
        state.headers = Some(Arc::new(headers));
    }

    /// Returns true once a refresh has populated this cell.
    pub fn has_image(&self) -> bool {
        self.state.read().image.is_some()
    }

    /// Replaces the source descriptor, keeping cached content.
    ///
    /// Reload calls this when a reconfiguration keeps a source's origin URL
    /// but changes its label or group.
    pub(crate) fn swap_source(&self, source: Arc<Source>) {
        self.state.write().source = source;
    }
}

impl std::fmt::Debug for CameraCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCell")
            .field("id", &self.id)
            .field("populated", &self.has_image())
            .finish()
    }
}
