//! Common traits for camrelay.
//!
//! The refresh engine never talks to the network directly; it works against
//! the [`SnapshotFetcher`] interface, so tests drive it with scripted doubles
//! and the production wiring plugs in the reqwest-backed client.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::HeaderData;

/// A full transfer result: transport metadata plus the payload bytes.
#[derive(Clone, Debug)]
pub struct FetchedSnapshot {
    /// Metadata from the transfer response
    pub headers: HeaderData,
    /// Payload bytes
    pub body: Bytes,
}

/// Interface for probing and transferring origin content.
///
/// Implementations might use:
/// - A shared HTTP client (production)
/// - Scripted per-URL outcomes (engine tests)
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Issues a bounded-timeout metadata probe with no body transfer.
    ///
    /// Returns the origin's transport metadata, including its validation
    /// token when it supplies one.
    async fn probe(&self, url: &str) -> Result<HeaderData>;

    /// Issues a bounded-timeout full transfer.
    ///
    /// A non-success status is surfaced as an error by the caller, not here;
    /// the metadata is returned as received.
    async fn fetch(&self, url: &str) -> Result<FetchedSnapshot>;
}
