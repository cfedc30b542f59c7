//! Source descriptors.
//!
//! A source is one externally-hosted feed the cache tracks. Sources are
//! immutable after registry construction; the registry assigns ids and slugs
//! and rejects ambiguous identifiers before the cache ever serves.

use serde::{Deserialize, Serialize};

use crate::fingerprint;

/// Kind of remote feed a source points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A fetchable still image (camera snapshot).
    #[default]
    Image,
    /// An embedded frame rendered by the serving layer; nothing to fetch.
    EmbeddedFrame,
    /// A group's status feed.
    Status,
}

/// One externally-hosted feed tracked by the cache.
///
/// The id is derived deterministically from the origin URL at build time and
/// never changes, so a source keeps its identity (and its cached content)
/// across reconfigurations that only touch its label or group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Source {
    /// Stable identifier, derived from the origin URL
    pub id: String,
    /// Human-readable display name
    pub label: String,
    /// Origin URL the content is fetched from
    pub url: String,
    /// Name of the group this source belongs to
    pub group: String,
    /// What kind of feed this is
    pub kind: SourceKind,
    /// URL-safe slug derived from the label, if the label is non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Identifier in an external system, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Latitude of the camera position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude of the camera position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Source {
    /// Creates a source with its id derived from the origin URL.
    ///
    /// The slug stays unset; the registry assigns it after collision checks.
    pub fn new(
        label: impl Into<String>,
        url: impl Into<String>,
        group: impl Into<String>,
        kind: SourceKind,
    ) -> Self {
        let url = url.into();
        Self {
            id: Self::derive_id(&url),
            label: label.into(),
            url,
            group: group.into(),
            kind,
            slug: None,
            external_id: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Derives the stable id for an origin URL.
    pub fn derive_id(url: &str) -> String {
        fingerprint::fingerprint_hex(url.as_bytes())
    }

    /// Returns true if this source has fetchable content.
    ///
    /// Embedded frames are rendered client-side; the refresh engine skips
    /// them entirely.
    pub fn is_fetchable(&self) -> bool {
        !matches!(self.kind, SourceKind::EmbeddedFrame)
    }
}
