//! Cached image payloads and transport metadata.
//!
//! Both types here are immutable values: a refresh constructs new ones and
//! swaps them into the cell wholesale, so snapshots taken earlier keep
//! referencing complete, frozen data.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::fingerprint;

/// Immutable cached payload with its content fingerprint.
#[derive(Clone, Debug)]
pub struct ImageData {
    /// Origin URL the payload was fetched from
    pub url: String,
    /// Raw payload bytes
    pub bytes: Bytes,
    /// XXH64 fingerprint of the payload bytes
    pub fingerprint: u64,
}

impl ImageData {
    /// Creates an image value, computing the fingerprint locally.
    ///
    /// The fingerprint is derived from the bytes actually received, never
    /// trusted from transport metadata.
    pub fn new(url: impl Into<String>, bytes: Bytes) -> Self {
        let fingerprint = fingerprint::fingerprint(&bytes);
        Self {
            url: url.into(),
            bytes,
            fingerprint,
        }
    }

    /// Entity tag for serving this payload: the fingerprint as quoted hex.
    pub fn etag(&self) -> String {
        format!("\"{:016x}\"", self.fingerprint)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Immutable transport metadata from the origin.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HeaderData {
    /// HTTP status the origin answered with
    pub status: u16,
    /// Content type as reported by the origin
    pub content_type: String,
    /// Content length as reported by the origin, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    /// Origin-supplied validation token (ETag), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_token: Option<String>,
}

impl HeaderData {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if this metadata carries a non-empty validation token
    /// equal to `cached`.
    ///
    /// An absent or empty token never matches: without a token there is no
    /// cheap way to rule out change, so the caller must transfer.
    pub fn token_matches(&self, cached: Option<&str>) -> bool {
        match (self.validation_token.as_deref(), cached) {
            (Some(token), Some(cached)) => !token.is_empty() && token == cached,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_fingerprint_from_bytes() {
        let image = ImageData::new("http://o/a.jpg", Bytes::from_static(b"123456789"));
        assert_eq!(image.fingerprint, fingerprint::fingerprint(b"123456789"));
        assert_eq!(image.len(), 9);
        assert!(!image.is_empty());
    }

    #[test]
    fn test_etag_is_quoted_hex() {
        let image = ImageData::new("http://o/a.jpg", Bytes::from_static(b"x"));
        let etag = image.etag();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 18); // 16 hex chars + quotes
    }

    #[test]
    fn test_same_bytes_same_etag() {
        let a = ImageData::new("http://o/a.jpg", Bytes::from_static(b"frame"));
        let b = ImageData::new("http://o/b.jpg", Bytes::from_static(b"frame"));
        // Identity is content, not location
        assert_eq!(a.etag(), b.etag());
    }

    #[test]
    fn test_header_success() {
        let ok = HeaderData {
            status: 200,
            ..Default::default()
        };
        let not_modified = HeaderData {
            status: 304,
            ..Default::default()
        };
        assert!(ok.is_success());
        assert!(!not_modified.is_success());
    }

    #[test]
    fn test_token_matches() {
        let headers = HeaderData {
            status: 200,
            validation_token: Some("t1".into()),
            ..Default::default()
        };
        assert!(headers.token_matches(Some("t1")));
        assert!(!headers.token_matches(Some("t2")));
        assert!(!headers.token_matches(None));
    }

    #[test]
    fn test_empty_token_never_matches() {
        let headers = HeaderData {
            status: 200,
            validation_token: Some(String::new()),
            ..Default::default()
        };
        assert!(!headers.token_matches(Some("")));

        let absent = HeaderData {
            status: 200,
            ..Default::default()
        };
        assert!(!absent.token_matches(Some("t1")));
    }
}
