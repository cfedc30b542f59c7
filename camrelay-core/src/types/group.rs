//! Camera groups.

use serde::{Deserialize, Serialize};

use crate::fingerprint;
use crate::types::Source;

/// Named collection of sources sharing a status feed.
///
/// The group fingerprint is computed from the member source ids at build
/// time; the serving layer uses it as a cache-busting token for whole-group
/// pages without hashing anything at request time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    /// Group name, unique across the registry
    pub name: String,
    /// Content fingerprint over the member source ids
    pub fingerprint: u64,
    /// Optional status feed for the whole group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Source>,
    /// Ordered member sources
    pub sources: Vec<Source>,
}

impl Group {
    /// Creates a group, computing its fingerprint from the member ids.
    pub fn new(name: impl Into<String>, status: Option<Source>, sources: Vec<Source>) -> Self {
        let fingerprint = Self::compute_fingerprint(status.as_ref(), &sources);
        Self {
            name: name.into(),
            fingerprint,
            status,
            sources,
        }
    }

    /// Fingerprint over the status and member source ids, in order.
    fn compute_fingerprint(status: Option<&Source>, sources: &[Source]) -> u64 {
        let ids = status
            .iter()
            .map(|s| s.id.as_str())
            .chain(sources.iter().map(|s| s.id.as_str()));
        fingerprint::combine(ids)
    }

    /// Returns the fingerprint rendered as fixed-width hex.
    pub fn fingerprint_hex(&self) -> String {
        format!("{:016x}", self.fingerprint)
    }

    /// Looks up a member source by id.
    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Number of member sources (status feed excluded).
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if the group has no member sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn make_source(url: &str) -> Source {
        Source::new("Cam", url, "harbor", SourceKind::Image)
    }

    #[test]
    fn test_fingerprint_tracks_membership() {
        let one = Group::new("harbor", None, vec![make_source("http://o/a.jpg")]);
        let two = Group::new(
            "harbor",
            None,
            vec![make_source("http://o/a.jpg"), make_source("http://o/b.jpg")],
        );
        assert_ne!(one.fingerprint, two.fingerprint);
    }

    #[test]
    fn test_fingerprint_ignores_name() {
        let sources = vec![make_source("http://o/a.jpg")];
        let a = Group::new("harbor", None, sources.clone());
        let b = Group::new("hills", None, sources);
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_includes_status() {
        let sources = vec![make_source("http://o/a.jpg")];
        let status = Source::new("", "http://o/status", "harbor", SourceKind::Status);

        let without = Group::new("harbor", None, sources.clone());
        let with = Group::new("harbor", Some(status), sources);
        assert_ne!(without.fingerprint, with.fingerprint);
    }

    #[test]
    fn test_source_lookup() {
        let a = make_source("http://o/a.jpg");
        let id = a.id.clone();
        let group = Group::new("harbor", None, vec![a]);

        assert!(group.source(&id).is_some());
        assert!(group.source("missing").is_none());
        assert_eq!(group.len(), 1);
        assert!(!group.is_empty());
    }
}
