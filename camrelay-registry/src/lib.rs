//! # camrelay Registry
//!
//! Turns already-parsed configuration into a validated [`SourceRegistry`]:
//!
//! - **Identity**: Derives each source's stable id from its origin URL and a
//!   URL-safe slug from its label
//! - **Fail fast**: Rejects duplicate or empty identifiers at build time, so
//!   the cache never serves under ambiguous identity
//! - **Groups**: Builds named groups with optional status feeds and a
//!   content fingerprint over their membership
//!
//! Parsing and validating the raw configuration document is the loading
//! collaborator's job; this crate consumes [`GroupConfig`] values it hands
//! over.
//!
//! ## Example
//!
//! ```rust
//! use camrelay_registry::{GroupConfig, SourceConfig, SourceRegistry};
//!
//! let registry = SourceRegistry::build(vec![GroupConfig {
//!     name: "harbor".into(),
//!     status_url: None,
//!     sources: vec![SourceConfig::image("North Pier", "http://origin/north.jpg")],
//! }])
//! .unwrap();
//!
//! assert_eq!(registry.groups().len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod slug;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use camrelay_core::error::{RelayError, Result};
use camrelay_core::types::{Group, Source, SourceKind};

/// Raw description of one source, as handed over by the configuration
/// collaborator.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display label; slugified into a lookup identifier when non-empty
    pub label: String,
    /// Origin URL
    pub url: String,
    /// Feed kind; defaults to a fetchable image
    #[serde(default)]
    pub kind: SourceKind,
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

impl SourceConfig {
    /// Shorthand for an image source with just a label and URL.
    pub fn image(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Raw description of one group.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group name, unique across the configuration
    pub name: String,
    /// Optional status feed URL for the whole group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
    /// Ordered member sources
    pub sources: Vec<SourceConfig>,
}

/// Validated full set of groups currently served.
///
/// Construction either succeeds with every identifier unambiguous or fails
/// with the first configuration error; there is no partially-valid registry.
#[derive(Clone, Debug)]
pub struct SourceRegistry {
    groups: Vec<Group>,
}

impl SourceRegistry {
    /// Builds a validated registry from parsed configuration.
    ///
    /// # Errors
    ///
    /// Fails fast on an empty or unparseable origin URL, a non-empty label
    /// that slugifies to nothing, or any duplicate id, slug, or group name.
    pub fn build(configs: Vec<GroupConfig>) -> Result<Self> {
        let mut seen_ids: HashMap<String, String> = HashMap::new();
        let mut seen_slugs: HashSet<String> = HashSet::new();
        let mut seen_groups: HashSet<String> = HashSet::new();
        let mut groups = Vec::with_capacity(configs.len());

        for config in configs {
            let name = config.name.trim().to_string();
            if name.is_empty() {
                return Err(RelayError::ConfigError("group name is empty".into()));
            }
            if !seen_groups.insert(name.clone()) {
                return Err(RelayError::DuplicateGroup(name));
            }

            let status = config
                .status_url
                .map(|url| {
                    let config = SourceConfig {
                        label: String::new(),
                        url,
                        kind: SourceKind::Status,
                        ..Default::default()
                    };
                    build_source(config, &name, &mut seen_ids, &mut seen_slugs)
                })
                .transpose()?;

            let mut sources = Vec::with_capacity(config.sources.len());
            for source in config.sources {
                sources.push(build_source(source, &name, &mut seen_ids, &mut seen_slugs)?);
            }

            debug!(group = %name, sources = sources.len(), "Validated group");
            groups.push(Group::new(name, status, sources));
        }

        let registry = Self { groups };
        info!(
            groups = registry.groups.len(),
            sources = registry.sources().count(),
            "Built source registry"
        );
        Ok(registry)
    }

    /// All groups, in configuration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Looks up a group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Iterates every source in the registry, status feeds included.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.groups
            .iter()
            .flat_map(|g| g.status.iter().chain(g.sources.iter()))
    }
}

/// Validates one source description and assigns its identifiers.
fn build_source(
    config: SourceConfig,
    group: &str,
    seen_ids: &mut HashMap<String, String>,
    seen_slugs: &mut HashSet<String>,
) -> Result<Source> {
    let url = config.url.trim().to_string();
    if url.is_empty() {
        return Err(RelayError::InvalidOrigin {
            url,
            reason: "origin URL is empty".into(),
        });
    }
    Url::parse(&url).map_err(|e| RelayError::InvalidOrigin {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    let id = Source::derive_id(&url);
    if let Some(previous) = seen_ids.insert(id.clone(), url.clone()) {
        return Err(RelayError::DuplicateId { id, url: previous });
    }

    let slug = if config.label.is_empty() {
        None
    } else {
        let slug = slug::slugify(&config.label);
        if slug.is_empty() {
            return Err(RelayError::EmptySlug {
                label: config.label,
            });
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(RelayError::DuplicateSlug(slug));
        }
        Some(slug)
    };

    let mut source = Source::new(config.label, url, group, config.kind);
    source.slug = slug;
    source.external_id = config.external_id;
    source.latitude = config.latitude;
    source.longitude = config.longitude;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_group(name: &str, urls: &[(&str, &str)]) -> GroupConfig {
        GroupConfig {
            name: name.into(),
            status_url: None,
            sources: urls
                .iter()
                .map(|(label, url)| SourceConfig::image(*label, *url))
                .collect(),
        }
    }

    #[test]
    fn test_build_assigns_ids_and_slugs() {
        let registry = SourceRegistry::build(vec![make_group(
            "harbor",
            &[("North Pier", "http://o/north.jpg"), ("South Pier", "http://o/south.jpg")],
        )])
        .unwrap();

        let group = registry.group("harbor").unwrap();
        assert_eq!(group.sources.len(), 2);
        assert_eq!(group.sources[0].slug.as_deref(), Some("north-pier"));
        assert_eq!(group.sources[0].id, Source::derive_id("http://o/north.jpg"));
        assert_eq!(group.sources[0].group, "harbor");
    }

    #[test]
    fn test_status_source_has_no_slug() {
        let registry = SourceRegistry::build(vec![GroupConfig {
            name: "harbor".into(),
            status_url: Some("http://o/status.json".into()),
            sources: vec![SourceConfig::image("North", "http://o/north.jpg")],
        }])
        .unwrap();

        let status = registry.group("harbor").unwrap().status.as_ref().unwrap();
        assert_eq!(status.kind, SourceKind::Status);
        assert!(status.slug.is_none());
        assert!(status.label.is_empty());
    }

    #[test]
    fn test_sources_iterates_status_feeds() {
        let registry = SourceRegistry::build(vec![GroupConfig {
            name: "harbor".into(),
            status_url: Some("http://o/status.json".into()),
            sources: vec![SourceConfig::image("North", "http://o/north.jpg")],
        }])
        .unwrap();

        assert_eq!(registry.sources().count(), 2);
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let result = SourceRegistry::build(vec![make_group(
            "harbor",
            &[("North", "http://o/cam.jpg"), ("South", "http://o/cam.jpg")],
        )]);
        assert!(matches!(result, Err(RelayError::DuplicateId { .. })));
    }

    #[test]
    fn test_duplicate_slug_rejected_across_groups() {
        let result = SourceRegistry::build(vec![
            make_group("harbor", &[("North Pier", "http://o/a.jpg")]),
            make_group("hills", &[("North  Pier!", "http://o/b.jpg")]),
        ]);
        assert!(matches!(result, Err(RelayError::DuplicateSlug(s)) if s == "north-pier"));
    }

    #[test]
    fn test_empty_slug_rejected() {
        let result = SourceRegistry::build(vec![make_group("harbor", &[("!!!", "http://o/a.jpg")])]);
        assert!(matches!(result, Err(RelayError::EmptySlug { .. })));
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = SourceRegistry::build(vec![make_group("harbor", &[("North", "  ")])]);
        assert!(matches!(result, Err(RelayError::InvalidOrigin { .. })));
    }

    #[test]
    fn test_unparseable_url_rejected() {
        let result = SourceRegistry::build(vec![make_group("harbor", &[("North", "not a url")])]);
        assert!(matches!(result, Err(RelayError::InvalidOrigin { .. })));
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let result = SourceRegistry::build(vec![
            make_group("harbor", &[("North", "http://o/a.jpg")]),
            make_group("harbor", &[("South", "http://o/b.jpg")]),
        ]);
        assert!(matches!(result, Err(RelayError::DuplicateGroup(_))));
    }

    #[test]
    fn test_empty_group_name_rejected() {
        let result = SourceRegistry::build(vec![make_group("  ", &[("North", "http://o/a.jpg")])]);
        assert!(matches!(result, Err(RelayError::ConfigError(_))));
    }

    #[test]
    fn test_group_fingerprint_set() {
        let registry =
            SourceRegistry::build(vec![make_group("harbor", &[("North", "http://o/a.jpg")])])
                .unwrap();
        let group = registry.group("harbor").unwrap();
        assert_eq!(group.fingerprint_hex().len(), 16);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "name": "harbor",
            "status_url": "http://o/status.json",
            "sources": [
                {"label": "North Pier", "url": "http://o/north.jpg"},
                {"label": "Overview", "url": "http://o/map", "kind": "embedded-frame"}
            ]
        }"#;
        let config: GroupConfig = serde_json::from_str(json).unwrap();
        let registry = SourceRegistry::build(vec![config]).unwrap();

        let group = registry.group("harbor").unwrap();
        assert_eq!(group.sources[1].kind, SourceKind::EmbeddedFrame);
        assert!(group.status.is_some());
    }
}
