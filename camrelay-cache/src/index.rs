//! Lookup index over cache cells.
//!
//! The index is immutable after construction: reload builds a fresh one and
//! swaps the reference, so lookups never contend with each other or with
//! reconfiguration beyond one brief section in the cache facade.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use camrelay_core::types::Group;
use camrelay_registry::SourceRegistry;

use crate::cell::CameraCell;

/// Immutable id/slug index over the cells of one registry generation.
pub struct CacheIndex {
    cells: Vec<Arc<CameraCell>>,
    by_id: HashMap<String, Arc<CameraCell>>,
    by_slug: HashMap<String, Arc<CameraCell>>,
    groups: Vec<Group>,
}

impl CacheIndex {
    /// Builds an index for a registry, reclaiming cells from `previous`.
    ///
    /// A cell is reused when the new registry contains a source with the
    /// same id; ids are derived from origin URLs, so this is exactly the
    /// same-origin-URL relation. Reused cells get the new source descriptor
    /// and keep their cached content; everything else starts empty.
    pub fn build(registry: &SourceRegistry, previous: Option<&CacheIndex>) -> Self {
        let mut cells = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_slug = HashMap::new();

        for source in registry.sources() {
            let cell = match previous.and_then(|p| p.by_id.get(&source.id)) {
                Some(existing) => {
                    existing.swap_source(Arc::new(source.clone()));
                    existing.clone()
                }
                None => Arc::new(CameraCell::new(source.clone())),
            };

            by_id.insert(source.id.clone(), cell.clone());
            if let Some(slug) = &source.slug {
                by_slug.insert(slug.clone(), cell.clone());
            }
            cells.push(cell);
        }

        debug!(cells = cells.len(), slugs = by_slug.len(), "Built cache index");

        Self {
            cells,
            by_id,
            by_slug,
            groups: registry.groups().to_vec(),
        }
    }

    /// Resolves a cell by id first, then by slug.
    pub fn cell(&self, key: &str) -> Option<&Arc<CameraCell>> {
        self.by_id.get(key).or_else(|| self.by_slug.get(key))
    }

    /// All cells, in registry order (status feeds included).
    pub fn cells(&self) -> &[Arc<CameraCell>] {
        &self.cells
    }

    /// Looks up a group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// All groups, in registry order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the index tracks no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ids of all cells, for reload diffing.
    pub(crate) fn ids(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.id())
    }
}
