//! Category catalog adapter.
//!
//! Read-mostly id-to-name lookup consulted when a move targets a
//! category. The catalog is open-ended: it always contains the three
//! bucket categories and may grow display-only entries, but a move
//! targeting an entry whose name is outside the closed bucket set is
//! rejected by the coordinator.

use parking_lot::RwLock;
use taskboard_proto::category::{Category, CategoryId};
use taskboard_proto::task::Bucket;

/// In-memory category catalog, seeded with the three bucket categories.
pub struct CategoryCatalog {
    entries: RwLock<Vec<Category>>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryCatalog {
    /// Creates a catalog containing one entry per bucket.
    #[must_use]
    pub fn new() -> Self {
        let entries = Bucket::ALL
            .into_iter()
            .map(|bucket| Category {
                id: CategoryId::new(),
                name: bucket.name().to_string(),
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Adds a catalog entry and returns it.
    ///
    /// Entries are append-only; nothing prevents a display-only name
    /// outside the bucket set.
    pub fn insert(&self, name: &str) -> Category {
        let category = Category {
            id: CategoryId::new(),
            name: name.to_string(),
        };
        self.entries.write().push(category.clone());
        category
    }

    /// Resolves a category id to its catalog entry.
    #[must_use]
    pub fn resolve(&self, id: &CategoryId) -> Option<Category> {
        self.entries.read().iter().find(|c| c.id == *id).cloned()
    }

    /// Returns all catalog entries in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Category> {
        self.entries.read().clone()
    }

    /// Returns the id of the catalog entry for a bucket.
    ///
    /// The seed rows guarantee one entry per bucket, so this only
    /// returns `None` if that invariant is broken.
    #[must_use]
    pub fn bucket_id(&self, bucket: Bucket) -> Option<CategoryId> {
        self.entries
            .read()
            .iter()
            .find(|c| c.name == bucket.name())
            .map(|c| c.id)
    }
}
