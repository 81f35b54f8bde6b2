//! Category catalog types.
//!
//! The catalog maps opaque category identifiers to display names. It is
//! open-ended — entries outside the closed bucket set are legal catalog
//! rows — but only entries whose name resolves to a [`Bucket`] can be
//! the target of a task move.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::Bucket;

/// Unique identifier for a catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Creates a new category identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `CategoryId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CategoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A catalog entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique catalog identifier.
    pub id: CategoryId,
    /// Display name, e.g. `"To Do"`.
    pub name: String,
}

impl Category {
    /// Resolves this entry's name against the closed bucket set.
    ///
    /// Returns `None` for catalog entries that exist for display only.
    #[must_use]
    pub fn bucket(&self) -> Option<Bucket> {
        Bucket::from_name(&self.name)
    }
}
