//! Task domain types for `Taskboard`.
//!
//! Defines the authoritative task record, the closed bucket set used by
//! the per-user category index, and the creation/patch shapes accepted
//! at the service boundary. All types serialize as JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
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

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The closed set of index buckets.
///
/// The category catalog may define additional named categories for
/// display purposes, but the per-user index only recognizes these
/// three. A catalog entry whose name falls outside this set cannot be
/// the target of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Not yet started.
    #[serde(rename = "To Do")]
    ToDo,
    /// Actively being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished.
    #[serde(rename = "Done")]
    Done,
}

impl Bucket {
    /// All buckets in display order.
    pub const ALL: [Self; 3] = [Self::ToDo, Self::InProgress, Self::Done];

    /// Canonical display name, as stored in the category catalog.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Parses a canonical category name into a bucket.
    ///
    /// Returns `None` for any name outside the closed set — callers
    /// treat that as an unknown category, never as a silent fallback.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "To Do" => Some(Self::ToDo),
            "In Progress" => Some(Self::InProgress),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An authoritative task record.
///
/// `id` and `owner_email` are immutable after creation; `category`
/// changes only through the move operation so the owner's index is
/// updated in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Identity of the owning user.
    pub owner_email: String,
    /// Short task title.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
    /// Deadline in milliseconds since epoch.
    pub deadline: u64,
    /// Which bucket the task currently sits in.
    pub category: Bucket,
}

/// Fields supplied when creating a task.
///
/// The identifier is assigned by the store; the owner comes from the
/// request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Short task title.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
    /// Deadline in milliseconds since epoch.
    pub deadline: u64,
    /// Initial bucket.
    pub category: Bucket,
}

/// A partial field update for a task.
///
/// Only supplied fields are changed; omitted fields are left untouched.
/// There is deliberately no `category` field here — category changes go
/// through the move operation so the index stays in sync — and unknown
/// fields are rejected at decode time so a request cannot smuggle a
/// category change through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    /// New title, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New deadline, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,
}

impl TaskPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline.is_none()
    }
}
