//! Per-user denormalized index types.
//!
//! Each user carries exactly three ordered collections of task
//! identifiers, one per bucket. The correctness property the rest of
//! the system maintains: every task owned by a user appears in exactly
//! one bucket of that user's index, matching the task's category.

use serde::{Deserialize, Serialize};

use crate::task::{Bucket, TaskId};

/// The three ordered task-id buckets of a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndex {
    /// Tasks not yet started, in insertion order.
    #[serde(rename = "ToDo")]
    pub to_do: Vec<TaskId>,
    /// Tasks being worked on, in insertion order.
    #[serde(rename = "InProgress")]
    pub in_progress: Vec<TaskId>,
    /// Finished tasks, in insertion order.
    #[serde(rename = "Done")]
    pub done: Vec<TaskId>,
}

impl CategoryIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            to_do: Vec::new(),
            in_progress: Vec::new(),
            done: Vec::new(),
        }
    }

    /// Returns the ordered id list for a bucket.
    #[must_use]
    pub const fn bucket(&self, bucket: Bucket) -> &Vec<TaskId> {
        match bucket {
            Bucket::ToDo => &self.to_do,
            Bucket::InProgress => &self.in_progress,
            Bucket::Done => &self.done,
        }
    }

    /// Returns the ordered id list for a bucket, mutably.
    pub const fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<TaskId> {
        match bucket {
            Bucket::ToDo => &mut self.to_do,
            Bucket::InProgress => &mut self.in_progress,
            Bucket::Done => &mut self.done,
        }
    }

    /// Returns the bucket currently holding `id`, if any.
    #[must_use]
    pub fn locate(&self, id: &TaskId) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| self.bucket(*bucket).contains(id))
    }

    /// Total number of indexed task ids across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_do.len() + self.in_progress.len() + self.done.len()
    }

    /// Returns `true` if no bucket holds any id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The index-relevant slice of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identity key.
    pub email: String,
    /// The user's three-bucket task index.
    pub category_index: CategoryIndex,
}

impl UserRecord {
    /// Creates a user record with empty buckets.
    #[must_use]
    pub const fn new(email: String) -> Self {
        Self {
            email,
            category_index: CategoryIndex::new(),
        }
    }
}
