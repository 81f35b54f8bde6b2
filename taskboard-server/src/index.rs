//! Per-user denormalized task index.
//!
//! Holds, for every user, the three ordered bucket collections of task
//! identifiers. All bucket mutations are idempotent — append-if-absent
//! and remove-if-present — so a retried or interleaved call converges
//! instead of duplicating or double-removing an entry.
//!
//! Users are created through [`UserIndex::create_user`] by the
//! registration surface; the coordinator only ever mutates buckets of
//! users that already exist.

use std::collections::HashMap;

use taskboard_proto::task::{Bucket, TaskId};
use taskboard_proto::user::{CategoryIndex, UserRecord};
use tokio::sync::RwLock;

/// Errors that can occur during user index operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The email does not resolve to a user record. Recoverable — the
    /// coordinator reports it rather than crashing on it.
    #[error("user not found: {0}")]
    UserNotFound(String),
    /// A user with the same email already exists.
    #[error("a user with that email already exists")]
    EmailTaken,
}

/// In-memory per-user category index.
///
/// Thread-safe via [`RwLock`]. Each mutation takes the write lock once
/// and commits independently of any task store mutation.
pub struct UserIndex {
    users: RwLock<HashMap<String, CategoryIndex>>,
}

impl Default for UserIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl UserIndex {
    /// Creates a new index with no users.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a user with empty buckets.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmailTaken`] if the email is already
    /// registered.
    pub async fn create_user(&self, email: &str) -> Result<(), IndexError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(IndexError::EmailTaken);
        }
        users.insert(email.to_string(), CategoryIndex::new());
        drop(users);
        Ok(())
    }

    /// Returns `true` if a user with this email exists.
    pub async fn contains_user(&self, email: &str) -> bool {
        let users = self.users.read().await;
        users.contains_key(email)
    }

    /// Returns a point-in-time copy of a user's record.
    pub async fn snapshot(&self, email: &str) -> Option<UserRecord> {
        let users = self.users.read().await;
        users.get(email).map(|index| UserRecord {
            email: email.to_string(),
            category_index: index.clone(),
        })
    }

    /// Appends a task id to a bucket unless it is already present.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UserNotFound`] for an unknown email.
    pub async fn add_to_bucket(
        &self,
        email: &str,
        bucket: Bucket,
        id: TaskId,
    ) -> Result<(), IndexError> {
        let mut users = self.users.write().await;
        let index = users
            .get_mut(email)
            .ok_or_else(|| IndexError::UserNotFound(email.to_string()))?;
        let entries = index.bucket_mut(bucket);
        if !entries.contains(&id) {
            entries.push(id);
        }
        drop(users);
        Ok(())
    }

    /// Removes a task id from a bucket if it is present.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UserNotFound`] for an unknown email.
    pub async fn remove_from_bucket(
        &self,
        email: &str,
        bucket: Bucket,
        id: TaskId,
    ) -> Result<(), IndexError> {
        let mut users = self.users.write().await;
        let index = users
            .get_mut(email)
            .ok_or_else(|| IndexError::UserNotFound(email.to_string()))?;
        index.bucket_mut(bucket).retain(|entry| *entry != id);
        drop(users);
        Ok(())
    }

    /// Moves a task id between buckets under a single write lock:
    /// remove-if-present from `from`, then append-if-absent to `to`.
    ///
    /// When `from == to` the id's position is preserved — the entry is
    /// neither duplicated nor reordered.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UserNotFound`] for an unknown email.
    pub async fn move_bucket(
        &self,
        email: &str,
        from: Bucket,
        to: Bucket,
        id: TaskId,
    ) -> Result<(), IndexError> {
        let mut users = self.users.write().await;
        let index = users
            .get_mut(email)
            .ok_or_else(|| IndexError::UserNotFound(email.to_string()))?;

        if from == to {
            let entries = index.bucket_mut(to);
            if !entries.contains(&id) {
                entries.push(id);
            }
            drop(users);
            return Ok(());
        }

        index.bucket_mut(from).retain(|entry| *entry != id);
        let entries = index.bucket_mut(to);
        if !entries.contains(&id) {
            entries.push(id);
        }
        drop(users);
        Ok(())
    }
}
