//! Authoritative task store.
//!
//! The [`TaskStore`] owns the task records themselves: creation, field
//! updates, category changes, and deletion. It knows nothing about the
//! per-user index — sequencing a store mutation with the matching index
//! mutation is the coordinator's job.

use std::collections::HashMap;

use taskboard_proto::task::{Bucket, Task, TaskDraft, TaskId, TaskPatch};
use tokio::sync::RwLock;

/// Errors that can occur during task store operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced task does not exist (or was concurrently deleted).
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
}

/// In-memory authoritative record of all tasks.
///
/// Thread-safe via [`RwLock`]. Each operation commits independently;
/// there is no transaction spanning two calls.
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates a new, empty task store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Persists a new task record, assigning its identifier.
    pub async fn create(&self, owner_email: &str, draft: TaskDraft) -> TaskId {
        let id = TaskId::new();
        let task = Task {
            id,
            owner_email: owner_email.to_string(),
            title: draft.title,
            description: draft.description,
            deadline: draft.deadline,
            category: draft.category,
        };
        let mut tasks = self.tasks.write().await;
        tasks.insert(id, task);
        drop(tasks);
        id
    }

    /// Fetches a task by id.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        let tasks = self.tasks.read().await;
        tasks.get(id).cloned()
    }

    /// Applies a partial field update, returning the number of records
    /// modified (0 when the patch changes nothing).
    ///
    /// Only fields present in the patch are replaced; omitted fields
    /// keep their current values. The category is not reachable from
    /// this path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if the task does not exist.
    pub async fn update_fields(&self, id: &TaskId, patch: &TaskPatch) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(id).ok_or(StoreError::TaskNotFound(*id))?;

        let mut modified = false;
        if let Some(title) = &patch.title
            && *title != task.title
        {
            task.title = title.clone();
            modified = true;
        }
        if let Some(description) = &patch.description
            && *description != task.description
        {
            task.description = description.clone();
            modified = true;
        }
        if let Some(deadline) = patch.deadline
            && deadline != task.deadline
        {
            task.deadline = deadline;
            modified = true;
        }
        drop(tasks);
        Ok(u64::from(modified))
    }

    /// Sets the task's category, returning the record's previous state
    /// so the caller can compute which index bucket to remove from.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if the task does not exist.
    pub async fn set_category(&self, id: &TaskId, category: Bucket) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(id).ok_or(StoreError::TaskNotFound(*id))?;
        let previous = task.clone();
        task.category = category;
        drop(tasks);
        Ok(previous)
    }

    /// Deletes a task record, returning the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if the task does not exist,
    /// which a caller can hit when two deletes race.
    pub async fn delete(&self, id: &TaskId) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.remove(id) {
            Some(_) => Ok(1),
            None => Err(StoreError::TaskNotFound(*id)),
        }
    }

    /// All stored task identifiers, in no particular order.
    ///
    /// Reconciliation helper: reaches records the per-user index has
    /// lost track of.
    pub async fn ids(&self) -> Vec<TaskId> {
        let tasks = self.tasks.read().await;
        tasks.keys().copied().collect()
    }

    /// Number of task records currently stored.
    pub async fn len(&self) -> usize {
        let tasks = self.tasks.read().await;
        tasks.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
