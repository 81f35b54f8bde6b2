//! Index consistency coordinator.
//!
//! Sequences task store and user index mutations for each logical
//! operation. There is no transaction spanning the two components, so
//! each operation is a short saga: a fixed step order with a defined
//! policy when a step fails after an earlier step already committed.
//! Such failures surface as [`CoordinatorError::PartialInconsistency`],
//! naming the committed steps, and are never downgraded to a generic
//! success or a generic error.
//!
//! Operations on the same task are serialized through a per-identifier
//! async lock, so interleaved sagas cannot leave the index pointing at
//! a bucket that disagrees with the task's recorded category.

use std::collections::HashMap;
use std::sync::Arc;

use taskboard_proto::category::{Category, CategoryId};
use taskboard_proto::task::{Bucket, MAX_TASK_TITLE_LENGTH, Task, TaskDraft, TaskId, TaskPatch};
use taskboard_proto::user::CategoryIndex;
use tokio::sync::Mutex;

use crate::catalog::CategoryCatalog;
use crate::index::{IndexError, UserIndex};
use crate::store::{StoreError, TaskStore};

/// A saga step that commits state. Reported by name when a later step
/// fails and the operation ends partially applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaStep {
    /// The task record was inserted into the store.
    TaskInsert,
    /// The task's category field was updated in the store.
    TaskCategorySet,
    /// The task record was deleted from the store.
    TaskDelete,
}

impl SagaStep {
    /// Stable wire name of the step.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TaskInsert => "task_insert",
            Self::TaskCategorySet => "task_category_set",
            Self::TaskDelete => "task_delete",
        }
    }
}

/// Errors returned by coordinator operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The claimed owner does not match the authenticated identity, or
    /// the task belongs to a different user. Nothing was mutated.
    #[error("forbidden: owner does not match the authenticated identity")]
    Forbidden,
    /// The referenced task does not exist. Nothing was mutated beyond
    /// what already completed.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The claimed owner does not resolve to a user record.
    #[error("user not found: {0}")]
    UserNotFound(String),
    /// The target category id is unknown, or its name is outside the
    /// closed bucket set.
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),
    /// A task title must be non-empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// A task title must fit the length cap.
    #[error("task title too long (max {MAX_TASK_TITLE_LENGTH} characters)")]
    TitleTooLong,
    /// The saga committed the listed steps, then the index mutation
    /// failed. The store and the index now disagree until reconciled.
    #[error("{op}: index update failed after {completed:?}: {source}")]
    PartialInconsistency {
        /// Which operation was running.
        op: &'static str,
        /// Steps that committed, in execution order.
        completed: Vec<SagaStep>,
        /// The index failure that ended the saga.
        #[source]
        source: IndexError,
    },
}

impl CoordinatorError {
    /// Wire names of the committed steps, empty for clean failures.
    #[must_use]
    pub fn completed_step_names(&self) -> Vec<String> {
        match self {
            Self::PartialInconsistency { completed, .. } => {
                completed.iter().map(|step| step.name().to_string()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Orchestrates task store and user index mutations.
///
/// Holds shared handles to the three leaf components, injected at
/// construction; the components never talk to each other directly.
pub struct Coordinator {
    store: Arc<TaskStore>,
    index: Arc<UserIndex>,
    catalog: Arc<CategoryCatalog>,
    /// Per-task locks serializing sagas that touch the same task.
    /// Entries are retained for the process lifetime; sagas on a
    /// deleted id fail fast on the store lookup.
    task_locks: Mutex<HashMap<TaskId, Arc<Mutex<()>>>>,
}

impl Coordinator {
    /// Creates a coordinator over the given components.
    #[must_use]
    pub fn new(store: Arc<TaskStore>, index: Arc<UserIndex>, catalog: Arc<CategoryCatalog>) -> Self {
        Self {
            store,
            index,
            catalog,
            task_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock guarding sagas on `id`, creating it on first use.
    async fn lock_for(&self, id: TaskId) -> Arc<Mutex<()>> {
        let mut locks = self.task_locks.lock().await;
        Arc::clone(locks.entry(id).or_default())
    }

    /// Ownership gate applied before every state-changing operation.
    fn check_owner(authenticated: &str, claimed: &str) -> Result<(), CoordinatorError> {
        if authenticated == claimed {
            Ok(())
        } else {
            Err(CoordinatorError::Forbidden)
        }
    }

    fn check_title(title: &str) -> Result<(), CoordinatorError> {
        if title.is_empty() {
            return Err(CoordinatorError::TitleEmpty);
        }
        if title.chars().count() > MAX_TASK_TITLE_LENGTH {
            return Err(CoordinatorError::TitleTooLong);
        }
        Ok(())
    }

    /// Fetches a task and verifies it belongs to `owner_email`.
    ///
    /// The record-level check closes a hole the request-level gate
    /// cannot: without it, a caller could mutate another user's task
    /// while indexing it under their own email, breaking the
    /// one-bucket-per-task invariant for the true owner.
    async fn get_owned(&self, owner_email: &str, id: TaskId) -> Result<Task, CoordinatorError> {
        let task = self
            .store
            .get(&id)
            .await
            .ok_or(CoordinatorError::TaskNotFound(id))?;
        if task.owner_email != owner_email {
            return Err(CoordinatorError::Forbidden);
        }
        Ok(task)
    }

    /// Creates a task and indexes it under the owner's initial bucket.
    ///
    /// Step order: insert the task record, then append its id to the
    /// owner's bucket. The category is taken directly from the draft —
    /// it is already a member of the closed bucket set, so the catalog
    /// is not consulted here.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Forbidden`] before any mutation on an owner
    /// mismatch; [`CoordinatorError::PartialInconsistency`] if the
    /// record was inserted but the index append failed — the task then
    /// exists and is reachable by direct lookup, but no bucket
    /// references it until reconciled.
    pub async fn create_task(
        &self,
        authenticated: &str,
        owner_email: &str,
        draft: TaskDraft,
    ) -> Result<TaskId, CoordinatorError> {
        Self::check_owner(authenticated, owner_email)?;
        Self::check_title(&draft.title)?;

        let bucket = draft.category;
        let id = self.store.create(owner_email, draft).await;

        if let Err(source) = self.index.add_to_bucket(owner_email, bucket, id).await {
            tracing::warn!(
                task_id = %id,
                email = %owner_email,
                error = %source,
                "task created but not indexed"
            );
            return Err(CoordinatorError::PartialInconsistency {
                op: "create_task",
                completed: vec![SagaStep::TaskInsert],
                source,
            });
        }

        tracing::info!(task_id = %id, email = %owner_email, bucket = %bucket, "task created");
        Ok(id)
    }

    /// Moves a task to the category named by a catalog entry.
    ///
    /// Step order: fetch the task, resolve the target against the
    /// closed bucket set, update the record's category, then move the
    /// id between the owner's buckets. A move onto the task's current
    /// bucket short-circuits before touching either component.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::CategoryNotFound`] for an unknown catalog id
    /// or a display-only category; [`CoordinatorError::PartialInconsistency`]
    /// if the record's category changed but the index move failed.
    pub async fn move_task(
        &self,
        authenticated: &str,
        owner_email: &str,
        id: TaskId,
        category_id: CategoryId,
    ) -> Result<(), CoordinatorError> {
        Self::check_owner(authenticated, owner_email)?;

        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let existing = self.get_owned(owner_email, id).await?;

        let target = self
            .catalog
            .resolve(&category_id)
            .and_then(|category| category.bucket())
            .ok_or(CoordinatorError::CategoryNotFound(category_id))?;

        let previous = existing.category;
        if previous == target {
            tracing::debug!(task_id = %id, bucket = %target, "move is a no-op");
            return Ok(());
        }

        match self.store.set_category(&id, target).await {
            Ok(_) => {}
            // Lost a race with a delete; nothing committed.
            Err(StoreError::TaskNotFound(_)) => return Err(CoordinatorError::TaskNotFound(id)),
        }

        if let Err(source) = self.index.move_bucket(owner_email, previous, target, id).await {
            tracing::warn!(
                task_id = %id,
                email = %owner_email,
                from = %previous,
                to = %target,
                error = %source,
                "task category changed but index still reflects the old bucket"
            );
            return Err(CoordinatorError::PartialInconsistency {
                op: "move_task",
                completed: vec![SagaStep::TaskCategorySet],
                source,
            });
        }

        tracing::info!(task_id = %id, from = %previous, to = %target, "task moved");
        Ok(())
    }

    /// Deletes a task, then prunes its id from the owner's bucket.
    ///
    /// The authoritative record goes first: a failure between the two
    /// steps leaves a dangling index reference, which readers already
    /// handle as not-found, rather than a deleted-but-live entry.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::TaskNotFound`] if the task is absent
    /// (including a concurrent-delete race);
    /// [`CoordinatorError::PartialInconsistency`] if the record was
    /// deleted but the index prune failed.
    pub async fn delete_task(
        &self,
        authenticated: &str,
        owner_email: &str,
        id: TaskId,
    ) -> Result<(), CoordinatorError> {
        Self::check_owner(authenticated, owner_email)?;

        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let existing = self.get_owned(owner_email, id).await?;
        let bucket = existing.category;

        match self.store.delete(&id).await {
            Ok(_) => {}
            Err(StoreError::TaskNotFound(_)) => return Err(CoordinatorError::TaskNotFound(id)),
        }

        if let Err(source) = self.index.remove_from_bucket(owner_email, bucket, id).await {
            tracing::warn!(
                task_id = %id,
                email = %owner_email,
                bucket = %bucket,
                error = %source,
                "task deleted but its index entry remains"
            );
            return Err(CoordinatorError::PartialInconsistency {
                op: "delete_task",
                completed: vec![SagaStep::TaskDelete],
                source,
            });
        }

        tracing::info!(task_id = %id, email = %owner_email, "task deleted");
        Ok(())
    }

    /// Applies a partial field update. Never touches the index — the
    /// patch type cannot carry a category, so a category change cannot
    /// bypass the move path.
    ///
    /// Returns the number of records modified (0 for a no-op patch).
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Forbidden`] on an owner mismatch,
    /// [`CoordinatorError::TaskNotFound`] for an unknown task, or a
    /// title validation error; none of these mutate state.
    pub async fn update_task_fields(
        &self,
        authenticated: &str,
        owner_email: &str,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<u64, CoordinatorError> {
        Self::check_owner(authenticated, owner_email)?;
        if let Some(title) = &patch.title {
            Self::check_title(title)?;
        }

        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        self.get_owned(owner_email, id).await?;
        match self.store.update_fields(&id, patch).await {
            Ok(modified) => {
                tracing::info!(task_id = %id, modified = modified, "task fields updated");
                Ok(modified)
            }
            Err(StoreError::TaskNotFound(_)) => Err(CoordinatorError::TaskNotFound(id)),
        }
    }

    /// Fetches a task by id, enforcing ownership.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Forbidden`] or [`CoordinatorError::TaskNotFound`].
    pub async fn get_task(
        &self,
        authenticated: &str,
        owner_email: &str,
        id: TaskId,
    ) -> Result<Task, CoordinatorError> {
        Self::check_owner(authenticated, owner_email)?;
        self.get_owned(owner_email, id).await
    }

    /// Returns the owner's index slice: all task ids grouped by bucket.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Forbidden`] or [`CoordinatorError::UserNotFound`].
    pub async fn task_ids(
        &self,
        authenticated: &str,
        owner_email: &str,
    ) -> Result<CategoryIndex, CoordinatorError> {
        Self::check_owner(authenticated, owner_email)?;
        self.index
            .snapshot(owner_email)
            .await
            .map(|record| record.category_index)
            .ok_or_else(|| CoordinatorError::UserNotFound(owner_email.to_string()))
    }

    /// Returns all catalog entries.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.catalog.list()
    }

    /// Verifies the core invariant for one user: every task owned by
    /// the user appears in exactly one bucket, matching its category.
    /// Test and reconciliation helper.
    pub async fn index_consistent_for(&self, email: &str) -> bool {
        let Some(record) = self.index.snapshot(email).await else {
            return false;
        };
        for bucket in Bucket::ALL {
            for id in record.category_index.bucket(bucket) {
                match self.store.get(id).await {
                    Some(task) if task.category == bucket && task.owner_email == email => {}
                    _ => return false,
                }
            }
        }
        true
    }
}
