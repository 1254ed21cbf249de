//! Repository port for task persistence and tag association.

use crate::task::domain::{OwnerId, TagId, Task, TaskId, TaskRevision};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Which tasks an owner-scoped listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionFilter {
    /// Only tasks that are not soft-deleted.
    Active,
    /// Only soft-deleted tasks.
    Deleted,
    /// Every task regardless of deletion state.
    Any,
}

impl DeletionFilter {
    /// Returns `true` when the task passes the filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::Active => !task.is_deleted(),
            Self::Deleted => task.is_deleted(),
            Self::Any => true,
        }
    }
}

/// Outcome of [`TaskRepository::complete_with_successor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessorWrite {
    /// Revision the completed task was stored at.
    pub original_revision: TaskRevision,
    /// Tags the successor received from the completed task.
    pub successor_tags: BTreeSet<TagId>,
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its tag associations.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task, tags included.
    ///
    /// The write only succeeds when the stored revision equals
    /// [`Task::revision`]; the stored revision then advances by one and the
    /// new value is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::StaleRevision`] when another writer got
    /// there first.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<TaskRevision>;

    /// Finds a task by identifier, deleted or not.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the owner's tasks passing `filter`, newest first.
    async fn find_by_owner(
        &self,
        owner: OwnerId,
        filter: DeletionFilter,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the owner's tasks among `ids`. Unknown or foreign IDs are
    /// skipped.
    async fn find_by_ids(&self, owner: OwnerId, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the occurrences spawned from the given root task.
    async fn find_occurrences(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Copies the stored tag set of `from` onto `to`, replacing any tags `to`
    /// had, and returns the copied set.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when either task does not
    /// exist.
    async fn copy_tags(&self, from: TaskId, to: TaskId) -> TaskRepositoryResult<BTreeSet<TagId>>;

    /// Persists a completed task and stores its next occurrence as one write.
    ///
    /// `original` is written under the same revision check as
    /// [`Self::update`], `successor` is stored, and the original's tags are
    /// copied onto it. Either all three take effect or none does.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] or
    /// [`TaskRepositoryError::StaleRevision`] for the original and
    /// [`TaskRepositoryError::DuplicateTask`] when the successor ID is taken.
    async fn complete_with_successor(
        &self,
        original: &Task,
        successor: &Task,
    ) -> TaskRepositoryResult<SuccessorWrite>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored revision moved on since the task was read.
    #[error("task {id} was modified concurrently (expected revision {expected})")]
    StaleRevision {
        /// Task whose update was rejected.
        id: TaskId,
        /// Revision presented by the rejected writer.
        expected: TaskRevision,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
