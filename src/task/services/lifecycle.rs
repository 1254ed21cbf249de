//! Service layer for task creation, updates, soft deletion, and statistics.

use super::RecurrenceEngine;
use crate::task::{
    domain::{
        OwnerId, RecurrencePattern, RecurrenceSettings, StatusChange, TagId, Task,
        TaskDomainError, TaskDraft, TaskId, TaskPriority, TaskStatus, TaskTitle, TimesPerPeriod,
    },
    ports::{DeletionFilter, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    owner: OwnerId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    tag_ids: Vec<TagId>,
    recurrence_pattern: RecurrencePattern,
    times_per_period: Option<u32>,
    keep_history: bool,
}

impl CreateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(owner: OwnerId, title: impl Into<String>) -> Self {
        Self {
            owner,
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            tag_ids: Vec::new(),
            recurrence_pattern: RecurrencePattern::default(),
            times_per_period: None,
            keep_history: true,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tag associations.
    #[must_use]
    pub fn with_tags(mut self, tag_ids: impl IntoIterator<Item = TagId>) -> Self {
        self.tag_ids = tag_ids.into_iter().collect();
        self
    }

    /// Makes the task recur with the given pattern.
    #[must_use]
    pub const fn with_recurrence(mut self, pattern: RecurrencePattern) -> Self {
        self.recurrence_pattern = pattern;
        self
    }

    /// Sets the per-period completion quota.
    #[must_use]
    pub const fn with_times_per_period(mut self, times_per_period: u32) -> Self {
        self.times_per_period = Some(times_per_period);
        self
    }

    /// Chooses history mode (`true`, the default) or reset-in-place mode.
    #[must_use]
    pub const fn with_keep_history(mut self, keep_history: bool) -> Self {
        self.keep_history = keep_history;
        self
    }
}

/// Request payload for a partial task update.
///
/// Fields left unset are not changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    owner: OwnerId,
    task_id: TaskId,
    title: Option<String>,
    description: Option<Option<String>>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<Option<DateTime<Utc>>>,
    tag_ids: Option<Vec<TagId>>,
    recurrence_pattern: Option<RecurrencePattern>,
    times_per_period: Option<Option<u32>>,
    keep_history: Option<bool>,
}

impl UpdateTaskRequest {
    /// Creates an update for the given task that changes nothing yet.
    #[must_use]
    pub const fn new(owner: OwnerId, task_id: TaskId) -> Self {
        Self {
            owner,
            task_id,
            title: None,
            description: None,
            status: None,
            priority: None,
            due_date: None,
            tag_ids: None,
            recurrence_pattern: None,
            times_per_period: None,
            keep_history: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Assigns a status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Assigns a priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the tag associations.
    #[must_use]
    pub fn with_tags(mut self, tag_ids: impl IntoIterator<Item = TagId>) -> Self {
        self.tag_ids = Some(tag_ids.into_iter().collect());
        self
    }

    /// Changes the recurrence pattern.
    #[must_use]
    pub const fn with_recurrence(mut self, pattern: RecurrencePattern) -> Self {
        self.recurrence_pattern = Some(pattern);
        self
    }

    /// Sets or clears the per-period completion quota.
    #[must_use]
    pub const fn with_times_per_period(mut self, times_per_period: Option<u32>) -> Self {
        self.times_per_period = Some(times_per_period);
        self
    }

    /// Changes history mode.
    #[must_use]
    pub const fn with_keep_history(mut self, keep_history: bool) -> Self {
        self.keep_history = Some(keep_history);
        self
    }

    fn changes_recurrence(&self) -> bool {
        self.recurrence_pattern.is_some()
            || self.times_per_period.is_some()
            || self.keep_history.is_some()
    }
}

/// Result of a task update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskUpdateOutcome {
    /// The updated task as stored.
    pub task: Task,
    /// The occurrence spawned by completing a recurring task in history mode.
    pub next_occurrence: Option<Task>,
}

/// Action applied by a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum BulkTaskAction {
    /// Soft-delete every active task.
    Delete,
    /// Restore every deleted task.
    Restore,
    /// Complete every active task that is not completed yet.
    Complete,
    /// Assign a priority to every active task.
    SetPriority(TaskPriority),
    /// Assign a status to every active task.
    SetStatus(TaskStatus),
}

impl BulkTaskAction {
    /// Parses an action name and its optional value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidBulkRequest`] for an unknown
    /// action or a missing or invalid value.
    pub fn parse(action: &str, value: Option<&str>) -> Result<Self, TaskLifecycleError> {
        let required_value = || {
            value.ok_or_else(|| {
                TaskLifecycleError::InvalidBulkRequest(format!("action '{action}' needs a value"))
            })
        };
        let invalid = |err: crate::task::domain::ParseTaskFieldError| {
            TaskLifecycleError::InvalidBulkRequest(err.to_string())
        };

        match action.trim() {
            "delete" => Ok(Self::Delete),
            "restore" => Ok(Self::Restore),
            "complete" => Ok(Self::Complete),
            "set_priority" => TaskPriority::try_from(required_value()?)
                .map(Self::SetPriority)
                .map_err(invalid),
            "set_status" => TaskStatus::try_from(required_value()?)
                .map(Self::SetStatus)
                .map_err(invalid),
            other => Err(TaskLifecycleError::InvalidBulkRequest(format!(
                "unknown bulk action '{other}'"
            ))),
        }
    }

    /// Returns the action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Restore => "restore",
            Self::Complete => "complete",
            Self::SetPriority(_) => "set_priority",
            Self::SetStatus(_) => "set_status",
        }
    }

    const fn completes(self) -> bool {
        matches!(
            self,
            Self::Complete | Self::SetStatus(TaskStatus::Completed)
        )
    }
}

/// Request payload for a bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTaskRequest {
    owner: OwnerId,
    task_ids: Vec<TaskId>,
    action: BulkTaskAction,
}

impl BulkTaskRequest {
    /// Largest number of task identifiers accepted in one request.
    pub const MAX_TASKS: usize = 100;

    /// Creates a bulk request.
    #[must_use]
    pub fn new(
        owner: OwnerId,
        task_ids: impl IntoIterator<Item = TaskId>,
        action: BulkTaskAction,
    ) -> Self {
        Self {
            owner,
            task_ids: task_ids.into_iter().collect(),
            action,
        }
    }
}

/// Result of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkActionSummary {
    /// The applied action.
    pub action: BulkTaskAction,
    /// Number of tasks the action changed.
    pub updated_count: usize,
    /// Occurrences spawned by completing recurring tasks in history mode.
    pub next_occurrences: Vec<Task>,
    /// Tasks the action failed for. The rest of the batch still ran.
    pub failures: Vec<BulkTaskFailure>,
}

/// A task a bulk action could not be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkTaskFailure {
    /// The task that failed.
    pub task_id: TaskId,
    /// Rendered error.
    pub reason: String,
}

/// Task counts per workflow status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Tasks to do.
    pub todo: usize,
    /// Tasks in progress.
    pub in_progress: usize,
    /// Completed tasks.
    pub completed: usize,
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    /// Low-priority tasks.
    pub low: usize,
    /// Medium-priority tasks.
    pub medium: usize,
    /// High-priority tasks.
    pub high: usize,
}

/// Summary statistics of an owner's tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Active (not deleted) tasks.
    pub total: usize,
    /// Active tasks per status.
    pub by_status: StatusCounts,
    /// Active tasks per priority.
    pub by_priority: PriorityCounts,
    /// Active tasks past their due date and not completed.
    pub overdue: usize,
    /// Soft-deleted tasks.
    pub deleted: usize,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The task does not exist or belongs to another owner.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The task is soft-deleted and must be restored first.
    #[error("task {0} is deleted")]
    TaskDeleted(TaskId),
    /// New tasks cannot be due in the past.
    #[error("due date cannot be in the past for new tasks")]
    DueDateInPast,
    /// The bulk request is malformed.
    #[error("invalid bulk request: {0}")]
    InvalidBulkRequest(String),
    /// None of the requested tasks belongs to the owner.
    #[error("no valid tasks found")]
    NoValidTasks,
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    recurrence: RecurrenceEngine<R, C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        let recurrence = RecurrenceEngine::new(Arc::clone(&repository), Arc::clone(&clock));
        Self {
            repository,
            clock,
            recurrence,
        }
    }

    /// Creates and stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the title or quota is invalid, the
    /// due date lies in the past, or the repository rejects persistence.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let title = TaskTitle::new(&request.title)?;
        if request
            .due_date
            .is_some_and(|due_date| due_date < self.clock.utc())
        {
            return Err(TaskLifecycleError::DueDateInPast);
        }
        let times_per_period = request
            .times_per_period
            .map(TimesPerPeriod::new)
            .transpose()?;

        let mut draft = TaskDraft::new(request.owner, title)
            .with_status(request.status)
            .with_priority(request.priority)
            .with_tags(request.tag_ids)
            .with_recurrence(RecurrenceSettings {
                pattern: request.recurrence_pattern,
                times_per_period,
                keep_history: request.keep_history,
            });
        if let Some(description) = request.description {
            draft = draft.with_description(description);
        }
        if let Some(due_date) = request.due_date {
            draft = draft.with_due_date(due_date);
        }

        let task = Task::new(draft, &*self.clock);
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), owner = %task.owner(), title = %task.title(), "task created");
        Ok(task)
    }

    /// Retrieves one of the owner's tasks, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find_task(&self, owner: OwnerId, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        let task = self.repository.find_by_id(id).await?;
        Ok(task.filter(|found| found.owner() == owner))
    }

    /// Lists the owner's active tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_active(&self, owner: OwnerId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self
            .repository
            .find_by_owner(owner, DeletionFilter::Active)
            .await?)
    }

    /// Lists the owner's soft-deleted tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_deleted(&self, owner: OwnerId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self
            .repository
            .find_by_owner(owner, DeletionFilter::Deleted)
            .await?)
    }

    /// Lists the occurrences spawned from one of the owner's recurring tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the root task is not the
    /// owner's, or [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_occurrences(
        &self,
        owner: OwnerId,
        root: TaskId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.load_owned(owner, root).await?;
        Ok(self.repository.find_occurrences(root).await?)
    }

    /// Applies a partial update to an active task.
    ///
    /// The changed task is stored first; when its status moved into
    /// completed and it recurs, the recurrence engine then runs and any
    /// spawned occurrence is returned alongside it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing or deleted,
    /// a field is invalid, or persistence fails.
    pub async fn update_task(
        &self,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<TaskUpdateOutcome> {
        let mut task = self.load_active(request.owner, request.task_id).await?;
        let clock = &*self.clock;

        if let Some(title) = &request.title {
            task.rename(TaskTitle::new(title)?, clock);
        }
        if let Some(description) = request.description.clone() {
            task.set_description(description, clock);
        }
        if let Some(priority) = request.priority {
            task.set_priority(priority, clock);
        }
        if let Some(due_date) = request.due_date {
            task.set_due_date(due_date, clock);
        }
        if let Some(tag_ids) = request.tag_ids.clone() {
            task.assign_tags(tag_ids, clock);
        }
        if request.changes_recurrence() {
            let current = task.recurrence();
            let times_per_period = match request.times_per_period {
                Some(quota) => quota.map(TimesPerPeriod::new).transpose()?,
                None => current.times_per_period,
            };
            task.set_recurrence(
                RecurrenceSettings {
                    pattern: request.recurrence_pattern.unwrap_or(current.pattern),
                    times_per_period,
                    keep_history: request.keep_history.unwrap_or(current.keep_history),
                },
                clock,
            );
        }
        let status_change = request
            .status
            .map_or(StatusChange::Unchanged, |status| task.set_status(status, clock));

        self.save(&mut task).await?;

        let next_occurrence = if status_change.is_completion() {
            self.run_recurrence(&mut task).await?
        } else {
            None
        };
        Ok(TaskUpdateOutcome {
            task,
            next_occurrence,
        })
    }

    /// Marks a task completed, running the recurrence engine when it recurs.
    ///
    /// # Errors
    ///
    /// See [`Self::update_task`].
    pub async fn complete_task(
        &self,
        owner: OwnerId,
        id: TaskId,
    ) -> TaskLifecycleResult<TaskUpdateOutcome> {
        self.update_task(UpdateTaskRequest::new(owner, id).with_status(TaskStatus::Completed))
            .await
    }

    /// Soft-deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskDomainError::AlreadyDeleted`] when already deleted, or a
    /// repository error.
    pub async fn soft_delete(&self, owner: OwnerId, id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.load_owned(owner, id).await?;
        task.soft_delete(&*self.clock)?;
        self.save(&mut task).await?;
        info!(task_id = %task.id(), owner = %owner, title = %task.title(), "task soft-deleted");
        Ok(task)
    }

    /// Restores a soft-deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskDomainError::NotDeleted`] when the task is live, or a
    /// repository error.
    pub async fn restore(&self, owner: OwnerId, id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.load_owned(owner, id).await?;
        task.restore(&*self.clock)?;
        self.save(&mut task).await?;
        info!(task_id = %task.id(), owner = %owner, title = %task.title(), "task restored");
        Ok(task)
    }

    /// Computes statistics over the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn stats(&self, owner: OwnerId) -> TaskLifecycleResult<TaskStats> {
        let tasks = self
            .repository
            .find_by_owner(owner, DeletionFilter::Any)
            .await?;
        let clock = &*self.clock;

        let mut stats = TaskStats::default();
        for task in &tasks {
            if task.is_deleted() {
                stats.deleted += 1;
                continue;
            }
            stats.total += 1;
            match task.status() {
                TaskStatus::Todo => stats.by_status.todo += 1,
                TaskStatus::InProgress => stats.by_status.in_progress += 1,
                TaskStatus::Completed => stats.by_status.completed += 1,
            }
            match task.priority() {
                TaskPriority::Low => stats.by_priority.low += 1,
                TaskPriority::Medium => stats.by_priority.medium += 1,
                TaskPriority::High => stats.by_priority.high += 1,
            }
            if task.is_overdue(clock) {
                stats.overdue += 1;
            }
        }
        Ok(stats)
    }

    /// Applies one action to several of the owner's tasks.
    ///
    /// Identifiers of other owners' tasks are ignored. Each task is handled
    /// on its own; completing actions run the recurrence engine per task. A
    /// task whose write or recurrence step fails is listed in
    /// [`BulkActionSummary::failures`] and the batch carries on. A task whose
    /// status was saved before its recurrence step failed is both counted and
    /// listed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidBulkRequest`] for an empty or
    /// oversized ID list, [`TaskLifecycleError::NoValidTasks`] when none of
    /// the IDs is the owner's, or a repository error from loading the tasks.
    pub async fn bulk_action(
        &self,
        request: BulkTaskRequest,
    ) -> TaskLifecycleResult<BulkActionSummary> {
        let BulkTaskRequest {
            owner,
            task_ids,
            action,
        } = request;
        if task_ids.is_empty() || task_ids.len() > BulkTaskRequest::MAX_TASKS {
            return Err(TaskLifecycleError::InvalidBulkRequest(format!(
                "expected between 1 and {} task ids, got {}",
                BulkTaskRequest::MAX_TASKS,
                task_ids.len()
            )));
        }

        let tasks = self.repository.find_by_ids(owner, &task_ids).await?;
        if tasks.is_empty() {
            return Err(TaskLifecycleError::NoValidTasks);
        }

        let mut summary = BulkActionSummary {
            action,
            updated_count: 0,
            next_occurrences: Vec::new(),
            failures: Vec::new(),
        };
        for task in tasks {
            let task_id = task.id();
            if let Err(err) = self.apply_bulk_action(task, action, &mut summary).await {
                warn!(
                    action = action.as_str(),
                    task_id = %task_id,
                    error = %err,
                    "bulk action failed for task"
                );
                summary.failures.push(BulkTaskFailure {
                    task_id,
                    reason: err.to_string(),
                });
            }
        }

        info!(
            action = action.as_str(),
            owner = %owner,
            updated_count = summary.updated_count,
            failed_count = summary.failures.len(),
            "bulk action performed"
        );
        Ok(summary)
    }

    async fn apply_bulk_action(
        &self,
        mut task: Task,
        action: BulkTaskAction,
        summary: &mut BulkActionSummary,
    ) -> TaskLifecycleResult<()> {
        let clock = &*self.clock;
        let applies = match action {
            BulkTaskAction::Delete => !task.is_deleted(),
            BulkTaskAction::Restore => task.is_deleted(),
            _ if action.completes() => !task.is_deleted() && !task.status().is_completed(),
            BulkTaskAction::Complete
            | BulkTaskAction::SetPriority(_)
            | BulkTaskAction::SetStatus(_) => !task.is_deleted(),
        };
        if !applies {
            return Ok(());
        }

        match action {
            BulkTaskAction::Delete => task.soft_delete(clock)?,
            BulkTaskAction::Restore => task.restore(clock)?,
            BulkTaskAction::SetPriority(priority) => task.set_priority(priority, clock),
            BulkTaskAction::Complete => {
                task.set_status(TaskStatus::Completed, clock);
            }
            BulkTaskAction::SetStatus(status) => {
                task.set_status(status, clock);
            }
        }
        self.save(&mut task).await?;
        summary.updated_count += 1;

        if action.completes() {
            if let Some(occurrence) = self.run_recurrence(&mut task).await? {
                summary.next_occurrences.push(occurrence);
            }
        }
        Ok(())
    }

    /// Runs the recurrence engine and keeps only occurrences that are new
    /// rows; a reset-in-place task is already reflected in `task`.
    async fn run_recurrence(&self, task: &mut Task) -> TaskLifecycleResult<Option<Task>> {
        if !task.is_recurring() {
            return Ok(None);
        }
        let next = self.recurrence.complete_recurring_task(task).await?;
        Ok(next.filter(|occurrence| occurrence.id() != task.id()))
    }

    async fn load_owned(&self, owner: OwnerId, id: TaskId) -> TaskLifecycleResult<Task> {
        self.find_task(owner, id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(id))
    }

    async fn load_active(&self, owner: OwnerId, id: TaskId) -> TaskLifecycleResult<Task> {
        let task = self.load_owned(owner, id).await?;
        if task.is_deleted() {
            return Err(TaskLifecycleError::TaskDeleted(id));
        }
        Ok(task)
    }

    async fn save(&self, task: &mut Task) -> TaskLifecycleResult<()> {
        let revision = self.repository.update(task).await?;
        task.mark_persisted(revision);
        Ok(())
    }
}
