//! Task aggregate root and its lifecycle transitions.

use super::{
    OwnerId, PeriodTracker, RecurrenceSettings, RecurrenceStep, TagId, TaskDomainError, TaskId,
    TaskPriority, TaskRevision, TaskStatus, TaskTitle,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Effect of a status assignment, as seen by completion triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status already had the requested value.
    Unchanged,
    /// The status changed to something other than completed.
    Changed,
    /// The status moved from a non-completed value to completed.
    Completed,
}

impl StatusChange {
    /// Returns `true` when the change entered the completed status.
    #[must_use]
    pub const fn is_completion(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: OwnerId,
    title: TaskTitle,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    tags: BTreeSet<TagId>,
    recurrence: RecurrenceSettings,
    period: PeriodTracker,
    parent_task: Option<TaskId>,
    deleted_at: Option<DateTime<Utc>>,
    revision: TaskRevision,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Attributes supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    owner: OwnerId,
    title: TaskTitle,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    tags: BTreeSet<TagId>,
    recurrence: RecurrenceSettings,
}

impl TaskDraft {
    /// Starts a draft with required fields; everything else takes defaults.
    #[must_use]
    pub fn new(owner: OwnerId, title: TaskTitle) -> Self {
        Self {
            owner,
            title,
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            tags: BTreeSet::new(),
            recurrence: RecurrenceSettings::default(),
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
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the recurrence configuration.
    #[must_use]
    pub const fn with_recurrence(mut self, recurrence: RecurrenceSettings) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Returns the requested due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: OwnerId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted tag associations.
    pub tags: BTreeSet<TagId>,
    /// Persisted recurrence configuration.
    pub recurrence: RecurrenceSettings,
    /// Persisted period bookkeeping.
    pub period: PeriodTracker,
    /// Root of the recurrence chain, if this row is a spawned occurrence.
    pub parent_task: Option<TaskId>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Stored row revision.
    pub revision: TaskRevision,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task from a draft.
    #[must_use]
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            owner: draft.owner,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            tags: draft.tags,
            recurrence: draft.recurrence,
            period: PeriodTracker::default(),
            parent_task: None,
            deleted_at: None,
            revision: TaskRevision::INITIAL,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            tags: data.tags,
            recurrence: data.recurrence,
            period: data.period,
            parent_task: data.parent_task,
            deleted_at: data.deleted_at,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the associated tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<TagId> {
        &self.tags
    }

    /// Returns the recurrence configuration.
    #[must_use]
    pub const fn recurrence(&self) -> RecurrenceSettings {
        self.recurrence
    }

    /// Returns the current period bookkeeping.
    #[must_use]
    pub const fn period(&self) -> PeriodTracker {
        self.period
    }

    /// Returns the root task of the recurrence chain, if any.
    #[must_use]
    pub const fn parent_task(&self) -> Option<TaskId> {
        self.parent_task
    }

    /// Returns the soft-delete timestamp, if deleted.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns `true` if the task is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the revision this value was read or last written at.
    #[must_use]
    pub const fn revision(&self) -> TaskRevision {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the recurrence pattern is not `None`.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.recurrence.pattern.is_recurring()
    }

    /// Returns `true` when the due date has passed and the task is not
    /// completed.
    #[must_use]
    pub fn is_overdue(&self, clock: &impl Clock) -> bool {
        !self.status.is_completed() && self.due_date.is_some_and(|due| clock.utc() > due)
    }

    /// Assigns a workflow status and reports how it changed.
    pub fn set_status(&mut self, status: TaskStatus, clock: &impl Clock) -> StatusChange {
        let previous = self.status;
        if previous == status {
            return StatusChange::Unchanged;
        }
        self.status = status;
        self.touch(clock);
        if status.is_completed() {
            StatusChange::Completed
        } else {
            StatusChange::Changed
        }
    }

    /// Replaces the title.
    pub fn rename(&mut self, title: TaskTitle, clock: &impl Clock) {
        self.title = title;
        self.touch(clock);
    }

    /// Replaces or clears the description.
    pub fn set_description(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = description;
        self.touch(clock);
    }

    /// Assigns a priority.
    pub fn set_priority(&mut self, priority: TaskPriority, clock: &impl Clock) {
        self.priority = priority;
        self.touch(clock);
    }

    /// Replaces or clears the due date.
    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>, clock: &impl Clock) {
        self.due_date = due_date;
        self.touch(clock);
    }

    /// Replaces the tag associations.
    pub fn assign_tags(&mut self, tags: impl IntoIterator<Item = TagId>, clock: &impl Clock) {
        self.tags = tags.into_iter().collect();
        self.touch(clock);
    }

    /// Replaces the recurrence configuration. Period bookkeeping is kept.
    pub fn set_recurrence(&mut self, recurrence: RecurrenceSettings, clock: &impl Clock) {
        self.recurrence = recurrence;
        self.touch(clock);
    }

    /// Marks the task as deleted without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyDeleted`] if the task is already
    /// deleted.
    pub fn soft_delete(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.is_deleted() {
            return Err(TaskDomainError::AlreadyDeleted(self.id));
        }
        let timestamp = clock.utc();
        self.deleted_at = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Restores a soft-deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotDeleted`] if the task is not deleted.
    pub fn restore(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if !self.is_deleted() {
            return Err(TaskDomainError::NotDeleted(self.id));
        }
        self.deleted_at = None;
        self.touch(clock);
        Ok(())
    }

    /// Records a completion against the recurrence rules.
    ///
    /// Rolls the period over when it has elapsed, counts the completion, and
    /// when the quota is met either reopens this task for its next due date
    /// or builds the successor occurrence. Non-recurring tasks are left
    /// untouched.
    pub fn advance_recurrence(&mut self, clock: &impl Clock) -> RecurrenceStep {
        let pattern = self.recurrence.pattern;
        if !pattern.is_recurring() {
            return RecurrenceStep::NotRecurring;
        }

        let now = clock.utc();
        let today = now.date_naive();
        self.period.roll_over(pattern, today);
        self.period.record_completion();
        self.updated_at = now;

        if let Some(quota) = self.recurrence.times_per_period {
            if !self.period.quota_reached(Some(quota)) {
                return RecurrenceStep::QuotaPending {
                    completed: self.period.current_period_count(),
                    quota,
                };
            }
        }

        let next_due_date = pattern.next_due_date(self.due_date);
        if self.recurrence.keep_history {
            return RecurrenceStep::SpawnSuccessor(Box::new(self.successor(next_due_date, now)));
        }

        self.status = TaskStatus::Todo;
        self.due_date = next_due_date;
        self.period.restart(today);
        RecurrenceStep::ResetInPlace
    }

    /// Records the revision the store assigned on the latest write.
    pub const fn mark_persisted(&mut self, revision: TaskRevision) {
        self.revision = revision;
    }

    /// Installs the tag set the store copied onto this task.
    pub(crate) fn adopt_copied_tags(&mut self, tags: BTreeSet<TagId>) {
        self.tags = tags;
    }

    /// Builds the next occurrence in history mode. Tags are copied by the
    /// store.
    fn successor(&self, due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            owner: self.owner,
            title: self.title.clone(),
            description: self.description.clone(),
            status: TaskStatus::Todo,
            priority: self.priority,
            due_date,
            tags: BTreeSet::new(),
            recurrence: self.recurrence,
            period: PeriodTracker::starting(now.date_naive()),
            parent_task: Some(self.parent_task.unwrap_or(self.id)),
            deleted_at: None,
            revision: TaskRevision::INITIAL,
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
