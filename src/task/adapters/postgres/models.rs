//! Diesel row models for task persistence.

use super::schema::{task_tags, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Recurrence pattern.
    pub recurrence_pattern: String,
    /// Completions required per period.
    pub times_per_period: Option<i32>,
    /// Completions recorded in the current period.
    pub current_period_count: i32,
    /// First day of the current period.
    pub period_start_date: Option<NaiveDate>,
    /// Root task of the recurrence chain.
    pub parent_task_id: Option<uuid::Uuid>,
    /// History mode flag.
    pub keep_history: bool,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
///
/// `None` values are written as `NULL` on update so that cleared fields
/// (due date, soft delete) are persisted.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Recurrence pattern.
    pub recurrence_pattern: String,
    /// Completions required per period.
    pub times_per_period: Option<i32>,
    /// Completions recorded in the current period.
    pub current_period_count: i32,
    /// First day of the current period.
    pub period_start_date: Option<NaiveDate>,
    /// Root task of the recurrence chain.
    pub parent_task_id: Option<uuid::Uuid>,
    /// History mode flag.
    pub keep_history: bool,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for tag associations.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = task_tags)]
pub struct NewTaskTagRow {
    /// Tagged task.
    pub task_id: uuid::Uuid,
    /// Attached tag.
    pub tag_id: uuid::Uuid,
}
