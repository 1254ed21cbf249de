//! Domain model for personal task management.
//!
//! Tasks, their workflow status, soft deletion, and the recurrence rules
//! that decide how a completed recurring task produces its next occurrence.
//! All infrastructure concerns stay outside of this boundary; the current
//! time is always read through an injected [`mockable::Clock`].

mod error;
mod ids;
mod recurrence;
mod status;
mod task;

pub use error::{ParseTaskFieldError, TaskDomainError};
pub use ids::{OwnerId, TagId, TaskId, TaskRevision, TaskTitle, TimesPerPeriod};
pub use recurrence::{PeriodTracker, RecurrencePattern, RecurrenceSettings, RecurrenceStep};
pub use status::{TaskPriority, TaskStatus};
pub use task::{PersistedTaskData, StatusChange, Task, TaskDraft};
