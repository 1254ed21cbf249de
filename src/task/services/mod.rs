//! Application services for task lifecycle orchestration.

mod lifecycle;
mod recurrence;

pub use lifecycle::{
    BulkActionSummary, BulkTaskAction, BulkTaskFailure, BulkTaskRequest, CreateTaskRequest,
    PriorityCounts, StatusCounts, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    TaskStats, TaskUpdateOutcome, UpdateTaskRequest,
};
pub use recurrence::RecurrenceEngine;
