//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("task title has {length} characters, at most {max} are allowed")]
    TitleTooLong {
        /// Character count of the rejected title.
        length: usize,
        /// Largest accepted character count.
        max: usize,
    },

    /// A per-period completion quota of zero was supplied.
    #[error("times per period must be a positive integer, got {0}")]
    InvalidTimesPerPeriod(u32),

    /// The task is already soft-deleted.
    #[error("task {0} is already deleted")]
    AlreadyDeleted(TaskId),

    /// The task is not soft-deleted, so it cannot be restored.
    #[error("task {0} is not deleted")]
    NotDeleted(TaskId),
}

/// Error returned while parsing task enumerations from text or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field}: {value}")]
pub struct ParseTaskFieldError {
    /// Name of the field being parsed.
    pub field: &'static str,
    /// The rejected raw value.
    pub value: String,
}

impl ParseTaskFieldError {
    pub(crate) fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}
