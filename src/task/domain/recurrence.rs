//! Recurrence rules: patterns, per-period completion tracking, and the
//! outcome of recording a completion.
//!
//! Periods are rolling windows of a fixed number of days measured from
//! `period_start_date`; they are not aligned to calendar weeks or months.

use super::{ParseTaskFieldError, Task, TimesPerPeriod};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a task recurs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    /// The task does not recur.
    #[default]
    None,
    /// Recurs every day.
    Daily,
    /// Recurs every seven days.
    Weekly,
    /// Recurs every thirty days.
    Monthly,
}

impl RecurrencePattern {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Returns `true` unless the pattern is [`RecurrencePattern::None`].
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Length of one recurrence period in days.
    ///
    /// Monthly is a fixed thirty-day approximation.
    #[must_use]
    pub const fn period_length_days(self) -> Option<i64> {
        match self {
            Self::None => None,
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Monthly => Some(30),
        }
    }

    /// Computes the due date of the next occurrence.
    ///
    /// The offset equals the period length, so a monthly task due on
    /// 31 January is next due on 2 March (non-leap year), not 28 February.
    #[must_use]
    pub fn next_due_date(self, due_date: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        let due = due_date?;
        let days = self.period_length_days()?;
        Some(due + TimeDelta::days(days))
    }
}

impl TryFrom<&str> for RecurrencePattern {
    type Error = ParseTaskFieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseTaskFieldError::new("recurrence pattern", value)),
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence configuration chosen by the task owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceSettings {
    /// Recurrence pattern.
    pub pattern: RecurrencePattern,
    /// Completions required before the next occurrence; `None` is unlimited.
    pub times_per_period: Option<TimesPerPeriod>,
    /// Spawn a new row per occurrence instead of resetting this one.
    pub keep_history: bool,
}

impl RecurrenceSettings {
    /// Settings for a task that never recurs.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            pattern: RecurrencePattern::None,
            times_per_period: None,
            keep_history: true,
        }
    }

    /// Settings for a recurring task with unlimited completions per period.
    #[must_use]
    pub const fn every(pattern: RecurrencePattern) -> Self {
        Self {
            pattern,
            times_per_period: None,
            keep_history: true,
        }
    }

    /// Sets the per-period completion quota.
    #[must_use]
    pub const fn with_times_per_period(mut self, quota: TimesPerPeriod) -> Self {
        self.times_per_period = Some(quota);
        self
    }

    /// Chooses between history mode and reset-in-place mode.
    #[must_use]
    pub const fn with_keep_history(mut self, keep_history: bool) -> Self {
        self.keep_history = keep_history;
        self
    }
}

impl Default for RecurrenceSettings {
    fn default() -> Self {
        Self::none()
    }
}

/// Completion bookkeeping for the current recurrence period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTracker {
    current_period_count: u32,
    period_start_date: Option<NaiveDate>,
}

impl PeriodTracker {
    /// Reconstructs a tracker from stored values.
    #[must_use]
    pub const fn new(current_period_count: u32, period_start_date: Option<NaiveDate>) -> Self {
        Self {
            current_period_count,
            period_start_date,
        }
    }

    /// A tracker whose period begins on `today` with no completions.
    #[must_use]
    pub const fn starting(today: NaiveDate) -> Self {
        Self::new(0, Some(today))
    }

    /// Completions recorded in the current period.
    #[must_use]
    pub const fn current_period_count(&self) -> u32 {
        self.current_period_count
    }

    /// Day the current period began, if bookkeeping has started.
    #[must_use]
    pub const fn period_start_date(&self) -> Option<NaiveDate> {
        self.period_start_date
    }

    /// Starts a new period when none exists or the current one has elapsed.
    ///
    /// Returns `true` when the counter was reset.
    pub fn roll_over(&mut self, pattern: RecurrencePattern, today: NaiveDate) -> bool {
        let Some(start) = self.period_start_date else {
            self.restart(today);
            return true;
        };
        let Some(length) = pattern.period_length_days() else {
            return false;
        };
        if (today - start).num_days() >= length {
            self.restart(today);
            return true;
        }
        false
    }

    /// Counts one completion in the current period.
    pub const fn record_completion(&mut self) {
        self.current_period_count = self.current_period_count.saturating_add(1);
    }

    /// Whether enough completions were recorded to produce the next
    /// occurrence. An unset quota is always satisfied.
    #[must_use]
    pub fn quota_reached(&self, quota: Option<TimesPerPeriod>) -> bool {
        quota.is_none_or(|limit| self.current_period_count >= limit.value())
    }

    /// Begins a fresh period on `today`.
    pub const fn restart(&mut self, today: NaiveDate) {
        self.current_period_count = 0;
        self.period_start_date = Some(today);
    }
}

/// Result of recording a completion on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceStep {
    /// The task does not recur; nothing was changed.
    NotRecurring,
    /// The completion was counted but the quota is not met yet.
    QuotaPending {
        /// Completions recorded in the current period.
        completed: u32,
        /// Completions required per period.
        quota: TimesPerPeriod,
    },
    /// The task itself was reopened for its next occurrence.
    ResetInPlace,
    /// A new occurrence row must be created; the original stays completed.
    SpawnSuccessor(Box<Task>),
}
