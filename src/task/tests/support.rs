//! Shared fixtures for task unit tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use mockall::mock;

use crate::task::{
    domain::{
        OwnerId, RecurrencePattern, RecurrenceSettings, TagId, Task, TaskDraft, TaskId,
        TaskRevision, TaskTitle, TimesPerPeriod,
    },
    ports::{DeletionFilter, SuccessorWrite, TaskRepository, TaskRepositoryResult},
};

mock! {
    pub Repository {}

    #[async_trait]
    impl TaskRepository for Repository {
        async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn update(&self, task: &Task) -> TaskRepositoryResult<TaskRevision>;
        async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;
        async fn find_by_owner(
            &self,
            owner: OwnerId,
            filter: DeletionFilter,
        ) -> TaskRepositoryResult<Vec<Task>>;
        async fn find_by_ids(
            &self,
            owner: OwnerId,
            ids: &[TaskId],
        ) -> TaskRepositoryResult<Vec<Task>>;
        async fn find_occurrences(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>>;
        async fn copy_tags(&self, from: TaskId, to: TaskId) -> TaskRepositoryResult<BTreeSet<TagId>>;
        async fn complete_with_successor(
            &self,
            original: &Task,
            successor: &Task,
        ) -> TaskRepositoryResult<SuccessorWrite>;
    }
}

/// Clock that stays put until a test moves it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 2 March 2026, 09:00 UTC.
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn title(value: &str) -> TaskTitle {
    TaskTitle::new(value).expect("valid title")
}

pub fn quota(value: u32) -> TimesPerPeriod {
    TimesPerPeriod::new(value).expect("positive quota")
}

pub fn recurring(pattern: RecurrencePattern, keep_history: bool) -> RecurrenceSettings {
    RecurrenceSettings::every(pattern).with_keep_history(keep_history)
}

pub fn recurring_task(
    clock: &ManualClock,
    settings: RecurrenceSettings,
    due_date: Option<DateTime<Utc>>,
    tags: &[TagId],
) -> Task {
    let mut draft = TaskDraft::new(OwnerId::new(), title("Water the plants"))
        .with_recurrence(settings)
        .with_tags(tags.iter().copied());
    if let Some(due) = due_date {
        draft = draft.with_due_date(due);
    }
    Task::new(draft, clock)
}
