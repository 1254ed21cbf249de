//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use crate::test_helpers::{StepClock, start_of_june};
use rstest::fixture;
use taskloom::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{OwnerId, RecurrencePattern, Task},
    services::{CreateTaskRequest, TaskLifecycleService},
};

/// Service type used across in-memory tests.
pub type TestService = TaskLifecycleService<InMemoryTaskRepository, StepClock>;

/// A service over a fresh repository together with its clock and owner.
pub struct Workspace {
    pub service: TestService,
    pub repository: Arc<InMemoryTaskRepository>,
    pub clock: Arc<StepClock>,
    pub owner: OwnerId,
}

impl Workspace {
    /// Creates a recurring task due at the start of the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    pub async fn recurring(
        &self,
        title: &str,
        pattern: RecurrencePattern,
        keep_history: bool,
        times_per_period: Option<u32>,
    ) -> eyre::Result<Task> {
        let mut request = CreateTaskRequest::new(self.owner, title)
            .with_recurrence(pattern)
            .with_keep_history(keep_history)
            .with_due_date(start_of_june());
        if let Some(quota) = times_per_period {
            request = request.with_times_per_period(quota);
        }
        Ok(self.service.create_task(request).await?)
    }
}

/// Provides a workspace with the clock frozen at the start of June.
#[fixture]
pub fn workspace() -> Workspace {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let clock = StepClock::starting_at(start_of_june());
    let service = TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock));
    Workspace {
        service,
        repository,
        clock,
        owner: OwnerId::new(),
    }
}
