//! Shared world state for recurring task BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use crate::test_helpers::{StepClock, start_of_june};
use rstest::fixture;
use taskloom::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{OwnerId, TagId, Task},
    services::TaskLifecycleService,
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, StepClock>;

/// Scenario world for recurring task behaviour tests.
pub struct RecurringTaskWorld {
    pub service: TestTaskService,
    pub clock: Arc<StepClock>,
    pub owner: OwnerId,
    pub tags: HashMap<String, TagId>,
    pub task: Option<Task>,
    pub next_occurrence: Option<Option<Task>>,
}

impl RecurringTaskWorld {
    /// Creates a world with the clock at the start of June.
    #[must_use]
    pub fn new() -> Self {
        let clock = StepClock::starting_at(start_of_june());
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&clock),
        );

        Self {
            service,
            clock,
            owner: OwnerId::new(),
            tags: HashMap::new(),
            task: None,
            next_occurrence: None,
        }
    }

    /// Returns the task under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no task was created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the occurrence produced by the last completion.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing was completed or nothing was produced.
    pub fn occurrence(&self) -> Result<&Task, eyre::Report> {
        self.next_occurrence
            .as_ref()
            .ok_or_else(|| eyre::eyre!("the task was not completed"))?
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no next occurrence was returned"))
    }

    /// Resolves a tag name to its identifier, allocating one on first use.
    pub fn tag(&mut self, name: &str) -> TagId {
        *self.tags.entry(name.to_owned()).or_default()
    }
}

impl Default for RecurringTaskWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RecurringTaskWorld {
    RecurringTaskWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
