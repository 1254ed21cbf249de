//! Recurrence engine: turns the completion of a recurring task into its next
//! occurrence.

use crate::task::{
    domain::{RecurrenceStep, Task},
    ports::{TaskRepository, TaskRepositoryResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Produces the next occurrence of completed recurring tasks.
///
/// The engine is invoked once per observed transition of a recurring task
/// into the completed status, after that transition has been persisted.
#[derive(Clone)]
pub struct RecurrenceEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RecurrenceEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates an engine over the given store and clock.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Records the completion of `task` and produces its next occurrence.
    ///
    /// Returns:
    ///
    /// - `None` for non-recurring tasks, without touching the task or the
    ///   store;
    /// - `None` when the per-period quota is not met yet; the counter is
    ///   persisted and the task stays completed;
    /// - the same task, reopened with its next due date, when history is not
    ///   kept;
    /// - a newly stored occurrence carrying the original's tags when history
    ///   is kept; the original stays completed.
    ///
    /// In history mode the original row, the new occurrence and its tags are
    /// written in one [`TaskRepository::complete_with_successor`] call. The
    /// original is revision checked, so a concurrent completion of the same
    /// task fails without creating an occurrence. `task` is only updated once
    /// the write succeeded.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::task::ports::TaskRepositoryError`] from the store
    /// unchanged; nothing is retried.
    pub async fn complete_recurring_task(
        &self,
        task: &mut Task,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut working = task.clone();
        let step = working.advance_recurrence(&*self.clock);

        let next = match step {
            RecurrenceStep::NotRecurring => return Ok(None),
            RecurrenceStep::QuotaPending { completed, quota } => {
                self.save(&mut working).await?;
                debug!(
                    task_id = %working.id(),
                    completed,
                    quota = quota.value(),
                    "recurring task completion counted, quota not met"
                );
                None
            }
            RecurrenceStep::ResetInPlace => {
                self.save(&mut working).await?;
                info!(
                    task_id = %working.id(),
                    due_date = ?working.due_date(),
                    "recurring task reopened for its next occurrence"
                );
                Some(working.clone())
            }
            RecurrenceStep::SpawnSuccessor(successor) => {
                let mut occurrence = *successor;
                let written = self
                    .repository
                    .complete_with_successor(&working, &occurrence)
                    .await?;
                working.mark_persisted(written.original_revision);
                occurrence.adopt_copied_tags(written.successor_tags);
                info!(
                    task_id = %working.id(),
                    occurrence_id = %occurrence.id(),
                    owner = %occurrence.owner(),
                    title = %occurrence.title(),
                    "recurring task created"
                );
                Some(occurrence)
            }
        };

        *task = working;
        Ok(next)
    }

    async fn save(&self, task: &mut Task) -> TaskRepositoryResult<()> {
        let revision = self.repository.update(task).await?;
        task.mark_persisted(revision);
        Ok(())
    }
}
