//! In-memory task repository for tests and embedding.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{OwnerId, TagId, Task, TaskId, TaskRevision},
    ports::{
        DeletionFilter, SuccessorWrite, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    },
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    occurrence_index: HashMap<TaskId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn index_occurrence(state: &mut InMemoryTaskState, task: &Task) {
    if let Some(parent) = task.parent_task() {
        let ids = state.occurrence_index.entry(parent).or_default();
        if !ids.contains(&task.id()) {
            ids.push(task.id());
        }
    }
}

fn next_revision(state: &InMemoryTaskState, task: &Task) -> TaskRepositoryResult<TaskRevision> {
    let stored_revision = state
        .tasks
        .get(&task.id())
        .ok_or(TaskRepositoryError::NotFound(task.id()))?
        .revision();
    if stored_revision != task.revision() {
        return Err(TaskRepositoryError::StaleRevision {
            id: task.id(),
            expected: task.revision(),
        });
    }
    Ok(stored_revision.next())
}

fn put_updated(state: &mut InMemoryTaskState, task: &Task, revision: TaskRevision) {
    let mut updated = task.clone();
    updated.mark_persisted(revision);
    index_occurrence(state, &updated);
    state.tasks.insert(updated.id(), updated);
}

fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        index_occurrence(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<TaskRevision> {
        let mut state = self.write()?;
        let revision = next_revision(&state, task)?;
        put_updated(&mut state, task, revision);
        Ok(revision)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner: OwnerId,
        filter: DeletionFilter,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.owner() == owner && filter.matches(task))
            .cloned()
            .collect();
        Ok(newest_first(tasks))
    }

    async fn find_by_ids(&self, owner: OwnerId, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let unique: BTreeSet<TaskId> = ids.iter().copied().collect();
        let tasks = unique
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| task.owner() == owner)
            .cloned()
            .collect();
        Ok(tasks)
    }

    async fn find_occurrences(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let tasks = state
            .occurrence_index
            .get(&parent)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(newest_first(tasks))
    }

    async fn copy_tags(&self, from: TaskId, to: TaskId) -> TaskRepositoryResult<BTreeSet<TagId>> {
        let mut state = self.write()?;
        let tags = state
            .tasks
            .get(&from)
            .ok_or(TaskRepositoryError::NotFound(from))?
            .tags()
            .clone();
        let target = state
            .tasks
            .get_mut(&to)
            .ok_or(TaskRepositoryError::NotFound(to))?;
        target.adopt_copied_tags(tags.clone());
        Ok(tags)
    }

    async fn complete_with_successor(
        &self,
        original: &Task,
        successor: &Task,
    ) -> TaskRepositoryResult<SuccessorWrite> {
        let mut state = self.write()?;
        let revision = next_revision(&state, original)?;
        if state.tasks.contains_key(&successor.id()) {
            return Err(TaskRepositoryError::DuplicateTask(successor.id()));
        }

        put_updated(&mut state, original, revision);
        let tags = original.tags().clone();
        let mut stored = successor.clone();
        stored.adopt_copied_tags(tags.clone());
        index_occurrence(&mut state, &stored);
        state.tasks.insert(stored.id(), stored);

        Ok(SuccessorWrite {
            original_revision: revision,
            successor_tags: tags,
        })
    }
}
