//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, NewTaskTagRow, TaskRow},
    schema::{task_tags, tasks},
};
use crate::task::{
    domain::{
        OwnerId, PeriodTracker, PersistedTaskData, RecurrencePattern, RecurrenceSettings, TagId,
        Task, TaskId, TaskPriority, TaskRevision, TaskStatus, TaskTitle, TimesPerPeriod,
    },
    ports::{
        DeletionFilter, SuccessorWrite, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task, task.revision())?;
        let tag_rows = to_tag_rows(task);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|connection| {
                insert_task(connection, task_id, &new_row, &tag_rows)
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<TaskRevision> {
        let write = RevisionedWrite::prepare(task)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|connection| write.apply(connection))
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(found) = row else {
                return Ok(None);
            };
            Ok(rows_to_tasks(connection, vec![found])?.into_iter().next())
        })
        .await
    }

    async fn find_by_owner(
        &self,
        owner: OwnerId,
        filter: DeletionFilter,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .into_boxed();
            query = match filter {
                DeletionFilter::Active => query.filter(tasks::deleted_at.is_null()),
                DeletionFilter::Deleted => query.filter(tasks::deleted_at.is_not_null()),
                DeletionFilter::Any => query,
            };
            let rows = query
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn find_by_ids(&self, owner: OwnerId, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let lookup: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::id.eq_any(lookup))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn find_occurrences(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_task_id.eq(parent.into_inner()))
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows_to_tasks(connection, rows)
        })
        .await
    }

    async fn copy_tags(&self, from: TaskId, to: TaskId) -> TaskRepositoryResult<BTreeSet<TagId>> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|connection| {
                for id in [from, to] {
                    let exists = diesel::select(diesel::dsl::exists(
                        tasks::table.filter(tasks::id.eq(id.into_inner())),
                    ))
                    .get_result::<bool>(connection)?;
                    if !exists {
                        return Err(TaskRepositoryError::NotFound(id));
                    }
                }
                copy_tag_rows(connection, from, to)
            })
        })
        .await
    }

    async fn complete_with_successor(
        &self,
        original: &Task,
        successor: &Task,
    ) -> TaskRepositoryResult<SuccessorWrite> {
        let write = RevisionedWrite::prepare(original)?;
        let original_id = original.id();
        let successor_id = successor.id();
        let successor_row = to_new_row(successor, successor.revision())?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|connection| {
                let original_revision = write.apply(connection)?;
                insert_task(connection, successor_id, &successor_row, &[])?;
                let successor_tags = copy_tag_rows(connection, original_id, successor_id)?;
                Ok(SuccessorWrite {
                    original_revision,
                    successor_tags,
                })
            })
        })
        .await
    }
}

/// Row changes for a revision-checked update, encoded before the blocking
/// call.
struct RevisionedWrite {
    task_id: TaskId,
    expected: TaskRevision,
    expected_value: i64,
    changes: NewTaskRow,
    tag_rows: Vec<NewTaskTagRow>,
}

impl RevisionedWrite {
    fn prepare(task: &Task) -> TaskRepositoryResult<Self> {
        let expected = task.revision();
        Ok(Self {
            task_id: task.id(),
            expected,
            expected_value: revision_to_column(expected)?,
            changes: to_new_row(task, expected.next())?,
            tag_rows: to_tag_rows(task),
        })
    }

    fn apply(&self, connection: &mut PgConnection) -> TaskRepositoryResult<TaskRevision> {
        let id = self.task_id.into_inner();
        let updated_count = diesel::update(
            tasks::table
                .filter(tasks::id.eq(id))
                .filter(tasks::revision.eq(self.expected_value)),
        )
        .set(&self.changes)
        .execute(connection)?;

        if updated_count == 0 {
            let exists =
                diesel::select(diesel::dsl::exists(tasks::table.filter(tasks::id.eq(id))))
                    .get_result::<bool>(connection)?;
            return Err(if exists {
                TaskRepositoryError::StaleRevision {
                    id: self.task_id,
                    expected: self.expected,
                }
            } else {
                TaskRepositoryError::NotFound(self.task_id)
            });
        }

        replace_tags(connection, id, &self.tag_rows)?;
        Ok(self.expected.next())
    }
}

fn insert_task(
    connection: &mut PgConnection,
    task_id: TaskId,
    row: &NewTaskRow,
    tag_rows: &[NewTaskTagRow],
) -> TaskRepositoryResult<()> {
    diesel::insert_into(tasks::table)
        .values(row)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                TaskRepositoryError::DuplicateTask(task_id)
            }
            _ => TaskRepositoryError::persistence(err),
        })?;
    insert_tags(connection, tag_rows)
}

fn copy_tag_rows(
    connection: &mut PgConnection,
    from: TaskId,
    to: TaskId,
) -> TaskRepositoryResult<BTreeSet<TagId>> {
    let source_tags = task_tags::table
        .filter(task_tags::task_id.eq(from.into_inner()))
        .select(task_tags::tag_id)
        .load::<Uuid>(connection)?;
    let rows: Vec<NewTaskTagRow> = source_tags
        .iter()
        .map(|tag_id| NewTaskTagRow {
            task_id: to.into_inner(),
            tag_id: *tag_id,
        })
        .collect();
    replace_tags(connection, to.into_inner(), &rows)?;

    Ok(source_tags.into_iter().map(TagId::from_uuid).collect())
}

fn replace_tags(
    connection: &mut PgConnection,
    task_id: Uuid,
    rows: &[NewTaskTagRow],
) -> TaskRepositoryResult<()> {
    diesel::delete(task_tags::table.filter(task_tags::task_id.eq(task_id))).execute(connection)?;
    insert_tags(connection, rows)
}

fn insert_tags(connection: &mut PgConnection, rows: &[NewTaskTagRow]) -> TaskRepositoryResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(task_tags::table)
        .values(rows)
        .execute(connection)?;
    Ok(())
}

fn rows_to_tasks(connection: &mut PgConnection, rows: Vec<TaskRow>) -> TaskRepositoryResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let pairs = task_tags::table
        .filter(task_tags::task_id.eq_any(ids))
        .select((task_tags::task_id, task_tags::tag_id))
        .load::<(Uuid, Uuid)>(connection)?;

    let mut tags_by_task: HashMap<Uuid, BTreeSet<TagId>> = HashMap::new();
    for (task_id, tag_id) in pairs {
        tags_by_task
            .entry(task_id)
            .or_default()
            .insert(TagId::from_uuid(tag_id));
    }

    rows.into_iter()
        .map(|row| {
            let tags = tags_by_task.remove(&row.id).unwrap_or_default();
            row_to_task(row, tags)
        })
        .collect()
}

fn revision_to_column(revision: TaskRevision) -> TaskRepositoryResult<i64> {
    i64::try_from(revision.value()).map_err(TaskRepositoryError::persistence)
}

fn to_tag_rows(task: &Task) -> Vec<NewTaskTagRow> {
    task.tags()
        .iter()
        .map(|tag_id| NewTaskTagRow {
            task_id: task.id().into_inner(),
            tag_id: tag_id.into_inner(),
        })
        .collect()
}

pub(super) fn to_new_row(task: &Task, revision: TaskRevision) -> TaskRepositoryResult<NewTaskRow> {
    let recurrence = task.recurrence();
    let period = task.period();
    let times_per_period = recurrence
        .times_per_period
        .map(|quota| i32::try_from(quota.value()))
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let current_period_count =
        i32::try_from(period.current_period_count()).map_err(TaskRepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        recurrence_pattern: recurrence.pattern.as_str().to_owned(),
        times_per_period,
        current_period_count,
        period_start_date: period.period_start_date(),
        parent_task_id: task.parent_task().map(TaskId::into_inner),
        keep_history: recurrence.keep_history,
        deleted_at: task.deleted_at(),
        revision: revision_to_column(revision)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow, tags: BTreeSet<TagId>) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title,
        description,
        status,
        priority,
        due_date,
        recurrence_pattern,
        times_per_period,
        current_period_count,
        period_start_date,
        parent_task_id,
        keep_history,
        deleted_at,
        revision,
        created_at,
        updated_at,
    } = row;

    let parsed_title = TaskTitle::new(&title).map_err(TaskRepositoryError::persistence)?;
    let parsed_status =
        TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let parsed_priority =
        TaskPriority::try_from(priority.as_str()).map_err(TaskRepositoryError::persistence)?;
    let pattern = RecurrencePattern::try_from(recurrence_pattern.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let quota = times_per_period
        .map(|value| {
            let positive = u32::try_from(value).map_err(TaskRepositoryError::persistence)?;
            TimesPerPeriod::new(positive).map_err(TaskRepositoryError::persistence)
        })
        .transpose()?;
    let count = u32::try_from(current_period_count).map_err(TaskRepositoryError::persistence)?;
    let stored_revision = u64::try_from(revision).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: OwnerId::from_uuid(owner_id),
        title: parsed_title,
        description,
        status: parsed_status,
        priority: parsed_priority,
        due_date,
        tags,
        recurrence: RecurrenceSettings {
            pattern,
            times_per_period: quota,
            keep_history,
        },
        period: PeriodTracker::new(count, period_start_date),
        parent_task: parent_task_id.map(TaskId::from_uuid),
        deleted_at,
        revision: TaskRevision::new(stored_revision),
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
