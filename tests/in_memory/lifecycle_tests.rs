//! In-memory integration tests for deletion, statistics, and bulk actions.

use super::helpers::{Workspace, workspace};
use chrono::TimeDelta;
use eyre::ensure;
use rstest::rstest;
use taskloom::task::{
    domain::{RecurrencePattern, TaskId, TaskPriority},
    services::{BulkTaskAction, BulkTaskRequest, CreateTaskRequest, TaskLifecycleError},
};

async fn create_many(workspace: &Workspace, count: usize) -> eyre::Result<Vec<TaskId>> {
    let mut ids = Vec::with_capacity(count);
    for index in 0..count {
        let task = workspace
            .service
            .create_task(CreateTaskRequest::new(workspace.owner, format!("Task {index}")))
            .await?;
        ids.push(task.id());
        workspace.clock.advance(TimeDelta::seconds(1));
    }
    Ok(ids)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_delete_moves_tasks_to_the_deleted_listing(workspace: Workspace) -> eyre::Result<()> {
    let ids = create_many(&workspace, 4).await?;
    let (doomed, kept) = ids.split_at(2);

    let summary = workspace
        .service
        .bulk_action(BulkTaskRequest::new(
            workspace.owner,
            doomed.iter().copied(),
            BulkTaskAction::Delete,
        ))
        .await?;

    ensure!(summary.updated_count == 2, "two tasks deleted");
    let active: Vec<TaskId> = workspace
        .service
        .list_active(workspace.owner)
        .await?
        .iter()
        .map(|task| task.id())
        .collect();
    ensure!(active.len() == kept.len(), "kept tasks stay active");
    ensure!(kept.iter().all(|id| active.contains(id)), "the right tasks stay");
    let stats = workspace.service.stats(workspace.owner).await?;
    ensure!(stats.deleted == 2 && stats.total == 2, "stats follow the split");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_actions_accept_exactly_one_hundred_ids(workspace: Workspace) -> eyre::Result<()> {
    let mut ids = create_many(&workspace, 1).await?;
    ids.extend((1..BulkTaskRequest::MAX_TASKS).map(|_| TaskId::new()));

    let summary = workspace
        .service
        .bulk_action(BulkTaskRequest::new(
            workspace.owner,
            ids,
            BulkTaskAction::SetPriority(TaskPriority::Low),
        ))
        .await?;

    ensure!(summary.updated_count == 1, "unknown ids are ignored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_complete_serialises_spawned_occurrences(workspace: Workspace) -> eyre::Result<()> {
    let daily = workspace
        .recurring("Meditate", RecurrencePattern::Daily, true, None)
        .await?;
    let weekly = workspace
        .recurring("Review budget", RecurrencePattern::Weekly, false, None)
        .await?;

    let summary = workspace
        .service
        .bulk_action(BulkTaskRequest::new(
            workspace.owner,
            [daily.id(), weekly.id()],
            BulkTaskAction::parse("complete", None)?,
        ))
        .await?;

    ensure!(summary.updated_count == 2, "both tasks completed");
    ensure!(
        summary.next_occurrences.len() == 1,
        "only history mode yields a separate occurrence"
    );
    let json = serde_json::to_value(&summary)?;
    ensure!(json["action"]["action"] == "complete", "action is tagged");
    ensure!(json["updated_count"] == 2, "count is serialised");
    ensure!(
        json["failures"].as_array().is_some_and(Vec::is_empty),
        "a clean batch reports no failures"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_recurring_tasks_are_not_completed_in_bulk(
    workspace: Workspace,
) -> eyre::Result<()> {
    let task = workspace
        .recurring("Walk the dog", RecurrencePattern::Daily, true, None)
        .await?;
    workspace.service.soft_delete(workspace.owner, task.id()).await?;

    let summary = workspace
        .service
        .bulk_action(BulkTaskRequest::new(
            workspace.owner,
            [task.id()],
            BulkTaskAction::Complete,
        ))
        .await?;

    ensure!(summary.updated_count == 0, "deleted task skipped");
    ensure!(summary.next_occurrences.is_empty(), "no occurrence spawned");
    let occurrences = workspace
        .service
        .list_occurrences(workspace.owner, task.id())
        .await?;
    ensure!(occurrences.is_empty(), "nothing stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restoring_unknown_tasks_reports_not_found(workspace: Workspace) {
    let missing = TaskId::new();

    let result = workspace.service.restore(workspace.owner, missing).await;

    assert!(matches!(result, Err(TaskLifecycleError::NotFound(id)) if id == missing));
}
