//! Recurring task completion through the lifecycle service.

use super::helpers::{Workspace, workspace};
use crate::test_helpers::start_of_june;
use chrono::TimeDelta;
use eyre::{ensure, eyre};
use rstest::rstest;
use taskloom::task::{
    domain::{RecurrencePattern, TagId, TaskStatus},
    ports::TaskRepository,
    services::UpdateTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn weekly_quota_without_history_reopens_after_the_second_completion(
    workspace: Workspace,
) -> eyre::Result<()> {
    let task = workspace
        .recurring("Gym", RecurrencePattern::Weekly, false, Some(2))
        .await?;

    let first = workspace.service.complete_task(workspace.owner, task.id()).await?;
    ensure!(first.next_occurrence.is_none(), "first completion returns nothing");
    ensure!(first.task.status() == TaskStatus::Completed, "quota pending");
    ensure!(first.task.period().current_period_count() == 1, "one completion counted");

    workspace.clock.advance(TimeDelta::days(3));
    let reopened = workspace
        .service
        .update_task(
            UpdateTaskRequest::new(workspace.owner, task.id()).with_status(TaskStatus::InProgress),
        )
        .await?;
    ensure!(reopened.task.status() == TaskStatus::InProgress, "user reopened it");

    let second = workspace.service.complete_task(workspace.owner, task.id()).await?;
    ensure!(second.next_occurrence.is_none(), "reset happens in place");
    ensure!(second.task.id() == task.id(), "same task");
    ensure!(second.task.status() == TaskStatus::Todo, "task reopened for next week");
    ensure!(
        second.task.due_date() == Some(start_of_june() + TimeDelta::days(7)),
        "due a week later"
    );
    ensure!(
        second.task.period().period_start_date() == Some(workspace.clock.today()),
        "period restarted today"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn daily_history_keeps_every_completed_occurrence(workspace: Workspace) -> eyre::Result<()> {
    let work = TagId::new();
    let root = workspace
        .recurring("Journal", RecurrencePattern::Daily, true, None)
        .await?;
    let root = workspace
        .service
        .update_task(UpdateTaskRequest::new(workspace.owner, root.id()).with_tags([work]))
        .await?
        .task;

    let mut current = root.id();
    for day in 1..=3 {
        let outcome = workspace.service.complete_task(workspace.owner, current).await?;
        let next = outcome
            .next_occurrence
            .ok_or_else(|| eyre!("day {day} should spawn an occurrence"))?;
        ensure!(next.parent_task() == Some(root.id()), "chain points at the root");
        ensure!(next.tags().contains(&work), "tags follow the chain");
        ensure!(
            next.due_date() == Some(start_of_june() + TimeDelta::days(day)),
            "due date advances one day per completion"
        );
        current = next.id();
        workspace.clock.advance(TimeDelta::days(1));
    }

    let occurrences = workspace.service.list_occurrences(workspace.owner, root.id()).await?;
    ensure!(occurrences.len() == 3, "three occurrences spawned");
    let completed = workspace
        .service
        .list_active(workspace.owner)
        .await?
        .iter()
        .filter(|task| task.status() == TaskStatus::Completed)
        .count();
    ensure!(completed == 3, "every completed occurrence is kept");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn monthly_tasks_move_thirty_days(workspace: Workspace) -> eyre::Result<()> {
    let task = workspace
        .recurring("Pay rent", RecurrencePattern::Monthly, true, None)
        .await?;

    let next = workspace
        .service
        .complete_task(workspace.owner, task.id())
        .await?
        .next_occurrence
        .ok_or_else(|| eyre!("monthly completion spawns"))?;

    ensure!(
        next.due_date() == Some(start_of_june() + TimeDelta::days(30)),
        "thirty days, not a calendar month"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recurring_tasks_without_due_date_stay_undated(workspace: Workspace) -> eyre::Result<()> {
    let task = workspace
        .service
        .create_task(
            taskloom::task::services::CreateTaskRequest::new(workspace.owner, "Tidy desk")
                .with_recurrence(RecurrencePattern::Weekly),
        )
        .await?;

    let next = workspace
        .service
        .complete_task(workspace.owner, task.id())
        .await?
        .next_occurrence
        .ok_or_else(|| eyre!("completion spawns"))?;

    ensure!(next.due_date().is_none(), "no due date to advance");
    let stored = workspace
        .repository
        .find_by_id(next.id())
        .await?
        .ok_or_else(|| eyre!("occurrence is stored"))?;
    ensure!(stored == next, "stored occurrence matches the returned one");
    Ok(())
}
