//! Then steps for recurring task BDD scenarios.

use super::world::RecurringTaskWorld;
use crate::test_helpers::start_of_june;
use chrono::TimeDelta;
use rstest_bdd_macros::then;
use taskloom::task::domain::TaskStatus;

fn parse_status(status: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(status).map_err(|err| eyre::eyre!("invalid expected status: {err}"))
}

#[then("no next occurrence is returned")]
fn no_next_occurrence(world: &RecurringTaskWorld) -> Result<(), eyre::Report> {
    match &world.next_occurrence {
        Some(None) => Ok(()),
        Some(Some(task)) => Err(eyre::eyre!("unexpected occurrence {}", task.id())),
        None => Err(eyre::eyre!("the task was not completed")),
    }
}

#[then("a next occurrence is returned")]
fn next_occurrence_returned(world: &RecurringTaskWorld) -> Result<(), eyre::Report> {
    let occurrence = world.occurrence()?;
    let task = world.task()?;
    eyre::ensure!(occurrence.id() != task.id(), "occurrence must be a new task");
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &RecurringTaskWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let actual = world.task()?.status();
    eyre::ensure!(actual == expected, "expected task status {expected}, found {actual}");
    Ok(())
}

#[then(r#"the occurrence status is "{status}""#)]
fn occurrence_status_is(world: &RecurringTaskWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let actual = world.occurrence()?.status();
    eyre::ensure!(
        actual == expected,
        "expected occurrence status {expected}, found {actual}"
    );
    Ok(())
}

#[then("the period count is {count:u32}")]
fn period_count_is(world: &RecurringTaskWorld, count: u32) -> Result<(), eyre::Report> {
    let actual = world.task()?.period().current_period_count();
    eyre::ensure!(actual == count, "expected period count {count}, found {actual}");
    Ok(())
}

#[then("the period started today")]
fn period_started_today(world: &RecurringTaskWorld) -> Result<(), eyre::Report> {
    let start = world.task()?.period().period_start_date();
    eyre::ensure!(
        start == Some(world.clock.today()),
        "expected the period to start today, found {start:?}"
    );
    Ok(())
}

#[then("the task is due {days:i64} days after the start")]
fn task_due_after(world: &RecurringTaskWorld, days: i64) -> Result<(), eyre::Report> {
    let due = world.task()?.due_date();
    eyre::ensure!(
        due == Some(start_of_june() + TimeDelta::days(days)),
        "unexpected task due date {due:?}"
    );
    Ok(())
}

#[then("the occurrence is due {days:i64} days after the start")]
fn occurrence_due_after(world: &RecurringTaskWorld, days: i64) -> Result<(), eyre::Report> {
    let due = world.occurrence()?.due_date();
    eyre::ensure!(
        due == Some(start_of_june() + TimeDelta::days(days)),
        "unexpected occurrence due date {due:?}"
    );
    Ok(())
}

#[then(r#"the occurrence is tagged "{tag}""#)]
fn occurrence_is_tagged(world: &RecurringTaskWorld, tag: String) -> Result<(), eyre::Report> {
    let tag_id = world
        .tags
        .get(&tag)
        .ok_or_else(|| eyre::eyre!("unknown tag {tag}"))?;
    eyre::ensure!(
        world.occurrence()?.tags().contains(tag_id),
        "occurrence is missing tag {tag}"
    );
    Ok(())
}

#[then("the occurrence belongs to the original task")]
fn occurrence_belongs_to_original(world: &RecurringTaskWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    eyre::ensure!(
        world.occurrence()?.parent_task() == Some(task.id()),
        "occurrence is not linked to the original task"
    );
    Ok(())
}
