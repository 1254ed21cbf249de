//! Given steps for recurring task BDD scenarios.

use super::world::{RecurringTaskWorld, run_async};
use crate::test_helpers::start_of_june;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskloom::task::{
    domain::RecurrencePattern,
    services::CreateTaskRequest,
};

fn create(world: &mut RecurringTaskWorld, request: CreateTaskRequest) -> Result<(), eyre::Report> {
    let task = run_async(world.service.create_task(request))
        .wrap_err("create task for recurring scenario")?;
    world.task = Some(task);
    Ok(())
}

fn pattern(name: &str) -> Result<RecurrencePattern, eyre::Report> {
    RecurrencePattern::try_from(name).map_err(|err| eyre::eyre!("invalid pattern: {err}"))
}

#[given("a {pattern_name} task due today that must be done {quota:u32} times per period without history")]
fn quota_task_without_history(
    world: &mut RecurringTaskWorld,
    pattern_name: String,
    quota: u32,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(world.owner, "Exercise")
        .with_recurrence(pattern(&pattern_name)?)
        .with_times_per_period(quota)
        .with_keep_history(false)
        .with_due_date(start_of_june());
    create(world, request)
}

#[given(r#"a {pattern_name} task due today kept in history and tagged "{tag}""#)]
fn tagged_task_with_history(
    world: &mut RecurringTaskWorld,
    pattern_name: String,
    tag: String,
) -> Result<(), eyre::Report> {
    let tag_id = world.tag(&tag);
    let request = CreateTaskRequest::new(world.owner, "Stand-up notes")
        .with_recurrence(pattern(&pattern_name)?)
        .with_keep_history(true)
        .with_tags([tag_id])
        .with_due_date(start_of_june());
    create(world, request)
}

#[given("a task that does not recur")]
fn non_recurring_task(world: &mut RecurringTaskWorld) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(world.owner, "Renew passport").with_due_date(start_of_june());
    create(world, request)
}
