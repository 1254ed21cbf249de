//! Operator commands over the `PostgreSQL` task store.
//!
//! Usage:
//!
//! ```text
//! taskctl <command> <owner-uuid> [task-uuid...]
//! ```
//!
//! The `command` must be `complete`, `delete`, `restore`, `stats`, or
//! `deleted`. `complete`, `delete`, and `restore` take one or more task
//! identifiers and run as a bulk action; `stats` and `deleted` take none.
//! Arguments are checked before settings are read from the environment (see
//! [`taskloom::config`]). The result is written to standard output as one
//! line of JSON whatever the log filter; logs go to standard error.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use taskloom::config::{AppConfig, ConfigError};
use taskloom::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{OwnerId, TaskId},
    services::{BulkTaskAction, BulkTaskRequest, TaskLifecycleService},
};
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;
use uuid::Uuid;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type PgService = TaskLifecycleService<PostgresTaskRepository, mockable::DefaultClock>;

#[derive(Debug, Error)]
enum CommandError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("invalid {what} '{value}': {source}")]
    InvalidId {
        what: &'static str,
        value: String,
        #[source]
        source: uuid::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Complete,
    Delete,
    Restore,
    Stats,
    Deleted,
}

impl Command {
    fn parse(arg: &str) -> Result<Self, CommandError> {
        match arg {
            "complete" => Ok(Self::Complete),
            "delete" => Ok(Self::Delete),
            "restore" => Ok(Self::Restore),
            "stats" => Ok(Self::Stats),
            "deleted" => Ok(Self::Deleted),
            other => Err(CommandError::InvalidArgs(format!(
                "unknown command '{other}'; expected complete, delete, restore, stats, or deleted"
            ))),
        }
    }

    const fn bulk_action(self) -> Option<BulkTaskAction> {
        match self {
            Self::Complete => Some(BulkTaskAction::Complete),
            Self::Delete => Some(BulkTaskAction::Delete),
            Self::Restore => Some(BulkTaskAction::Restore),
            Self::Stats | Self::Deleted => None,
        }
    }
}

#[derive(Debug)]
struct Invocation {
    command: Command,
    owner: OwnerId,
    task_ids: Vec<TaskId>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation, CommandError> {
    let mut rest = args.into_iter().skip(1);
    let command = rest
        .next()
        .ok_or_else(|| CommandError::InvalidArgs("missing command".into()))
        .and_then(|arg| Command::parse(&arg))?;
    let owner = rest
        .next()
        .ok_or_else(|| CommandError::InvalidArgs("missing owner id".into()))
        .and_then(|arg| parse_uuid("owner id", arg))
        .map(OwnerId::from_uuid)?;
    let task_ids = rest
        .map(|arg| parse_uuid("task id", arg).map(TaskId::from_uuid))
        .collect::<Result<Vec<_>, _>>()?;

    match (command.bulk_action(), task_ids.is_empty()) {
        (Some(_), true) => Err(CommandError::InvalidArgs(
            "expected at least one task id".into(),
        )),
        (None, false) => Err(CommandError::InvalidArgs(
            "this command takes no task ids".into(),
        )),
        _ => Ok(Invocation {
            command,
            owner,
            task_ids,
        }),
    }
}

fn parse_uuid(what: &'static str, value: String) -> Result<Uuid, CommandError> {
    Uuid::parse_str(&value).map_err(|source| CommandError::InvalidId {
        what,
        value,
        source,
    })
}

/// Parses the command line, then loads settings with `load_config`.
fn prepare(
    args: impl IntoIterator<Item = String>,
    load_config: impl FnOnce() -> Result<AppConfig, ConfigError>,
) -> Result<(Invocation, AppConfig), BoxError> {
    let invocation = parse_args(args)?;
    let config = load_config()?;
    Ok((invocation, config))
}

fn main() -> Result<(), BoxError> {
    let (invocation, config) = prepare(env::args(), AppConfig::from_env)?;
    taskloom::telemetry::init(&config.log_filter)?;

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.pool_max_size)
        .build(manager)?;
    let service: PgService = TaskLifecycleService::new(
        Arc::new(PostgresTaskRepository::new(pool)),
        Arc::new(mockable::DefaultClock),
    );

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let mut out = io::stdout().lock();
    runtime.block_on(run(&service, invocation, &mut out))
}

async fn run(
    service: &PgService,
    invocation: Invocation,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    let Invocation {
        command,
        owner,
        task_ids,
    } = invocation;

    if let Some(action) = command.bulk_action() {
        let summary = service
            .bulk_action(BulkTaskRequest::new(owner, task_ids, action))
            .await?;
        emit(out, &summary)?;
    } else if command == Command::Stats {
        emit(out, &service.stats(owner).await?)?;
    } else {
        emit(out, &service.list_deleted(owner).await?)?;
    }
    info!(command = ?command, owner = %owner, "taskctl command finished");
    Ok(())
}

fn emit(out: &mut impl Write, value: &impl Serialize) -> Result<(), BoxError> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
