//! Taskloom: personal task management core.
//!
//! This crate owns the task domain of a personal task manager: tasks with
//! status, priority, due dates and tags, soft deletion, and recurring tasks
//! whose completion produces the next occurrence.
//!
//! # Architecture
//!
//! Taskloom follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle and the recurrence engine
//! - [`config`]: Environment-driven settings for binaries
//! - [`telemetry`]: Log subscriber installation for binaries

pub mod config;
pub mod task;
pub mod telemetry;
