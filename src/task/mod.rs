//! Task lifecycle management for Taskloom.
//!
//! Tasks are created, updated, soft-deleted, restored, and summarised per
//! owner. Completing a recurring task hands it to the recurrence engine,
//! which either reopens the same task for its next due date or stores a new
//! occurrence linked to the root of its chain. Per-period quotas delay the
//! next occurrence until enough completions were recorded. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
