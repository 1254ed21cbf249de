//! Adapter implementations of the task ports.
//!
//! - [`memory`]: in-process storage for tests and embedding
//! - [`postgres`]: Diesel-backed `PostgreSQL` storage

pub mod memory;
pub mod postgres;
