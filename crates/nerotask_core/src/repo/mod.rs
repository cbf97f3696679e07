//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task-store contract consumed by the action layer.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Every write commits the task row and its tag rows in one transaction.

pub mod task_repo;
