//! Domain model for the task manager.
//!
//! # Responsibility
//! - Define the single persisted entity (`Task`) and its invariants.
//! - Keep completion/today toggle semantics in one place so every caller
//!   observes the same state transitions.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Smart lists, priorities, and date buckets are derived, never stored.

pub mod task;
