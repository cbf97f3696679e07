//! Core domain logic for NeroTask.
//! This crate is the single source of truth for task invariants: smart-list
//! classification, completion statistics, the mutation action layer, and
//! cross-view selection state. Rendering belongs to embedders.

pub mod db;
pub mod lists;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod stats;

pub use lists::buckets::{
    anytime_by_priority, bucket_for, upcoming_buckets, BucketGroup, DueBucket, PriorityGroup,
};
pub use lists::{matches_search, SmartList};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskPriority, TaskValidationError};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_service::{NewTaskRequest, TaskEdit, TaskService, TaskServiceError};
pub use session::Session;
pub use stats::{completion_stats, filter_completed, period_count, CompletionStats, TimePeriod};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
