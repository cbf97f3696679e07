//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shared by all smart-list projections.
//! - Provide lifecycle helpers for completion and today-focus toggles.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `created_at` is set once at creation and never changes.
//! - `completed_at` is present iff `is_completed` is true.
//! - Completing a task clears `is_today`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Ordered task priority. Ordering follows declaration order, so
/// `Low < Normal < High < Urgent` and descending sorts put `Urgent` first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl TaskPriority {
    /// All priorities from most to least urgent, the order grouped views
    /// emit their sections in.
    pub const DESCENDING: [TaskPriority; 4] = [
        TaskPriority::Urgent,
        TaskPriority::High,
        TaskPriority::Normal,
        TaskPriority::Low,
    ];

    /// Human-readable label used by list headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

/// Validation failure for task field invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `id` is the nil UUID.
    NilId,
    /// `title` is empty or whitespace-only.
    EmptyTitle,
    /// `is_completed` disagrees with `completed_at` presence.
    CompletionTimestampMismatch,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be the nil uuid"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::CompletionTimestampMismatch => write!(
                f,
                "completed_at must be present exactly when is_completed is true"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Smart lists are derived views over collections of this one shape; no
/// list membership is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for selection, linking and auditing.
    pub id: TaskId,
    /// Display title. Never empty for persisted tasks.
    pub title: String,
    /// Free-text notes, may be empty.
    pub notes: String,
    pub is_completed: bool,
    /// Creation timestamp, immutable after construction.
    pub created_at: DateTime<Utc>,
    /// Present iff `is_completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    /// Optional due date driving the Upcoming list.
    pub due_at: Option<DateTime<Utc>>,
    /// Marks inclusion in the Today focus list.
    pub is_today: bool,
    pub priority: TaskPriority,
    /// Ordered tags; duplicates permitted, insertion order preserved.
    pub tags: Vec<String>,
}

impl Task {
    /// Creates a new task with a generated stable ID.
    ///
    /// Optional fields start empty; `priority` starts at `Normal`. The
    /// title is not validated here; writes go through [`Task::validate`].
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            notes: String::new(),
            is_completed: false,
            created_at: now,
            completed_at: None,
            due_at: None,
            is_today: false,
            priority: TaskPriority::default(),
            tags: Vec::new(),
        }
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by import paths and deterministic tests where identity already
    /// exists externally.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        let mut task = Self::new(title, now);
        task.id = id;
        Ok(task)
    }

    /// Checks field invariants. Called before every persistence write and
    /// on read-back of persisted rows.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.is_completed != self.completed_at.is_some() {
            return Err(TaskValidationError::CompletionTimestampMismatch);
        }
        Ok(())
    }

    /// Flips completion state.
    ///
    /// Completing sets `completed_at` to `now` and clears `is_today`
    /// (a completed task cannot remain in Today's active focus).
    /// Un-completing clears `completed_at`.
    pub fn toggle_completion(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        if self.is_completed {
            self.completed_at = Some(now);
            self.is_today = false;
        } else {
            self.completed_at = None;
        }
    }

    /// Flips the Today focus flag unconditionally.
    ///
    /// Completed tasks can technically be toggled too; callers are expected
    /// not to expose this path for them.
    pub fn toggle_today(&mut self) {
        self.is_today = !self.is_today;
    }

    /// Returns a copy with a fresh identity.
    ///
    /// Copies title, notes, due date, priority, tags, and `is_today`;
    /// completion state is reset and `created_at` starts over at `now`.
    pub fn duplicate(&self, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            notes: self.notes.clone(),
            is_completed: false,
            created_at: now,
            completed_at: None,
            due_at: self.due_at,
            is_today: self.is_today,
            priority: self.priority,
            tags: self.tags.clone(),
        }
    }
}
