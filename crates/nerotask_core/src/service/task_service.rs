//! Task action layer.
//!
//! # Responsibility
//! - Provide the only mutation path for tasks: create, edit, complete,
//!   reschedule, duplicate, delete.
//! - Enforce cross-field invariants (completing clears the today flag)
//!   and keep the selection session free of dangling identifiers.
//!
//! # Invariants
//! - Validation failures are rejected before any store mutation.
//! - Field changes are staged on a loaded copy and only returned to the
//!   caller after the commit succeeds, so a failed commit never leaves a
//!   half-applied task visible in any smart list.
//! - A failed delete leaves the session untouched.

use crate::model::task::{Task, TaskId, TaskPriority, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::session::Session;
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Action-layer error taxonomy.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Field invariant violated; checked before touching the store.
    Validation(TaskValidationError),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Store commit failed; the operation is considered not applied.
    Persistence(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::TaskNotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Persistence(other),
        }
    }
}

/// Request model for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRequest {
    pub title: String,
    pub notes: String,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    pub is_today: bool,
}

impl NewTaskRequest {
    /// Creates a request with empty notes/tags, normal priority, no due
    /// date, and no today flag.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: String::new(),
            due_at: None,
            priority: TaskPriority::default(),
            tags: Vec::new(),
            is_today: false,
        }
    }
}

/// Staged field values for an inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: String,
    pub notes: String,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
}

/// Action layer facade over the task repository.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a new task and returns it.
    ///
    /// Rejects an empty title before any store mutation.
    pub fn create_task(&mut self, request: &NewTaskRequest) -> Result<Task, TaskServiceError> {
        let mut task = Task::new(request.title.clone(), now_millis());
        task.notes = request.notes.clone();
        task.due_at = request.due_at;
        task.priority = request.priority;
        task.tags = request.tags.clone();
        task.is_today = request.is_today;
        task.validate()?;

        self.repo.insert_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} is_today={}",
            task.id, task.is_today
        );
        Ok(task)
    }

    /// Overwrites the editable fields of an existing task.
    pub fn update_task(&mut self, id: TaskId, edit: &TaskEdit) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        task.title = edit.title.clone();
        task.notes = edit.notes.clone();
        task.due_at = edit.due_at;
        task.priority = edit.priority;
        task.validate()?;

        self.repo.update_task(&task)?;
        info!("event=task_update module=service status=ok task_id={id}");
        Ok(task)
    }

    /// Flips completion state; completing clears the today flag.
    pub fn toggle_completion(&mut self, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        task.toggle_completion(now_millis());
        self.repo.update_task(&task)?;
        info!(
            "event=task_toggle_completion module=service status=ok task_id={id} is_completed={}",
            task.is_completed
        );
        Ok(task)
    }

    /// Flips the today flag unconditionally.
    ///
    /// Completed tasks are not guarded against; the UI is expected not to
    /// expose this path for them.
    pub fn toggle_today(&mut self, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        task.toggle_today();
        self.repo.update_task(&task)?;
        info!(
            "event=task_toggle_today module=service status=ok task_id={id} is_today={}",
            task.is_today
        );
        Ok(task)
    }

    pub fn set_priority(
        &mut self,
        id: TaskId,
        priority: TaskPriority,
    ) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        task.priority = priority;
        self.repo.update_task(&task)?;
        info!(
            "event=task_set_priority module=service status=ok task_id={id} priority={}",
            task.priority.label()
        );
        Ok(task)
    }

    /// Inserts a copy of an existing task with a fresh identity and
    /// reset completion state.
    pub fn duplicate_task(&mut self, id: TaskId) -> Result<Task, TaskServiceError> {
        let source = self.load(id)?;
        let copy = source.duplicate(now_millis());
        self.repo.insert_task(&copy)?;
        info!(
            "event=task_duplicate module=service status=ok source_id={id} task_id={}",
            copy.id
        );
        Ok(copy)
    }

    /// Removes a task and clears any matching session reference.
    ///
    /// The session is only touched after the store delete succeeds.
    pub fn delete_task(
        &mut self,
        id: TaskId,
        session: &mut Session,
    ) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        session.forget(id);
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Deletes every completed task and returns how many were removed.
    ///
    /// The batch commits as a whole; on failure no task is removed and the
    /// session keeps all its references.
    pub fn clear_completed(&mut self, session: &mut Session) -> Result<usize, TaskServiceError> {
        let completed: Vec<TaskId> = self
            .repo
            .list_tasks()?
            .into_iter()
            .filter(|task| task.is_completed)
            .map(|task| task.id)
            .collect();

        self.repo.delete_tasks(&completed)?;
        for id in &completed {
            session.forget(*id);
        }

        info!(
            "event=completed_cleared module=service status=ok count={}",
            completed.len()
        );
        Ok(completed.len())
    }

    /// Gets one task by stable ID.
    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    /// Returns the full task snapshot consumed by the derivation engines.
    pub fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks()?)
    }

    fn load(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}

/// Current time at the store's millisecond precision, so a task read back
/// after a commit compares equal to the staged copy.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
