//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide a durable keyed store for the canonical task collection.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - A task row and its `task_tags` rows commit or roll back together.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskPriority, TaskValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    notes,
    is_completed,
    created_at,
    completed_at,
    due_at,
    is_today,
    priority
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task CRUD operations.
///
/// All operations commit synchronously before returning; a failed commit
/// surfaces as an error and leaves durable state unchanged.
pub trait TaskRepository {
    fn insert_task(&mut self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&mut self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn delete_task(&mut self, id: TaskId) -> RepoResult<()>;
    /// Deletes every listed task in one commit. Either all rows are
    /// removed or, on any failure, none are.
    fn delete_tasks(&mut self, ids: &[TaskId]) -> RepoResult<()>;
    /// Returns the full task collection as a snapshot for the derivation
    /// engines. Ordering is deterministic but not list-specific; smart
    /// lists re-sort per their own contract.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&mut self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                notes,
                is_completed,
                created_at,
                completed_at,
                due_at,
                is_today,
                priority
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.notes.as_str(),
                bool_to_int(task.is_completed),
                task.created_at.timestamp_millis(),
                task.completed_at.map(|at| at.timestamp_millis()),
                task.due_at.map(|at| at.timestamp_millis()),
                bool_to_int(task.is_today),
                priority_to_db(task.priority),
            ],
        )?;
        replace_tags_in_tx(&tx, &task.id.to_string(), &task.tags)?;
        tx.commit()?;

        Ok(task.id)
    }

    fn update_task(&mut self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks
             SET
                title = ?1,
                notes = ?2,
                is_completed = ?3,
                completed_at = ?4,
                due_at = ?5,
                is_today = ?6,
                priority = ?7
             WHERE uuid = ?8;",
            params![
                task.title.as_str(),
                task.notes.as_str(),
                bool_to_int(task.is_completed),
                task.completed_at.map(|at| at.timestamp_millis()),
                task.due_at.map(|at| at.timestamp_millis()),
                bool_to_int(task.is_today),
                priority_to_db(task.priority),
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        replace_tags_in_tx(&tx, &task.id.to_string(), &task.tags)?;
        tx.commit()?;

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut task = parse_task_row(row)?;
            task.tags = load_tags(self.conn, &task.id.to_string())?;
            task.validate()?;
            return Ok(Some(task));
        }

        Ok(None)
    }

    fn delete_task(&mut self, id: TaskId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM task_tags WHERE task_uuid = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [id_text.as_str()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_tasks(&mut self, ids: &[TaskId]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for id in ids {
            let id_text = id.to_string();
            tx.execute(
                "DELETE FROM task_tags WHERE task_uuid = ?1;",
                [id_text.as_str()],
            )?;
            let changed = tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [id_text.as_str()])?;

            if changed == 0 {
                return Err(RepoError::NotFound(*id));
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            let mut task = parse_task_row(row)?;
            task.tags = load_tags(self.conn, &task.id.to_string())?;
            task.validate()?;
            tasks.push(task);
        }

        Ok(tasks)
    }
}

fn replace_tags_in_tx(tx: &Transaction<'_>, task_uuid: &str, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM task_tags WHERE task_uuid = ?1;", [task_uuid])?;

    for (position, name) in tags.iter().enumerate() {
        tx.execute(
            "INSERT INTO task_tags (task_uuid, position, name) VALUES (?1, ?2, ?3);",
            params![task_uuid, position as i64, name.as_str()],
        )?;
    }

    Ok(())
}

fn load_tags(conn: &Connection, task_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM task_tags
         WHERE task_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([task_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    Ok(Task {
        id,
        title: row.get("title")?,
        notes: row.get("notes")?,
        is_completed: int_to_bool(row.get("is_completed")?, "tasks.is_completed")?,
        created_at: parse_timestamp(row.get("created_at")?, "tasks.created_at")?,
        completed_at: parse_optional_timestamp(row.get("completed_at")?, "tasks.completed_at")?,
        due_at: parse_optional_timestamp(row.get("due_at")?, "tasks.due_at")?,
        is_today: int_to_bool(row.get("is_today")?, "tasks.is_today")?,
        priority,
        tags: Vec::new(),
    })
}

fn parse_timestamp(millis: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{millis}` in {column}"))
    })
}

fn parse_optional_timestamp(
    millis: Option<i64>,
    column: &str,
) -> RepoResult<Option<DateTime<Utc>>> {
    millis.map(|value| parse_timestamp(value, column)).transpose()
}

fn priority_to_db(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "low",
        TaskPriority::Normal => "normal",
        TaskPriority::High => "high",
        TaskPriority::Urgent => "urgent",
    }
}

fn parse_priority(value: &str) -> Option<TaskPriority> {
    match value {
        "low" => Some(TaskPriority::Low),
        "normal" => Some(TaskPriority::Normal),
        "high" => Some(TaskPriority::High),
        "urgent" => Some(TaskPriority::Urgent),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["tasks", "task_tags"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["uuid", "title", "priority", "is_today"] {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    for column in ["task_uuid", "position", "name"] {
        if !table_has_column(conn, "task_tags", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "task_tags",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
