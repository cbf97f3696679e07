use chrono::{DateTime, TimeZone, Utc};
use nerotask_core::db::{open_db_in_memory, DbError};
use nerotask_core::{
    NewTaskRequest, RepoError, RepoResult, Session, SmartList, SqliteTaskRepository, Task,
    TaskEdit, TaskId, TaskPriority, TaskRepository, TaskService, TaskServiceError,
    TaskValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn service(conn: &mut Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap())
}

// Whole-second timestamp, exact under the store's millisecond precision.
fn due(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, day, hour, 0, 0).unwrap()
}

/// In-memory repository whose write commits can be made to fail, for
/// exercising the persistence-failure contract of the action layer.
#[derive(Default)]
struct UnreliableRepo {
    tasks: Vec<Task>,
    fail_updates: bool,
    fail_batch_deletes: bool,
}

fn commit_failure() -> RepoError {
    RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
}

impl TaskRepository for UnreliableRepo {
    fn insert_task(&mut self, task: &Task) -> RepoResult<TaskId> {
        self.tasks.push(task.clone());
        Ok(task.id)
    }

    fn update_task(&mut self, task: &Task) -> RepoResult<()> {
        if self.fail_updates {
            return Err(commit_failure());
        }
        let stored = self
            .tasks
            .iter_mut()
            .find(|stored| stored.id == task.id)
            .ok_or(RepoError::NotFound(task.id))?;
        *stored = task.clone();
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        Ok(self.tasks.iter().find(|task| task.id == id).cloned())
    }

    fn delete_task(&mut self, id: TaskId) -> RepoResult<()> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_tasks(&mut self, ids: &[TaskId]) -> RepoResult<()> {
        if self.fail_batch_deletes {
            return Err(commit_failure());
        }
        for id in ids {
            if !self.tasks.iter().any(|task| task.id == *id) {
                return Err(RepoError::NotFound(*id));
            }
        }
        self.tasks.retain(|task| !ids.contains(&task.id));
        Ok(())
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }
}

#[test]
fn create_task_persists_all_requested_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let mut request = NewTaskRequest::new("plan trip");
    request.notes = "check ferry times".to_string();
    request.due_at = Some(due(10, 9));
    request.priority = TaskPriority::High;
    request.tags = vec!["travel".to_string(), "family".to_string()];
    request.is_today = true;

    let created = service.create_task(&request).unwrap();
    let loaded = service.get_task(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.notes, "check ferry times");
    assert_eq!(loaded.priority, TaskPriority::High);
    assert_eq!(loaded.tags, vec!["travel", "family"]);
    assert!(loaded.is_today);
    assert!(!loaded.is_completed);
}

#[test]
fn create_task_rejects_empty_title_and_leaves_store_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let err = service
        .create_task(&NewTaskRequest::new(""))
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(TaskValidationError::EmptyTitle)
    ));
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn update_task_rejects_empty_title_and_keeps_persisted_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let created = service
        .create_task(&NewTaskRequest::new("water garden"))
        .unwrap();

    let edit = TaskEdit {
        title: "  ".to_string(),
        notes: "should never land".to_string(),
        due_at: None,
        priority: TaskPriority::Urgent,
    };
    let err = service.update_task(created.id, &edit).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(TaskValidationError::EmptyTitle)
    ));

    let loaded = service.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded.title, "water garden");
    assert_eq!(loaded.notes, "");
    assert_eq!(loaded.priority, TaskPriority::Normal);
}

#[test]
fn update_task_overwrites_editable_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let created = service
        .create_task(&NewTaskRequest::new("rough draft"))
        .unwrap();
    let due_at = due(3, 17);

    let edit = TaskEdit {
        title: "final draft".to_string(),
        notes: "send to reviewers".to_string(),
        due_at: Some(due_at),
        priority: TaskPriority::High,
    };
    let updated = service.update_task(created.id, &edit).unwrap();

    assert_eq!(updated.title, "final draft");
    assert_eq!(updated.due_at, Some(due_at));
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(service.get_task(created.id).unwrap().unwrap(), updated);
}

#[test]
fn toggle_completion_round_trips_and_clears_today_flag() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let mut request = NewTaskRequest::new("morning run");
    request.is_today = true;
    let created = service.create_task(&request).unwrap();

    let completed = service.toggle_completion(created.id).unwrap();
    assert!(completed.is_completed);
    assert!(completed.completed_at.is_some());
    assert!(!completed.is_today);

    let reopened = service.toggle_completion(created.id).unwrap();
    assert!(!reopened.is_completed);
    assert_eq!(reopened.completed_at, None);
    // The today flag stays cleared; completion round-trips do not
    // resurrect focus state.
    assert!(!reopened.is_today);
}

#[test]
fn toggle_today_flips_even_on_a_completed_task() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let created = service
        .create_task(&NewTaskRequest::new("archive photos"))
        .unwrap();
    service.toggle_completion(created.id).unwrap();

    // Documented accepted behavior: no completion guard on this path.
    let flipped = service.toggle_today(created.id).unwrap();
    assert!(flipped.is_today);
    assert!(flipped.is_completed);

    // The inconsistent task still never reaches the Today list.
    let snapshot = service.list_tasks().unwrap();
    assert!(SmartList::Today.tasks(&snapshot, "").is_empty());
}

#[test]
fn set_priority_persists() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let created = service
        .create_task(&NewTaskRequest::new("renew license"))
        .unwrap();
    let updated = service
        .set_priority(created.id, TaskPriority::Urgent)
        .unwrap();

    assert_eq!(updated.priority, TaskPriority::Urgent);
    assert_eq!(
        service.get_task(created.id).unwrap().unwrap().priority,
        TaskPriority::Urgent
    );
}

#[test]
fn duplicate_task_resets_identity_and_completion_state() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let mut request = NewTaskRequest::new("quarterly report");
    request.priority = TaskPriority::High;
    request.tags = vec!["work".to_string()];
    let created = service.create_task(&request).unwrap();
    let completed = service.toggle_completion(created.id).unwrap();
    assert!(completed.is_completed);

    let copy = service.duplicate_task(created.id).unwrap();

    assert_ne!(copy.id, created.id);
    assert_eq!(copy.title, "quarterly report");
    assert_eq!(copy.priority, TaskPriority::High);
    assert_eq!(copy.tags, vec!["work"]);
    assert!(!copy.is_completed);
    assert_eq!(copy.completed_at, None);
    assert!(copy.created_at >= created.created_at);

    // Both tasks exist in the store.
    assert_eq!(service.list_tasks().unwrap().len(), 2);
}

#[test]
fn delete_task_clears_matching_session_references() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let mut session = Session::new();

    let selected = service
        .create_task(&NewTaskRequest::new("selected"))
        .unwrap();
    let expanded = service
        .create_task(&NewTaskRequest::new("expanded"))
        .unwrap();
    session.select(selected.id);
    session.expand(expanded.id);

    service.delete_task(selected.id, &mut session).unwrap();
    assert_eq!(session.selected_task_id(), None);
    assert_eq!(session.expanded_task_id(), Some(expanded.id));

    service.delete_task(expanded.id, &mut session).unwrap();
    assert_eq!(session.expanded_task_id(), None);
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn failed_delete_leaves_session_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let mut session = Session::new();

    let created = service
        .create_task(&NewTaskRequest::new("keep me"))
        .unwrap();
    session.select(created.id);

    let err = service
        .delete_task(Uuid::new_v4(), &mut session)
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
    assert_eq!(session.selected_task_id(), Some(created.id));
}

#[test]
fn clear_completed_removes_only_completed_tasks() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let mut session = Session::new();

    let open = service.create_task(&NewTaskRequest::new("open")).unwrap();
    let first_done = service
        .create_task(&NewTaskRequest::new("first done"))
        .unwrap();
    let second_done = service
        .create_task(&NewTaskRequest::new("second done"))
        .unwrap();
    service.toggle_completion(first_done.id).unwrap();
    service.toggle_completion(second_done.id).unwrap();
    session.select(first_done.id);

    let removed = service.clear_completed(&mut session).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(session.selected_task_id(), None);
    let remaining = service.list_tasks().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, open.id);
}

#[test]
fn failed_commit_surfaces_persistence_and_keeps_stored_fields() {
    let mut repo = UnreliableRepo::default();
    repo.fail_updates = true;
    let task = Task::new("stretch routine", due(1, 8));
    repo.insert_task(&task).unwrap();
    let mut service = TaskService::new(repo);

    let edit = TaskEdit {
        title: "evening stretch".to_string(),
        notes: "never committed".to_string(),
        due_at: Some(due(2, 19)),
        priority: TaskPriority::High,
    };
    let err = service.update_task(task.id, &edit).unwrap_err();
    assert!(matches!(err, TaskServiceError::Persistence(_)));

    let err = service.toggle_completion(task.id).unwrap_err();
    assert!(matches!(err, TaskServiceError::Persistence(_)));

    // The caller never observes a half-applied task.
    let stored = service.get_task(task.id).unwrap().unwrap();
    assert_eq!(stored, task);
}

#[test]
fn failed_clear_completed_keeps_every_task_and_session_reference() {
    let mut repo = UnreliableRepo::default();
    repo.fail_batch_deletes = true;

    let open = Task::new("still open", due(5, 9));
    let mut first_done = Task::new("first done", due(5, 10));
    first_done.toggle_completion(due(6, 12));
    let mut second_done = Task::new("second done", due(5, 11));
    second_done.toggle_completion(due(6, 13));
    repo.insert_task(&open).unwrap();
    repo.insert_task(&first_done).unwrap();
    repo.insert_task(&second_done).unwrap();

    let mut service = TaskService::new(repo);
    let mut session = Session::new();
    session.select(first_done.id);
    session.expand(second_done.id);

    let err = service.clear_completed(&mut session).unwrap_err();
    assert!(matches!(err, TaskServiceError::Persistence(_)));

    // The batch is all-or-nothing: no task was removed and the session
    // still points at the completed tasks.
    assert_eq!(service.list_tasks().unwrap().len(), 3);
    assert_eq!(session.selected_task_id(), Some(first_done.id));
    assert_eq!(session.expanded_task_id(), Some(second_done.id));
}

#[test]
fn actions_on_unknown_tasks_report_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.toggle_completion(missing).unwrap_err(),
        TaskServiceError::TaskNotFound(id) if id == missing
    ));
    assert!(matches!(
        service.duplicate_task(missing).unwrap_err(),
        TaskServiceError::TaskNotFound(id) if id == missing
    ));
}
