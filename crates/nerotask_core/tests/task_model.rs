use chrono::{Duration, TimeZone, Utc};
use nerotask_core::{Task, TaskPriority, TaskValidationError};
use uuid::Uuid;

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

#[test]
fn new_task_sets_defaults() {
    let task = Task::new("buy milk", fixed_now());

    assert!(!task.id.is_nil());
    assert_eq!(task.title, "buy milk");
    assert_eq!(task.notes, "");
    assert!(!task.is_completed);
    assert_eq!(task.created_at, fixed_now());
    assert_eq!(task.completed_at, None);
    assert_eq!(task.due_at, None);
    assert!(!task.is_today);
    assert_eq!(task.priority, TaskPriority::Normal);
    assert!(task.tags.is_empty());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Task::with_id(Uuid::nil(), "invalid", fixed_now()).unwrap_err();
    assert_eq!(err, TaskValidationError::NilId);
}

#[test]
fn validate_rejects_empty_and_whitespace_titles() {
    let mut task = Task::new("", fixed_now());
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::EmptyTitle);

    task.title = "   ".to_string();
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::EmptyTitle);

    task.title = "real title".to_string();
    assert!(task.validate().is_ok());
}

#[test]
fn validate_rejects_completion_timestamp_mismatch() {
    let mut task = Task::new("ship release", fixed_now());

    task.is_completed = true;
    assert_eq!(
        task.validate().unwrap_err(),
        TaskValidationError::CompletionTimestampMismatch
    );

    task.is_completed = false;
    task.completed_at = Some(fixed_now());
    assert_eq!(
        task.validate().unwrap_err(),
        TaskValidationError::CompletionTimestampMismatch
    );
}

#[test]
fn toggle_completion_round_trip_restores_original_state() {
    let mut task = Task::new("water plants", fixed_now());
    task.is_today = true;
    let original = task.clone();

    task.toggle_completion(fixed_now() + Duration::hours(1));
    assert!(task.is_completed);
    assert_eq!(task.completed_at, Some(fixed_now() + Duration::hours(1)));
    assert!(!task.is_today, "completing must clear the today flag");

    task.toggle_completion(fixed_now() + Duration::hours(2));
    assert!(!task.is_completed);
    assert_eq!(task.completed_at, None);
    // Everything except the cleared today flag matches the original.
    assert_eq!(task.id, original.id);
    assert_eq!(task.title, original.title);
    assert_eq!(task.created_at, original.created_at);
    assert_eq!(task.completed_at, original.completed_at);
}

#[test]
fn toggle_today_flips_unconditionally() {
    let mut task = Task::new("sweep porch", fixed_now());
    task.toggle_completion(fixed_now());
    assert!(task.is_completed);

    // Accepted behavior: the flag flips even on a completed task.
    task.toggle_today();
    assert!(task.is_today);
    assert!(task.is_completed);
}

#[test]
fn duplicate_copies_fields_but_resets_identity_and_completion() {
    let mut source = Task::new("publish notes", fixed_now());
    source.notes = "draft in folder".to_string();
    source.due_at = Some(fixed_now() + Duration::days(2));
    source.priority = TaskPriority::High;
    source.tags = vec!["writing".to_string(), "writing".to_string()];
    source.is_today = true;
    source.toggle_completion(fixed_now() + Duration::hours(3));

    let later = fixed_now() + Duration::days(1);
    let copy = source.duplicate(later);

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.title, source.title);
    assert_eq!(copy.notes, source.notes);
    assert_eq!(copy.due_at, source.due_at);
    assert_eq!(copy.priority, TaskPriority::High);
    assert_eq!(copy.tags, source.tags);
    // toggle_completion cleared is_today on the source; the copy takes
    // whatever the source currently carries.
    assert_eq!(copy.is_today, source.is_today);
    assert!(!copy.is_completed);
    assert_eq!(copy.completed_at, None);
    assert_eq!(copy.created_at, later);
}

#[test]
fn priority_ordering_puts_urgent_on_top() {
    assert!(TaskPriority::Urgent > TaskPriority::High);
    assert!(TaskPriority::High > TaskPriority::Normal);
    assert!(TaskPriority::Normal > TaskPriority::Low);
    assert_eq!(
        TaskPriority::DESCENDING,
        [
            TaskPriority::Urgent,
            TaskPriority::High,
            TaskPriority::Normal,
            TaskPriority::Low
        ]
    );
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::with_id(id, "review budget", fixed_now()).unwrap();
    task.priority = TaskPriority::Urgent;
    task.tags = vec!["finance".to_string(), "q1".to_string()];

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["title"], "review budget");
    assert_eq!(json["is_completed"], false);
    assert_eq!(json["priority"], "urgent");
    assert_eq!(json["tags"][0], "finance");
    assert_eq!(json["completed_at"], serde_json::Value::Null);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}
