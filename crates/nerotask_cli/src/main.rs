//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `nerotask_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use chrono::Utc;
use nerotask_core::db::open_db_in_memory;
use nerotask_core::{
    upcoming_buckets, NewTaskRequest, SmartList, SqliteTaskRepository, TaskService,
};
use std::error::Error;

fn main() {
    if let Err(err) = run() {
        eprintln!("smoke check failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("nerotask_core version={}", nerotask_core::core_version());

    let mut conn = open_db_in_memory()?;
    let repo = SqliteTaskRepository::try_new(&mut conn)?;
    let mut service = TaskService::new(repo);

    let mut request = NewTaskRequest::new("Smoke-check the core crate");
    request.is_today = true;
    service.create_task(&request)?;

    let mut due_request = NewTaskRequest::new("Follow up tomorrow");
    due_request.due_at = Some(Utc::now() + chrono::Duration::days(1));
    service.create_task(&due_request)?;

    let snapshot = service.list_tasks()?;
    for list in [
        SmartList::Inbox,
        SmartList::Today,
        SmartList::Upcoming,
        SmartList::Anytime,
        SmartList::Completed,
    ] {
        println!("{}={}", list.label(), list.tasks(&snapshot, "").len());
    }
    println!(
        "upcoming_buckets={}",
        upcoming_buckets(&snapshot, "", Utc::now()).len()
    );

    Ok(())
}
