//! Smart list classification engine.
//!
//! # Responsibility
//! - Derive each smart list's membership and ordering from a task snapshot.
//! - Apply the shared free-text filter between predicate and sort.
//!
//! # Invariants
//! - Classification is pure: no caching, no task mutation. Every read
//!   re-evaluates the full snapshot; task sets are small enough that
//!   correctness wins over micro-optimization.
//! - Sorts are stable, so equal-key tasks keep snapshot order.

use crate::model::task::Task;
use std::cmp::Reverse;

pub mod buckets;

/// Named derived views over the task collection.
///
/// Each list is a `(predicate, sort)` pair; membership is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmartList {
    /// Every incomplete task.
    Inbox,
    /// Incomplete tasks flagged for today's focus.
    Today,
    /// Incomplete tasks with a due date.
    Upcoming,
    /// Incomplete tasks with no due date and no today flag.
    Anytime,
    /// Completed tasks.
    Completed,
}

impl SmartList {
    /// Display name used by view chrome.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Today => "Today",
            Self::Upcoming => "Upcoming",
            Self::Anytime => "Anytime",
            Self::Completed => "Completed",
        }
    }

    /// The list's membership predicate.
    pub fn admits(self, task: &Task) -> bool {
        match self {
            Self::Inbox => !task.is_completed,
            Self::Today => task.is_today && !task.is_completed,
            Self::Upcoming => !task.is_completed && task.due_at.is_some(),
            Self::Anytime => !task.is_completed && task.due_at.is_none() && !task.is_today,
            Self::Completed => task.is_completed,
        }
    }

    /// Derives the list's ordered membership from a full snapshot.
    ///
    /// The free-text filter runs after the predicate and before the sort.
    pub fn tasks(self, all: &[Task], search: &str) -> Vec<Task> {
        let mut picked: Vec<Task> = all
            .iter()
            .filter(|task| self.admits(task))
            .filter(|task| matches_search(task, search))
            .cloned()
            .collect();
        self.sort(&mut picked);
        picked
    }

    fn sort(self, tasks: &mut [Task]) {
        match self {
            Self::Inbox | Self::Anytime => {
                tasks.sort_by_key(|task| (Reverse(task.priority), Reverse(task.created_at)));
            }
            Self::Today => {
                tasks.sort_by_key(|task| (Reverse(task.priority), task.created_at));
            }
            Self::Upcoming => tasks.sort_by_key(|task| task.due_at),
            Self::Completed => tasks.sort_by_key(|task| Reverse(task.completed_at)),
        }
    }
}

/// Case-insensitive free-text filter over title, notes, and tags.
///
/// An empty filter matches everything.
pub fn matches_search(task: &Task, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task.notes.to_lowercase().contains(&needle)
        || task
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}
