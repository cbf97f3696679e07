//! Date-bucket grouping for Upcoming and priority grouping for Anytime.
//!
//! # Responsibility
//! - Partition the Upcoming list into labeled due-date buckets relative
//!   to an explicit `now`.
//! - Group the Anytime list by priority, most urgent first.
//!
//! # Invariants
//! - Empty buckets/groups are omitted.
//! - Buckets are emitted ordered by their first member's due date; within
//!   a bucket the Upcoming sort (due date ascending) is preserved.
//! - Week comparisons use ISO weeks.

use crate::lists::SmartList;
use crate::model::task::{Task, TaskPriority};
use chrono::{DateTime, Datelike, Duration, Utc};

/// Labeled subgroup of the Upcoming list, keyed by the due date's relation
/// to `now`. Precedence follows declaration order: an overdue-but-today
/// due date is Today, not Overdue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueBucket {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
    ThisMonth,
    /// Anything further out, keyed by the due date's month ("April 2026").
    Month(String),
}

impl DueBucket {
    /// Header label for the bucket.
    pub fn label(&self) -> &str {
        match self {
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::ThisWeek => "This Week",
            Self::NextWeek => "Next Week",
            Self::ThisMonth => "This Month",
            Self::Month(label) => label,
        }
    }
}

/// One emitted Upcoming bucket with its ordered members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketGroup {
    pub bucket: DueBucket,
    pub tasks: Vec<Task>,
}

/// One emitted Anytime priority group with its ordered members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityGroup {
    pub priority: TaskPriority,
    pub tasks: Vec<Task>,
}

/// Classifies a single due date against `now`.
pub fn bucket_for(due_at: DateTime<Utc>, now: DateTime<Utc>) -> DueBucket {
    let today = now.date_naive();
    let due_day = due_at.date_naive();

    if due_at < now && due_day != today {
        DueBucket::Overdue
    } else if due_day == today {
        DueBucket::Today
    } else if today.succ_opt() == Some(due_day) {
        DueBucket::Tomorrow
    } else if due_day.iso_week() == today.iso_week() {
        DueBucket::ThisWeek
    } else if due_day.iso_week() == (today + Duration::days(7)).iso_week() {
        DueBucket::NextWeek
    } else if due_day.year() == today.year() && due_day.month() == today.month() {
        DueBucket::ThisMonth
    } else {
        DueBucket::Month(due_day.format("%B %Y").to_string())
    }
}

/// Derives the bucketed Upcoming view from a full snapshot.
pub fn upcoming_buckets(all: &[Task], search: &str, now: DateTime<Utc>) -> Vec<BucketGroup> {
    let mut groups: Vec<BucketGroup> = Vec::new();

    for task in SmartList::Upcoming.tasks(all, search) {
        // The Upcoming predicate guarantees a due date.
        let Some(due_at) = task.due_at else { continue };
        let bucket = bucket_for(due_at, now);
        match groups.iter_mut().find(|group| group.bucket == bucket) {
            Some(group) => group.tasks.push(task),
            None => groups.push(BucketGroup {
                bucket,
                tasks: vec![task],
            }),
        }
    }

    groups.sort_by_key(|group| group.tasks.first().and_then(|task| task.due_at));
    groups
}

/// Derives the priority-grouped Anytime view from a full snapshot.
///
/// Groups are emitted urgent to low; empty groups are omitted.
pub fn anytime_by_priority(all: &[Task], search: &str) -> Vec<PriorityGroup> {
    let tasks = SmartList::Anytime.tasks(all, search);

    TaskPriority::DESCENDING
        .iter()
        .filter_map(|&priority| {
            let members: Vec<Task> = tasks
                .iter()
                .filter(|task| task.priority == priority)
                .cloned()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(PriorityGroup {
                    priority,
                    tasks: members,
                })
            }
        })
        .collect()
}
