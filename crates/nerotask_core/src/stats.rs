//! Completion statistics for the Completed list.
//!
//! # Responsibility
//! - Derive streaks, completion latency, and best-weekday figures from a
//!   caller-filtered completed subset.
//! - Provide the time-period filters backing the Completed header chips.
//!
//! # Invariants
//! - Statistics are pure functions of the passed-in tasks and `now`.
//! - A streak ends today: no completion today means streak 0.
//! - Best-day ties resolve to the earliest weekday, Sunday first.

use crate::model::task::Task;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use std::collections::HashSet;

/// Time-period filters applied to the Completed list before statistics
/// are computed. Declaration order matches the chip row in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePeriod {
    All,
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
}

impl TimePeriod {
    /// All periods in display order.
    pub const ALL: [TimePeriod; 6] = [
        TimePeriod::All,
        TimePeriod::Today,
        TimePeriod::Yesterday,
        TimePeriod::ThisWeek,
        TimePeriod::LastWeek,
        TimePeriod::ThisMonth,
    ];

    /// Chip label for the period.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
            Self::ThisMonth => "This Month",
        }
    }

    /// Whether a completion timestamp falls inside this period relative
    /// to `now`. Weeks are ISO weeks.
    pub fn contains(self, completed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let day = completed_at.date_naive();
        match self {
            Self::All => true,
            Self::Today => day == today,
            Self::Yesterday => today.pred_opt() == Some(day),
            Self::ThisWeek => day.iso_week() == today.iso_week(),
            Self::LastWeek => day.iso_week() == (today - Duration::days(7)).iso_week(),
            Self::ThisMonth => day.year() == today.year() && day.month() == today.month(),
        }
    }
}

/// Summary figures over a completed subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStats {
    pub total_completed: usize,
    /// Consecutive calendar days ending today with at least one completion.
    pub current_streak: u32,
    /// Mean of `completed_at - created_at`; `None` for an empty subset.
    pub average_completion_time: Option<Duration>,
    /// Weekday with the most completions; `None` for an empty subset.
    pub best_day: Option<Weekday>,
}

/// Restricts tasks to completed ones whose completion falls inside `period`.
pub fn filter_completed(tasks: &[Task], period: TimePeriod, now: DateTime<Utc>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| {
            task.completed_at
                .is_some_and(|at| period.contains(at, now))
        })
        .cloned()
        .collect()
}

/// Badge count for one period chip.
pub fn period_count(tasks: &[Task], period: TimePeriod, now: DateTime<Utc>) -> usize {
    tasks
        .iter()
        .filter(|task| {
            task.completed_at
                .is_some_and(|at| period.contains(at, now))
        })
        .count()
}

/// Computes summary statistics over an already-filtered completed subset.
pub fn completion_stats(tasks: &[Task], now: DateTime<Utc>) -> CompletionStats {
    CompletionStats {
        total_completed: tasks.len(),
        current_streak: current_streak(tasks, now),
        average_completion_time: average_completion_time(tasks),
        best_day: best_day(tasks),
    }
}

fn current_streak(tasks: &[Task], now: DateTime<Utc>) -> u32 {
    let completion_days: HashSet<_> = tasks
        .iter()
        .filter_map(|task| task.completed_at)
        .map(|at| at.date_naive())
        .collect();

    let mut streak = 0;
    let mut day = now.date_naive();
    while completion_days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

fn average_completion_time(tasks: &[Task]) -> Option<Duration> {
    let mut total_millis = 0i64;
    let mut counted = 0i64;
    for task in tasks {
        if let Some(completed_at) = task.completed_at {
            total_millis += (completed_at - task.created_at).num_milliseconds();
            counted += 1;
        }
    }

    if counted == 0 {
        None
    } else {
        Some(Duration::milliseconds(total_millis / counted))
    }
}

fn best_day(tasks: &[Task]) -> Option<Weekday> {
    const WEEK_SUNDAY_FIRST: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    let mut counts = [0usize; 7];
    for task in tasks {
        if let Some(completed_at) = task.completed_at {
            counts[completed_at.weekday().num_days_from_sunday() as usize] += 1;
        }
    }

    let mut best: Option<(usize, Weekday)> = None;
    for (index, weekday) in WEEK_SUNDAY_FIRST.iter().enumerate() {
        // Strict comparison keeps the earliest weekday on ties.
        if counts[index] > best.map_or(0, |(count, _)| count) {
            best = Some((counts[index], *weekday));
        }
    }
    best.map(|(_, weekday)| weekday)
}
