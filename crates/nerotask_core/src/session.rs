//! Cross-view selection and expansion state.
//!
//! # Responsibility
//! - Track the single selected task, the single expanded (inline-edit)
//!   task, and the shared free-text search filter.
//!
//! # Invariants
//! - At most one task is expanded at any time; expanding another task
//!   implicitly collapses the previous one.
//! - Deleting a task clears any matching selection/expansion in the same
//!   logical operation, so no view holds a dangling identifier.
//!
//! Multiple independently rendered list views share this one state object;
//! it is passed explicitly to whatever needs it rather than living in a
//! global. The engine model is single-threaded; embedders sharing a
//! `Session` across threads must wrap it in their own lock.

use crate::model::task::TaskId;

/// Shared view session: selection, expansion, and search filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    selected_task_id: Option<TaskId>,
    expanded_task_id: Option<TaskId>,
    search_text: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_task_id
    }

    pub fn expanded_task_id(&self) -> Option<TaskId> {
        self.expanded_task_id
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn select(&mut self, id: TaskId) {
        self.selected_task_id = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_task_id = None;
    }

    /// Expands `id` for inline editing, collapsing any previous expansion.
    ///
    /// Returns the task that was collapsed, if it differs from `id`.
    pub fn expand(&mut self, id: TaskId) -> Option<TaskId> {
        let previous = self.expanded_task_id.replace(id);
        previous.filter(|collapsed| *collapsed != id)
    }

    pub fn collapse(&mut self) {
        self.expanded_task_id = None;
    }

    /// Updates the shared free-text filter. Does not mutate any task;
    /// list views re-run classification on their next read.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Drops any reference to `id`. Called by the action layer when the
    /// task is deleted.
    pub fn forget(&mut self, id: TaskId) {
        if self.selected_task_id == Some(id) {
            self.selected_task_id = None;
        }
        if self.expanded_task_id == Some(id) {
            self.expanded_task_id = None;
        }
    }
}
