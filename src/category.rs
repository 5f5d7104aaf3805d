//! Category: a named, ordered column of tasks within a board.
//!
//! One category per board carries the reserved inbox name "To Do"
//! (case-insensitive). It cannot be renamed or deleted, and it is the only
//! category that accepts direct task creation; other categories receive
//! tasks through cross-category moves.

use crate::error::{Error, Result};
use crate::id::{self, IdKind};
use crate::order::reconcile_by_ids;
use crate::task::Task;
use crate::types::CategoryRecord;

/// Reserved inbox category name, compared case-insensitively.
pub const INBOX_NAME: &str = "To Do";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub board_id: String,
    pub tasks: Vec<Task>,
}

impl Category {
    pub fn new(board_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id::new_id(IdKind::Category),
            name: name.into(),
            board_id: board_id.into(),
            tasks: Vec::new(),
        }
    }

    pub fn is_inbox(&self) -> bool {
        self.name.eq_ignore_ascii_case(INBOX_NAME)
    }

    /// Create a task at the end of this category. Only the inbox category
    /// accepts direct creation.
    pub fn add_task(&mut self, text: &str) -> Result<String> {
        if !self.is_inbox() {
            return Err(Error::invalid_operation(format!(
                "new tasks can only be added to the \"{INBOX_NAME}\" category"
            )));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_operation("task text cannot be empty"));
        }

        let task = Task::new(text, self.id.clone());
        let task_id = task.id.clone();
        self.tasks.push(task);
        Ok(task_id)
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        if self.is_inbox() {
            return Err(Error::invalid_operation(format!(
                "the \"{INBOX_NAME}\" category cannot be renamed"
            )));
        }

        let name = name.trim();
        if name.eq_ignore_ascii_case(INBOX_NAME) {
            return Err(Error::invalid_operation(format!(
                "a category named \"{INBOX_NAME}\" already exists"
            )));
        }

        self.name = name.to_string();
        Ok(())
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    /// Detach a top-level task without destroying it. One half of the
    /// cross-category move protocol.
    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id == task_id)?;
        Some(self.tasks.remove(position))
    }

    /// Attach an already-constructed task at `index` (clamped to the list
    /// length), reassigning its category. The other half of the move
    /// protocol.
    pub fn insert_task(&mut self, mut task: Task, index: usize) {
        task.set_category(&self.id);
        let index = index.min(self.tasks.len());
        self.tasks.insert(index, task);
    }

    /// Re-derive the top-level task order from a reported id list. Ids that
    /// do not name a current top-level task (stale entries, sub-task ids)
    /// are ignored.
    pub fn reorder_tasks(&mut self, reported: &[String]) {
        reconcile_by_ids(&mut self.tasks, reported, |task| task.id.as_str());
    }

    pub fn to_record(&self) -> CategoryRecord {
        CategoryRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            tasks: self.tasks.iter().map(Task::to_record).collect(),
        }
    }

    /// Rebuild a category from its record, preserving ids.
    pub fn from_record(record: &CategoryRecord, board_id: &str) -> Self {
        let tasks = record
            .tasks
            .iter()
            .map(|task_record| Task::from_record(task_record, &record.id))
            .collect();

        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            board_id: board_id.to_string(),
            tasks,
        }
    }
}
