//! Task and sub-task entities.
//!
//! A task owns its sub-tasks exclusively; `category_id` and `parent_id` are
//! non-owning back-references used for lookup and for routing persistence
//! upward. Sub-task depth is capped at one level.

use crate::error::{Error, Result};
use crate::id::{self, IdKind};
use crate::order::reconcile_by_ids;
use crate::types::TaskRecord;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub category_id: String,
    pub parent_id: Option<String>,
    pub sub_tasks: Vec<Task>,
}

impl Task {
    pub fn new(text: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            id: id::new_id(IdKind::Task),
            text: text.into(),
            category_id: category_id.into(),
            parent_id: None,
            sub_tasks: Vec::new(),
        }
    }

    pub fn is_sub_task(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Append a new sub-task and return its id. Sub-tasks cannot have their
    /// own sub-tasks.
    pub fn add_sub_task(&mut self, text: &str) -> Result<String> {
        if self.is_sub_task() {
            return Err(Error::invalid_operation(
                "sub-tasks cannot have their own sub-tasks",
            ));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_operation("sub-task text cannot be empty"));
        }

        let mut sub_task = Task::new(text, self.category_id.clone());
        sub_task.parent_id = Some(self.id.clone());
        let sub_task_id = sub_task.id.clone();
        self.sub_tasks.push(sub_task);
        Ok(sub_task_id)
    }

    /// Edit the task text. Surrounding whitespace is trimmed; empty text is
    /// accepted as-is.
    pub fn rename(&mut self, text: &str) {
        self.text = text.trim().to_string();
    }

    /// Re-derive the sub-task order from a reported id list. Stale ids are
    /// ignored.
    pub fn reorder_sub_tasks(&mut self, reported: &[String]) {
        reconcile_by_ids(&mut self.sub_tasks, reported, |task| task.id.as_str());
    }

    pub fn sub_task(&self, sub_task_id: &str) -> Option<&Task> {
        self.sub_tasks.iter().find(|task| task.id == sub_task_id)
    }

    pub fn sub_task_mut(&mut self, sub_task_id: &str) -> Option<&mut Task> {
        self.sub_tasks
            .iter_mut()
            .find(|task| task.id == sub_task_id)
    }

    /// Detach a sub-task without destroying it.
    pub fn remove_sub_task(&mut self, sub_task_id: &str) -> Option<Task> {
        let position = self
            .sub_tasks
            .iter()
            .position(|task| task.id == sub_task_id)?;
        Some(self.sub_tasks.remove(position))
    }

    /// Point this task (and every sub-task) at a new owning category.
    pub fn set_category(&mut self, category_id: &str) {
        self.category_id = category_id.to_string();
        for sub_task in &mut self.sub_tasks {
            sub_task.category_id = category_id.to_string();
        }
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            sub_tasks: self.sub_tasks.iter().map(Task::to_record).collect(),
        }
    }

    /// Rebuild a task tree from its record, preserving ids. Anything nested
    /// below the first sub-task level is dropped.
    pub fn from_record(record: &TaskRecord, category_id: &str) -> Self {
        let sub_tasks = record
            .sub_tasks
            .iter()
            .map(|sub_record| Task {
                id: sub_record.id.clone(),
                text: sub_record.text.clone(),
                category_id: category_id.to_string(),
                parent_id: Some(record.id.clone()),
                sub_tasks: Vec::new(),
            })
            .collect();

        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            category_id: category_id.to_string(),
            parent_id: None,
            sub_tasks,
        }
    }
}
