//! Board: a named, ordered container of categories.
//!
//! Boards created without category data are seeded with the three default
//! columns. The board also carries the id index used by cross-category
//! moves: [`Board::task_by_id`] covers top-level tasks and one level of
//! sub-tasks.

use crate::category::{Category, INBOX_NAME};
use crate::error::{Error, Result};
use crate::order::reconcile_by_ids;
use crate::task::Task;
use crate::types::BoardRecord;

pub const DEFAULT_CATEGORIES: [&str; 3] = ["To Do", "In Progress", "Done"];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub color_index: usize,
    pub categories: Vec<Category>,
}

impl Board {
    /// Construct a board with the default categories seeded.
    pub fn new(id: impl Into<String>, name: impl Into<String>, color_index: usize) -> Self {
        let id = id.into();
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|name| Category::new(id.clone(), *name))
            .collect();

        Self {
            id,
            name: name.into(),
            color_index,
            categories,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    /// Append a new category. A second inbox is rejected; callers surface
    /// that as a warning rather than a hard failure.
    pub fn add_category(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_operation("category name cannot be empty"));
        }
        if name.eq_ignore_ascii_case(INBOX_NAME) {
            return Err(Error::invalid_operation(format!(
                "a category named \"{INBOX_NAME}\" already exists"
            )));
        }

        let category = Category::new(self.id.clone(), name);
        let category_id = category.id.clone();
        self.categories.push(category);
        Ok(category_id)
    }

    /// Detach a category and everything in it. The inbox category cannot be
    /// deleted.
    pub fn remove_category(&mut self, category_id: &str) -> Result<Category> {
        let position = self
            .categories
            .iter()
            .position(|category| category.id == category_id)
            .ok_or_else(|| Error::not_found("category", category_id))?;

        if self.categories[position].is_inbox() {
            return Err(Error::invalid_operation(format!(
                "the \"{INBOX_NAME}\" category cannot be deleted"
            )));
        }

        Ok(self.categories.remove(position))
    }

    /// Re-derive the category order from a reported id list.
    pub fn reorder_categories(&mut self, reported: &[String]) {
        reconcile_by_ids(&mut self.categories, reported, |category| {
            category.id.as_str()
        });
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.id == category_id)
    }

    pub fn category_mut(&mut self, category_id: &str) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.id == category_id)
    }

    pub fn inbox(&self) -> Option<&Category> {
        self.categories.iter().find(|category| category.is_inbox())
    }

    pub fn inbox_mut(&mut self) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.is_inbox())
    }

    /// Find a task by id, searching every category's top-level tasks and
    /// their sub-tasks one level deep. This is the hot path of every
    /// cross-category move.
    pub fn task_by_id(&self, task_id: &str) -> Option<&Task> {
        for category in &self.categories {
            for task in &category.tasks {
                if task.id == task_id {
                    return Some(task);
                }
                if let Some(sub_task) = task.sub_task(task_id) {
                    return Some(sub_task);
                }
            }
        }
        None
    }

    pub fn task_by_id_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        for category in &mut self.categories {
            for task in &mut category.tasks {
                if task.id == task_id {
                    return Some(task);
                }
                if task.sub_task(task_id).is_some() {
                    return task.sub_task_mut(task_id);
                }
            }
        }
        None
    }

    /// Reverse lookup: the category whose top-level list contains the task.
    pub fn category_by_task(&self, task_id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.tasks.iter().any(|task| task.id == task_id))
    }

    pub fn to_record(&self) -> BoardRecord {
        BoardRecord {
            id: self.id.clone(),
            board_name: self.name.clone(),
            board_color_index: Some(self.color_index),
            categories: self
                .categories
                .iter()
                .map(Category::to_record)
                .collect(),
        }
    }

    /// Replace the in-memory categories wholesale from a record, preserving
    /// ids. The color index is resolved by the collection when the board is
    /// created, not here.
    pub fn load_record(&mut self, record: &BoardRecord) {
        self.name = record.board_name.clone();
        self.categories = record
            .categories
            .iter()
            .map(|category_record| Category::from_record(category_record, &self.id))
            .collect();
    }
}
