//! Serialized record types.
//!
//! These structs are the single wire shape: the sqlite store persists them,
//! and export/import reads and writes a JSON array of [`BoardRecord`]s.
//! Board and category back-references are deliberately absent; they are
//! re-derived from nesting when a record is loaded into the model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BoardRecord {
    pub id: String,
    #[serde(rename = "boardName")]
    pub board_name: String,
    #[serde(
        rename = "boardColorIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub board_color_index: Option<usize>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// `subTasks` may nest arbitrarily deep in a hand-edited document; parsing
/// accepts that, and the model keeps only the first level when loading.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TaskRecord {
    pub id: String,
    pub text: String,
    #[serde(rename = "subTasks", default)]
    pub sub_tasks: Vec<TaskRecord>,
}
