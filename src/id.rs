//! Identifier generation for boards, categories, and tasks.
//!
//! Ids are opaque strings of the form `{kind}-{millis}-{random}`; callers
//! only rely on them being unique for the lifetime of the data, never on
//! their contents.

use chrono::Utc;
use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 12;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IdKind {
    Board,
    Category,
    Task,
}

impl IdKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IdKind::Board => "board",
            IdKind::Category => "category",
            IdKind::Task => "task",
        }
    }
}

/// Produce a fresh identifier. Sub-tasks share the `task` kind with their
/// parents.
pub fn new_id(kind: IdKind) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", kind.as_str(), millis, &random[..RANDOM_SUFFIX_LEN])
}
