//! Error types for corkboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad arguments, unknown board/category/task)
//! - 3: Blocked by a structural rule (reserved category, sub-task nesting)
//! - 4: Operation failed (import parse, storage failure)

use thiserror::Error;

/// Exit codes for the corkboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const RULE_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for board operations
#[derive(Error, Debug)]
pub enum Error {
    /// A structural rule would be violated: nesting sub-tasks under a
    /// sub-task, renaming or deleting the reserved "To Do" category, or
    /// minting a second one.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A board, category, or task id named by the caller does not exist.
    /// Stale ids arriving through drag events never surface this; those
    /// degrade to no-ops.
    #[error("not found: {0}")]
    NotFound(String),

    /// Import document could not be parsed into board records. Raised
    /// before any existing state is touched.
    #[error("import failed: {0}")]
    Import(String),

    /// The underlying store rejected a read or write. Fatal for the
    /// triggering operation, not retried.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl Error {
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation(message.into())
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Error::NotFound(format!("{what} {id}"))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_) => exit_codes::USER_ERROR,
            Error::InvalidOperation(_) => exit_codes::RULE_BLOCKED,
            Error::Import(_) | Error::Persistence(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}
