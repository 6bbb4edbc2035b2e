//! Error types and exit codes for feedsim
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (including a failed user run)
//! - 2: Usage error (bad flags/args, invalid configuration)
//! - 3: Data/store error (missing database, unknown entry, invalid document)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data/store error (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<rusqlite::Error> for FeedsimError {
    fn from(err: rusqlite::Error) -> Self {
        FeedsimError::Other(err.to_string())
    }
}

/// Errors that can occur during feedsim operations
#[derive(Error, Debug)]
pub enum FeedsimError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data/store errors (exit code 3)
    #[error("database not found at {path:?} (run `feedsim init` first)")]
    DatabaseNotFound { path: PathBuf },

    #[error("entry not found: {id}")]
    EntryNotFound { id: i64 },

    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("task {task_id} exceeded its {timeout_ms}ms deadline")]
    TaskTimeout { task_id: usize, timeout_ms: u64 },

    #[error("worker pool is {state}, cannot accept tasks")]
    PoolClosed { state: String },

    #[error("similarity pass failed for user {user_id}: {reason}")]
    UserRunFailed { user_id: i64, reason: String },

    #[error("{0}")]
    Other(String),

    #[error("Similarity pass interrupted. Run `feedsim calc-similarity` again to resume.")]
    Interrupted,
}

impl FeedsimError {
    /// Create an error for a failed database operation
    pub fn db_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        FeedsimError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed field extraction from database row
    pub fn field_extraction(field: &str, error: impl std::fmt::Display) -> Self {
        FeedsimError::FailedOperation {
            operation: format!("get {}", field),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        FeedsimError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        FeedsimError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            FeedsimError::UsageError(_)
            | FeedsimError::InvalidValue { .. } => ExitCode::Usage,

            FeedsimError::DatabaseNotFound { .. }
            | FeedsimError::EntryNotFound { .. }
            | FeedsimError::InvalidDocument { .. } => ExitCode::Data,

            FeedsimError::Io(_)
            | FeedsimError::Json(_)
            | FeedsimError::Toml(_)
            | FeedsimError::FailedOperation { .. }
            | FeedsimError::FailedOperationWithTarget { .. }
            | FeedsimError::TaskTimeout { .. }
            | FeedsimError::PoolClosed { .. }
            | FeedsimError::UserRunFailed { .. }
            | FeedsimError::Other(_)
            | FeedsimError::Interrupted => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            FeedsimError::UsageError(_) => "usage_error",
            FeedsimError::InvalidValue { .. } => "invalid_value",
            FeedsimError::DatabaseNotFound { .. } => "database_not_found",
            FeedsimError::EntryNotFound { .. } => "entry_not_found",
            FeedsimError::InvalidDocument { .. } => "invalid_document",
            FeedsimError::Io(_) => "io_error",
            FeedsimError::Json(_) => "json_error",
            FeedsimError::Toml(_) => "toml_error",
            FeedsimError::FailedOperation { .. } => "failed_operation",
            FeedsimError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            FeedsimError::TaskTimeout { .. } => "task_timeout",
            FeedsimError::PoolClosed { .. } => "pool_closed",
            FeedsimError::UserRunFailed { .. } => "user_run_failed",
            FeedsimError::Other(_) => "other",
            FeedsimError::Interrupted => "interrupted",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for feedsim operations
pub type Result<T> = std::result::Result<T, FeedsimError>;
