//! Error codes returned by the organizer API.
//!
//! Every code that reaches an HTTP response is listed here; handlers never
//! pass ad-hoc strings. Codes are SCREAMING_SNAKE_CASE.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request validation
    /// Task payload failed validation
    ValidationError,
    /// Malformed request (body or query string)
    BadRequest,
    /// Task id path segment is not a positive integer
    InvalidTaskId,
    /// Date filter is not `YYYY-MM-DD`
    InvalidDate,

    // Resource not found
    TaskNotFound,
    NotFound,

    // Infrastructure
    DbError,
    DbUnavailable,
    DbTimeout,
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidTaskId => "INVALID_TASK_ID",
            Self::InvalidDate => "INVALID_DATE",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
