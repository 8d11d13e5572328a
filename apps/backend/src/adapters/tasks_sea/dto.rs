//! DTOs for the tasks_sea adapter.

use time::OffsetDateTime;

use crate::entities::TaskStatus;

/// Column values for inserting or replacing a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub status: TaskStatus,
}

/// Filters pushed down to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    /// Case-insensitive substring match on the title; `%` and `_` match literally.
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    /// Inclusive lower bound on `date`.
    pub date_from: Option<OffsetDateTime>,
    /// Exclusive upper bound on `date`.
    pub date_until: Option<OffsetDateTime>,
}
