//! Task service: input validation and normalisation in front of the repository.

use sea_orm::ConnectionTrait;
use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, info};

use crate::adapters::tasks_sea::TaskFields;
use crate::entities::TaskStatus;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::tasks::{self as tasks_repo, Task, TaskFilter};

/// Client-supplied task content, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Reject blank titles, trim text, store the date in UTC at whole seconds.
    pub fn validate(self) -> Result<TaskFields, DomainError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Title must not be blank"));
        }

        // SQLite keeps timestamps as RFC 3339 text; one fixed width keeps range filters ordered
        let date = self.date.to_offset(UtcOffset::UTC);
        let date = date - Duration::nanoseconds(i64::from(date.nanosecond()));

        Ok(TaskFields {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            date,
            status: self.status,
        })
    }
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &TaskFilter,
) -> Result<Vec<Task>, AppError> {
    let tasks = tasks_repo::list_tasks(conn, filter).await?;
    debug!(count = tasks.len(), ?filter, "tasks listed");
    Ok(tasks)
}

pub async fn get<C: ConnectionTrait + Send + Sync>(conn: &C, id: i64) -> Result<Task, AppError> {
    Ok(tasks_repo::require_task(conn, id).await?)
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    draft: TaskDraft,
) -> Result<Task, AppError> {
    let fields = draft.validate()?;
    let task = tasks_repo::create_task(conn, fields).await?;
    info!(task_id = task.id, "task created");
    Ok(task)
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    draft: TaskDraft,
) -> Result<Task, AppError> {
    let fields = draft.validate()?;
    let task = tasks_repo::update_task(conn, id, fields).await?;
    info!(task_id = id, "task updated");
    Ok(task)
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(conn: &C, id: i64) -> Result<(), AppError> {
    tasks_repo::delete_task(conn, id).await?;
    info!(task_id = id, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: "  buy milk ".to_string(),
            date: datetime!(2025-03-01 22:30 -3),
            status: TaskStatus::Pending,
        }
    }

    #[test]
    fn blank_titles_are_rejected() {
        for title in ["", "   ", "\t\n"] {
            assert_eq!(
                draft(title).validate(),
                Err(DomainError::validation("Title must not be blank"))
            );
        }
    }

    #[test]
    fn text_is_trimmed_and_date_moved_to_utc() {
        let fields = draft("  Groceries ").validate().unwrap();
        assert_eq!(fields.title, "Groceries");
        assert_eq!(fields.description, "buy milk");
        assert_eq!(fields.date, datetime!(2025-03-02 01:30 UTC));
        assert_eq!(fields.date.offset(), UtcOffset::UTC);
    }

    #[test]
    fn sub_second_precision_is_dropped() {
        let mut d = draft("Standup");
        d.date = datetime!(2025-03-02 00:00:00.75 UTC);
        assert_eq!(d.validate().unwrap().date, datetime!(2025-03-02 00:00 UTC));
    }

    #[tokio::test]
    async fn service_calls_run_against_a_pooled_connection() {
        let state = crate::test_support::memory_state().await.unwrap();
        let conn = state.db().unwrap();

        let created = create(conn, draft("Groceries")).await.unwrap();
        assert_eq!(get(conn, created.id).await.unwrap(), created);

        let filter = TaskFilter {
            title: Some("GROC".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(list(conn, &filter).await.unwrap(), vec![created.clone()]);

        delete(conn, created.id).await.unwrap();
        let err = get(conn, created.id).await.unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::TaskNotFound);
    }
}
