//! Task repository functions (generic over ConnectionTrait).

use sea_orm::ConnectionTrait;
use time::{Date, OffsetDateTime, Time};

use crate::adapters::tasks_sea::{self as tasks_adapter, TaskFields, TaskQuery};
use crate::entities::{tasks, TaskStatus};
use crate::errors::domain::DomainError;

/// Task domain model
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub status: TaskStatus,
}

/// List filters. `date` matches tasks on the same UTC calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub title: Option<String>,
    pub date: Option<Date>,
    pub status: Option<TaskStatus>,
}

pub async fn list_tasks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &TaskFilter,
) -> Result<Vec<Task>, DomainError> {
    let (date_from, date_until) = match filter.date {
        Some(day) => {
            let (from, until) = utc_day_bounds(day);
            (Some(from), until)
        }
        None => (None, None),
    };
    let query = TaskQuery {
        title: filter.title.clone(),
        status: filter.status,
        date_from,
        date_until,
    };
    let rows = tasks_adapter::find_all(conn, &query).await?;

    Ok(rows.into_iter().map(Task::from).collect())
}

/// Half-open UTC range `[day 00:00Z, next day 00:00Z)`. No upper bound on the last representable day.
fn utc_day_bounds(day: Date) -> (OffsetDateTime, Option<OffsetDateTime>) {
    let start = |d: Date| d.with_time(Time::MIDNIGHT).assume_utc();
    (start(day), day.next_day().map(start))
}

pub async fn find_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Task>, DomainError> {
    let row = tasks_adapter::find_by_id(conn, id).await?;
    Ok(row.map(Task::from))
}

pub async fn require_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Task, DomainError> {
    find_task(conn, id)
        .await?
        .ok_or_else(|| DomainError::task_not_found(id))
}

pub async fn create_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    fields: TaskFields,
) -> Result<Task, DomainError> {
    let row = tasks_adapter::create(conn, fields).await?;
    Ok(Task::from(row))
}

pub async fn update_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    fields: TaskFields,
) -> Result<Task, DomainError> {
    tasks_adapter::update(conn, id, fields)
        .await?
        .map(Task::from)
        .ok_or_else(|| DomainError::task_not_found(id))
}

pub async fn delete_task<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<(), DomainError> {
    if tasks_adapter::delete(conn, id).await? {
        Ok(())
    } else {
        Err(DomainError::task_not_found(id))
    }
}

impl From<tasks::Model> for Task {
    fn from(model: tasks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            date: model.date,
            status: model.status,
        }
    }
}
