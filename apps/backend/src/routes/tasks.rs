//! Task HTTP routes.

use actix_web::error::QueryPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::db::require_db;
use crate::entities::TaskStatus;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{TaskId, ValidatedJson};
use crate::repos::tasks::{Task, TaskFilter};
use crate::services::tasks::{self as task_service, TaskDraft};
use crate::state::app_state::AppState;

/// Body of `POST` and `PUT`.
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: TaskStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub title: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub status: Option<TaskStatus>,
}

impl From<TaskRequest> for TaskDraft {
    fn from(req: TaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            date: req.date,
            status: req.status,
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            date: task.date,
            status: task.status,
        }
    }
}

impl ListQuery {
    fn into_filter(self) -> Result<TaskFilter, AppError> {
        let date = self.date.as_deref().map(parse_day).transpose()?;
        Ok(TaskFilter {
            title: self.title.filter(|t| !t.trim().is_empty()),
            date,
            status: self.status,
        })
    }
}

fn parse_day(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidDate,
            format!("Invalid date '{raw}', expected YYYY-MM-DD"),
        )
    })
}

/// Query-string failures (e.g. an unknown status) as Problem Details.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Invalid query string: {err}")).into()
    })
}

/// GET /api/tasks
async fn list_tasks(
    query: web::Query<ListQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    let db = require_db(&app_state)?;

    let tasks = task_service::list(db, &filter).await?;
    let body: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/tasks/{task_id}
async fn get_task(
    task_id: TaskId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let task = task_service::get(db, task_id.0).await?;
    Ok(HttpResponse::Ok().json(TaskResponse::from(task)))
}

/// POST /api/tasks
async fn create_task(
    body: ValidatedJson<TaskRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let task = task_service::create(db, body.into_inner().into()).await?;
    Ok(HttpResponse::Created()
        .insert_header(("location", format!("/api/tasks/{}", task.id)))
        .json(TaskResponse::from(task)))
}

/// PUT /api/tasks/{task_id}
async fn update_task(
    task_id: TaskId,
    body: ValidatedJson<TaskRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let task = task_service::update(db, task_id.0, body.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(TaskResponse::from(task)))
}

/// DELETE /api/tasks/{task_id}
async fn delete_task(
    task_id: TaskId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    task_service::delete(db, task_id.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_tasks))
            .route(web::post().to(create_task)),
    );
    cfg.service(
        web::resource("/{task_id}")
            .route(web::get().to(get_task))
            .route(web::put().to(update_task))
            .route(web::delete().to(delete_task)),
    );
}
