use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Positive task id taken from the `{task_id}` path segment.
///
/// Only the shape is checked here; handlers report unknown ids as 404.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(pub i64);

impl TaskId {
    fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = raw.ok_or_else(|| {
            AppError::bad_request(ErrorCode::InvalidTaskId, "Missing task_id parameter")
        })?;

        let id = raw.parse::<i64>().map_err(|_| {
            AppError::bad_request(ErrorCode::InvalidTaskId, format!("Invalid task id: {raw}"))
        })?;

        if id <= 0 {
            return Err(AppError::bad_request(
                ErrorCode::InvalidTaskId,
                format!("Task id must be positive, got: {id}"),
            ));
        }

        Ok(TaskId(id))
    }
}

impl FromRequest for TaskId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::parse(req.match_info().get("task_id")))
    }
}
