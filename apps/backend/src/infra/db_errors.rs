//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repositories convert here and higher
//! layers map `DomainError` to `AppError`. Raw driver messages are logged,
//! never returned to clients.

use tracing::{error, warn};

use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::trace_ctx;

fn looks_like_timeout(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("timed out") || msg.contains("timeout") || msg.contains("database is locked")
}

/// Translate a `DbErr` into a `DomainError` with a client-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(
                NotFoundKind::Other("Record".into()),
                "Record not found",
            );
        }
        sea_orm::DbErr::ConnectionAcquire(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Database pool exhausted or unreachable");
            return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
        }
        sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if looks_like_timeout(&error_msg) {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
