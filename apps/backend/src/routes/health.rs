use actix_web::{web, HttpResponse};
use migration::get_latest_migration_version;
use serde::Serialize;
use tracing::warn;

use crate::db::require_db;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct ReadinessResponse {
    database: &'static str,
    driver: Option<String>,
    migrations: String,
}

/// GET /health
///
/// Liveness only; answers while the database is down.
async fn live() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}

/// GET /health/ready
///
/// `200` once the database answers a ping, `503 DB_UNAVAILABLE` otherwise.
async fn ready(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;

    db.ping().await.map_err(|e| {
        warn!(error = %e, "readiness ping failed");
        AppError::db_unavailable("Database did not answer a ping")
    })?;

    let migrations = match get_latest_migration_version(db).await {
        Ok(Some(version)) => version,
        Ok(None) => "none".to_string(),
        Err(_) => "unknown".to_string(),
    };

    Ok(HttpResponse::Ok().json(ReadinessResponse {
        database: "ok",
        driver: app_state.connection().map(|c| c.driver.to_string()),
        migrations,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(live))
        .route("/ready", web::get().to(ready));
}
