//! Helpers shared by unit and integration tests.

pub mod app_builder;

pub use app_builder::{create_test_app_builder, TestAppBuilder};

use db_infra::ResolvedConnection;

use crate::error::AppError;
use crate::infra::state::build_state;
use crate::state::app_state::AppState;

/// State backed by a fresh, migrated in-memory SQLite database.
pub async fn memory_state() -> Result<AppState, AppError> {
    build_state()
        .with_connection(ResolvedConnection::from_connection_string(Some(
            "Data Source=:memory:",
        )))
        .build()
        .await
}
