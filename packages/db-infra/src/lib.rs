//! Shared database configuration and migration infrastructure.
//! Used by the backend and the migration CLI.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db::{
    resolve_connection, select_driver, ConnectionSettings, ConnectionSource, Driver, PoolPurpose,
    ResolvedConnection, CONNECTION_STRING_NAME, DEFAULT_CONNECTION_STRING,
};
pub use config::settings::{
    environment_name, process_env_vars, ConfigLayers, ENVIRONMENT_VAR,
};
pub use error::DbInfraError;
pub use infra::db::bootstrap::{
    bootstrap_schema, BootstrapError, BootstrapOutcome, BootstrapPolicy, BootstrapStage,
    ModelSchema,
};
pub use infra::db::core::{build_admin_pool, connect, orchestrate_migration, sanitize_db_url};
