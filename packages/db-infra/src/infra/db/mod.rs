pub mod bootstrap;
pub mod core;

pub use bootstrap::{bootstrap_schema, BootstrapOutcome, BootstrapPolicy, ModelSchema};
pub use core::{build_admin_pool, connect, orchestrate_migration, sanitize_db_url};
