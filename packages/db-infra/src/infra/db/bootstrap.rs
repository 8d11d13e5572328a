//! Startup schema bootstrap.
//!
//! Prefers versioned migrations; when none are registered the schema is
//! created straight from the entity model. Failures come back as values so
//! the caller decides whether startup continues.

use std::fmt;
use std::str::FromStr;

use migration::MigratorTrait;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use thiserror::Error;
use tracing::{info, warn};

/// Entity model used when there are no migrations to apply.
pub trait ModelSchema {
    fn create_tables(schema: &Schema) -> Vec<TableCreateStatement>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Migrations ran; `applied` is 0 when the schema was already current.
    Migrated { applied: usize },
    /// No migrations registered; tables were created if missing.
    Created { tables: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Inspect,
    Migrate,
    Create,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BootstrapStage::Inspect => "inspect",
            BootstrapStage::Migrate => "migrate",
            BootstrapStage::Create => "create",
        })
    }
}

#[derive(Debug, Error)]
#[error("schema bootstrap failed during {stage}: {source}")]
pub struct BootstrapError {
    pub stage: BootstrapStage,
    #[source]
    pub source: DbErr,
}

impl BootstrapError {
    fn at(stage: BootstrapStage) -> impl FnOnce(DbErr) -> Self {
        move |source| Self { stage, source }
    }
}

/// What startup does when the bootstrap fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapPolicy {
    /// Log the failure and keep booting.
    #[default]
    Lenient,
    /// Abort startup.
    Strict,
}

impl FromStr for BootstrapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown bootstrap policy '{other}' (expected lenient | strict)"
            )),
        }
    }
}

impl BootstrapPolicy {
    /// Apply the policy to a bootstrap result. `Ok(None)` means the failure was tolerated.
    pub fn enforce(
        self,
        result: Result<BootstrapOutcome, BootstrapError>,
    ) -> Result<Option<BootstrapOutcome>, BootstrapError> {
        match (self, result) {
            (_, Ok(outcome)) => Ok(Some(outcome)),
            (BootstrapPolicy::Lenient, Err(e)) => {
                warn!(
                    stage = %e.stage,
                    error = %e.source,
                    "bootstrap=failed policy=lenient continuing without a verified schema"
                );
                Ok(None)
            }
            (BootstrapPolicy::Strict, Err(e)) => Err(e),
        }
    }
}

/// Make sure the schema exists: apply pending migrations of `M`, or create
/// the tables of `S` when `M` has none. Safe to call repeatedly.
pub async fn bootstrap_schema<M, S>(
    conn: &DatabaseConnection,
) -> Result<BootstrapOutcome, BootstrapError>
where
    M: MigratorTrait,
    S: ModelSchema,
{
    let backend = conn.get_database_backend();
    info!("bootstrap=start backend={:?}", backend);

    let outcome = if M::migrations().is_empty() {
        let schema = Schema::new(backend);
        let statements = S::create_tables(&schema);
        let tables = statements.len();
        for mut stmt in statements {
            stmt.if_not_exists();
            conn.execute(backend.build(&stmt))
                .await
                .map_err(BootstrapError::at(BootstrapStage::Create))?;
        }
        BootstrapOutcome::Created { tables }
    } else {
        let pending = M::get_pending_migrations(conn)
            .await
            .map_err(BootstrapError::at(BootstrapStage::Inspect))?
            .len();
        if pending > 0 {
            M::up(conn, None)
                .await
                .map_err(BootstrapError::at(BootstrapStage::Migrate))?;
        }
        BootstrapOutcome::Migrated { applied: pending }
    };

    info!("bootstrap=ready outcome={:?}", outcome);
    Ok(outcome)
}
