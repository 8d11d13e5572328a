use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, SqlxPostgresConnector,
    SqlxSqliteConnector, Statement,
};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, trace, warn};

use crate::config::db::{
    build_session_statements, ConnectionSettings, DbSettings, Driver, PoolPurpose,
    ResolvedConnection, SqliteMode, SqliteTarget,
};
use crate::error::DbInfraError;

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| DbInfraError::connect("no error recorded after max attempts")))
}

async fn apply_sqlite_config(
    conn: &mut sqlx::SqliteConnection,
    settings: &DbSettings,
) -> Result<(), sqlx::Error> {
    for stmt in build_session_statements(settings) {
        sqlx::query(&stmt).execute(&mut *conn).await?;
    }
    Ok(())
}

async fn apply_postgres_config(
    conn: &mut sqlx::PgConnection,
    settings: &DbSettings,
) -> Result<(), sqlx::Error> {
    for stmt in build_session_statements(settings) {
        sqlx::query(&stmt).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Open the runtime pool for the resolved connection.
///
/// SQLite pools connect eagerly and create the file if it is missing. Postgres
/// pools connect lazily: an unreachable server surfaces on first use, not here.
pub async fn connect(
    resolved: &ResolvedConnection,
    settings: &ConnectionSettings,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = resolved.database_url()?;

    let db = match resolved.driver {
        Driver::Sqlite => connect_sqlite(&resolved.sqlite_target()?, settings).await?,
        Driver::Postgres => {
            let pool = postgres_pool_options(settings).connect_lazy_with(postgres_options(&url)?);
            SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
        }
    };

    info!(
        "pool=create engine={} url={} min={} max={} acquire_timeout_ms={}",
        resolved.driver,
        sanitize_db_url(&url),
        settings.pool_min,
        settings.pool_max,
        settings.acquire_timeout_ms
    );
    Ok(db)
}

async fn connect_sqlite(
    target: &SqliteTarget,
    settings: &ConnectionSettings,
) -> Result<DatabaseConnection, DbInfraError> {
    let connect_opts = sqlite_options(target)?;

    // The in-memory database lives only as long as its connection, so keep exactly one alive
    let memory = matches!(target, SqliteTarget::Memory);
    let (pool_min, pool_max) = if memory {
        (1, 1)
    } else {
        (settings.pool_min, settings.pool_max)
    };

    let db_settings = settings.db_settings.clone();
    let mut options = SqlitePoolOptions::new()
        .min_connections(pool_min)
        .max_connections(pool_max)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .after_connect(move |conn, _meta| {
            let settings = db_settings.clone();
            Box::pin(async move {
                apply_sqlite_config(conn, &settings).await?;
                trace!("db=sqlite hook=after_connect ok");
                Ok::<_, sqlx::Error>(())
            })
        });
    if memory {
        options = options.idle_timeout(None).max_lifetime(None);
    }

    let pool = options
        .connect_with(connect_opts)
        .await
        .map_err(|e| DbInfraError::connect(format!("failed to open SQLite database: {e}")))?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// Options built from the parsed target; file paths never pass through URL decoding.
fn sqlite_options(target: &SqliteTarget) -> Result<SqliteConnectOptions, DbInfraError> {
    match target {
        SqliteTarget::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbInfraError::config(format!("invalid SQLite connection options: {e}"))),
        SqliteTarget::File { path, mode } => Ok(SqliteConnectOptions::new()
            .filename(path)
            .read_only(*mode == SqliteMode::ReadOnly)
            .create_if_missing(*mode == SqliteMode::ReadWriteCreate)),
    }
}

fn postgres_options(url: &str) -> Result<PgConnectOptions, DbInfraError> {
    PgConnectOptions::from_str(url)
        .map_err(|e| DbInfraError::config(format!("invalid Postgres connection options: {e}")))
}

fn postgres_pool_options(settings: &ConnectionSettings) -> PgPoolOptions {
    let db_settings = settings.db_settings.clone();
    PgPoolOptions::new()
        .min_connections(settings.pool_min)
        .max_connections(settings.pool_max)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(30))
        .after_connect(move |conn, _meta| {
            let settings = db_settings.clone();
            Box::pin(async move {
                apply_postgres_config(conn, &settings).await?;
                Ok::<_, sqlx::Error>(())
            })
        })
}

/// Single-connection pool for schema work from the design-time tool.
/// Postgres connects eagerly with retries so failures are reported up front.
pub async fn build_admin_pool(
    resolved: &ResolvedConnection,
) -> Result<DatabaseConnection, DbInfraError> {
    let settings = ConnectionSettings::for_driver(resolved.driver, PoolPurpose::Migration);

    match resolved.driver {
        Driver::Sqlite => connect_sqlite(&resolved.sqlite_target()?, &settings).await,
        Driver::Postgres => {
            let opts = postgres_options(&resolved.database_url()?)?;
            let pool = retry_connection(
                || {
                    let opts = opts.clone();
                    let pool_options = postgres_pool_options(&settings);
                    async move {
                        pool_options.connect_with(opts).await.map_err(|e| {
                            DbInfraError::connect(format!(
                                "failed to connect to Postgres (admin pool): {e}"
                            ))
                        })
                    }
                },
                5,
                500,
            )
            .await?;
            Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
        }
    }
}

/// Sanitize database URL by masking password in connection strings.
pub fn sanitize_db_url(url: &str) -> String {
    if url.contains('@') && url.contains(':') {
        let parts: Vec<&str> = url.split('@').collect();
        if parts.len() == 2 {
            let auth_part = parts[0];
            let host_part = parts[1];

            // "postgresql://user" has its only colon in the scheme: nothing to mask
            if let Some(colon_pos) = auth_part.rfind(':') {
                if !auth_part[colon_pos..].starts_with("://") {
                    let scheme_user = &auth_part[..colon_pos];
                    return format!("{scheme_user}:***@{host_part}");
                }
            }
        }
    }
    url.to_string()
}

/// Run a migration command from the design-time tool against the resolved connection.
pub async fn orchestrate_migration(
    resolved: &ResolvedConnection,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let url = resolved.database_url()?;
    info!(
        "migrate=start driver={} source={:?} url={}",
        resolved.driver,
        resolved.source,
        sanitize_db_url(&url)
    );

    if resolved.is_memory() {
        warn!("migrate target is an in-memory database; it is discarded when this command exits");
    }

    let pool = build_admin_pool(resolved).await?;

    if matches!(resolved.driver, Driver::Sqlite) && !resolved.is_memory() {
        setup_sqlite_file_prerequisites(&pool).await?;
    }

    migrate(&pool, command)
        .await
        .map_err(|e| DbInfraError::migration(format!("migration execution failed: {e}")))?;

    verify_applied_count(&pool, command).await?;

    info!("migrate=done");
    Ok(())
}

async fn verify_applied_count(
    pool: &DatabaseConnection,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let expected_count = Migrator::migrations().len();
    let applied_count = migration::count_applied_migrations(pool)
        .await
        .map_err(|e| DbInfraError::migration(format!("failed to count migrations: {e}")))?;
    info!(
        migrate = "counts",
        expected_count = expected_count,
        applied_count = applied_count
    );

    match command {
        MigrationCommand::Reset if applied_count != 0 => Err(DbInfraError::migration(format!(
            "reset should leave 0 migrations applied, but {applied_count} were found"
        ))),
        MigrationCommand::Up | MigrationCommand::Fresh | MigrationCommand::Refresh
            if applied_count != expected_count =>
        {
            Err(DbInfraError::migration(format!(
                "expected {expected_count} migrations, but {applied_count} were applied"
            )))
        }
        _ => Ok(()),
    }
}

async fn setup_sqlite_file_prerequisites(pool: &DatabaseConnection) -> Result<(), DbInfraError> {
    for pragma in ["PRAGMA journal_mode = WAL;", "PRAGMA synchronous = NORMAL;"] {
        pool.execute(Statement::from_string(DatabaseBackend::Sqlite, pragma))
            .await
            .map_err(|e| DbInfraError::migration(format!("failed to run '{pragma}': {e}")))?;
    }
    Ok(())
}
