use db_infra::{
    bootstrap_schema, connect, resolve_connection, BootstrapPolicy, ConfigLayers,
    ConnectionSettings, PoolPurpose, ResolvedConnection,
};
use migration::Migrator;
use tracing::{info, warn};

use crate::error::AppError;
use crate::infra::schema::EntitySchema;
use crate::state::app_state::AppState;

/// Builder for `AppState` (used by `main` and by tests).
///
/// Startup runs resolve, connect, bootstrap in that order. The bootstrap
/// policy decides whether a database failure stops the process or leaves
/// the service running without a verified schema.
#[derive(Default)]
pub struct StateBuilder {
    layers: Option<ConfigLayers>,
    connection: Option<ResolvedConnection>,
    policy: Option<BootstrapPolicy>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the connection and pool overrides from these layers.
    pub fn with_layers(mut self, layers: ConfigLayers) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Use this connection instead of resolving one from the layers.
    pub fn with_connection(mut self, connection: ResolvedConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn with_policy(mut self, policy: BootstrapPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let resolved = match (self.connection, &self.layers) {
            (Some(connection), _) => connection,
            (None, Some(layers)) => resolve_connection(layers),
            (None, None) => return Ok(AppState::without_db()),
        };
        let policy = match (self.policy, &self.layers) {
            (Some(policy), _) => policy,
            (None, Some(layers)) => layers
                .get_parsed::<BootstrapPolicy>("Database:BootstrapPolicy")?
                .unwrap_or_default(),
            (None, None) => BootstrapPolicy::default(),
        };

        let mut settings = ConnectionSettings::for_driver(resolved.driver, PoolPurpose::Runtime);
        if let Some(layers) = &self.layers {
            settings = settings.with_overrides(layers)?;
        }

        info!(
            driver = %resolved.driver,
            source = ?resolved.source,
            ?policy,
            "startup=resolve"
        );

        let conn = match connect(&resolved, &settings).await {
            Ok(conn) => conn,
            Err(e) if policy == BootstrapPolicy::Lenient => {
                warn!(
                    error = %e,
                    "startup=connect failed policy=lenient serving without a database"
                );
                return Ok(AppState::without_db().with_connection(resolved));
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = policy
            .enforce(bootstrap_schema::<Migrator, EntitySchema>(&conn).await)
            .map_err(|e| AppError::db_unavailable(e.to_string()))?;

        Ok(AppState::new(conn)
            .with_connection(resolved)
            .with_bootstrap(outcome))
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
