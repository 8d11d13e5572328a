use db_infra::{BootstrapOutcome, ResolvedConnection};
use sea_orm::DatabaseConnection;

/// Shared application state handed to every worker via `web::Data`.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// `None` when no connection could be built and startup was lenient.
    db: Option<DatabaseConnection>,
    /// The connection the process resolved at startup.
    connection: Option<ResolvedConnection>,
    /// Result of the startup schema bootstrap, when it succeeded.
    bootstrap: Option<BootstrapOutcome>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Some(db),
            ..Self::default()
        }
    }

    pub fn without_db() -> Self {
        Self::default()
    }

    pub fn with_connection(mut self, connection: ResolvedConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn with_bootstrap(mut self, outcome: Option<BootstrapOutcome>) -> Self {
        self.bootstrap = outcome;
        self
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn connection(&self) -> Option<&ResolvedConnection> {
        self.connection.as_ref()
    }

    pub fn bootstrap(&self) -> Option<BootstrapOutcome> {
        self.bootstrap
    }
}
