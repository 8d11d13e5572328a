//! Service settings derived from the layered configuration.

use db_infra::{BootstrapPolicy, ConfigLayers};

use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bootstrap_policy: BootstrapPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bootstrap_policy: BootstrapPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Read `Server:Host`, `Server:Port` and `Database:BootstrapPolicy`.
    /// Absent keys take their defaults; present but invalid ones are errors.
    pub fn from_layers(layers: &ConfigLayers) -> Result<Self, AppError> {
        let defaults = Self::default();

        let host = layers
            .get("Server:Host")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);
        let port = layers
            .get_parsed::<u16>("Server:Port")?
            .unwrap_or(defaults.port);
        let bootstrap_policy = layers
            .get_parsed::<BootstrapPolicy>("Database:BootstrapPolicy")?
            .unwrap_or(defaults.bootstrap_policy);

        Ok(Self {
            host,
            port,
            bootstrap_policy,
        })
    }
}
