//! Layered settings: base file, environment-named file, process environment.
//!
//! Keys are case-insensitive and hierarchical, joined with `:`
//! (`ConnectionStrings:ConexaoPadrao`). Environment variables use `__` as the
//! separator (`ConnectionStrings__ConexaoPadrao`). Later layers override
//! earlier ones for the same key.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use config::builder::DefaultState;
use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map, Source, Value,
    ValueKind,
};
use tracing::debug;

use crate::error::DbInfraError;

/// Environment variable selecting the active environment name.
pub const ENVIRONMENT_VAR: &str = "ORGANIZADOR_ENVIRONMENT";
/// Environment name used when [`ENVIRONMENT_VAR`] is unset or blank.
pub const DEFAULT_ENVIRONMENT: &str = "Development";
pub const BASE_SETTINGS_FILE: &str = "appsettings.json";

const ENV_SEPARATOR: &str = "__";

/// Resolve the environment name from the given variables.
pub fn environment_name(env_vars: &HashMap<String, String>) -> String {
    env_vars
        .get(ENVIRONMENT_VAR)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_ENVIRONMENT)
        .to_string()
}

/// File name of the environment-specific settings layer.
pub fn environment_settings_file(environment: &str) -> String {
    format!("appsettings.{environment}.json")
}

/// Wraps a source so every table key it yields is lowercase.
#[derive(Debug, Clone)]
struct CaseFolded<S>(S);

impl<S> Source for CaseFolded<S>
where
    S: Source + Clone + Send + Sync + 'static,
{
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        Ok(fold_table(self.0.collect()?))
    }
}

fn fold_table(table: Map<String, Value>) -> Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), fold_value(value)))
        .collect()
}

fn fold_value(mut value: Value) -> Value {
    value.kind = match value.kind {
        ValueKind::Table(table) => ValueKind::Table(fold_table(table)),
        ValueKind::Array(items) => ValueKind::Array(items.into_iter().map(fold_value).collect()),
        other => other,
    };
    value
}

/// Optional JSON file: a missing file is skipped, a malformed one fails the build.
fn settings_file(path: &Path) -> CaseFolded<File<config::FileSourceFile, FileFormat>> {
    CaseFolded(File::from(path).format(FileFormat::Json).required(false))
}

/// Env var layer over an explicit snapshot. `:` in names is accepted like `__`.
fn environment_source(env_vars: &HashMap<String, String>) -> CaseFolded<Environment> {
    let vars: Map<String, String> = env_vars
        .iter()
        .map(|(key, value)| (key.replace(':', ENV_SEPARATOR), value.clone()))
        .collect();
    CaseFolded(
        Environment::default()
            .separator(ENV_SEPARATOR)
            .source(Some(vars)),
    )
}

/// `ConnectionStrings:ConexaoPadrao` -> `connectionstrings.conexaopadrao`,
/// `Hosts:1` -> `hosts[1]`.
fn key_path(key: &str) -> String {
    let mut path = String::new();
    for segment in key.split(':').map(|s| s.trim().to_lowercase()) {
        if !path.is_empty() && segment.parse::<usize>().is_ok() {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }
    path
}

/// All configuration layers for one process, merged in override order.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayers {
    pub environment_name: String,
    settings: Config,
}

impl ConfigLayers {
    /// Read `appsettings.json` and `appsettings.{Environment}.json` from
    /// `base_dir`, then put `env_vars` on top.
    ///
    /// Missing files are skipped. A file that exists but does not parse, or
    /// whose root is not an object, is an error.
    pub fn load(base_dir: &Path, env_vars: &HashMap<String, String>) -> Result<Self, DbInfraError> {
        let environment_name = environment_name(env_vars);
        let base = base_dir.join(BASE_SETTINGS_FILE);
        let environment = base_dir.join(environment_settings_file(&environment_name));

        debug!(
            environment = %environment_name,
            base_dir = %base_dir.display(),
            base_layer = base.is_file(),
            environment_layer = environment.is_file(),
            "loading settings layers"
        );

        let builder = Config::builder()
            .add_source(settings_file(&base))
            .add_source(settings_file(&environment));
        Self::build(environment_name, builder, env_vars)
    }

    /// [`ConfigLayers::load`] with the current process environment.
    pub fn from_process_env(base_dir: &Path) -> Result<Self, DbInfraError> {
        Self::load(base_dir, &process_env_vars())
    }

    /// Layers from an inline JSON document plus env vars, without touching the filesystem.
    pub fn from_json(json: &str, env_vars: &HashMap<String, String>) -> Result<Self, DbInfraError> {
        let builder =
            Config::builder().add_source(CaseFolded(File::from_str(json, FileFormat::Json)));
        Self::build(environment_name(env_vars), builder, env_vars)
    }

    /// Env vars only.
    pub fn from_env_vars(env_vars: &HashMap<String, String>) -> Result<Self, DbInfraError> {
        Self::build(environment_name(env_vars), Config::builder(), env_vars)
    }

    fn build(
        environment_name: String,
        builder: ConfigBuilder<DefaultState>,
        env_vars: &HashMap<String, String>,
    ) -> Result<Self, DbInfraError> {
        let settings = builder
            .add_source(environment_source(env_vars))
            .build()
            .map_err(|e| DbInfraError::config(format!("failed to load settings: {e}")))?;

        Ok(Self {
            environment_name,
            settings,
        })
    }

    /// Look a key up. Scalars come back as text, `null` as the empty string,
    /// sections and arrays as `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self.settings.get::<Value>(&key_path(key)).ok()?;
        match value.kind {
            ValueKind::Nil => Some(String::new()),
            ValueKind::Table(_) | ValueKind::Array(_) => None,
            _ => value.into_string().ok(),
        }
    }

    pub fn connection_string(&self, name: &str) -> Option<String> {
        self.get(&format!("ConnectionStrings:{name}"))
    }

    /// Parse a value when present. Blank values count as absent.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, DbInfraError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<T>()
            .map(Some)
            .map_err(|e| DbInfraError::config(format!("invalid value for '{key}': {e}")))
    }
}

/// Snapshot of the process environment, skipping non-UTF-8 entries.
pub fn process_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn environment_defaults_to_development() {
        assert_eq!(environment_name(&HashMap::new()), "Development");
        assert_eq!(
            environment_name(&vars(&[(ENVIRONMENT_VAR, "  ")])),
            "Development"
        );
        assert_eq!(
            environment_name(&vars(&[(ENVIRONMENT_VAR, "Production")])),
            "Production"
        );
    }

    #[test]
    fn key_paths_use_dots_and_indexes() {
        assert_eq!(
            key_path("ConnectionStrings:ConexaoPadrao"),
            "connectionstrings.conexaopadrao"
        );
        assert_eq!(key_path("Hosts:1"), "hosts[1]");
        assert_eq!(key_path("Server"), "server");
    }

    #[test]
    fn json_keys_are_case_insensitive_and_scalars_read_as_text() {
        let layers = ConfigLayers::from_json(
            r#"{
                "ConnectionStrings": { "ConexaoPadrao": "Data Source=a.db" },
                "Server": { "Port": 9000, "Tls": false },
                "Hosts": ["a", "b"],
                "Empty": null
            }"#,
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(
            layers.get("connectionstrings:conexaopadrao").as_deref(),
            Some("Data Source=a.db")
        );
        assert_eq!(layers.get("Server:Port").as_deref(), Some("9000"));
        assert_eq!(layers.get("server:tls").as_deref(), Some("false"));
        assert_eq!(layers.get("Hosts:0").as_deref(), Some("a"));
        assert_eq!(layers.get("Hosts:1").as_deref(), Some("b"));
        assert_eq!(layers.get("Hosts:2"), None);
        assert_eq!(layers.get("Empty").as_deref(), Some(""));
        // sections are not values
        assert_eq!(layers.get("Server"), None);
        assert_eq!(layers.get("Hosts"), None);
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = ConfigLayers::from_json("[1, 2]", &HashMap::new()).unwrap_err();
        assert!(matches!(err, DbInfraError::Config { .. }));
    }

    #[test]
    fn env_vars_use_double_underscore_separator() {
        let layers = ConfigLayers::from_env_vars(&vars(&[(
            "ConnectionStrings__ConexaoPadrao",
            "Server=db",
        )]))
        .unwrap();
        assert_eq!(
            layers.connection_string("ConexaoPadrao").as_deref(),
            Some("Server=db")
        );

        let layers =
            ConfigLayers::from_env_vars(&vars(&[("Database:PoolMax", "3")])).unwrap();
        assert_eq!(layers.get("database:poolmax").as_deref(), Some("3"));
    }

    #[test]
    fn env_vars_override_json_regardless_of_key_case() {
        let layers = ConfigLayers::from_json(
            r#"{"ConnectionStrings":{"ConexaoPadrao":"Data Source=a.db"},"Server":{"Port":1}}"#,
            &vars(&[("CONNECTIONSTRINGS__CONEXAOPADRAO", "Server=override")]),
        )
        .unwrap();
        assert_eq!(
            layers.connection_string("ConexaoPadrao").as_deref(),
            Some("Server=override")
        );
        assert_eq!(layers.get("Server:Port").as_deref(), Some("1"));
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("appsettings.json"),
            r#"{"A":"base","B":"base","C":"base"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("appsettings.Development.json"),
            r#"{"b":"environment","C":"environment"}"#,
        )
        .unwrap();

        let layers = ConfigLayers::load(dir.path(), &vars(&[("c", "env")])).unwrap();
        assert_eq!(layers.get("a").as_deref(), Some("base"));
        assert_eq!(layers.get("B").as_deref(), Some("environment"));
        assert_eq!(layers.get("C").as_deref(), Some("env"));
        assert_eq!(layers.get("d"), None);
    }

    #[test]
    fn load_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let layers = ConfigLayers::load(dir.path(), &HashMap::new()).unwrap();
        assert_eq!(layers.environment_name, "Development");
        assert_eq!(layers.connection_string("ConexaoPadrao"), None);
    }

    #[test]
    fn load_reads_environment_file_named_after_environment() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("appsettings.json"),
            r#"{"ConnectionStrings":{"ConexaoPadrao":"Data Source=base.db"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("appsettings.Staging.json"),
            r#"{"ConnectionStrings":{"ConexaoPadrao":"Server=staging"}}"#,
        )
        .unwrap();

        let layers =
            ConfigLayers::load(dir.path(), &vars(&[(ENVIRONMENT_VAR, "Staging")])).unwrap();
        assert_eq!(
            layers.connection_string("ConexaoPadrao").as_deref(),
            Some("Server=staging")
        );

        // Development has no file of its own, so the base value shows through
        let layers = ConfigLayers::load(dir.path(), &HashMap::new()).unwrap();
        assert_eq!(
            layers.connection_string("ConexaoPadrao").as_deref(),
            Some("Data Source=base.db")
        );
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("appsettings.json"), "{ not json").unwrap();

        let err = ConfigLayers::load(dir.path(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, DbInfraError::Config { .. }));
        assert!(err.to_string().contains("appsettings.json"));
    }

    #[test]
    fn get_parsed_reports_bad_values() {
        let layers = ConfigLayers::from_env_vars(&vars(&[
            ("Server__Port", "eighty"),
            ("Database__PoolMax", " "),
        ]))
        .unwrap();

        assert!(layers.get_parsed::<u16>("Server:Port").is_err());
        assert_eq!(layers.get_parsed::<u32>("Database:PoolMax").unwrap(), None);
        assert_eq!(layers.get_parsed::<u32>("Database:Missing").unwrap(), None);
    }
}
