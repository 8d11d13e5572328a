use std::str::FromStr;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info,actix_web=info,sqlx=warn,sea_orm=warn";
/// Selects the log line format (`json` or `text`).
pub const LOG_FORMAT_VAR: &str = "ORGANIZADOR_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    #[default]
    Json,
    /// Human-readable lines for local runs.
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(format!("unknown log format '{other}' (expected json | text)")),
        }
    }
}

impl LogFormat {
    /// Read [`LOG_FORMAT_VAR`]; unset, blank or unknown values mean JSON.
    pub fn from_env_value(value: Option<&str>) -> Self {
        value
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

/// `RUST_LOG` when it parses, otherwise [`DEFAULT_LOG_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the process-wide subscriber. Fails if one is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).compact())
            .try_init(),
    }
}
