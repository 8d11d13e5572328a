use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use db_infra::ConfigLayers;
use organizer_api::infra::state::build_state;
use organizer_api::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use organizer_api::{routes, telemetry, AppConfig};
use tracing::{error, info};

/// Directory holding `appsettings*.json`; defaults to the working directory.
const CONFIG_DIR_VAR: &str = "ORGANIZADOR_CONFIG_DIR";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let log_format = telemetry::LogFormat::from_env_value(
        std::env::var(telemetry::LOG_FORMAT_VAR).ok().as_deref(),
    );
    if let Err(e) = telemetry::init_tracing(log_format) {
        eprintln!("tracing already initialized: {e}");
    }

    let config_dir = std::env::var_os(CONFIG_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let layers = match ConfigLayers::from_process_env(&config_dir) {
        Ok(layers) => layers,
        Err(e) => {
            error!(error = %e, "failed to load settings");
            std::process::exit(1);
        }
    };

    let config = match AppConfig::from_layers(&layers) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid settings");
            std::process::exit(1);
        }
    };

    info!(
        environment = %layers.environment_name,
        host = %config.host,
        port = config.port,
        "starting organizer-api"
    );

    let app_state = match build_state()
        .with_layers(layers)
        .with_policy(config.bootstrap_policy)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
