use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use db_infra::{
    orchestrate_migration, process_env_vars, resolve_connection, ConfigLayers, ENVIRONMENT_VAR,
};
use migration::MigrationCommand;

#[derive(Clone, Copy, ValueEnum)]
enum Command {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl From<Command> for MigrationCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Up => MigrationCommand::Up,
            Command::Down => MigrationCommand::Down,
            Command::Fresh => MigrationCommand::Fresh,
            Command::Reset => MigrationCommand::Reset,
            Command::Refresh => MigrationCommand::Refresh,
            Command::Status => MigrationCommand::Status,
        }
    }
}

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Task organizer database migration tool")]
struct Args {
    /// Migration command to run
    #[arg(value_enum)]
    command: Command,

    /// Environment name; overrides ORGANIZADOR_ENVIRONMENT
    #[arg(short, long)]
    environment: Option<String>,

    /// Directory holding appsettings.json and appsettings.{Environment}.json
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            print!("{e}");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let mut env_vars = process_env_vars();
    if let Some(environment) = args.environment {
        env_vars.insert(ENVIRONMENT_VAR.to_string(), environment);
    }

    let layers = match ConfigLayers::load(&args.config_dir, &env_vars) {
        Ok(layers) => layers,
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            std::process::exit(1);
        }
    };

    let resolved = resolve_connection(&layers);
    tracing::info!(
        "environment={} driver={} source={:?}",
        layers.environment_name,
        resolved.driver,
        resolved.source
    );

    if let Err(e) = orchestrate_migration(&resolved, args.command.into()).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}
