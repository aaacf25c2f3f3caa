use clap::Parser;
use event_api::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// HTTP API that looks up upstream events by id.
#[derive(Parser)]
struct Cli {
    /// Path to a yaml config file. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config from {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    if let Err(err) = event_api::run(config) {
        eprintln!("event-api exited with error: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
