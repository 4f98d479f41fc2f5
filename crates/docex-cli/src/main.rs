//! docex CLI - Command-line interface for document field extraction.

use clap::Parser;
use docex_cli::commands;
use docex_cli::config;
use docex_cli::{Cli, Command, Formatter, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Exit code when the pipeline ran but did not succeed
const EXIT_UNSUCCESSFUL: i32 = 2;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_UNSUCCESSFUL),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> docex_cli::Result<bool> {
    let cli = Cli::parse();

    let format = cli.format.map(Into::into).unwrap_or(OutputFormat::Table);
    let formatter = Formatter::new(format, !cli.no_color);
    let explicit = cli.config.as_deref();

    match cli.command {
        Command::Extract(args) => {
            let settings = config::load_settings(explicit)?;
            commands::execute_extract(args, &settings, &formatter).await
        }
        Command::Events(args) => {
            let settings = config::load_settings(explicit)?;
            commands::execute_events(args, &settings, &formatter).await?;
            Ok(true)
        }
        Command::Config(args) => {
            commands::execute_config(args, explicit, format, &formatter)?;
            Ok(true)
        }
    }
}
