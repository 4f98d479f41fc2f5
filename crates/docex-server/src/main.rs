//! docex Server CLI
//!
//! Starts the HTTP server for document extraction.

use docex_orchestrator::Settings;
use docex_server::{start_server, ServerError};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 2 && args[1] == "--config" {
        Some(PathBuf::from(&args[2]))
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        env::var("DOCEX_CONFIG").ok().map(PathBuf::from)
    };

    let settings = Settings::load(config_path.as_deref())?;

    start_server(settings, async {
        // Without a signal handler, serve until killed
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await
}

fn print_help() {
    println!("docex Server - Document field extraction over HTTP");
    println!();
    println!("USAGE:");
    println!("    docex-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DOCEX_CONFIG       Config file used when --config is absent");
    println!("    DOCEX_*            Per-key overrides (see `docex config`)");
    println!("    RUST_LOG           Log filter (default: info)");
    println!();
    println!("ROUTES:");
    println!("    GET  /health");
    println!("    POST /extract_document_data");
    println!("    POST /events");
    println!();
}
