//! Marginalia command-line entry point
//!
//! Replays a session file against an in-memory document and prints the
//! resulting comments and selection as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use marginalia::core::AppConfig;
use marginalia::session::Session;
use marginalia::{APP_NAME, VERSION};

#[derive(Parser, Debug)]
#[command(name = "marginalia")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session file to replay
    session: PathBuf,

    /// Configuration file, instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => AppConfig::load_from(path).await,
        None => AppConfig::load().await,
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("{} v{} starting...", APP_NAME, VERSION);
    if let Some(err) = config_error {
        warn!("Using default configuration: {}", err.user_message());
    }

    let session = Session::load(&args.session).await?;
    let report = session.run(&config);

    info!(
        "Session finished with {} comment(s) and {} refused step(s)",
        report.comments.len(),
        report.failures.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
