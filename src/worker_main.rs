//! # Courier Worker — the queue's delivery loop.
//!
//! Polls the queue file, dispatches due jobs over SMTP, applies the retry
//! policy, and persists after every outcome. Runs until terminated
//! (Ctrl+C to stop).

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use courier_core::CourierConfig;
use courier_message::{MailComposer, SmtpGateway};
use courier_queue::Worker;

#[derive(Parser)]
#[command(
    name = "courier-worker",
    version,
    about = "⏰ Courier Worker — delivers scheduled emails from the queue"
)]
struct Cli {
    /// Path to config.toml (default: ~/.courier/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "courier_worker=debug,courier_core=debug,courier_queue=debug,courier_message=debug"
    } else {
        "courier_worker=info,courier_core=info,courier_queue=info,courier_message=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => CourierConfig::load_from(path)?,
        None => CourierConfig::load()?,
    };

    println!("⏰ Courier Worker v{}", env!("CARGO_PKG_VERSION"));
    println!("   🗂️ Queue: {}", config.queue_path().display());
    println!(
        "   ⏱️ tick={}s | rate_limit={}s | Ctrl+C to stop",
        config.app.tick_seconds, config.app.rate_limit_seconds
    );

    let composer = Arc::new(MailComposer::new(config.clone()));
    let gateway = Arc::new(SmtpGateway::new(&config));
    Worker::new(&config, composer, gateway).run().await;

    Ok(())
}
