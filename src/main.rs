//! # Courier — send now or enqueue, per the configured mode.
//!
//! Usage:
//!   courier                          # app.mode from ~/.courier/config.toml
//!   courier --config ./config.toml   # explicit config
//!
//! `send_now` delivers to every recipient immediately; `schedule` only
//! writes jobs into the queue — start `courier-worker` to deliver them.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use courier_core::CourierConfig;
use courier_core::config::SendMode;
use courier_message::{MailComposer, SmtpGateway};

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "📮 Courier — personal scheduled-email sender"
)]
struct Cli {
    /// Path to config.toml (default: ~/.courier/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "courier=debug,courier_core=debug,courier_queue=debug,courier_message=debug"
    } else {
        "courier=info,courier_core=info,courier_queue=info,courier_message=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => CourierConfig::load_from(path)?,
        None => CourierConfig::load()?,
    };

    match config.app.mode {
        SendMode::SendNow => {
            let composer = MailComposer::new(config.clone());
            let gateway = SmtpGateway::new(&config);
            let summary = courier_queue::send_now(&config, &composer, &gateway).await?;
            println!("📤 Done: {} sent, {} failed", summary.sent, summary.failed);
        }
        SendMode::Schedule => {
            let added = courier_queue::enqueue_from_config(&config)?;
            println!(
                "📅 Enqueued {} job(s) into {}",
                added.len(),
                config.queue_path().display()
            );
            println!("   No email was sent. Start `courier-worker` to deliver them.");
        }
    }

    Ok(())
}
