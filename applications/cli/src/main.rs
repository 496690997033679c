/// OHAKO - music discovery from the terminal
mod commands;
mod config;
mod error;
mod terminal;

use clap::Parser;
use crate::commands::{App, Command};
use crate::config::CliConfig;
use ohako_client::OhakoClient;
use ohako_sync::{FileSessionStorage, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ohako")]
#[command(about = "OHAKO music discovery client", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ohako_cli=info,ohako_sync=info,ohako_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;
    tracing::debug!(url = %config.server.url, "Configuration loaded");

    let client = Arc::new(OhakoClient::new(config.server.client_config())?);
    let session = Arc::new(SessionStore::open(FileSessionStorage::new(
        &config.storage.session_dir,
    )));

    let mut app = App::new(client, session);
    let result = app.run(cli.command).await;
    app.flush_notifications();
    result
}
