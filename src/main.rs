use anyhow::{Context, Result};
use clap::Parser;
use contacts2bbdb::cli::{Cli, CliHandler};
use contacts2bbdb::config::AppConfig;
use contacts2bbdb::contacts::GoogleContactsProvider;
use std::io::{self, BufWriter};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stdout carries the records, so logs go to stderr
    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let handler = CliHandler::new(config, Box::new(GoogleContactsProvider::new()));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    handler.run(cli.run_mode(), &mut out).await?;

    Ok(())
}
