//! Invalidator command-line client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use invalidator::{CacheHandler, InvalidationMode, Settings, telemetry};

#[derive(Debug, Parser)]
#[command(name = "invalidator", version, about = "Invalidate content on reverse-proxy caches")]
struct Cli {
    /// Configuration file (toml, yaml or json).
    #[arg(short, long, env = "INVALIDATOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Invalidate a single page.
    Page(Target),
    /// Invalidate every page matching a path pattern.
    Path(Target),
}

#[derive(Debug, clap::Args)]
struct Target {
    /// Public domain, sent as the Host header.
    domain: String,
    /// Path starting with `/`; may contain a regular expression for `path`.
    path: String,
    /// Evict immediately instead of marking stale.
    #[arg(long)]
    purge: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    if let Err(e) = telemetry::init(&settings.log_level) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    tracing::info!("Starting invalidator v{}", env!("CARGO_PKG_VERSION"));

    let transport = settings.transport()?;
    let handler = CacheHandler::with_transport(&settings.backends, Arc::new(transport))
        .context("failed to configure cache backends")?;

    match cli.command {
        Command::Page(target) => handler.invalidate_page(
            &target.domain,
            &target.path,
            InvalidationMode::from(target.purge),
        )?,
        Command::Path(target) => handler.invalidate_path(
            &target.domain,
            &target.path,
            InvalidationMode::from(target.purge),
        )?,
    }

    Ok(())
}
