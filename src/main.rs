use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glasswall::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "glasswall",
    version,
    about = "Mute every account listed on a directory site that is not muted yet",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl, reconcile and mute
    Run {
        /// Stop after building the work queue
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Seed for a reproducible queue order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Crawl the directory and print the handles found
    Crawl {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Read the existing mute list and print it
    Existing {
        /// Print every handle, not just the count
        #[arg(long, default_value = "false")]
        list: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());

    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("glasswall starting");

    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone());

    match cli.command {
        Commands::Run { dry_run, seed } => {
            tracing::info!(dry_run = %dry_run, seed = ?seed, "Starting run command");
            commands::run(config, dry_run, seed, &cancel).await?;
        }

        Commands::Crawl { max_pages } => {
            tracing::info!(max_pages = ?max_pages, "Starting crawl command");
            commands::crawl(config, max_pages, &cancel).await?;
        }

        Commands::Existing { list } => {
            tracing::info!(list = %list, "Starting existing command");
            commands::existing(config, list, &cancel).await?;
        }
    }

    tracing::info!("glasswall completed successfully");
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            cancel.cancel();
        }
    });
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("glasswall=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("glasswall={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
