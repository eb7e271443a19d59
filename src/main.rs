//! Quarry main entry point
//!
//! Command-line interface for the harvester. The crawl and the pipeline are
//! independently runnable stages connected by the raw record stream, so each
//! gets its own subcommand alongside a combined `run`.

use clap::{Parser, Subcommand};
use quarry::config::load_config_with_hash;
use quarry::crawler::run_crawl;
use quarry::pipeline::run_pipeline;
use quarry::shutdown::{listen_for_ctrl_c, shutdown_channel};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Quarry: harvest source files into a scored dataset
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "Harvests repository files into a deduplicated, scored dataset", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl repositories and write the raw record stream
    Crawl,

    /// Process an existing raw stream into the scored Parquet dataset
    Pipeline,

    /// Crawl, then run the pipeline over the fresh stream
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    match cli.command {
        Command::Crawl => {
            handle_crawl(config).await?;
        }
        Command::Pipeline => {
            run_pipeline(&config)?;
        }
        Command::Run => {
            let config_for_pipeline = config.clone();
            handle_crawl(config).await?;
            run_pipeline(&config_for_pipeline)?;
        }
    }

    Ok(())
}

async fn handle_crawl(config: quarry::Config) -> anyhow::Result<()> {
    let (trigger, handle) = shutdown_channel();
    listen_for_ctrl_c(trigger);

    let summary = run_crawl(config, handle).await?;
    tracing::info!(
        "Crawl complete: {} files written across {} repositories",
        summary.files_written,
        summary.processed
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quarry=info,warn"),
            1 => EnvFilter::new("quarry=debug,info"),
            2 => EnvFilter::new("quarry=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
