mod cli;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use keepsake::config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keepsake", version, about = "Timeline memory service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve,
    /// Print one page of the timeline
    Page {
        /// Zero-based page index
        #[arg(default_value_t = 0)]
        page: usize,
    },
    /// Resolve the image attached to a memory
    Image {
        /// Memory id
        id: String,
    },
    /// Show catalog statistics
    Stats,
    /// Check that the data documents load and reference each other correctly
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::KeepsakeConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Page { page } => cli::page::page(&config, page).await?,
        Command::Image { id } => cli::image::image(&config, &id).await?,
        Command::Stats => cli::stats::stats(&config).await?,
        Command::Doctor => cli::doctor::doctor(&config).await?,
    }

    Ok(())
}
