//! keptn-bridge - headless Keptn Bridge
//!
//! Loads bridge info, projects and their latest sequences from a Keptn
//! control plane, and classifies pipeline events from files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use keptn_bridge::cli::{self, ConfigSubcommand};
use keptn_bridge::config::ConfigLoader;

/// keptn-bridge - headless Keptn Bridge
#[derive(Parser, Debug)]
#[command(name = "keptn-bridge")]
#[command(about = "Inspect Keptn projects, sequences and events from the terminal", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Override the configured API URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Show bridge info, metadata and projects (default)
    Status,
    /// Show the latest sequences of every project
    Sequences {
        /// Number of projects to load
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Classify the events in a JSON file, grouped by context
    Events {
        /// Path to a JSON array of events or an events page
        file: PathBuf,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let command = match args.command {
        Some(Command::Config { subcommand }) => return cli::handle_config_command(subcommand),
        Some(Command::Version) => {
            cli::display_version();
            return Ok(());
        }
        Some(command) => command,
        None => Command::Status,
    };

    let mut config = ConfigLoader::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}; using default configuration", e);
        ConfigLoader::load_defaults()
    });

    let log_file = cli::init_logging(args.debug, &config.logger.level);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    tracing::debug!(
        "Configuration loaded: apiUrl={}, pageSize={}, sequenceLimit={}",
        config.api_url,
        config.effective_page_size(),
        config.sequence_limit
    );

    match command {
        Command::Status => cli::run_status(&config).await,
        Command::Sequences { page_size } => cli::run_sequences(&config, page_size).await,
        Command::Events { file } => cli::run_events(&file),
        Command::Config { .. } | Command::Version => Ok(()),
    }
}
