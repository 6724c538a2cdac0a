use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gridveto_state::StateStore;
use tracing::debug;

mod commands;
mod config;
mod snapshot;

use config::GridConfig;
use snapshot::ClusterSnapshot;

#[derive(Parser)]
#[command(
    name = "gridveto",
    about = "gridveto — which hosts do a job's placement constraints allow?",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Config file (default: ./gridveto.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load hosts, jobs and active tasks from a TOML snapshot into the store
    Import {
        /// Snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Evaluate a job's constraints against hosts and print the vetoes.
    ///
    /// Reads the configured store, or only the given snapshot when
    /// --snapshot is passed (nothing is written in that case).
    Check {
        /// Job key, e.g. prod/api
        #[arg(short, long)]
        job: String,
        /// Only evaluate this host
        #[arg(long)]
        host: Option<String>,
        /// Evaluate against a snapshot file instead of the store
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List stored hosts and their attributes
    Hosts,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = GridConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Import { snapshot } => {
            let store = open_store(&config)?;
            commands::import::import(&store, &snapshot)
        }
        Commands::Check {
            job,
            host,
            snapshot,
            format,
        } => {
            let store = match snapshot {
                Some(path) => ClusterSnapshot::load_in_memory(&path)?,
                None => open_store(&config)?,
            };
            commands::check::check(&store, &job, host.as_deref(), &format)
        }
        Commands::Hosts => {
            let store = open_store(&config)?;
            commands::hosts::hosts(&store)
        }
    }
}

fn open_store(config: &GridConfig) -> anyhow::Result<StateStore> {
    let path = &config.store.path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let store = StateStore::open(path)?;
    debug!(path = ?path, "store opened");
    Ok(store)
}
