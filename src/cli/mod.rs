pub mod plan;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};

use crate::config::{load_config, resolve_path, Config};
use crate::error::Result;

pub(crate) fn load(config_path: &str) -> Result<Config> {
    load_config(&resolve_path(config_path)?)
}

#[derive(Parser)]
#[command(
    name = "filestash",
    about = "FileStash: on-demand scanned document organizer for a structured archive."
)]
pub struct Cli {
    /// Path to JSON config file.
    #[arg(long)]
    pub config: String,
    /// Print actions without moving/copying files.
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
    /// Emit debug diagnostics on stderr.
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// File every candidate in the source directory (default).
    Run,
    /// Show where each candidate would go, without hashing or moving anything.
    Plan,
    /// Show the resolved configuration and hash index statistics.
    Status,
}
