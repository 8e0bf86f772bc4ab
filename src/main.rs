mod classifier;
mod cli;
mod config;
mod error;
mod filename;
mod filer;
mod fmt;
mod index;
mod keys;
mod logging;
mod runlog;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::run::run(&cli.config, cli.dry_run),
        Commands::Plan => cli::plan::run(&cli.config),
        Commands::Status => cli::status::run(&cli.config),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
