//! Prepper CLI - undoable cleaning pipeline for tabular data.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr so stdout stays clean for `--json`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match commands::load_config(cli.config.as_deref(), cli.backend_url, cli.rows) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Profile { file, json, top } => {
            commands::profile::run(file, config, json, top, cli.verbose)
        }

        Commands::Run {
            file,
            steps,
            output,
            json,
        } => commands::run::run(file, config, steps, output, json, cli.verbose),

        Commands::Serve { file, port } => commands::serve::run(file, config, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
