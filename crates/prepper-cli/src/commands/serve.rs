//! Serve command - expose the workspace as a JSON API.

use std::path::PathBuf;

use colored::Colorize;
use prepper::PrepperConfig;

use super::open_workspace;
use crate::server::{app, state::AppState};

pub fn run(
    file: PathBuf,
    config: PrepperConfig,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    // The HTTP backend uses a blocking client, so the workspace is built
    // before the runtime starts.
    let workspace = open_workspace(&file, config)?;
    let status = workspace.status();
    let state = AppState::new(workspace);

    let url = format!("http://localhost:{}/api", port);
    println!();
    println!(
        "{} {}",
        "Serving workspace at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  File:    {}", file.display());
    println!("  Service: {}", status.backend);
    println!("  Columns: {}", status.columns);
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))?;

    Ok(())
}
