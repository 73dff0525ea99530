//! CLI command implementations.

pub mod profile;
pub mod run;
pub mod serve;

use std::path::Path;

use colored::Colorize;
use prepper::{BackendConfig, Dataset, PrepperConfig, Workspace};

/// Configuration from file (or defaults), then environment, then flags.
pub fn load_config(
    path: Option<&Path>,
    backend_url: Option<String>,
    rows: Option<usize>,
) -> Result<PrepperConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => PrepperConfig::load(path)?,
        None => PrepperConfig::default(),
    }
    .with_env()?;

    if let Some(url) = backend_url {
        config.backend = BackendConfig::http(url);
    }
    if let Some(rows) = rows {
        config.row_limit = rows;
    }

    config.validate()?;
    Ok(config)
}

/// Build a workspace and open `file` in it.
pub fn open_workspace(
    file: &Path,
    config: PrepperConfig,
) -> Result<Workspace, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut workspace = Workspace::from_config(config)?;
    workspace.open(Dataset::from_path(file)?)?;

    if workspace.stats().is_stale() {
        eprintln!(
            "{} Column statistics are unavailable; recommendations will be empty",
            "Warning:".yellow()
        );
    }
    Ok(workspace)
}
