//! Workspace configuration: file, environment, defaults.

use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::{AnalysisService, HttpService, LocalService};
use crate::error::{PrepError, Result};

/// Environment variable naming the analysis service URL.
pub const ENV_BACKEND_URL: &str = "PREPPER_BACKEND_URL";
/// Environment variable overriding the preview row limit.
pub const ENV_ROW_LIMIT: &str = "PREPPER_ROW_LIMIT";
/// Environment variable overriding the number of default display columns.
pub const ENV_DISPLAY_COLUMNS: &str = "PREPPER_DISPLAY_COLUMNS";

/// Where transformations and statistics are computed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BackendConfig {
    /// In-process service.
    #[default]
    Local,
    /// Remote service over HTTP.
    Http {
        base_url: String,
        /// Per-request timeout; none by default.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
}

impl BackendConfig {
    /// HTTP backend at `base_url` without a timeout.
    pub fn http(base_url: impl Into<String>) -> Self {
        BackendConfig::Http {
            base_url: base_url.into(),
            timeout_secs: None,
        }
    }
}

/// Configuration for a [`Workspace`](crate::Workspace).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepperConfig {
    /// Rows requested from the service for each preview.
    pub row_limit: usize,
    /// How many columns to pick for visualization by default.
    pub display_columns: usize,
    /// Delimiter used when exporting the preview.
    pub delimiter: char,
    pub backend: BackendConfig,
}

impl Default for PrepperConfig {
    fn default() -> Self {
        Self {
            row_limit: 10,
            display_columns: 5,
            delimiter: ',',
            backend: BackendConfig::Local,
        }
    }
}

impl PrepperConfig {
    /// Defaults overlaid with `PREPPER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay `PREPPER_*` environment variables on this configuration.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(url) = env::var(ENV_BACKEND_URL) {
            if !url.trim().is_empty() {
                self.backend = BackendConfig::http(url.trim());
            }
        }
        if let Some(rows) = env_usize(ENV_ROW_LIMIT)? {
            self.row_limit = rows;
        }
        if let Some(count) = env_usize(ENV_DISPLAY_COLUMNS)? {
            self.display_columns = count;
        }
        Ok(self)
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PrepError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: PrepperConfig = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            PrepError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    PrepError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            PrepError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| PrepError::Persistence(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Reject values no workspace can run with.
    pub fn validate(&self) -> Result<()> {
        if self.row_limit == 0 {
            return Err(PrepError::Config("row_limit must be at least 1".to_string()));
        }
        if let BackendConfig::Http { base_url, .. } = &self.backend {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(PrepError::Config(format!(
                    "Backend URL must start with http:// or https://, got '{}'",
                    base_url
                )));
            }
        }
        Ok(())
    }

    /// Construct the configured service.
    pub fn build_service(&self) -> Result<Arc<dyn AnalysisService>> {
        self.validate()?;
        let service: Arc<dyn AnalysisService> = match &self.backend {
            BackendConfig::Local => Arc::new(LocalService::new()),
            BackendConfig::Http {
                base_url,
                timeout_secs,
            } => Arc::new(HttpService::with_timeout(
                base_url.as_str(),
                timeout_secs.map(Duration::from_secs),
            )?),
        };
        Ok(service)
    }
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PrepError::Config(format!("{} must be a number, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}
