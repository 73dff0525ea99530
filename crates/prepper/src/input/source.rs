//! Dataset snapshots and parsed tables.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{PrepError, Result};

/// An immutable snapshot of a source file, as uploaded to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// File name without path.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// SHA-256 hash of the contents (`sha256:<hex>`).
    pub hash: String,
}

impl Dataset {
    /// Create a dataset from raw bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        Self {
            name: name.into(),
            bytes,
            hash,
        }
    }

    /// Read a dataset from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| PrepError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());

        Ok(Self::from_bytes(name, bytes))
    }

    /// Size of the snapshot in bytes.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Represents parsed tabular data.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Remove a column and return its values.
    pub fn remove_column(&mut self, index: usize) -> Vec<String> {
        self.headers.remove(index);
        self.rows
            .iter_mut()
            .map(|row| {
                if index < row.len() {
                    row.remove(index)
                } else {
                    String::new()
                }
            })
            .collect()
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
    }
}
