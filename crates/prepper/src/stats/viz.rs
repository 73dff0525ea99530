//! Chart choices per column.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

use super::column::DisplayKind;

/// Chart used to visualize a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VizKind {
    /// Min/mean/median/max for numeric, top/other for categorical.
    Bar,
    #[serde(rename = "hist")]
    Histogram,
    Box,
    Violin,
    Pie,
    /// Every categorical value.
    #[serde(rename = "fullbar")]
    FullBar,
    /// Missing vs present.
    Missing,
}

const NUMERIC_OPTIONS: &[VizKind] = &[
    VizKind::Bar,
    VizKind::Histogram,
    VizKind::Box,
    VizKind::Violin,
    VizKind::Missing,
];

const CATEGORICAL_OPTIONS: &[VizKind] = &[
    VizKind::Bar,
    VizKind::Pie,
    VizKind::FullBar,
    VizKind::Missing,
];

impl VizKind {
    /// Charts available for a display kind. Unknown columns get none.
    pub fn options_for(kind: DisplayKind) -> &'static [VizKind] {
        match kind {
            DisplayKind::Numeric => NUMERIC_OPTIONS,
            DisplayKind::Categorical => CATEGORICAL_OPTIONS,
            DisplayKind::Unknown => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VizKind::Bar => "bar",
            VizKind::Histogram => "hist",
            VizKind::Box => "box",
            VizKind::Violin => "violin",
            VizKind::Pie => "pie",
            VizKind::FullBar => "fullbar",
            VizKind::Missing => "missing",
        }
    }
}

impl FromStr for VizKind {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(VizKind::Bar),
            "hist" | "histogram" => Ok(VizKind::Histogram),
            "box" | "boxplot" => Ok(VizKind::Box),
            "violin" => Ok(VizKind::Violin),
            "pie" => Ok(VizKind::Pie),
            "fullbar" | "full_bar" => Ok(VizKind::FullBar),
            "missing" => Ok(VizKind::Missing),
            other => Err(PrepError::InvalidRequest(format!(
                "Unknown chart type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for VizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
