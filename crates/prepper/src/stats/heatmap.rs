//! Data quality heatmap: one graded cell per (issue, column).

use serde::{Deserialize, Serialize};

use super::column::{IssueType, StatsMap};

/// Risk grade of an issue score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Low,
    Medium,
    High,
    /// No score was reported.
    NotApplicable,
}

impl IssueLevel {
    /// Grade a score with per-issue `(medium, high)` thresholds.
    pub fn grade(issue: IssueType, score: Option<f64>) -> Self {
        let Some(score) = score else {
            return IssueLevel::NotApplicable;
        };
        let (medium, high) = match issue {
            IssueType::Missing => (0.05, 0.2),
            IssueType::Constant => (0.7, 0.95),
            IssueType::HighCardinality => (0.2, 0.5),
            IssueType::Outlier => (0.03, 0.1),
        };

        if score > high {
            IssueLevel::High
        } else if score > medium {
            IssueLevel::Medium
        } else {
            IssueLevel::Low
        }
    }
}

/// One heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub column: String,
    pub score: Option<f64>,
    pub level: IssueLevel,
    /// `"12.5%"`, or `"-"` / `"N/A"` when no score was reported.
    pub label: String,
}

/// All cells for one issue type, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub issue: IssueType,
    pub cells: Vec<HeatmapCell>,
}

/// Issue × column grid of graded scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub columns: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

impl Heatmap {
    /// Build the heatmap for a stats snapshot.
    pub fn from_stats(stats: &StatsMap) -> Self {
        let columns: Vec<String> = stats.keys().cloned().collect();
        if columns.is_empty() {
            return Self::default();
        }

        let rows = IssueType::ALL
            .iter()
            .map(|&issue| HeatmapRow {
                issue,
                cells: stats
                    .iter()
                    .map(|(column, stat)| {
                        let score = stat.data_issues.get(issue);
                        HeatmapCell {
                            column: column.clone(),
                            score,
                            level: IssueLevel::grade(issue, score),
                            label: cell_label(issue, score),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    /// Cell lookup by issue and column.
    pub fn cell(&self, issue: IssueType, column: &str) -> Option<&HeatmapCell> {
        self.rows
            .iter()
            .find(|row| row.issue == issue)
            .and_then(|row| row.cells.iter().find(|cell| cell.column == column))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn cell_label(issue: IssueType, score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{:.1}%", score * 100.0),
        None if issue == IssueType::Outlier => "N/A".to_string(),
        None => "-".to_string(),
    }
}
