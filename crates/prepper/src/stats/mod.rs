//! Column statistics: the cached snapshot, health ranking and heatmap.
//!
//! The analysis service computes the numbers; this module only models what
//! it returns and derives display state from it:
//!
//! - [`ColumnStat`] mirrors one column of the service's stats response
//! - [`StatsCache`] holds the latest snapshot and the display selection
//! - [`healthiest_columns`] picks default columns for visualization
//! - [`Heatmap`] grades each (issue, column) score for display

mod cache;
mod column;
mod health;
mod heatmap;
mod viz;

pub use cache::StatsCache;
pub use column::{
    CategoricalSummary, ColumnStat, ColumnSummary, DataIssues, DisplayKind, Histogram, IssueType,
    NumericSummary, StatsMap, ValueCount,
};
pub use health::{DISQUALIFYING_PHRASES, health_score, healthiest_columns, is_disqualified};
pub use heatmap::{Heatmap, HeatmapCell, HeatmapRow, IssueLevel};
pub use viz::VizKind;
