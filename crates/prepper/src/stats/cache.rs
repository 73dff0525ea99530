//! Latest statistics snapshot plus the display state derived from it.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{PrepError, Result};

use super::column::{DisplayKind, StatsMap};
use super::health::healthiest_columns;
use super::viz::VizKind;

/// Holds the most recent stats snapshot.
///
/// The snapshot is replaced wholesale on every refresh and shared through an
/// `Arc`, so a reader holding [`StatsCache::snapshot`] never sees a
/// half-updated map.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    snapshot: Arc<StatsMap>,
    display_columns: Vec<String>,
    viz: IndexMap<String, VizKind>,
    stale: bool,
}

impl StatsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<StatsMap> {
        Arc::clone(&self.snapshot)
    }

    /// Borrow the current snapshot.
    pub fn stats(&self) -> &StatsMap {
        &self.snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Columns currently chosen for visualization.
    pub fn display_columns(&self) -> &[String] {
        &self.display_columns
    }

    /// True when the last refresh attempt failed and the snapshot may lag
    /// behind the dataset.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Replace the snapshot.
    ///
    /// Display columns that no longer exist are pruned. If nothing is left and
    /// `reset_defaults_if_missing` is set, the `default_count` healthiest
    /// columns are selected; otherwise the selection stays empty. Chart
    /// choices for vanished columns are dropped.
    pub fn replace(
        &mut self,
        stats: StatsMap,
        reset_defaults_if_missing: bool,
        default_count: usize,
    ) {
        let before = self.display_columns.len();
        self.display_columns.retain(|col| stats.contains_key(col));
        self.viz.retain(|col, _| stats.contains_key(col));

        if self.display_columns.is_empty() && reset_defaults_if_missing {
            self.display_columns = healthiest_columns(&stats, default_count);
        }

        debug!(
            columns = stats.len(),
            pruned = before.saturating_sub(self.display_columns.len()),
            display = ?self.display_columns,
            "Stats snapshot replaced"
        );

        self.snapshot = Arc::new(stats);
        self.stale = false;
    }

    /// Explicitly choose display columns. Every column must exist.
    pub fn select_display_columns<I, S>(&mut self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if !self.snapshot.contains_key(&column) {
                return Err(PrepError::InvalidRequest(format!(
                    "Unknown column '{}'",
                    column
                )));
            }
            if !selected.contains(&column) {
                selected.push(column);
            }
        }

        self.display_columns = selected;
        Ok(())
    }

    /// Display kind of a column; unknown for columns without stats.
    pub fn display_kind(&self, column: &str) -> DisplayKind {
        self.snapshot
            .get(column)
            .map(|stat| stat.display_kind())
            .unwrap_or(DisplayKind::Unknown)
    }

    /// Choose the chart for a column.
    pub fn set_viz(&mut self, column: &str, kind: VizKind) -> Result<()> {
        let display = self.display_kind(column);
        if !VizKind::options_for(display).contains(&kind) {
            return Err(PrepError::InvalidRequest(format!(
                "Chart '{}' is not available for column '{}'",
                kind, column
            )));
        }
        self.viz.insert(column.to_string(), kind);
        Ok(())
    }

    /// Chart for a column: the user's choice, else a bar chart. `None` for
    /// columns that cannot be charted.
    pub fn viz_for(&self, column: &str) -> Option<VizKind> {
        if self.display_kind(column) == DisplayKind::Unknown {
            return None;
        }
        Some(self.viz.get(column).copied().unwrap_or(VizKind::Bar))
    }

    /// Forget everything (new dataset).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{
        CategoricalSummary, ColumnStat, ColumnSummary, DataIssues, IssueType, NumericSummary,
    };

    fn numeric(missing: f64) -> ColumnStat {
        ColumnStat::new(ColumnSummary::Numeric(NumericSummary::default()))
            .with_issues(DataIssues::new().with(IssueType::Missing, missing))
    }

    fn categorical() -> ColumnStat {
        ColumnStat::new(ColumnSummary::Categorical(CategoricalSummary::default()))
    }

    fn stats(cols: &[(&str, ColumnStat)]) -> StatsMap {
        cols.iter()
            .map(|(name, stat)| (name.to_string(), stat.clone()))
            .collect()
    }

    #[test]
    fn test_first_load_selects_healthiest() {
        let mut cache = StatsCache::new();
        cache.replace(
            stats(&[("a", numeric(0.4)), ("b", numeric(0.0)), ("c", numeric(0.1))]),
            true,
            2,
        );
        assert_eq!(cache.display_columns(), ["b", "c"]);
    }

    #[test]
    fn test_explicit_selection_survives_refresh() {
        let mut cache = StatsCache::new();
        cache.replace(stats(&[("a", numeric(0.4)), ("b", numeric(0.0))]), true, 1);
        cache.select_display_columns(["a"]).unwrap();

        cache.replace(stats(&[("a", numeric(0.5)), ("b", numeric(0.0))]), true, 1);
        assert_eq!(cache.display_columns(), ["a"]);
    }

    #[test]
    fn test_pruned_selection_without_reset_stays_empty() {
        let mut cache = StatsCache::new();
        cache.replace(stats(&[("a", numeric(0.0))]), true, 5);
        assert_eq!(cache.display_columns(), ["a"]);

        cache.replace(stats(&[("b", numeric(0.0))]), false, 5);
        assert!(cache.display_columns().is_empty());

        cache.replace(stats(&[("b", numeric(0.0))]), true, 5);
        assert_eq!(cache.display_columns(), ["b"]);
    }

    #[test]
    fn test_select_unknown_column_rejected() {
        let mut cache = StatsCache::new();
        cache.replace(stats(&[("a", numeric(0.0))]), true, 5);
        let err = cache.select_display_columns(["zzz"]).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
        assert_eq!(cache.display_columns(), ["a"]);
    }

    #[test]
    fn test_snapshot_is_replaced_not_mutated() {
        let mut cache = StatsCache::new();
        cache.replace(stats(&[("a", numeric(0.0))]), true, 5);
        let held = cache.snapshot();

        cache.replace(stats(&[("b", numeric(0.0))]), true, 5);
        assert!(held.contains_key("a"));
        assert!(cache.stats().contains_key("b"));
        assert!(!cache.stats().contains_key("a"));
    }

    #[test]
    fn test_viz_choices() {
        let mut cache = StatsCache::new();
        cache.replace(
            stats(&[("n", numeric(0.0)), ("c", categorical()), ("u", ColumnStat::default())]),
            true,
            5,
        );

        assert_eq!(cache.viz_for("n"), Some(VizKind::Bar));
        assert_eq!(cache.viz_for("u"), None);

        cache.set_viz("n", VizKind::Histogram).unwrap();
        assert_eq!(cache.viz_for("n"), Some(VizKind::Histogram));
        assert!(cache.set_viz("c", VizKind::Histogram).is_err());
        cache.set_viz("c", VizKind::Pie).unwrap();

        // vanished columns lose their chart choice
        cache.replace(stats(&[("c", categorical())]), false, 5);
        cache.replace(
            stats(&[("n", numeric(0.0)), ("c", categorical())]),
            false,
            5,
        );
        assert_eq!(cache.viz_for("n"), Some(VizKind::Bar));
        assert_eq!(cache.viz_for("c"), Some(VizKind::Pie));
    }
}
