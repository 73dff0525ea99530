//! Dismissal tracking and the visible recommendation list.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats::StatsMap;

use super::one_click::RecommendationKind;

/// A recommendation the user can see and act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub column: String,
    pub text: String,
    pub kind: RecommendationKind,
}

impl Recommendation {
    pub fn new(column: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            column: column.into(),
            kind: RecommendationKind::classify(&text),
            text,
        }
    }
}

/// Column → dismissed recommendation texts.
///
/// A column entry is never left holding an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DismissalSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl DismissalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dismiss a (column, recommendation) pair. Idempotent.
    pub fn dismiss(&mut self, column: impl Into<String>, recommendation: impl Into<String>) {
        self.entries
            .entry(column.into())
            .or_default()
            .insert(recommendation.into());
    }

    pub fn is_dismissed(&self, column: &str, recommendation: &str) -> bool {
        self.entries
            .get(column)
            .is_some_and(|set| set.contains(recommendation))
    }

    /// Dismissed texts for a column.
    pub fn for_column(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of dismissed pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reconcile in place against fresh stats.
    pub fn reconcile(&mut self, stats: &StatsMap) {
        *self = reconcile(stats, self);
    }
}

/// Keep only dismissals whose column still exists and whose text is still
/// among that column's current recommendations. Columns left with nothing
/// are removed.
pub fn reconcile(stats: &StatsMap, dismissals: &DismissalSet) -> DismissalSet {
    let mut entries = BTreeMap::new();

    for (column, dismissed) in &dismissals.entries {
        let Some(stat) = stats.get(column) else {
            continue;
        };

        let kept: BTreeSet<String> = dismissed
            .iter()
            .filter(|text| stat.recommendations.iter().any(|r| r == *text))
            .cloned()
            .collect();

        if !kept.is_empty() {
            entries.insert(column.clone(), kept);
        }
    }

    let result = DismissalSet { entries };
    if result.len() != dismissals.len() {
        debug!(
            before = dismissals.len(),
            after = result.len(),
            "Pruned stale dismissals"
        );
    }
    result
}

/// Recommendations not dismissed, in column order then service order.
pub fn visible_recommendations(stats: &StatsMap, dismissals: &DismissalSet) -> Vec<Recommendation> {
    stats
        .iter()
        .flat_map(|(column, stat)| {
            stat.recommendations
                .iter()
                .filter(move |text| !dismissals.is_dismissed(column, text))
                .map(move |text| Recommendation::new(column.as_str(), text.as_str()))
        })
        .collect()
}
