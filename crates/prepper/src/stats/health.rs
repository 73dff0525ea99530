//! Health ranking for default visualization columns.

use super::column::{ColumnStat, IssueType, StatsMap};

/// Recommendation phrases that exclude a column from the healthy candidates.
pub const DISQUALIFYING_PHRASES: [&str; 4] = [
    "drop",
    "excessive missing",
    "nearly constant",
    "high cardinality",
];

/// True if any recommendation contains a disqualifying phrase (case-insensitive).
pub fn is_disqualified(stat: &ColumnStat) -> bool {
    stat.recommendations.iter().any(|rec| {
        let rec = rec.to_lowercase();
        DISQUALIFYING_PHRASES
            .iter()
            .any(|phrase| rec.contains(phrase))
    })
}

/// Sum of the reported issue scores; lower is healthier.
///
/// Absent scores contribute nothing. Non-finite scores are ignored so the
/// ranking stays totally ordered.
pub fn health_score(stat: &ColumnStat) -> f64 {
    IssueType::ALL
        .iter()
        .filter_map(|issue| stat.data_issues.get(*issue))
        .filter(|score| score.is_finite())
        .sum()
}

/// Pick up to `count` columns for default visualization.
///
/// Candidates are the columns without a disqualifying recommendation, sorted
/// by ascending health score; ties keep the original column order. When fewer
/// than `count` candidates survive, the first `count` columns of the full
/// stats map are used instead.
pub fn healthiest_columns(stats: &StatsMap, count: usize) -> Vec<String> {
    let mut candidates: Vec<(&String, f64)> = stats
        .iter()
        .filter(|(_, stat)| !is_disqualified(stat))
        .map(|(name, stat)| (name, health_score(stat)))
        .collect();

    if candidates.len() < count {
        return stats.keys().take(count).cloned().collect();
    }

    // sort_by is stable: equal scores keep column order
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates
        .into_iter()
        .take(count)
        .map(|(name, _)| name.clone())
        .collect()
}
