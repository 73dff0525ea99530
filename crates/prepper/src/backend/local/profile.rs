//! Column statistics and recommendations for the in-process service.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::input::DataTable;
use crate::stats::{
    CategoricalSummary, ColumnStat, ColumnSummary, DataIssues, Histogram, IssueType,
    NumericSummary, StatsMap, ValueCount,
};

use super::values::{ColumnKind, median, mode, parse_number};

pub(super) const EXCESSIVE_MISSING: &str =
    "Consider dropping this column due to excessive missing data.";
pub(super) const IMPUTE_MISSING: &str = "Consider imputing missing values.";
pub(super) const NEARLY_CONSTANT: &str = "Consider dropping this column as it is nearly constant.";
pub(super) const HIGH_CARDINALITY: &str =
    "Consider dropping or encoding this column due to high cardinality.";
pub(super) const HIGH_OUTLIER_RISK: &str =
    "Consider scaling or transforming this column due to high outlier risk.";

const HISTOGRAM_BINS: usize = 20;
const VALUE_COUNT_LIMIT: usize = 20;
/// Label used for nulls in categorical value counts.
const NULL_LABEL: &str = "nan";

/// Statistics for every column, in column order.
pub(super) fn column_stats(table: &DataTable) -> StatsMap {
    (0..table.column_count())
        .map(|index| (table.headers[index].clone(), profile_column(table, index)))
        .collect()
}

fn profile_column(table: &DataTable, index: usize) -> ColumnStat {
    let cells: Vec<&str> = table.column_values(index).collect();
    let rows = cells.len();
    let non_null: Vec<&str> = cells
        .iter()
        .copied()
        .filter(|c| !DataTable::is_null_value(c))
        .collect();
    let kind = ColumnKind::infer(cells.iter().copied());

    let unique = if kind.is_numeric() {
        non_null
            .iter()
            .filter_map(|c| parse_number(c))
            .map(f64::to_bits)
            .collect::<HashSet<_>>()
            .len()
    } else {
        non_null.iter().collect::<HashSet<_>>().len()
    };

    let ratio = |n: usize| if rows > 0 { n as f64 / rows as f64 } else { 0.0 };
    let missing = ratio(rows - non_null.len());
    let cardinality = ratio(unique);

    // nulls count as one value when looking for a dominant value
    let nulls = (rows - non_null.len()) as u64;
    let most_common = mode(non_null.iter().copied())
        .map(|(_, count)| count)
        .unwrap_or(0)
        .max(nulls);
    let constant = ratio(most_common as usize);

    let mut issues = DataIssues::new()
        .with(IssueType::Missing, missing)
        .with(IssueType::Constant, constant)
        .with(IssueType::HighCardinality, cardinality);

    let mut recommendations = Vec::new();
    if missing > 0.5 {
        recommendations.push(EXCESSIVE_MISSING);
    } else if missing > 0.1 {
        recommendations.push(IMPUTE_MISSING);
    }
    if constant > 0.95 {
        recommendations.push(NEARLY_CONSTANT);
    }
    if cardinality > 0.8 {
        recommendations.push(HIGH_CARDINALITY);
    }

    let summary = if kind.is_numeric() {
        let values: Vec<f64> = non_null.iter().filter_map(|c| parse_number(c)).collect();
        let (summary, outlier) = numeric_summary(&values);
        issues = issues.with(IssueType::Outlier, outlier);
        if outlier > 0.1 {
            recommendations.push(HIGH_OUTLIER_RISK);
        }
        ColumnSummary::Numeric(summary)
    } else {
        ColumnSummary::Categorical(categorical_summary(&cells))
    };

    ColumnStat::new(summary)
        .with_counts(non_null.len() as u64, missing * 100.0, unique as u64)
        .with_issues(issues)
        .with_recommendations(recommendations)
}

/// Summary plus the share of values more than three sample deviations from
/// the mean.
fn numeric_summary(values: &[f64]) -> (NumericSummary, f64) {
    if values.is_empty() {
        return (
            NumericSummary {
                histogram: Some(Histogram::default()),
                ..NumericSummary::default()
            },
            0.0,
        );
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        Some((values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt())
    } else {
        None
    };

    let mut sorted = values.to_vec();
    let median = median(&mut sorted);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let outlier = match std {
        Some(std) if std > 0.0 => {
            values.iter().filter(|v| (*v - mean).abs() > 3.0 * std).count() as f64 / n
        }
        _ => 0.0,
    };

    let summary = NumericSummary {
        mean: Some(mean),
        median,
        std,
        min: Some(min),
        max: Some(max),
        histogram: Some(histogram(values, min, max)),
    };
    (summary, outlier)
}

/// Equal-width bins over [min, max]; the last bin is closed. A single-valued
/// column spans half a unit either side.
fn histogram(values: &[f64], min: f64, max: f64) -> Histogram {
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / HISTOGRAM_BINS as f64;

    let bin_edges = (0..=HISTOGRAM_BINS)
        .map(|i| lo + width * i as f64)
        .collect();

    let mut counts = vec![0u64; HISTOGRAM_BINS];
    for value in values {
        let bin = (((value - lo) / width).floor() as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }

    Histogram { bin_edges, counts }
}

fn categorical_summary(cells: &[&str]) -> CategoricalSummary {
    let top = mode(cells.iter().copied());

    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for cell in cells {
        let label = if DataTable::is_null_value(cell) {
            NULL_LABEL
        } else {
            *cell
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    // stable: equal counts keep first-appearance order
    let mut counts: Vec<(&str, u64)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    CategoricalSummary {
        top: top.map(|(value, _)| value.to_string()),
        freq: top.map(|(_, count)| count).unwrap_or(0),
        value_counts: Some(
            counts
                .into_iter()
                .take(VALUE_COUNT_LIMIT)
                .map(|(value, count)| ValueCount {
                    value: value.to_string(),
                    count,
                })
                .collect(),
        ),
    }
}
