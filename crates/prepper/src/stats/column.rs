//! Per-column statistics as reported by the analysis service.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Column name → statistics, in the service's column order.
pub type StatsMap = IndexMap<String, ColumnStat>;

/// Data quality issue categories scored by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Missing,
    Constant,
    HighCardinality,
    Outlier,
}

impl IssueType {
    /// All issue types, in display order.
    pub const ALL: [IssueType; 4] = [
        IssueType::Missing,
        IssueType::Constant,
        IssueType::HighCardinality,
        IssueType::Outlier,
    ];

    /// Key used in the `data_issues` map.
    pub fn key(&self) -> &'static str {
        match self {
            IssueType::Missing => "missing",
            IssueType::Constant => "constant",
            IssueType::HighCardinality => "high_cardinality",
            IssueType::Outlier => "outlier",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueType::Missing => "Missing",
            IssueType::Constant => "Constant",
            IssueType::HighCardinality => "High Cardinality",
            IssueType::Outlier => "Outlier",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Issue scores in [0, 1]. Absent or non-numeric entries are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataIssues {
    #[serde(default, deserialize_with = "lenient_score")]
    pub missing: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub constant: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub high_cardinality: Option<f64>,
    /// Not reported for categorical columns.
    #[serde(default, deserialize_with = "lenient_score")]
    pub outlier: Option<f64>,
}

impl DataIssues {
    /// Create an empty score set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one issue score.
    pub fn with(mut self, issue: IssueType, score: f64) -> Self {
        *self.slot(issue) = Some(score);
        self
    }

    /// Score for one issue, if reported.
    pub fn get(&self, issue: IssueType) -> Option<f64> {
        match issue {
            IssueType::Missing => self.missing,
            IssueType::Constant => self.constant,
            IssueType::HighCardinality => self.high_cardinality,
            IssueType::Outlier => self.outlier,
        }
    }

    fn slot(&mut self, issue: IssueType) -> &mut Option<f64> {
        match issue {
            IssueType::Missing => &mut self.missing,
            IssueType::Constant => &mut self.constant,
            IssueType::HighCardinality => &mut self.high_cardinality,
            IssueType::Outlier => &mut self.outlier,
        }
    }
}

/// Accept any JSON value; only numbers count as scores.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Distinguish "field absent" (`None`) from "field present but null" (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Histogram of a numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `counts.len() + 1` edges when non-empty.
    pub bin_edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty() || self.bin_edges.len() < 2
    }

    /// `(label, count)` pairs, labelled `lo-hi` with two decimals.
    pub fn bins(&self) -> Vec<(String, u64)> {
        self.counts
            .iter()
            .zip(self.bin_edges.windows(2))
            .map(|(count, edges)| (format!("{:.2}-{:.2}", edges[0], edges[1]), *count))
            .collect()
    }
}

/// Count of one categorical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// Summary of a numeric column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub histogram: Option<Histogram>,
}

/// Summary of a categorical column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoricalSummary {
    /// Most frequent value.
    pub top: Option<String>,
    /// Frequency of the top value.
    pub freq: u64,
    pub value_counts: Option<Vec<ValueCount>>,
}

/// Variant payload of a column's statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
    /// Neither a `mean` nor a `top` was reported.
    #[default]
    Unknown,
}

/// How a column is charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    Numeric,
    Categorical,
    Unknown,
}

/// Statistics for one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawColumnStat", into = "RawColumnStat")]
pub struct ColumnStat {
    /// Non-null value count.
    pub count: u64,
    /// Percentage (0-100) of missing values.
    pub missing_pct: f64,
    /// Distinct non-null values.
    pub unique: u64,
    pub summary: ColumnSummary,
    pub data_issues: DataIssues,
    /// Free-text recommendations, in the service's order.
    pub recommendations: Vec<String>,
}

impl ColumnStat {
    /// Create statistics with the given summary.
    pub fn new(summary: ColumnSummary) -> Self {
        Self {
            summary,
            ..Self::default()
        }
    }

    /// Set the basic counts.
    pub fn with_counts(mut self, count: u64, missing_pct: f64, unique: u64) -> Self {
        self.count = count;
        self.missing_pct = missing_pct;
        self.unique = unique;
        self
    }

    /// Set issue scores.
    pub fn with_issues(mut self, issues: DataIssues) -> Self {
        self.data_issues = issues;
        self
    }

    /// Set recommendations.
    pub fn with_recommendations<I, S>(mut self, recommendations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommendations = recommendations.into_iter().map(Into::into).collect();
        self
    }

    /// Chart kind: numeric if a mean was reported, categorical if a top value was.
    pub fn display_kind(&self) -> DisplayKind {
        match self.summary {
            ColumnSummary::Numeric(_) => DisplayKind::Numeric,
            ColumnSummary::Categorical(_) => DisplayKind::Categorical,
            ColumnSummary::Unknown => DisplayKind::Unknown,
        }
    }

    /// Numeric summary, if any.
    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.summary {
            ColumnSummary::Numeric(n) => Some(n),
            _ => None,
        }
    }

    /// Categorical summary, if any.
    pub fn categorical(&self) -> Option<&CategoricalSummary> {
        match &self.summary {
            ColumnSummary::Categorical(c) => Some(c),
            _ => None,
        }
    }

    /// More than 20% of values are missing.
    pub fn has_missing_warning(&self) -> bool {
        self.missing_pct > 20.0
    }
}

/// Flat wire form: variant fields sit next to the common ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawColumnStat {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    missing_pct: f64,
    #[serde(default)]
    unique: u64,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    mean: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    median: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    std: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    min: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    max: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    histogram: Option<Histogram>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    top: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    freq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_counts: Option<Vec<ValueCount>>,

    #[serde(default)]
    data_issues: DataIssues,
    #[serde(default)]
    recommendations: Vec<String>,
}

impl From<RawColumnStat> for ColumnStat {
    fn from(raw: RawColumnStat) -> Self {
        let summary = if let Some(mean) = raw.mean {
            ColumnSummary::Numeric(NumericSummary {
                mean,
                median: raw.median.flatten(),
                std: raw.std.flatten(),
                min: raw.min.flatten(),
                max: raw.max.flatten(),
                histogram: raw.histogram,
            })
        } else if let Some(top) = raw.top {
            ColumnSummary::Categorical(CategoricalSummary {
                top,
                freq: raw.freq.unwrap_or(0),
                value_counts: raw.value_counts,
            })
        } else {
            ColumnSummary::Unknown
        };

        Self {
            count: raw.count,
            missing_pct: raw.missing_pct,
            unique: raw.unique,
            summary,
            data_issues: raw.data_issues,
            recommendations: raw.recommendations,
        }
    }
}

impl From<ColumnStat> for RawColumnStat {
    fn from(stat: ColumnStat) -> Self {
        let mut raw = RawColumnStat {
            count: stat.count,
            missing_pct: stat.missing_pct,
            unique: stat.unique,
            data_issues: stat.data_issues,
            recommendations: stat.recommendations,
            ..RawColumnStat::default()
        };

        match stat.summary {
            ColumnSummary::Numeric(n) => {
                raw.mean = Some(n.mean);
                raw.median = Some(n.median);
                raw.std = Some(n.std);
                raw.min = Some(n.min);
                raw.max = Some(n.max);
                raw.histogram = n.histogram;
            }
            ColumnSummary::Categorical(c) => {
                raw.top = Some(c.top);
                raw.freq = Some(c.freq);
                raw.value_counts = c.value_counts;
            }
            ColumnSummary::Unknown => {}
        }

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_column_from_wire() {
        let stat: ColumnStat = serde_json::from_value(json!({
            "count": 9,
            "missing_pct": 10.0,
            "unique": 7,
            "mean": 4.5,
            "median": 4.0,
            "std": 1.2,
            "min": 1.0,
            "max": 9.0,
            "histogram": { "bin_edges": [1.0, 5.0, 9.0], "counts": [6, 3] },
            "data_issues": { "missing": 0.1, "constant": 0.2, "high_cardinality": 0.7, "outlier": 0.0 },
            "recommendations": []
        }))
        .unwrap();

        assert_eq!(stat.display_kind(), DisplayKind::Numeric);
        let numeric = stat.numeric().unwrap();
        assert_eq!(numeric.mean, Some(4.5));
        assert_eq!(numeric.histogram.as_ref().unwrap().bins()[1], ("5.00-9.00".to_string(), 3));
        assert_eq!(stat.data_issues.get(IssueType::HighCardinality), Some(0.7));
    }

    #[test]
    fn test_null_mean_still_numeric() {
        let stat: ColumnStat = serde_json::from_value(json!({ "mean": null })).unwrap();
        assert_eq!(stat.display_kind(), DisplayKind::Numeric);
        assert_eq!(stat.numeric().unwrap().mean, None);
    }

    #[test]
    fn test_categorical_column_from_wire() {
        let stat: ColumnStat = serde_json::from_value(json!({
            "count": 4,
            "missing_pct": 0.0,
            "unique": 2,
            "top": "red",
            "freq": 3,
            "value_counts": [{ "value": "red", "count": 3 }, { "value": "blue", "count": 1 }],
            "data_issues": { "missing": 0.0, "constant": 0.75, "high_cardinality": 0.5, "outlier": null },
            "recommendations": ["Consider imputing missing values."]
        }))
        .unwrap();

        assert_eq!(stat.display_kind(), DisplayKind::Categorical);
        assert_eq!(stat.categorical().unwrap().top.as_deref(), Some("red"));
        assert_eq!(stat.data_issues.outlier, None);
        assert_eq!(stat.recommendations.len(), 1);
    }

    #[test]
    fn test_unknown_kind_and_lenient_scores() {
        let stat: ColumnStat = serde_json::from_value(json!({
            "data_issues": { "missing": "high", "constant": 0.5 }
        }))
        .unwrap();

        assert_eq!(stat.display_kind(), DisplayKind::Unknown);
        assert_eq!(stat.data_issues.missing, None);
        assert_eq!(stat.data_issues.constant, Some(0.5));
    }

    #[test]
    fn test_serialize_keeps_variant_fields_flat() {
        let stat = ColumnStat::new(ColumnSummary::Categorical(CategoricalSummary {
            top: Some("a".into()),
            freq: 2,
            value_counts: None,
        }));
        let value = serde_json::to_value(&stat).unwrap();

        assert_eq!(value["top"], json!("a"));
        assert!(value.get("mean").is_none());

        let back: ColumnStat = serde_json::from_value(value).unwrap();
        assert_eq!(back, stat);
    }

    #[test]
    fn test_missing_warning() {
        let stat = ColumnStat::default().with_counts(7, 30.0, 3);
        assert!(stat.has_missing_warning());
        assert!(!ColumnStat::default().has_missing_warning());
    }
}
