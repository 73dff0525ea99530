//! Cell typing shared by the local transforms and profiler.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::input::DataTable;

/// Storage kind of a column, inferred from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ColumnKind {
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    /// Infer from all cells of a column. A column with rows that are all
    /// null is a float column; a column with no rows is text.
    pub(super) fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut rows = 0usize;
        let mut kind: Option<ColumnKind> = None;

        for cell in cells {
            rows += 1;
            if DataTable::is_null_value(cell) {
                continue;
            }
            let cell_kind = Self::of_cell(cell);
            let widened = match kind {
                None => cell_kind,
                Some(current) => current.widen(cell_kind),
            };
            if widened == ColumnKind::Text {
                return ColumnKind::Text;
            }
            kind = Some(widened);
        }

        match kind {
            Some(kind) => kind,
            None if rows > 0 => ColumnKind::Float,
            None => ColumnKind::Text,
        }
    }

    fn of_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if parse_bool(trimmed).is_some() {
            ColumnKind::Boolean
        } else if trimmed.parse::<i64>().is_ok() {
            ColumnKind::Integer
        } else if trimmed.parse::<f64>().is_ok() {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    fn widen(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    }

    pub(super) fn is_numeric(&self) -> bool {
        !matches!(self, ColumnKind::Text)
    }

    /// JSON value of one cell in a column of this kind.
    pub(super) fn to_json(&self, cell: &str) -> Value {
        if DataTable::is_null_value(cell) {
            return Value::Null;
        }
        let trimmed = cell.trim();
        match self {
            ColumnKind::Boolean => parse_bool(trimmed)
                .map(Value::Bool)
                .unwrap_or_else(|| Value::String(cell.to_string())),
            ColumnKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(cell.to_string())),
            ColumnKind::Float => parse_number(trimmed)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnKind::Text => Value::String(cell.to_string()),
        }
    }
}

pub(super) fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        t if t.eq_ignore_ascii_case("true") => Some(true),
        t if t.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Numeric value of a cell; booleans count as 1 and 0.
pub(super) fn parse_number(cell: &str) -> Option<f64> {
    if DataTable::is_null_value(cell) {
        return None;
    }
    if let Some(b) = parse_bool(cell) {
        return Some(if b { 1.0 } else { 0.0 });
    }
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest text form of a number; whole values print without a fraction.
pub(super) fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Order two cells numerically when both parse, else lexically.
pub(super) fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

/// Distinct non-null cells, sorted.
pub(super) fn sorted_categories<'a>(cells: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut categories: Vec<&str> = cells
        .into_iter()
        .filter(|c| !DataTable::is_null_value(c))
        .collect();
    categories.sort_by(|a, b| compare_cells(a, b));
    categories.dedup_by(|a, b| compare_cells(a, b) == Ordering::Equal);
    categories
}

/// Non-null cell counts in order of first appearance.
pub(super) fn value_counts<'a>(cells: impl IntoIterator<Item = &'a str>) -> IndexMap<&'a str, u64> {
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for cell in cells {
        if !DataTable::is_null_value(cell) {
            *counts.entry(cell).or_insert(0) += 1;
        }
    }
    counts
}

/// Most frequent non-null cell; ties go to the smallest value.
pub(super) fn mode<'a>(cells: impl IntoIterator<Item = &'a str>) -> Option<(&'a str, u64)> {
    value_counts(cells)
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| compare_cells(b, a)))
}

/// Middle value, or the mean of the middle two. Sorts `values` in place.
pub(super) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
