//! Table transformations for the in-process service.
//!
//! Each function takes the current table and returns a new one; the caller
//! pushes it onto the session stack only when the transformation succeeds.

use crate::error::{PrepError, Result};
use crate::input::DataTable;
use crate::transform::{
    EncodeMethod, ImputeMethod, ScaleMethod, TransformRequest, Transformation,
};

use super::values::{format_number, median, mode, parse_number, sorted_categories};

/// Apply one request to a copy of `table`.
pub(super) fn apply(table: &DataTable, request: &TransformRequest) -> Result<DataTable> {
    let indices = request
        .columns()
        .iter()
        .map(|column| {
            table.column_index(column).ok_or_else(|| {
                PrepError::Transformation(format!("Column '{}' not found", column))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut out = table.clone();
    match request.transformation() {
        Transformation::Impute { method } => {
            for &index in &indices {
                impute(&mut out, index, method)?;
            }
        }
        Transformation::Encode { method } => match method {
            EncodeMethod::Onehot => onehot(&mut out, request.columns()),
            EncodeMethod::Ordinal => {
                for &index in &indices {
                    ordinal(&mut out, index);
                }
            }
        },
        Transformation::Scale { method } => {
            for &index in &indices {
                scale(&mut out, index, *method)?;
            }
        }
        Transformation::Drop => {
            for column in request.columns() {
                if let Some(index) = out.column_index(column) {
                    out.remove_column(index);
                }
            }
        }
    }

    Ok(out)
}

/// Non-null values of a numeric column, or an error naming the column.
fn numeric_values(table: &DataTable, index: usize) -> Result<Vec<Option<f64>>> {
    table
        .column_values(index)
        .map(|cell| {
            if DataTable::is_null_value(cell) {
                Ok(None)
            } else {
                parse_number(cell).map(Some).ok_or_else(|| {
                    PrepError::Transformation(format!(
                        "Column '{}' is not numeric (value '{}')",
                        table.headers[index], cell
                    ))
                })
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn impute(table: &mut DataTable, index: usize, method: &ImputeMethod) -> Result<()> {
    let fill = match method {
        ImputeMethod::Mean | ImputeMethod::Median => {
            let mut present: Vec<f64> =
                numeric_values(table, index)?.into_iter().flatten().collect();
            let value = match method {
                ImputeMethod::Mean => mean(&present),
                _ => median(&mut present),
            };
            // an all-null column has nothing to average; leave it as is
            value.map(format_number)
        }
        ImputeMethod::Mode => {
            let (value, _) = mode(table.column_values(index)).ok_or_else(|| {
                PrepError::Transformation(format!(
                    "Column '{}' has no values to take the mode of",
                    table.headers[index]
                ))
            })?;
            Some(value.to_string())
        }
        ImputeMethod::Constant(value) => Some(value.clone()),
    };

    if let Some(fill) = fill {
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(index) {
                if DataTable::is_null_value(cell) {
                    *cell = fill.clone();
                }
            }
        }
    }
    Ok(())
}

/// Replace each column with `<column>_<value>` indicator columns appended at
/// the end, one per distinct non-null value in sorted order.
fn onehot(table: &mut DataTable, columns: &[String]) {
    let mut blocks: Vec<(Vec<String>, Vec<Vec<String>>)> = Vec::new();

    for column in columns {
        let Some(index) = table.column_index(column) else {
            continue;
        };
        let categories: Vec<String> = sorted_categories(table.column_values(index))
            .into_iter()
            .map(str::to_string)
            .collect();
        let headers: Vec<String> = categories
            .iter()
            .map(|value| format!("{}_{}", column, value))
            .collect();
        let rows: Vec<Vec<String>> = table
            .column_values(index)
            .map(|cell| {
                categories
                    .iter()
                    .map(|value| (cell == value.as_str()).to_string())
                    .collect()
            })
            .collect();
        blocks.push((headers, rows));
    }

    for column in columns {
        if let Some(index) = table.column_index(column) {
            table.remove_column(index);
        }
    }

    for (headers, rows) in blocks {
        table.headers.extend(headers);
        for (row, indicators) in table.rows.iter_mut().zip(rows) {
            row.extend(indicators);
        }
    }
}

/// Replace values with their position among the sorted categories; null is -1.
fn ordinal(table: &mut DataTable, index: usize) {
    let categories: Vec<String> = sorted_categories(table.column_values(index))
        .into_iter()
        .map(str::to_string)
        .collect();

    for row in &mut table.rows {
        if let Some(cell) = row.get_mut(index) {
            let code = categories
                .iter()
                .position(|c| *c == *cell)
                .map(|p| p as i64)
                .unwrap_or(-1);
            *cell = code.to_string();
        }
    }
}

fn scale(table: &mut DataTable, index: usize, method: ScaleMethod) -> Result<()> {
    let values = numeric_values(table, index)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return Ok(());
    }

    let (offset, divisor) = match method {
        ScaleMethod::Standard => {
            let mean = mean(&present).unwrap_or(0.0);
            let variance =
                present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / present.len() as f64;
            (mean, variance.sqrt())
        }
        ScaleMethod::Minmax => {
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (min, max - min)
        }
    };
    // zero spread scales by one so constant columns become all zeros
    let divisor = if divisor == 0.0 { 1.0 } else { divisor };

    for (row, value) in table.rows.iter_mut().zip(values) {
        if let (Some(cell), Some(value)) = (row.get_mut(index), value) {
            *cell = format_number((value - offset) / divisor);
        }
    }
    Ok(())
}
