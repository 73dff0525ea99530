//! Delimited-text export of the projected table.

use serde_json::Value;

use super::projection::PreviewTable;

/// Serialize `table` as delimited text.
///
/// One header line, then one line per row, joined by `\n` without a trailing
/// newline. Every cell is written as a JSON string literal, so delimiters and
/// quotes inside values are escaped. Null or missing cells become `""`;
/// numbers and booleans are written as their text inside quotes.
pub fn to_delimited(table: &PreviewTable, delimiter: char) -> String {
    let separator = delimiter.to_string();
    let mut lines = Vec::with_capacity(table.rows.len() + 1);

    lines.push(
        table
            .columns
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(&separator),
    );

    for row in &table.rows {
        let line = table
            .columns
            .iter()
            .map(|c| quote(&cell_text(row.fields.get(c))))
            .collect::<Vec<_>>()
            .join(&separator);
        lines.push(line);
    }

    lines.join("\n")
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}
