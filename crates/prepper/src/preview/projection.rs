//! Positional service rows → named, addressable preview rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PrepError, Result};

/// One display row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    /// 0-based arrival index.
    pub id: usize,
    /// Column name → value, in column order.
    pub fields: IndexMap<String, Value>,
}

impl PreviewRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

/// The projected table shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
}

impl PreviewTable {
    /// Map each positional row onto `columns`.
    ///
    /// Fails with [`PrepError::ShapeMismatch`] on the first row whose length
    /// differs from the column count; nothing is projected in that case.
    pub fn project(columns: Vec<String>, data: Vec<Vec<Value>>) -> Result<Self> {
        let expected = columns.len();
        if let Some((row, values)) = data
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(PrepError::ShapeMismatch {
                row,
                expected,
                found: values.len(),
            });
        }

        let rows = data
            .into_iter()
            .enumerate()
            .map(|(id, values)| PreviewRow {
                id,
                fields: columns.iter().cloned().zip(values).collect(),
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom. `Null` where a row lacks it.
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows
            .iter()
            .map(|row| row.fields.get(name).unwrap_or(&Value::Null))
            .collect()
    }

    /// Positional form, as the service sends it.
    pub fn data(&self) -> Vec<Vec<Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.fields.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_assigns_sequential_ids() {
        let table = PreviewTable::project(
            vec!["a".into(), "b".into()],
            vec![vec![json!(1), json!("x")], vec![json!(2), json!(null)]],
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].id, 0);
        assert_eq!(table.rows[1].id, 1);
        assert_eq!(table.rows[0].get("b"), Some(&json!("x")));
        assert_eq!(table.rows[1].get("b"), Some(&Value::Null));
        assert_eq!(table.column("a"), vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn test_project_shape_mismatch() {
        let err = PreviewTable::project(
            vec!["a".into(), "b".into()],
            vec![vec![json!(1), json!(2)], vec![json!(3)]],
        )
        .unwrap_err();

        match err {
            PrepError::ShapeMismatch {
                row,
                expected,
                found,
            } => {
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_order_follows_columns() {
        let table = PreviewTable::project(
            vec!["z".into(), "a".into()],
            vec![vec![json!(1), json!(2)]],
        )
        .unwrap();
        let keys: Vec<&String> = table.rows[0].fields.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(table.data(), vec![vec![json!(1), json!(2)]]);
    }

    #[test]
    fn test_empty_rows() {
        let table = PreviewTable::project(vec!["a".into()], vec![]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 1);
    }
}
