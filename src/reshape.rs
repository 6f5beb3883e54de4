//! Wide/long reshaping of query results.
//!
//! A wide table has one row per entity and one column per measurement. The
//! long form has one row per (entity, variable, value) triple.

use serde::Serialize;

use crate::error::Result;
use crate::query::{Table, Value};

/// One (entity, variable, value) triple of a long table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub id: String,
    pub variable: String,
    pub value: Value,
}

/// Unpivot every non-id column of `table` into long rows.
///
/// Rows come out column by column: all entities for the first value column,
/// then all entities for the second, and so on. Filtering the result to one
/// entity therefore preserves the original column order.
pub fn melt(table: &Table, id_column: &str) -> Result<Vec<LongRow>> {
    let id_idx = table.column_index(id_column)?;
    let mut out = Vec::with_capacity(table.len() * table.columns.len().saturating_sub(1));
    for (col_idx, variable) in table.columns.iter().enumerate() {
        if col_idx == id_idx {
            continue;
        }
        for row in &table.rows {
            out.push(LongRow {
                id: row[id_idx].to_display_string(),
                variable: variable.clone(),
                value: row[col_idx].clone(),
            });
        }
    }
    Ok(out)
}

/// Regroup long rows by entity, the inverse of [`melt`].
///
/// Entities and variables keep the order in which they first appear. An
/// entity with no value for some variable gets `Null` in that cell. Ids come
/// back as text.
pub fn pivot(rows: &[LongRow], id_column: &str) -> Table {
    let mut variables: Vec<&str> = Vec::new();
    let mut ids: Vec<&str> = Vec::new();
    for row in rows {
        if !variables.contains(&row.variable.as_str()) {
            variables.push(&row.variable);
        }
        if !ids.contains(&row.id.as_str()) {
            ids.push(&row.id);
        }
    }

    let mut columns = Vec::with_capacity(variables.len() + 1);
    columns.push(id_column.to_string());
    columns.extend(variables.iter().map(|v| v.to_string()));

    let mut table = Table::new(columns);
    for id in &ids {
        let mut out_row = vec![Value::Null; variables.len() + 1];
        out_row[0] = Value::from(*id);
        for row in rows.iter().filter(|r| r.id == *id) {
            if let Some(pos) = variables.iter().position(|v| *v == row.variable) {
                out_row[pos + 1] = row.value.clone();
            }
        }
        table.rows.push(out_row);
    }
    table
}

/// Rows belonging to one entity, in their original order.
pub fn select_id<'a>(rows: &'a [LongRow], id: &str) -> Vec<&'a LongRow> {
    rows.iter().filter(|r| r.id == id).collect()
}

/// Distinct ids in first-appearance order.
pub fn unique_ids(rows: &[LongRow]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for row in rows {
        if !ids.contains(&row.id) {
            ids.push(row.id.clone());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide() -> Table {
        Table {
            columns: vec!["User ID".into(), "A".into(), "B".into()],
            rows: vec![
                vec![Value::Integer(7), Value::Real(1.5), Value::Integer(2)],
                vec![Value::from("U2"), Value::Real(0.0), Value::Integer(0)],
            ],
        }
    }

    #[test]
    fn test_melt_is_column_major() {
        let long = melt(&wide(), "User ID").unwrap();
        let triples: Vec<(&str, &str)> = long
            .iter()
            .map(|r| (r.id.as_str(), r.variable.as_str()))
            .collect();
        assert_eq!(
            triples,
            vec![("7", "A"), ("U2", "A"), ("7", "B"), ("U2", "B")]
        );
        assert_eq!(long[0].value, Value::Real(1.5));
    }

    #[test]
    fn test_melt_missing_id_column() {
        assert!(melt(&wide(), "Userid").is_err());
    }

    #[test]
    fn test_melt_empty_table() {
        let table = Table::new(vec!["User ID".into(), "A".into()]);
        assert!(melt(&table, "User ID").unwrap().is_empty());
    }

    #[test]
    fn test_pivot_reconstructs_values() {
        let original = wide();
        let back = pivot(&melt(&original, "User ID").unwrap(), "User ID");

        assert_eq!(back.columns, original.columns);
        assert_eq!(back.len(), 2);
        assert_eq!(back.rows[0][0], Value::from("7"));
        assert_eq!(back.rows[0][1..], original.rows[0][1..]);
        assert_eq!(back.rows[1], original.rows[1]);
    }

    #[test]
    fn test_pivot_fills_gaps_with_null() {
        let rows = vec![
            LongRow {
                id: "U1".into(),
                variable: "A".into(),
                value: Value::Integer(1),
            },
            LongRow {
                id: "U2".into(),
                variable: "B".into(),
                value: Value::Integer(2),
            },
        ];
        let table = pivot(&rows, "id");
        assert_eq!(table.columns, vec!["id", "A", "B"]);
        assert!(table.rows[0][2].is_null());
        assert!(table.rows[1][1].is_null());
    }

    #[test]
    fn test_select_and_unique_ids() {
        let long = melt(&wide(), "User ID").unwrap();
        assert_eq!(unique_ids(&long), vec!["7", "U2"]);

        let picked = select_id(&long, "U2");
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|r| r.id == "U2"));
        assert!(select_id(&long, "nobody").is_empty());
    }
}
