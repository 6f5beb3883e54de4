use crate::error::Result;
use crate::query::table::{Table, Value};
use crate::storage::Database;

/// A SQL statement and the positional parameters bound to it.
#[derive(Debug, Clone, Default)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next positional parameter (`?1`, `?2`, ...).
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Run a query and materialize every row.
///
/// A connection scope is opened for the call and dropped before returning,
/// whether the statement succeeded or not. Errors are passed through without
/// retry.
pub async fn execute(db: &Database, query: &Query) -> Result<Table> {
    log::debug!("Executing SQL: {}", query.sql.trim());
    let query = query.clone();
    let conn = db.connect().await?;
    let table = conn
        .call(move |conn| {
            let mut stmt = conn.prepare(&query.sql)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(|c| c.to_string())
                .collect();
            let width = columns.len();
            let param_refs: Vec<&dyn rusqlite::types::ToSql> = query
                .params
                .iter()
                .map(|p| p as &dyn rusqlite::types::ToSql)
                .collect();
            let rows = stmt.query_map(param_refs.as_slice(), |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(Value::from))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?;
            let rows: std::result::Result<Vec<Vec<Value>>, _> = rows.collect();
            Ok::<Table, rusqlite::Error>(Table {
                columns,
                rows: rows?,
            })
        })
        .await;
    drop(conn);
    let table = table?;
    log::debug!("Query returned {} rows", table.len());
    Ok(table)
}
