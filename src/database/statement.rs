//! Executed statement handles.

use anyhow::{anyhow, Result};
use rusqlite::types::Value;
use rusqlite::Statement;

use super::bind::{self, BindValues};

/// The result of one prepared-and-executed SQL statement.
///
/// The handle owns its column names and row data; it is never reused across
/// queries. For statements that produce no result set (INSERT, UPDATE,
/// DELETE, DDL), `row_count` reports the number of affected rows instead.
#[derive(Debug, Clone)]
pub struct StatementHandle {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    affected: usize,
}

impl StatementHandle {
    /// Bind `values` and execute, materializing any produced rows.
    pub(crate) fn run(stmt: &mut Statement<'_>, values: &BindValues) -> Result<StatementHandle> {
        bind::apply(stmt, values)?;

        if stmt.column_count() == 0 {
            let affected = stmt
                .raw_execute()
                .map_err(|e| anyhow!("Failed to execute statement: {}", e))?;
            return Ok(StatementHandle {
                columns: Vec::new(),
                rows: Vec::new(),
                affected,
            });
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = Vec::new();
        let mut produced = stmt.raw_query();
        while let Some(row) = produced
            .next()
            .map_err(|e| anyhow!("Failed to read result row: {}", e))?
        {
            let mut row_values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value: Value = row
                    .get(i)
                    .map_err(|e| anyhow!("Failed to read column {}: {}", i, e))?;
                row_values.push(value);
            }
            rows.push(row_values);
        }

        Ok(StatementHandle {
            columns,
            rows,
            affected: 0,
        })
    }

    /// Number of result rows, or affected rows for statements without a
    /// result set.
    pub fn row_count(&self) -> usize {
        if self.columns.is_empty() {
            self.affected
        } else {
            self.rows.len()
        }
    }

    /// Result column names, in select order. Empty for statements without a
    /// result set.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Materialized row data, one `Vec<Value>` per row in column order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}
