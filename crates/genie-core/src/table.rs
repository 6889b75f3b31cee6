//! Query results returned by a Genie agent.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row-oriented result table.
///
/// Cells are kept as the agent returned them: text, or `None` for SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Column names in display order
    pub columns: Vec<String>,
    /// One entry per record; each record is aligned with `columns`
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table from JSON records (`[{"col": value, ...}, ...]`).
    ///
    /// Columns follow first-seen order across all records. Missing keys and
    /// JSON nulls become `None`; non-string scalars are rendered as JSON text.
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).and_then(cell_text))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Builds a table from positional JSON rows aligned with `columns`.
    pub fn from_json_rows(columns: Vec<String>, rows: &[Vec<Value>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Self { columns, rows }
    }

    /// Returns `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// True when the table reduces to exactly one row and one column.
    pub fn is_single_value(&self) -> bool {
        self.shape() == (1, 1)
    }

    /// Returns the lone cell of a 1x1 table as display text.
    ///
    /// A NULL cell is shown as an empty string.
    pub fn single_value(&self) -> Option<String> {
        if !self.is_single_value() {
            return None;
        }
        Some(self.cell(0, 0).unwrap_or_default().to_string())
    }

    /// Returns the cell at `(row, column)`; ragged rows read as `None`.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Serializes the table as CSV with a header row and no index column.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in 0..self.rows.len() {
            let record: Vec<&str> = (0..self.columns.len())
                .map(|column| self.cell(row, column).unwrap_or(""))
                .collect();
            writer.write_record(&record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::GenieError::internal(format!("CSV flush failed: {e}")))?;
        String::from_utf8(bytes).map_err(|e| crate::GenieError::internal(e.to_string()))
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The answer part of an agent response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryPayload {
    /// Free-text answer (markdown)
    Text(String),
    /// Tabular answer produced by a SQL statement
    Table(ResultTable),
}
