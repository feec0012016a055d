//! Result Tables
//!
//! The tabular value passed between the database driver, the session state and
//! the prompt builders. Cells are JSON scalars so a table can be handed to the
//! frontend unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A rectangular query result: column names plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Create a table with columns and no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
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

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the values of one column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&Value::Null))
    }

    /// Copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Render the table as aligned plain text with a leading row index.
    ///
    /// This is the representation embedded in language model prompts.
    pub fn to_text(&self) -> String {
        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                (0..self.columns.len())
                    .map(|i| cell_text(row.get(i).unwrap_or(&Value::Null)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (name, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", name, width = *width));
        }
        for (idx, row) in cells.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{:<width$}", idx, width = index_width));
            for (cell, width) in row.iter().zip(&widths) {
                out.push_str(&format!("  {:>width$}", cell, width = *width));
            }
        }
        out
    }
}

/// Text form of a single cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
