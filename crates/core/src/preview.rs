//! Table previews.

use indexmap::IndexMap;
use serde::Serialize;
use sweeper_table::{CellValue, DataType, Table};

/// Rows shown when no count is requested.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Clamp a requested row count to `[min(10, rows), rows]`.
#[must_use]
pub fn clamp_rows(requested: Option<usize>, row_count: usize) -> usize {
    let floor = DEFAULT_PREVIEW_ROWS.min(row_count);
    requested.unwrap_or(DEFAULT_PREVIEW_ROWS).clamp(floor, row_count)
}

/// Column header of a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewColumn {
    pub name: String,
    pub dtype: DataType,
}

/// The first rows of a table together with its shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub file: String,
    pub total_rows: usize,
    pub missing: usize,
    pub columns: Vec<PreviewColumn>,
    pub rows: Vec<IndexMap<String, CellValue>>,
}

impl TablePreview {
    #[must_use]
    pub fn new(file: &str, table: &Table, requested: Option<usize>) -> Self {
        let shown = clamp_rows(requested, table.row_count());
        Self {
            file: file.to_string(),
            total_rows: table.row_count(),
            missing: table.missing_count(),
            columns: table
                .fields()
                .iter()
                .map(|f| PreviewColumn {
                    name: f.name.clone(),
                    dtype: f.dtype,
                })
                .collect(),
            rows: table.head(shown).to_records(),
        }
    }

    #[must_use]
    pub fn shown_rows(&self) -> usize {
        self.rows.len()
    }
}
