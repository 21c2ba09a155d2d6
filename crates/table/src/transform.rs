//! Cleaning transforms. Each one borrows a table and returns a new one, so
//! callers decide when the result replaces the current state.

use crate::cell::{CellKey, CellValue};
use crate::error::Result;
use crate::table::Table;
use std::collections::HashSet;

impl Table {
    /// Remove rows that exactly repeat an earlier row.
    ///
    /// The first occurrence is kept and surviving rows stay in their
    /// original order. Missing values compare equal to each other.
    #[must_use]
    pub fn drop_duplicates(&self) -> Table {
        let mut seen = HashSet::with_capacity(self.row_count());
        let mut rows = Vec::with_capacity(self.row_count());

        for row in self.rows() {
            let key: Vec<CellKey<'_>> = row.iter().map(CellValue::key).collect();
            if seen.insert(key) {
                rows.push(row.clone());
            }
        }

        Table::from_parts(self.fields().to_vec(), rows)
    }

    /// Replace missing values in numeric columns with zero.
    ///
    /// `Int` columns get `0`, `Float` columns get `0.0`; other columns are
    /// left untouched.
    #[must_use]
    pub fn fill_missing_numeric(&self) -> Table {
        let zeros: Vec<_> = self.fields().iter().map(|f| f.dtype.zero()).collect();

        let rows = self
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&zeros)
                    .map(|(cell, zero)| match zero {
                        Some(zero) if cell.is_null() => zero.clone(),
                        _ => cell.clone(),
                    })
                    .collect()
            })
            .collect();

        Table::from_parts(self.fields().to_vec(), rows)
    }

    /// Keep only the requested columns, in the requested order.
    ///
    /// Repeated names are collapsed to their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` if any requested name is not a column.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table> {
        let mut seen = HashSet::with_capacity(columns.len());
        let mut indices = Vec::with_capacity(columns.len());
        for name in columns {
            let name = name.as_ref();
            let idx = self.column_index(name)?;
            if seen.insert(idx) {
                indices.push(idx);
            }
        }

        let fields = indices.iter().map(|&i| self.fields()[i].clone()).collect();
        let rows = self
            .rows()
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table::from_parts(fields, rows))
    }
}
