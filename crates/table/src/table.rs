use crate::cell::{CellValue, DataType};
use crate::error::{Result, TableError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Name and inferred type of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub dtype: DataType,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Field {
            name: name.into(),
            dtype,
        }
    }
}

/// An in-memory table: named, typed columns over row-major storage.
///
/// Every row has exactly one value per field, and every non-null value in a
/// column matches that column's [`DataType`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    fields: Vec<Field>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from typed columns.
    ///
    /// Values are coerced to their field's type.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateColumnName` for repeated names and
    /// `ColumnLengthMismatch` when columns differ in length.
    pub fn from_typed_columns(columns: Vec<(Field, Vec<CellValue>)>) -> Result<Self> {
        let row_count = columns.first().map_or(0, |(_, values)| values.len());
        let mut fields = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<CellValue>> = (0..row_count)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for (field, values) in columns {
            if values.len() != row_count {
                return Err(TableError::ColumnLengthMismatch {
                    name: field.name,
                    expected: row_count,
                    actual: values.len(),
                });
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value.coerce(field.dtype));
            }
            fields.push(field);
        }

        let column_index = build_column_index(&fields)?;
        Ok(Table {
            fields,
            column_index,
            rows,
        })
    }

    /// Build a table from named columns, inferring each column's type.
    ///
    /// A column without any non-null value is typed `Float`.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<CellValue>)>) -> Result<Self> {
        let typed = columns
            .into_iter()
            .map(|(name, values)| {
                let dtype = infer_type(&values);
                (Field::new(name, dtype), values)
            })
            .collect();
        Self::from_typed_columns(typed)
    }

    /// Build a table from a header and rows of values.
    ///
    /// # Example
    /// ```
    /// use sweeper_table::{CellValue, Table};
    ///
    /// let table = Table::from_rows(
    ///     &["k", "v"],
    ///     vec![
    ///         vec![CellValue::from("a"), CellValue::from(1)],
    ///         vec![CellValue::from("b"), CellValue::Null],
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.column_names(), vec!["k", "v"]);
    /// ```
    pub fn from_rows<S: AsRef<str>>(header: &[S], rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut columns: Vec<Vec<CellValue>> = header
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != header.len() {
                return Err(TableError::LengthMismatch {
                    row: row_idx,
                    expected: header.len(),
                    actual: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Self::from_columns(
            header
                .iter()
                .map(|name| name.as_ref().to_string())
                .zip(columns)
                .collect(),
        )
    }

    /// Internal constructor for transforms that already hold valid parts.
    pub(crate) fn from_parts(fields: Vec<Field>, rows: Vec<Vec<CellValue>>) -> Self {
        let column_index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        Table {
            fields,
            column_index,
            rows,
        }
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.fields.len()
    }

    /// Check if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Get the index of a column by name
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| TableError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Get the type of a column by name
    pub fn dtype(&self, name: &str) -> Result<DataType> {
        let idx = self.column_index(name)?;
        Ok(self.fields[idx].dtype)
    }

    /// Get an entire column by name
    pub fn column(&self, name: &str) -> Result<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Get a cell by row index and column name
    pub fn get(&self, row: usize, name: &str) -> Result<&CellValue> {
        let col = self.column_index(name)?;
        self.rows
            .get(row)
            .map(|r| &r[col])
            .ok_or(TableError::RowIndexOutOfBounds {
                index: row,
                count: self.rows.len(),
            })
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Names of the numeric columns, in column order
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.dtype.is_numeric())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Total number of missing cells
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_null())
            .count()
    }

    /// First `n` rows as a new table
    #[must_use]
    pub fn head(&self, n: usize) -> Table {
        Table {
            fields: self.fields.clone(),
            column_index: self.column_index.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Convert to a list of records (column name -> value), preserving
    /// column order in each record.
    #[must_use]
    pub fn to_records(&self) -> Vec<IndexMap<String, CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.fields
                    .iter()
                    .zip(row)
                    .map(|(field, value)| (field.name.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }
}

/// Infer a column type from its values; all-null columns are `Float`.
#[must_use]
pub fn infer_type(values: &[CellValue]) -> DataType {
    values
        .iter()
        .filter_map(CellValue::data_type)
        .reduce(DataType::unify)
        .unwrap_or(DataType::Float)
}

fn build_column_index(fields: &[Field]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        if index.insert(field.name.clone(), i).is_some() {
            return Err(TableError::DuplicateColumnName {
                name: field.name.clone(),
            });
        }
    }
    Ok(index)
}

/// Turn a raw header row into unique column names.
///
/// Blank names become `Unnamed: {index}`; repeats get `.1`, `.2`, ...
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };

        let mut candidate = base.clone();
        if used.contains(&candidate) {
            let counter = repeats.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                candidate = format!("{base}.{counter}");
                if !used.contains(&candidate) {
                    break;
                }
            }
        }

        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            &["name", "age", "score"],
            vec![
                vec!["Alice".into(), 30.into(), 1.5.into()],
                vec!["Bob".into(), CellValue::Null, 2.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_infers_types() {
        let table = sample();
        assert_eq!(table.dtype("name").unwrap(), DataType::Text);
        assert_eq!(table.dtype("age").unwrap(), DataType::Int);
        assert_eq!(table.dtype("score").unwrap(), DataType::Float);
        // ints in a float column are widened
        assert_eq!(table.get(1, "score").unwrap(), &CellValue::Float(2.0));
    }

    #[test]
    fn test_all_null_column_is_float() {
        let table = Table::from_columns(vec![("x", vec![CellValue::Null, CellValue::Null])]).unwrap();
        assert_eq!(table.dtype("x").unwrap(), DataType::Float);
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let err = Table::from_rows(&["a", "b"], vec![vec![1.into()]]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_duplicate_column_name_rejected() {
        let err = Table::from_columns(vec![("a", vec![]), ("a", vec![])]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumnName { name } if name == "a"));
    }

    #[test]
    fn test_column_not_found() {
        let table = sample();
        assert!(matches!(
            table.column("missing"),
            Err(TableError::ColumnNotFound { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_numeric_columns_and_missing_count() {
        let table = sample();
        assert_eq!(table.numeric_columns(), vec!["age", "score"]);
        assert_eq!(table.missing_count(), 1);
    }

    #[test]
    fn test_head_and_records() {
        let table = sample();
        let head = table.head(1);
        assert_eq!(head.row_count(), 1);
        assert_eq!(head.column_names(), table.column_names());

        let records = table.to_records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["name", "age", "score"]);
        assert_eq!(records[1]["age"], CellValue::Null);
    }

    #[test]
    fn test_normalize_headers() {
        let names = normalize_headers(vec![
            "a".to_string(),
            String::new(),
            "a".to_string(),
            "a.1".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "a.1.1", "a.2"]);
    }
}
