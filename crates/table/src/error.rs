use thiserror::Error;

/// Errors that can occur while loading, transforming or writing a table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Unsupported export target: {target}")]
    UnsupportedTarget { target: String },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Row index out of bounds: {index} (table has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Data length mismatch at row {row}: expected {expected} fields, got {actual}")]
    LengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{name}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name: {name}")]
    DuplicateColumnName { name: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Excel error: {0}")]
    Xlsx(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::XlsxError> for TableError {
    fn from(err: calamine::XlsxError) -> Self {
        TableError::Xlsx(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for TableError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        TableError::Xlsx(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
