use crate::cell::{CellValue, DataType};
use crate::error::{Result, TableError};
use crate::table::{normalize_headers, Field, Table};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Field values read as missing in addition to empty fields.
pub const DEFAULT_NULL_VALUES: [&str; 13] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "#NA", "<NA>",
];

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Tokens read as missing values; blank fields are always missing
    pub null_values: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl CsvOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the set of missing-value tokens
    #[must_use]
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    fn is_null(&self, field: &str) -> bool {
        let trimmed = field.trim();
        trimmed.is_empty() || self.null_values.iter().any(|token| token == trimmed)
    }
}

impl Table {
    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(BufReader::new(file), &CsvOptions::default())
    }

    /// Load a table from CSV bytes
    pub fn from_csv_bytes(bytes: &[u8], options: &CsvOptions) -> Result<Self> {
        Self::from_csv_reader(bytes, options)
    }

    /// Load a table from a CSV string with default options
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), &CsvOptions::default())
    }

    /// Load a table from a reader.
    ///
    /// The first record names the columns. Short records are padded with
    /// missing values.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for input without a header, `LengthMismatch` when a
    /// record has more fields than the header, and `Csv` for malformed input.
    pub fn from_csv_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() {
            return Err(TableError::Parse("No columns to parse from file".to_string()));
        }
        let width = header.len();

        let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if record.len() > width {
                return Err(TableError::LengthMismatch {
                    row: row_idx + 1,
                    expected: width,
                    actual: record.len(),
                });
            }
            for (col_idx, column) in raw_columns.iter_mut().enumerate() {
                let field = record
                    .get(col_idx)
                    .filter(|field| !options.is_null(field))
                    .map(str::to_string);
                column.push(field);
            }
        }

        let columns = normalize_headers(header)
            .into_iter()
            .zip(raw_columns)
            .map(|(name, raw)| typed_column(name, raw))
            .collect();

        Self::from_typed_columns(columns)
    }

    /// Save the table to a CSV file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file), &CsvOptions::default())
    }

    /// Write the header and rows to a writer as CSV.
    ///
    /// Missing values become empty fields.
    pub fn write_csv<W: Write>(&self, writer: W, options: &CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_writer(writer);

        csv_writer.write_record(self.column_names())?;
        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::as_text).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Serialize the table into an in-memory CSV buffer
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, &CsvOptions::default())?;
        Ok(buffer)
    }

    /// Convert the table to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        // writing into a Vec cannot fail
        let buffer = self.to_csv_bytes().unwrap_or_default();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

/// Infer a column type from raw text fields and convert them.
///
/// Text columns keep the fields exactly as written.
fn typed_column(name: String, raw: Vec<Option<String>>) -> (Field, Vec<CellValue>) {
    let parsed: Vec<CellValue> = raw
        .iter()
        .map(|field| field.as_deref().map_or(CellValue::Null, CellValue::parse))
        .collect();
    let dtype = crate::table::infer_type(&parsed);

    let values = if dtype == DataType::Text {
        raw.into_iter().map(CellValue::from).collect()
    } else {
        parsed
    };

    (Field::new(name, dtype), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_csv_str() {
        let csv = "name,age,city\nAlice,30,NYC\nBob,25,LA";
        let table = Table::from_csv_str(csv).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["name", "age", "city"]);
        assert_eq!(table.get(0, "age").unwrap(), &CellValue::Int(30));
        assert_eq!(
            table.get(1, "city").unwrap(),
            &CellValue::String("LA".to_string())
        );
    }

    #[test]
    fn test_type_inference_per_column() {
        let csv = "s,i,f,b,mixed,empty\nhello,42,3.5,true,1,\nworld,7,2,FALSE,x,";
        let table = Table::from_csv_str(csv).unwrap();

        assert_eq!(table.dtype("s").unwrap(), DataType::Text);
        assert_eq!(table.dtype("i").unwrap(), DataType::Int);
        assert_eq!(table.dtype("f").unwrap(), DataType::Float);
        assert_eq!(table.dtype("b").unwrap(), DataType::Bool);
        assert_eq!(table.dtype("mixed").unwrap(), DataType::Text);
        assert_eq!(table.dtype("empty").unwrap(), DataType::Float);

        assert_eq!(table.get(1, "f").unwrap(), &CellValue::Float(2.0));
        assert_eq!(
            table.get(0, "mixed").unwrap(),
            &CellValue::String("1".to_string())
        );
        assert!(table.get(0, "empty").unwrap().is_null());
    }

    #[test]
    fn test_null_tokens() {
        let csv = "v\n1\nNA\n \n3\nnull";
        let table = Table::from_csv_str(csv).unwrap();
        assert_eq!(table.dtype("v").unwrap(), DataType::Int);
        assert_eq!(table.missing_count(), 3);

        let options = CsvOptions::default().with_null_values(Vec::<String>::new());
        let table = Table::from_csv_bytes(b"v\n1\nNA", &options).unwrap();
        assert_eq!(table.dtype("v").unwrap(), DataType::Text);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_csv_str("a,b\n1,2\n3").unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(table.get(1, "b").unwrap().is_null());
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = Table::from_csv_str("a,b\n1,2,3").unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { row: 1, expected: 2, actual: 3 }));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(Table::from_csv_str(""), Err(TableError::Parse(_))));
    }

    #[test]
    fn test_header_normalization() {
        let table = Table::from_csv_str("a,,a\n1,2,3").unwrap();
        assert_eq!(table.column_names(), vec!["a", "Unnamed: 1", "a.1"]);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let options = CsvOptions::default().with_delimiter(b';');
        let table = Table::from_csv_bytes(b"a;b\n1;x", &options).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_to_csv_string() {
        let table = Table::from_csv_str("k,v,f\na,1,1.0\nb,,2.5").unwrap();
        let csv = table.to_csv_string();
        assert_eq!(csv, "k,v,f\na,1,1.0\nb,,2.5\n");
    }

    #[test]
    fn test_csv_roundtrip() {
        let original =
            Table::from_csv_str("name,n,x,ok,when\n\"Smith, J\",1,0.5,true,2024-01-02 03:04:05\nLee,,,false,")
                .unwrap();

        let restored = Table::from_csv_str(&original.to_csv_string()).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_save_and_load_csv_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");

        let table = Table::from_csv_str("a,b\n1,2\n3,4").unwrap();
        table.save_as_csv(&file_path).unwrap();

        let loaded = Table::from_csv(&file_path).unwrap();
        assert_eq!(loaded, table);
    }
}
