//! Input and output file formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use sweeper_table::TableError;

/// MIME type of CSV downloads.
pub const CSV_MIME: &str = "text/csv";

/// MIME type of spreadsheet downloads.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Format of an uploaded file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Match a declared extension such as `.csv` (case-insensitive, the
    /// leading dot is optional).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for anything but `.csv` and `.xlsx`.
    pub fn from_extension(extension: &str) -> Result<Self, TableError> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(TableError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export target chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Csv,
    Excel,
}

impl TargetFormat {
    /// Extension of exported files, without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Excel => XLSX_MIME,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Excel => write!(f, "Excel"),
        }
    }
}

impl FromStr for TargetFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(TableError::UnsupportedTarget {
                target: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_extension(".csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_extension(".XLSX").unwrap(), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_extension("csv").unwrap(), SourceFormat::Csv);

        let err = SourceFormat::from_extension(".json").unwrap_err();
        assert!(matches!(err, TableError::UnsupportedFormat { extension } if extension == ".json"));
    }

    #[test]
    fn test_target_format_parsing() {
        assert_eq!("CSV".parse::<TargetFormat>().unwrap(), TargetFormat::Csv);
        assert_eq!("Excel".parse::<TargetFormat>().unwrap(), TargetFormat::Excel);
        assert_eq!("xlsx".parse::<TargetFormat>().unwrap(), TargetFormat::Excel);

        let err = "parquet".parse::<TargetFormat>().unwrap_err();
        assert!(matches!(err, TableError::UnsupportedTarget { target } if target == "parquet"));
    }

    #[test]
    fn test_target_mime_types() {
        assert_eq!(TargetFormat::Csv.mime_type(), "text/csv");
        assert_eq!(
            TargetFormat::Excel.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(TargetFormat::Excel.extension(), "xlsx");
    }
}
