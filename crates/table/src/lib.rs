//! Table module for sweeper
//!
//! An in-memory table of named, typed columns, the CSV and XLSX codecs that
//! load and store it, and the cleaning transforms applied to it.
//!
//! # Examples
//!
//! ## Loading from CSV
//!
//! ```
//! use sweeper_table::{CellValue, DataType, Table};
//!
//! let table = Table::from_csv_str("k,v\na,1\na,1\nb,2").unwrap();
//!
//! assert_eq!(table.row_count(), 3);
//! assert_eq!(table.dtype("v").unwrap(), DataType::Int);
//! ```
//!
//! ## Cleaning
//!
//! ```
//! use sweeper_table::{CellValue, Table};
//!
//! let table = Table::from_csv_str("k,v\na,1\na,1\nb,\nb,").unwrap();
//!
//! let cleaned = table.drop_duplicates().fill_missing_numeric();
//! assert_eq!(cleaned.row_count(), 2);
//! assert_eq!(cleaned.get(1, "v").unwrap(), &CellValue::Int(0));
//!
//! let keys = cleaned.project(&["k"]).unwrap();
//! assert_eq!(keys.column_names(), vec!["k"]);
//! ```
//!
//! ## Writing
//!
//! ```
//! use sweeper_table::Table;
//!
//! let table = Table::from_csv_str("k,v\na,1").unwrap();
//! let xlsx = table.to_xlsx_bytes().unwrap();
//! let restored = Table::from_xlsx_bytes(&xlsx).unwrap();
//! assert_eq!(restored, table);
//! ```

mod cell;
mod csv;
mod error;
mod table;
mod transform;
mod xlsx;

/// Re-export cell value types.
pub use cell::{CellValue, DataType};
/// Re-export CSV options.
pub use csv::{CsvOptions, DEFAULT_NULL_VALUES};
/// Re-export table error types.
pub use error::{Result, TableError};
/// Re-export the table type.
pub use table::{infer_type, Field, Table};
