use crate::cell::{CellValue, DataType, DATETIME_FORMAT};
use crate::error::{Result, TableError};
use crate::table::{infer_type, normalize_headers, Field, Table};
use calamine::{Data, Reader, Xlsx};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::io::Cursor;
use std::path::Path;

/// Worksheet name used when writing a table.
const SHEET_NAME: &str = "Sheet1";

/// Excel number format applied to datetime cells.
const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| CellValue::Float(dt.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map_or_else(|_| CellValue::String(s.clone()), CellValue::DateTime),
        Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

/// Spreadsheets store every number as a float; a float column holding only
/// whole numbers is read back as integers.
fn narrow_integral(values: Vec<CellValue>) -> (DataType, Vec<CellValue>) {
    let integral = values.iter().all(|v| match v {
        CellValue::Float(f) => f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15,
        CellValue::Null | CellValue::Int(_) => true,
        _ => false,
    });
    let has_value = values.iter().any(|v| !v.is_null());

    if integral && has_value {
        let narrowed = values
            .into_iter()
            .map(|v| match v {
                CellValue::Float(f) => CellValue::Int(f as i64),
                other => other,
            })
            .collect();
        (DataType::Int, narrowed)
    } else {
        (DataType::Float, values)
    }
}

impl Table {
    /// Load a table from an Excel file (first worksheet)
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_xlsx_bytes(&bytes)
    }

    /// Load a table from the first worksheet of an in-memory workbook.
    ///
    /// The first row names the columns. A workbook without worksheets, or
    /// with an empty first worksheet, yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns `Xlsx` if the bytes are not a readable workbook.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

        let Some(first) = workbook.sheet_names().first().cloned() else {
            return Ok(Table::new());
        };
        let range = workbook.worksheet_range(&first)?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(Table::new());
        };
        let header: Vec<String> = header_row
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect();

        let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); header.len()];
        for row in rows {
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(data_to_cell_value(cell));
            }
        }

        let typed = normalize_headers(header)
            .into_iter()
            .zip(columns)
            .map(|(name, values)| {
                let (dtype, values) = match infer_type(&values) {
                    DataType::Float => narrow_integral(values),
                    dtype => (dtype, values),
                };
                (Field::new(name, dtype), values)
            })
            .collect();

        Self::from_typed_columns(typed)
    }

    /// Save the table to an Excel file
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let buffer = self.to_xlsx_bytes()?;
        std::fs::write(path.as_ref(), buffer)?;
        Ok(())
    }

    /// Serialize the table into an in-memory single-sheet workbook.
    ///
    /// The header goes in the first row; missing values are left blank.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        self.write_to_worksheet(worksheet)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Write header and data to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        for (col_idx, name) in self.column_names().into_iter().enumerate() {
            worksheet.write_string(0, column_number(col_idx)?, name)?;
        }

        for (row_idx, row) in self.rows().iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| TableError::Serialize("Row index overflow".to_string()))?;

            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = column_number(col_idx)?;

                match cell {
                    CellValue::Null => {}
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    CellValue::Int(i) => {
                        // Excel numbers are f64; integers beyond 2^53 lose precision
                        worksheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    CellValue::Float(f) => {
                        worksheet.write_number(row_num, col_num, *f)?;
                    }
                    CellValue::DateTime(dt) => match to_excel_datetime(dt) {
                        Some(excel_dt) => {
                            worksheet.write_datetime_with_format(
                                row_num,
                                col_num,
                                &excel_dt,
                                &datetime_format,
                            )?;
                        }
                        // Excel serial dates stop at 1900..=9999
                        None => {
                            let text = dt.format(DATETIME_FORMAT).to_string();
                            worksheet.write_string(row_num, col_num, &text)?;
                        }
                    },
                    CellValue::String(s) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn column_number(col_idx: usize) -> Result<u16> {
    u16::try_from(col_idx).map_err(|_| TableError::Serialize("Column index overflow".to_string()))
}

fn to_excel_datetime(dt: &NaiveDateTime) -> Option<ExcelDateTime> {
    let year = u16::try_from(dt.year()).ok()?;
    let seconds = f64::from(dt.second()) + f64::from(dt.nanosecond()) / 1e9;

    ExcelDateTime::from_ymd(year, dt.month() as u8, dt.day() as u8)
        .and_then(|date| date.and_hms(dt.hour() as u16, dt.minute() as u8, seconds))
        .ok()
}
