use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual layout used when a datetime is written out as text.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_PARSE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// The single inferred type shared by every value of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    Bool,
    Text,
    DateTime,
}

impl DataType {
    /// `Int` and `Float` columns are numeric; booleans are not.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }

    /// Widen two column types to one that can hold both.
    ///
    /// Integers widen to floats; any other disagreement falls back to text.
    #[must_use]
    pub fn unify(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int, DataType::Float) | (DataType::Float, DataType::Int) => DataType::Float,
            _ => DataType::Text,
        }
    }

    /// The value used by numeric zero-fill, `None` for non-numeric types.
    #[must_use]
    pub fn zero(self) -> Option<CellValue> {
        match self {
            DataType::Int => Some(CellValue::Int(0)),
            DataType::Float => Some(CellValue::Float(0.0)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::Text => "text",
            DataType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    String(String),
}

impl CellValue {
    /// Check if the value is missing
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The type this value contributes to column inference, `None` for nulls.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(_) => Some(DataType::Bool),
            CellValue::Int(_) => Some(DataType::Int),
            CellValue::Float(_) => Some(DataType::Float),
            CellValue::DateTime(_) => Some(DataType::DateTime),
            CellValue::String(_) => Some(DataType::Text),
        }
    }

    /// Try to get the value as a float (numeric cells only)
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get the value as an integer (integer cells only)
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render the value as text; missing values render as an empty string.
    ///
    /// Floats always keep a fractional part or exponent so they parse back
    /// as floats.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format!("{f:?}"),
            CellValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    /// Parse a single non-missing text field into its most specific value.
    /// Tries: int -> float -> bool -> datetime -> string
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        let trimmed = s.trim();

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        if let Some(dt) = parse_datetime(trimmed) {
            return CellValue::DateTime(dt);
        }

        CellValue::String(s.to_string())
    }

    /// Convert a value into the representation used by a column of `dtype`.
    ///
    /// Only widening conversions happen here: ints to floats, and anything
    /// to text.
    #[must_use]
    pub fn coerce(self, dtype: DataType) -> CellValue {
        match (self, dtype) {
            (CellValue::Null, _) => CellValue::Null,
            (CellValue::Int(i), DataType::Float) => CellValue::Float(i as f64),
            (CellValue::String(s), DataType::Text) => CellValue::String(s),
            (value, DataType::Text) => CellValue::String(value.as_text()),
            (value, _) => value,
        }
    }

    /// Key used to compare rows for duplicate detection.
    ///
    /// Floats compare by value: `-0.0` keys like `0.0` and every NaN keys alike.
    pub(crate) fn key(&self) -> CellKey<'_> {
        match self {
            CellValue::Null => CellKey::Null,
            CellValue::Bool(b) => CellKey::Bool(*b),
            CellValue::Int(i) => CellKey::Int(*i),
            CellValue::Float(f) if f.is_nan() => CellKey::Float(f64::NAN.to_bits()),
            CellValue::Float(f) if *f == 0.0 => CellKey::Float(0.0_f64.to_bits()),
            CellValue::Float(f) => CellKey::Float(f.to_bits()),
            CellValue::DateTime(dt) => CellKey::DateTime(*dt),
            CellValue::String(s) => CellKey::String(s),
        }
    }
}

/// Hashable view of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    DateTime(NaiveDateTime),
    String(&'a str),
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_PARSE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}
