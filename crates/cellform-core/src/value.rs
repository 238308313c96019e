//! Cell values: what a field holds at runtime and what gets written out.

use rust_decimal::Decimal;

/// A runtime field value handed in by the export pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl CellValue {
    /// True for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The decimal, if this is a `Decimal`.
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            CellValue::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// The string, if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Decimal(_) => "decimal",
            CellValue::Text(_) => "text",
        }
    }

    /// The cell kind this value is written as when no converter claims it.
    pub fn natural_kind(&self) -> CellKind {
        match self {
            CellValue::Null => CellKind::Blank,
            CellValue::Bool(_) => CellKind::Boolean,
            CellValue::Int(_) | CellValue::Float(_) | CellValue::Decimal(_) => CellKind::Number,
            CellValue::Text(_) => CellKind::Text,
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<Decimal> for CellValue {
    fn from(d: Decimal) -> Self {
        CellValue::Decimal(d)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(CellValue::Null, Into::into)
    }
}

/// Representation type of a spreadsheet cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Blank,
    Boolean,
    Number,
    Text,
}

/// A (kind, value) pair ready to be written into one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellKind,
    pub value: CellValue,
}

impl Cell {
    /// An empty cell.
    pub fn blank() -> Self {
        Self {
            kind: CellKind::Blank,
            value: CellValue::Null,
        }
    }

    /// A string-valued cell.
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Text,
            value: CellValue::Text(s.into()),
        }
    }

    /// A cell holding `value` as-is, typed by [`CellValue::natural_kind`].
    pub fn passthrough(value: CellValue) -> Self {
        Self {
            kind: value.natural_kind(),
            value,
        }
    }

    /// Text content of a text cell.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// One record (object) of the export, keyed by field name.
pub type Record = indexmap::IndexMap<String, CellValue>;

/// Extension trait for building records ergonomically.
pub trait RecordExt {
    fn with(self, field: impl Into<String>, value: impl Into<CellValue>) -> Self;
}

impl RecordExt for Record {
    fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(field.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_value_conversions() {
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert_eq!(CellValue::from(42i64), CellValue::Int(42));
        assert_eq!(CellValue::from("hello"), CellValue::Text("hello".into()));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert!(CellValue::from(None::<&str>).is_null());
        assert_eq!(CellValue::from(true).as_bool(), Some(true));
        assert_eq!(CellValue::from(1i64).as_bool(), None);
    }

    #[test]
    fn test_natural_kind() {
        let d = Decimal::from_str("1.50").unwrap();
        assert_eq!(CellValue::from(d).natural_kind(), CellKind::Number);
        assert_eq!(CellValue::Null.natural_kind(), CellKind::Blank);
        assert_eq!(CellValue::from("x").natural_kind(), CellKind::Text);
        assert_eq!(CellValue::from(false).natural_kind(), CellKind::Boolean);
    }

    #[test]
    fn test_record_builder() {
        let record = Record::new().with("id", 7i64).with("label", "seven");

        assert_eq!(record.get("id").and_then(CellValue::as_i64), Some(7));
        assert_eq!(record.get("label").and_then(CellValue::as_str), Some("seven"));
    }
}
