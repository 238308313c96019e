//! Converter trait and errors.

use crate::field::FieldDescriptor;
use crate::pattern::FormatError;
use crate::value::{Cell, CellValue};

/// Trait for implementing cell converters.
///
/// A converter claims a field/value pair with [`supports`](Self::supports)
/// and turns it into the cell to write with [`convert`](Self::convert).
/// Callers must check `supports` first.
pub trait CellConverter: Send + Sync {
    /// Unique identifier for this converter.
    fn id(&self) -> &str;

    /// Whether this converter applies to the field/value pair. Pure.
    fn supports(&self, field: &dyn FieldDescriptor, value: &CellValue) -> bool;

    /// Convert the value into a cell.
    fn convert(&self, field: &dyn FieldDescriptor, value: &CellValue) -> Result<Cell, ConvertError>;
}

/// Errors that can occur during conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("converter `{converter}` does not support field `{field}`")]
    Unsupported { converter: String, field: String },

    #[error("field `{field}` expected a {expected} value, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ConvertError {
    /// True for caller bugs (converting without `supports`, wrong value type)
    /// as opposed to data-driven failures such as a malformed pattern.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ConvertError::Unsupported { .. } | ConvertError::TypeMismatch { .. }
        )
    }
}
