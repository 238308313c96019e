//! Decimal fields rendered through their format pattern.

use crate::cache::FormatterCache;
use crate::converter::{CellConverter, ConvertError};
use crate::field::{FieldDescriptor, FieldType};
use crate::pattern::{rescale_half_up, rescale_target};
use crate::value::{Cell, CellValue};
use std::sync::Arc;
use tracing::trace;

/// Writes decimal fields that carry a format pattern as text cells.
///
/// When the pattern has a single `.`-separated fraction part, the value is
/// first rescaled half-up to that many places; it is then rendered with the
/// calling thread's formatter for the pattern.
#[derive(Debug, Clone)]
pub struct DecimalFormatConverter {
    cache: Arc<FormatterCache>,
}

impl Default for DecimalFormatConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DecimalFormatConverter {
    pub const ID: &'static str = "decimal-format";

    /// Converter backed by the process-wide cache.
    pub fn new() -> Self {
        Self::with_cache(FormatterCache::global())
    }

    /// Converter backed by a caller-owned cache, e.g. one sized by a schema.
    pub fn with_cache(cache: Arc<FormatterCache>) -> Self {
        Self { cache }
    }

    /// The formatter cache this converter resolves patterns through.
    pub fn cache(&self) -> &Arc<FormatterCache> {
        &self.cache
    }
}

impl CellConverter for DecimalFormatConverter {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports(&self, field: &dyn FieldDescriptor, _value: &CellValue) -> bool {
        field.declared_type() == FieldType::Decimal && field.has_format_pattern()
    }

    fn convert(
        &self,
        field: &dyn FieldDescriptor,
        value: &CellValue,
    ) -> Result<Cell, ConvertError> {
        if !self.supports(field, value) {
            return Err(ConvertError::Unsupported {
                converter: Self::ID.to_string(),
                field: field.name().to_string(),
            });
        }
        let decimal = value.as_decimal().ok_or_else(|| ConvertError::TypeMismatch {
            field: field.name().to_string(),
            expected: "decimal",
            found: value.type_name(),
        })?;

        let pattern = field.format_pattern();
        let decimal = match rescale_target(pattern) {
            Some(scale) => rescale_half_up(decimal, scale)?,
            None => *decimal,
        };
        let formatted = self.cache.resolve(pattern)?.format(&decimal)?;

        trace!(field = field.name(), pattern, %formatted, "formatted decimal cell");
        Ok(Cell::text(formatted))
    }
}
