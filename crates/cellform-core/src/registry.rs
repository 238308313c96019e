//! Registry for converters.

use crate::cache::FormatterCache;
use crate::converter::{CellConverter, ConvertError};
use crate::decimal::DecimalFormatConverter;
use crate::field::FieldDescriptor;
use crate::schema::ExportSchema;
use crate::value::{Cell, CellValue, Record};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Converted record, keyed by field name in schema order.
pub type Row = IndexMap<String, Cell>;

/// Ordered list of converters.
///
/// Registration order is priority order: for each field, the first converter
/// whose `supports` returns true does the conversion.
#[derive(Clone)]
pub struct Registry {
    converters: IndexMap<String, Arc<dyn CellConverter>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            converters: IndexMap::new(),
        }
    }

    /// Registry with the built-in converters on the process-wide cache.
    pub fn with_defaults() -> Self {
        Self::with_cache(FormatterCache::global())
    }

    /// Registry with the built-in converters on `cache`, typically one built
    /// by [`ExportSchema::build_cache`].
    pub fn with_cache(cache: Arc<FormatterCache>) -> Self {
        let mut registry = Self::new();
        registry.register(DecimalFormatConverter::with_cache(cache));
        registry
    }

    /// Register a converter.
    ///
    /// A converter with an id that is already registered replaces the old one
    /// and keeps its position.
    pub fn register(&mut self, converter: impl CellConverter + 'static) {
        self.register_arc(Arc::new(converter));
    }

    /// Register a shared converter.
    pub fn register_arc(&mut self, converter: Arc<dyn CellConverter>) {
        let id = converter.id().to_string();
        debug!(converter = %id, priority = self.converters.len(), "registered converter");
        self.converters.insert(id, converter);
    }

    /// Get a converter by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn CellConverter>> {
        self.converters.get(id).cloned()
    }

    /// Converter IDs in priority order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(|s| s.as_str())
    }

    /// Find the first converter that supports the field/value pair.
    pub fn find(
        &self,
        field: &dyn FieldDescriptor,
        value: &CellValue,
    ) -> Option<&dyn CellConverter> {
        self.converters
            .values()
            .find(|converter| converter.supports(field, value))
            .map(|converter| converter.as_ref())
    }

    /// Convert with the first supporting converter, if any.
    pub fn convert(
        &self,
        field: &dyn FieldDescriptor,
        value: &CellValue,
    ) -> Result<Option<Cell>, ConvertError> {
        match self.find(field, value) {
            Some(converter) => {
                trace!(field = field.name(), converter = converter.id(), "converting field");
                converter.convert(field, value).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Convert, or write the value as-is when no converter applies.
    pub fn convert_or_passthrough(
        &self,
        field: &dyn FieldDescriptor,
        value: &CellValue,
    ) -> Result<Cell, ConvertError> {
        Ok(self
            .convert(field, value)?
            .unwrap_or_else(|| Cell::passthrough(value.clone())))
    }

    /// Convert every schema field of a record, in schema order.
    ///
    /// Missing and null values become blank cells without consulting any
    /// converter. Fields not in the schema are ignored.
    pub fn convert_record(
        &self,
        schema: &ExportSchema,
        record: &Record,
    ) -> Result<Row, RecordError> {
        let mut row = Row::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let cell = match record.get(&field.name) {
                None | Some(CellValue::Null) => Cell::blank(),
                Some(value) => self.convert_or_passthrough(field, value).map_err(|source| {
                    RecordError::ConversionFailed {
                        field: field.name.clone(),
                        source,
                    }
                })?,
            };
            row.insert(field.name.clone(), cell);
        }
        Ok(row)
    }

    /// Convert a batch of records.
    ///
    /// With the `parallel` feature the records are spread over the rayon pool;
    /// each worker thread uses its own formatters.
    pub fn convert_records(
        &self,
        schema: &ExportSchema,
        records: &[Record],
    ) -> Vec<Result<Row, RecordError>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            records
                .par_iter()
                .map(|record| self.convert_record(schema, record))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            records
                .iter()
                .map(|record| self.convert_record(schema, record))
                .collect()
        }
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

/// Errors from converting a whole record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("conversion failed for field `{field}`: {source}")]
    ConversionFailed {
        field: String,
        #[source]
        source: ConvertError,
    },
}
