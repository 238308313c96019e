//! Cellform: cell conversion for spreadsheet export.
//!
//! For each field of a record, the [`Registry`] asks its converters in
//! priority order whether they apply; the first one that does turns the
//! runtime value into the cell to write. [`DecimalFormatConverter`] renders
//! decimal fields through a per-field pattern such as `#,##0.00`, using
//! formatters drawn from a shared [`FormatterCache`].

mod cache;
mod converter;
mod decimal;
mod field;
mod formatter;
mod pattern;
mod registry;
mod schema;
mod value;

pub use cache::{
    CacheConfig, CacheStats, DEFAULT_CAPACITY, FormatterCache, FormatterFactory, FormatterHandle,
};
pub use converter::{CellConverter, ConvertError};
pub use decimal::DecimalFormatConverter;
pub use field::{FieldConfig, FieldDescriptor, FieldType};
pub use formatter::DecimalFormatter;
pub use pattern::{
    Affixes, DecimalPattern, FormatError, MAX_SCALE, rescale_half_up, rescale_target,
};
pub use registry::{RecordError, Registry, Row};
pub use schema::{ExportSchema, SchemaError};
pub use value::{Cell, CellKind, CellValue, Record, RecordExt};

pub use rust_decimal::Decimal;
