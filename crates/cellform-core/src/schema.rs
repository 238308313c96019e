//! Export schema: per-field configuration, built once before export.
//!
//! Schemas are serializable and can be written in JSON, YAML or TOML:
//!
//! ```toml
//! [cache]
//! capacity = 128
//!
//! [[fields]]
//! name = "price"
//! type = "decimal"
//! decimal_format = "#,##0.00"
//! ```

use crate::cache::{CacheConfig, FormatterCache};
use crate::field::{FieldConfig, FieldDescriptor, FieldType};
use crate::pattern::{DecimalPattern, FormatError, MAX_SCALE, rescale_target};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Ordered field list plus cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSchema {
    #[serde(default)]
    pub cache: CacheConfig,

    /// Fields in column order.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl ExportSchema {
    /// Empty schema with default cache settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the cache configuration.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build a formatter cache sized by this schema.
    pub fn build_cache(&self) -> FormatterCache {
        FormatterCache::from_config(&self.cache)
    }

    /// Check the schema before use.
    ///
    /// Decimal formats on non-decimal fields are never used and are not checked.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.cache.capacity == 0 {
            return Err(SchemaError::InvalidCapacity);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if field.declared_type() != FieldType::Decimal || !field.has_format_pattern() {
                continue;
            }

            let pattern = field.format_pattern();
            let invalid = |source| SchemaError::InvalidFormat {
                field: field.name.clone(),
                source,
            };
            if let Some(scale) = rescale_target(pattern).filter(|&s| s > MAX_SCALE as usize) {
                return Err(invalid(FormatError::ScaleOutOfRange {
                    scale,
                    max: MAX_SCALE,
                }));
            }
            DecimalPattern::parse(pattern).map_err(invalid)?;
        }
        Ok(())
    }

    /// Read, parse and validate a schema file. The format follows the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let schema = Self::from_bytes(&data, path.to_str())?;
        schema.validate()?;
        debug!(path = %path.display(), fields = schema.fields.len(), "loaded export schema");
        Ok(schema)
    }

    /// Parse a schema from bytes, auto-detecting format.
    pub fn from_bytes(data: &[u8], path: Option<&str>) -> Result<Self, SchemaError> {
        let format = path.and_then(detect_format).unwrap_or("yaml");
        Self::from_bytes_format(data, format)
    }

    /// Parse a schema from bytes with explicit format.
    pub fn from_bytes_format(data: &[u8], format: &str) -> Result<Self, SchemaError> {
        match format {
            "json" => serde_json::from_slice(data).map_err(parse_error),
            "yaml" | "yml" => serde_yaml::from_slice(data).map_err(parse_error),
            "toml" => std::str::from_utf8(data)
                .map_err(parse_error)
                .and_then(|text| toml::from_str(text).map_err(parse_error)),
            other => Err(SchemaError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Serialize the schema in the given format.
    pub fn to_bytes(&self, format: &str) -> Result<Vec<u8>, SchemaError> {
        let text = match format {
            "json" => serde_json::to_string_pretty(self).map_err(parse_error)?,
            "yaml" | "yml" => serde_yaml::to_string(self).map_err(parse_error)?,
            "toml" => toml::to_string_pretty(self).map_err(parse_error)?,
            other => return Err(SchemaError::UnsupportedFormat(other.to_string())),
        };
        Ok(text.into_bytes())
    }
}

fn parse_error(err: impl std::fmt::Display) -> SchemaError {
    SchemaError::Parse(err.to_string())
}

/// Errors related to schema loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(String),

    #[error("unsupported schema format `{0}`")]
    UnsupportedFormat(String),

    #[error("failed to read schema {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("cache capacity must be at least 1")]
    InvalidCapacity,

    #[error("invalid decimal format on field `{field}`: {source}")]
    InvalidFormat {
        field: String,
        #[source]
        source: FormatError,
    },
}

/// Detect format from file path extension.
fn detect_format(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    match ext.to_lowercase().as_str() {
        "json" => Some("json"),
        "yaml" | "yml" => Some("yaml"),
        "toml" => Some("toml"),
        _ => None,
    }
}
