//! Field metadata: declared type and per-field formatting configuration.

use serde::{Deserialize, Serialize};

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Integer,
    Float,
    /// Fixed-point decimal with explicit scale.
    Decimal,
    Text,
    Date,
}

/// Read-only view of a field, resolved once when the schema is built.
pub trait FieldDescriptor {
    /// Field name (column key in the record).
    fn name(&self) -> &str;

    /// Declared type of the field.
    fn declared_type(&self) -> FieldType;

    /// Decimal format pattern for this field. Empty when none is configured.
    fn format_pattern(&self) -> &str;

    /// True when the format pattern is neither empty nor whitespace.
    fn has_format_pattern(&self) -> bool {
        !self.format_pattern().trim().is_empty()
    }
}

/// Configuration of a single exported field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Pattern such as `#,##0.00`; only meaningful on decimal fields.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub decimal_format: String,
}

impl FieldConfig {
    /// Create a field with no format pattern.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            decimal_format: String::new(),
        }
    }

    /// Convenience: a decimal field with the given format pattern.
    pub fn decimal(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(name, FieldType::Decimal).decimal_format(pattern)
    }

    /// Set the decimal format pattern.
    pub fn decimal_format(mut self, pattern: impl Into<String>) -> Self {
        self.decimal_format = pattern.into();
        self
    }
}

impl FieldDescriptor for FieldConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> FieldType {
        self.field_type
    }

    fn format_pattern(&self) -> &str {
        &self.decimal_format
    }
}
