//! Loading schemas from disk and converting records with them.

use rhi_cellform_core::{
    CellKind, Decimal, ExportSchema, FormatError, Record, RecordExt, Registry, SchemaError,
};
use std::fs;
use std::str::FromStr;
use std::sync::Arc;

const SCHEMA_TOML: &str = r##"
[cache]
capacity = 4

[[fields]]
name = "sku"
type = "text"

[[fields]]
name = "price"
type = "decimal"
decimal_format = "#,##0.00"

[[fields]]
name = "rate"
type = "decimal"
decimal_format = "0.000"
"##;

#[test]
fn test_load_toml_and_convert() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.toml");
    fs::write(&path, SCHEMA_TOML).unwrap();

    let schema = ExportSchema::load(&path).unwrap();
    assert_eq!(schema.cache.capacity, 4);

    let cache = Arc::new(schema.build_cache());
    let registry = Registry::with_cache(Arc::clone(&cache));
    let record = Record::new()
        .with("sku", "A-1")
        .with("price", Decimal::from_str("1234.5").unwrap())
        .with("rate", Decimal::from_str("2.71828").unwrap());

    let row = registry.convert_record(&schema, &record).unwrap();

    assert_eq!(row["sku"].kind, CellKind::Text);
    assert_eq!(row["price"].as_str(), Some("1,234.50"));
    assert_eq!(row["rate"].as_str(), Some("2.718"));
    assert_eq!(cache.capacity(), 4);
    assert!(cache.contains("#,##0.00") && cache.contains("0.000"));
}

#[test]
fn test_load_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let schema = ExportSchema::from_bytes(SCHEMA_TOML.as_bytes(), Some("export.toml")).unwrap();

    for ext in ["yaml", "json"] {
        let path = dir.path().join(format!("export.{ext}"));
        fs::write(&path, schema.to_bytes(ext).unwrap()).unwrap();

        assert_eq!(ExportSchema::load(&path).unwrap(), schema);
    }
}

#[test]
fn test_load_rejects_malformed_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        "fields:\n  - name: total\n    type: decimal\n    decimal_format: \"###.##.##\"\n",
    )
    .unwrap();

    match ExportSchema::load(&path) {
        Err(SchemaError::InvalidFormat { field, source }) => {
            assert_eq!(field, "total");
            assert!(matches!(source, FormatError::MultipleDecimalSeparators { .. }));
        }
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ExportSchema::load(dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, SchemaError::Io { .. }));
}
