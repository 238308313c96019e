//! Property tests for decimal conversion.

use proptest::prelude::*;
use rhi_cellform_core::{
    CellConverter, CellValue, Decimal, DecimalFormatConverter, DecimalPattern, FieldConfig,
    FormatterCache,
};
use rust_decimal::RoundingStrategy;
use std::str::FromStr;
use std::sync::Arc;

const SCALED_PATTERNS: &[&str] = &["#,##0.00", "0.000", "0.0", "#,##0.0000", "000.00"];
const PLAIN_PATTERNS: &[&str] = &["#,##0", "0", "#,##0.", "#,##0;(#,##0)"];

fn converter() -> DecimalFormatConverter {
    DecimalFormatConverter::with_cache(Arc::new(FormatterCache::new()))
}

fn convert(converter: &DecimalFormatConverter, pattern: &str, value: Decimal) -> String {
    let field = FieldConfig::decimal("amount", pattern);
    converter
        .convert(&field, &CellValue::from(value))
        .unwrap()
        .as_str()
        .unwrap()
        .to_string()
}

fn decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000_000i64..1_000_000_000_000i64, 0u32..=8).prop_map(|(m, s)| Decimal::new(m, s))
}

proptest! {
    #[test]
    fn rendering_is_idempotent(
        pattern in prop::sample::select(SCALED_PATTERNS),
        value in decimal(),
    ) {
        let converter = converter();
        let rendered = convert(&converter, pattern, value);

        let reparsed = Decimal::from_str(&rendered.replace(',', "")).unwrap();
        prop_assert_eq!(convert(&converter, pattern, reparsed), rendered);
    }

    #[test]
    fn fraction_digits_match_pattern(value in decimal()) {
        let rendered = convert(&converter(), "#,##0.00", value);
        let (_, fraction) = rendered.split_once('.').unwrap();
        prop_assert_eq!(fraction.len(), 2);
    }

    #[test]
    fn patterns_without_fraction_part_skip_rescaling(
        pattern in prop::sample::select(PLAIN_PATTERNS),
        value in decimal(),
    ) {
        let direct = FormatterCache::new()
            .resolve(pattern)
            .unwrap()
            .format(&value)
            .unwrap();
        prop_assert_eq!(convert(&converter(), pattern, value), direct);
    }

    #[test]
    fn rescale_rounds_half_up(value in decimal()) {
        let rendered = convert(&converter(), "0.000", value);
        let expected = value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
        prop_assert_eq!(Decimal::from_str(&rendered).unwrap(), expected);
    }
}

#[test]
fn test_pattern_equality_across_parses() {
    assert_eq!(
        DecimalPattern::parse("#,##0.00").unwrap(),
        DecimalPattern::parse("#,##0.00").unwrap()
    );
}
