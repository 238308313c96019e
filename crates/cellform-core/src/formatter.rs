//! Rendering decimals with a parsed pattern.

use crate::pattern::{DecimalPattern, FormatError};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Renders decimals according to one pattern.
///
/// A formatter owns a scratch buffer and is meant to stay on the thread that
/// built it; share the [`DecimalPattern`] instead and build one per thread.
#[derive(Debug)]
pub struct DecimalFormatter {
    pattern: Arc<DecimalPattern>,
    instance_id: u64,
    buf: String,
}

impl DecimalFormatter {
    /// Fresh formatter with its own instance id.
    pub fn new(pattern: Arc<DecimalPattern>) -> Self {
        Self {
            pattern,
            instance_id: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            buf: String::new(),
        }
    }

    /// Process-unique id of this formatter instance.
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// The pattern this formatter renders with.
    pub fn pattern(&self) -> &DecimalPattern {
        &self.pattern
    }

    /// Format `value`, rounding half-up to the pattern's fraction digits.
    ///
    /// Ties round away from zero, unlike `DecimalFormat`'s half-even default:
    /// `#,##0` renders `2.5` as `3`.
    pub fn format(&mut self, value: &Decimal) -> Result<String, FormatError> {
        let pattern = &*self.pattern;
        let multiplier = pattern.multiplier();
        let scaled = if multiplier == 1 {
            *value
        } else {
            value
                .checked_mul(Decimal::from(multiplier))
                .ok_or_else(|| FormatError::Overflow {
                    value: value.to_string(),
                    multiplier,
                })?
        };

        let rounded = scaled.round_dp_with_strategy(
            pattern.max_fraction_digits(),
            RoundingStrategy::MidpointAwayFromZero,
        );
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = rounded.abs().to_string();
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

        let buf = &mut self.buf;
        buf.clear();

        let positive = pattern.positive_affixes();
        let suffix = match (negative, pattern.negative_affixes()) {
            (false, _) => {
                buf.push_str(&positive.prefix);
                &positive.suffix
            }
            (true, Some(affixes)) => {
                buf.push_str(&affixes.prefix);
                &affixes.suffix
            }
            (true, None) => {
                buf.push('-');
                buf.push_str(&positive.prefix);
                &positive.suffix
            }
        };

        let fraction = fraction.trim_end_matches('0');
        let fraction_len = fraction.len().max(pattern.min_fraction_digits() as usize);
        push_integer(buf, integer, pattern, fraction_len == 0);

        if fraction_len > 0 || pattern.decimal_always_shown() {
            buf.push('.');
            buf.push_str(fraction);
            buf.extend(std::iter::repeat_n('0', fraction_len - fraction.len()));
        }

        buf.push_str(suffix);
        Ok(buf.clone())
    }
}

/// Write the integer digits, zero-padded and grouped.
fn push_integer(buf: &mut String, digits: &str, pattern: &DecimalPattern, no_fraction: bool) {
    let significant = digits.trim_start_matches('0');
    let mut width = significant.len().max(pattern.min_integer_digits());
    if width == 0 && no_fraction {
        width = 1;
    }
    let padding = width - significant.len();

    let all = std::iter::repeat_n('0', padding).chain(significant.chars());
    for (i, c) in all.enumerate() {
        if let Some(group) = pattern.grouping_size() {
            if i > 0 && (width - i) % group == 0 {
                buf.push(',');
            }
        }
        buf.push(c);
    }
}
