//! Decimal format patterns.
//!
//! A pattern such as `#,##0.00` describes how a decimal is rendered:
//! minimum integer digits, grouping, and the fraction digit range. The
//! grammar is a subset of the familiar spreadsheet/`DecimalFormat` one:
//!
//! ```text
//! pattern    := subpattern (';' subpattern)?
//! subpattern := prefix integer ('.' fraction)? suffix
//! integer    := ('#' | ',')* ('0' | ',')*
//! fraction   := '0'* '#'*
//! ```
//!
//! Prefix and suffix are literal text. `'...'` quotes special characters and
//! `''` is a literal quote. `%` and `‰` scale the value by 100 and 1000.
//! The second subpattern, if any, only supplies the negative prefix/suffix.

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest scale a [`Decimal`] can carry.
pub const MAX_SCALE: u32 = 28;

/// Errors from parsing a pattern or from rendering a value with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("empty format pattern")]
    Empty,

    #[error("multiple decimal separators in pattern `{pattern}`")]
    MultipleDecimalSeparators { pattern: String },

    #[error("malformed pattern `{pattern}`: {reason}")]
    Malformed {
        pattern: String,
        reason: &'static str,
    },

    #[error("unquoted special character `{ch}` at position {position} in pattern `{pattern}`")]
    UnquotedSpecial {
        pattern: String,
        ch: char,
        position: usize,
    },

    #[error("unterminated quote in pattern `{pattern}`")]
    UnterminatedQuote { pattern: String },

    #[error("pattern `{pattern}` has no digit placeholders")]
    MissingDigits { pattern: String },

    #[error("pattern `{pattern}` uses unsupported {feature}")]
    Unsupported {
        pattern: String,
        feature: &'static str,
    },

    #[error("scale {scale} exceeds the maximum decimal scale of {max}")]
    ScaleOutOfRange { scale: usize, max: u32 },

    #[error("value {value} overflows when multiplied by {multiplier}")]
    Overflow { value: String, multiplier: u32 },
}

/// Literal text around the number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affixes {
    pub prefix: String,
    pub suffix: String,
}

impl Affixes {
    fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

/// A parsed decimal format pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalPattern {
    source: String,
    positive: Affixes,
    negative: Option<Affixes>,
    min_integer_digits: usize,
    grouping_size: Option<usize>,
    min_fraction_digits: u32,
    max_fraction_digits: u32,
    decimal_always_shown: bool,
    multiplier: u32,
}

impl DecimalPattern {
    /// Parse a pattern string.
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        if source.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut parser = Parser::new(source);
        let (positive, more) = parser.subpattern()?;
        let negative = if more {
            let (negative, more) = parser.subpattern()?;
            if more {
                return Err(parser.malformed("more than two subpatterns"));
            }
            // A trailing `;` with nothing after it declares no negative form.
            Some(negative.affixes)
                .filter(|affixes| !affixes.is_empty() || negative.number.has_digits())
        } else {
            None
        };

        let number = positive.number;
        if !number.has_digits() {
            return Err(FormatError::MissingDigits {
                pattern: source.to_string(),
            });
        }

        Ok(Self {
            source: source.to_string(),
            positive: positive.affixes,
            negative,
            min_integer_digits: number.integer_zeros,
            grouping_size: number.grouping.filter(|&size| size > 0),
            min_fraction_digits: number.fraction_zeros,
            max_fraction_digits: number.fraction_zeros + number.fraction_hashes,
            decimal_always_shown: number.has_decimal_point
                && number.fraction_zeros + number.fraction_hashes == 0,
            multiplier: positive.multiplier,
        })
    }

    /// The pattern text this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Prefix and suffix used for zero and positive values.
    pub fn positive_affixes(&self) -> &Affixes {
        &self.positive
    }

    /// Affixes of an explicit negative subpattern, if the pattern has one.
    pub fn negative_affixes(&self) -> Option<&Affixes> {
        self.negative.as_ref()
    }

    /// Count of `0` placeholders in the integer part.
    pub fn min_integer_digits(&self) -> usize {
        self.min_integer_digits
    }

    /// Digits between grouping separators, `None` when the pattern has no `,`.
    pub fn grouping_size(&self) -> Option<usize> {
        self.grouping_size
    }

    /// Fraction digits always written, padded with zeros.
    pub fn min_fraction_digits(&self) -> u32 {
        self.min_fraction_digits
    }

    /// Fraction digits kept after rounding.
    pub fn max_fraction_digits(&self) -> u32 {
        self.max_fraction_digits
    }

    /// True for patterns ending in `.` with no fraction placeholders.
    pub fn decimal_always_shown(&self) -> bool {
        self.decimal_always_shown
    }

    /// 100 for `%`, 1000 for `‰`, otherwise 1.
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }
}

/// Scale a pattern asks the value to be rescaled to before rendering.
///
/// The pattern is split on every `.` with trailing empty segments dropped.
/// Exactly two segments yield the character length of the second one;
/// anything else yields `None` and the value keeps its own scale.
pub fn rescale_target(pattern: &str) -> Option<usize> {
    let mut parts: Vec<&str> = pattern.split('.').collect();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    match parts.as_slice() {
        [_, fraction] => Some(fraction.chars().count()),
        _ => None,
    }
}

/// Round `value` half-up to `scale` fractional digits.
///
/// The result carries exactly `scale` digits when the 96-bit mantissa has
/// room for the trailing zeros; otherwise it keeps the shorter scale and the
/// formatter pads the fraction. Fails only when `scale` exceeds [`MAX_SCALE`].
pub fn rescale_half_up(value: &Decimal, scale: usize) -> Result<Decimal, FormatError> {
    let target = u32::try_from(scale)
        .ok()
        .filter(|&s| s <= MAX_SCALE)
        .ok_or(FormatError::ScaleOutOfRange {
            scale,
            max: MAX_SCALE,
        })?;

    let rounded = value.round_dp_with_strategy(target, RoundingStrategy::MidpointAwayFromZero);
    let mut padded = rounded;
    padded.rescale(target);
    Ok(if padded == rounded { padded } else { rounded })
}

#[derive(Debug, Default)]
struct NumberPart {
    integer_hashes: usize,
    integer_zeros: usize,
    /// Digits seen since the last `,`; `None` until a `,` appears.
    grouping: Option<usize>,
    has_decimal_point: bool,
    fraction_zeros: u32,
    fraction_hashes: u32,
}

impl NumberPart {
    fn has_digits(&self) -> bool {
        self.integer_hashes + self.integer_zeros > 0
            || self.fraction_zeros + self.fraction_hashes > 0
    }

    fn count_integer_digit(&mut self) {
        if let Some(group) = self.grouping.as_mut() {
            *group += 1;
        }
    }
}

#[derive(Debug)]
struct Subpattern {
    affixes: Affixes,
    number: NumberPart,
    multiplier: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Prefix,
    Number,
    Suffix,
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn malformed(&self, reason: &'static str) -> FormatError {
        FormatError::Malformed {
            pattern: self.source.to_string(),
            reason,
        }
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Parse one subpattern. The flag is true when it ended at a `;`.
    fn subpattern(&mut self) -> Result<(Subpattern, bool), FormatError> {
        let mut sub = Subpattern {
            affixes: Affixes::default(),
            number: NumberPart::default(),
            multiplier: 1,
        };
        let mut phase = Phase::Prefix;
        let mut in_quote = false;

        while let Some(&c) = self.chars.get(self.pos) {
            if in_quote {
                if c == '\'' {
                    if self.peek_next() == Some('\'') {
                        push_affix(&mut sub.affixes, phase, '\'');
                        self.pos += 2;
                        continue;
                    }
                    in_quote = false;
                } else {
                    push_affix(&mut sub.affixes, phase, c);
                }
                self.pos += 1;
                continue;
            }

            if phase == Phase::Number {
                if self.number_char(c, &mut sub.number)? {
                    self.pos += 1;
                } else {
                    self.finish_number(&sub.number)?;
                    phase = Phase::Suffix;
                }
                continue;
            }

            match c {
                '\'' => {
                    if self.peek_next() == Some('\'') {
                        push_affix(&mut sub.affixes, phase, '\'');
                        self.pos += 1;
                    } else {
                        in_quote = true;
                    }
                }
                ';' => {
                    self.pos += 1;
                    return Ok((sub, true));
                }
                '#' | '0' | ',' | '.' if phase == Phase::Prefix => {
                    phase = Phase::Number;
                    continue;
                }
                '#' | '0' | ',' | '.' => {
                    return Err(FormatError::UnquotedSpecial {
                        pattern: self.source.to_string(),
                        ch: c,
                        position: self.pos,
                    });
                }
                '%' => {
                    self.set_multiplier(&mut sub, 100)?;
                    push_affix(&mut sub.affixes, phase, c);
                }
                '\u{2030}' => {
                    self.set_multiplier(&mut sub, 1000)?;
                    push_affix(&mut sub.affixes, phase, c);
                }
                '\u{00A4}' => {
                    return Err(FormatError::Unsupported {
                        pattern: self.source.to_string(),
                        feature: "currency sign",
                    });
                }
                _ => push_affix(&mut sub.affixes, phase, c),
            }
            self.pos += 1;
        }

        if in_quote {
            return Err(FormatError::UnterminatedQuote {
                pattern: self.source.to_string(),
            });
        }
        if phase == Phase::Number {
            self.finish_number(&sub.number)?;
        }
        Ok((sub, false))
    }

    /// Consume one character of the number part. Returns false at its end.
    fn number_char(&self, c: char, number: &mut NumberPart) -> Result<bool, FormatError> {
        match c {
            '#' if number.has_decimal_point => number.fraction_hashes += 1,
            '#' => {
                if number.integer_zeros > 0 {
                    return Err(self.malformed("'#' after '0' in the integer part"));
                }
                number.integer_hashes += 1;
                number.count_integer_digit();
            }
            '0' if number.has_decimal_point => {
                if number.fraction_hashes > 0 {
                    return Err(self.malformed("'0' after '#' in the fraction part"));
                }
                number.fraction_zeros += 1;
            }
            '0' => {
                number.integer_zeros += 1;
                number.count_integer_digit();
            }
            ',' => {
                if number.has_decimal_point {
                    return Err(self.malformed("grouping separator in the fraction part"));
                }
                if number.grouping == Some(0) {
                    return Err(self.malformed("consecutive grouping separators"));
                }
                number.grouping = Some(0);
            }
            '.' => {
                if number.has_decimal_point {
                    return Err(FormatError::MultipleDecimalSeparators {
                        pattern: self.source.to_string(),
                    });
                }
                if number.grouping == Some(0) {
                    return Err(self.malformed("grouping separator ends the integer part"));
                }
                number.has_decimal_point = true;
            }
            'E' => {
                return Err(FormatError::Unsupported {
                    pattern: self.source.to_string(),
                    feature: "scientific notation",
                });
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish_number(&self, number: &NumberPart) -> Result<(), FormatError> {
        if !number.has_decimal_point && number.grouping == Some(0) {
            return Err(self.malformed("grouping separator ends the integer part"));
        }
        Ok(())
    }

    fn set_multiplier(&self, sub: &mut Subpattern, multiplier: u32) -> Result<(), FormatError> {
        if sub.multiplier != 1 {
            return Err(self.malformed("more than one percent or per-mille sign"));
        }
        sub.multiplier = multiplier;
        Ok(())
    }
}

fn push_affix(affixes: &mut Affixes, phase: Phase, c: char) {
    match phase {
        Phase::Prefix => affixes.prefix.push(c),
        Phase::Number | Phase::Suffix => affixes.suffix.push(c),
    }
}
