//! Audience-size label parsing.
//!
//! Feeds render follower and subscriber counts for humans: `"12.3K"`,
//! `"4M subscribers"`, `"1,234"`. [`parse_size`] turns the leading token of
//! such a label into an integer count so it can be compared against a
//! threshold.

use std::fmt;

/// Why a size label could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// The label was empty or whitespace only.
    #[error("empty size label")]
    Empty,

    /// The numeric part is not a plain decimal number.
    #[error("not a decimal number: {0:?}")]
    NotANumber(String),

    /// The scaled value does not fit in a `u64`.
    #[error("size out of range: {0:?}")]
    OutOfRange(String),
}

/// Magnitude suffix recognised after the numeric part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Magnitude {
    Units,
    Thousands,
    Millions,
}

impl Magnitude {
    fn factor(self) -> f64 {
        match self {
            Self::Units => 1.0,
            Self::Thousands => 1_000.0,
            Self::Millions => 1_000_000.0,
        }
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Units => f.write_str(""),
            Self::Thousands => f.write_str("K"),
            Self::Millions => f.write_str("M"),
        }
    }
}

/// Parse a human-formatted audience size into a count.
///
/// Only the first whitespace-delimited token is interpreted, so
/// `"1.2M subscribers"` and `"1.2M"` are equivalent. A trailing `K` or `M`
/// (case-insensitive) scales the number; without a suffix, comma thousands
/// separators are stripped. Fractional results are rounded to the nearest
/// integer, halves away from zero.
///
/// # Errors
///
/// Returns [`ParseFailure`] for empty labels, anything that is not a plain
/// non-negative decimal (`"banana"`, `"1e3"`, `"-5"`, `"inf"`), and values
/// too large for a `u64`.
///
/// # Examples
///
/// ```
/// use scout_core::size::parse_size;
///
/// assert_eq!(parse_size("12.3K"), Ok(12_300));
/// assert_eq!(parse_size("2M subscribers"), Ok(2_000_000));
/// assert_eq!(parse_size("1,234"), Ok(1_234));
/// assert!(parse_size("banana").is_err());
/// ```
pub fn parse_size(label: &str) -> Result<u64, ParseFailure> {
    let token = label
        .split_whitespace()
        .next()
        .ok_or(ParseFailure::Empty)?
        .to_uppercase();

    let (number, magnitude) = split_magnitude(&token);
    if !is_plain_decimal(&number) {
        return Err(ParseFailure::NotANumber(token));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| ParseFailure::NotANumber(token.clone()))?;
    let scaled = (value * magnitude.factor()).round();

    if !scaled.is_finite() || scaled < 0.0 || scaled > u64::MAX as f64 {
        return Err(ParseFailure::OutOfRange(format!("{number}{magnitude}")));
    }
    Ok(scaled as u64)
}

/// Split an uppercased token into its numeric text and magnitude.
fn split_magnitude(token: &str) -> (String, Magnitude) {
    if let Some(number) = token.strip_suffix('K') {
        (number.to_owned(), Magnitude::Thousands)
    } else if let Some(number) = token.strip_suffix('M') {
        (number.to_owned(), Magnitude::Millions)
    } else {
        (token.replace(',', ""), Magnitude::Units)
    }
}

/// Digits with at most one decimal point and at least one digit.
fn is_plain_decimal(text: &str) -> bool {
    let mut digits = 0usize;
    let mut points = 0usize;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
