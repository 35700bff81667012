//! Amount parsing and conversion against a rate snapshot

use crate::core::rate::RateSnapshot;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("No exchange rate available yet")]
    NoRate,

    #[error("Enter an amount to convert")]
    EmptyAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Keeps only the characters an amount may contain: digits, `.` and `,`.
pub fn sanitize_amount(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect()
}

/// Parses a typed amount from its leading `digits[.digits]` prefix.
///
/// Reading stops at the first `,`, a second `.`, or any other character, so
/// `"10,5"` is 10 and `"1.2.3"` is 1.2.
pub fn parse_amount(amount: &str) -> Result<f64, ConversionError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::EmptyAmount);
    }

    let mut seen_dot = false;
    let end = trimmed
        .char_indices()
        .find(|&(_, c)| match c {
            '0'..='9' => false,
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            _ => true,
        })
        .map_or(trimmed.len(), |(i, _)| i);
    let prefix = &trimmed[..end];
    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return Err(ConversionError::InvalidAmount(trimmed.to_string()));
    }

    let value: f64 = prefix
        .parse()
        .map_err(|_| ConversionError::InvalidAmount(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(ConversionError::InvalidAmount(trimmed.to_string()));
    }
    Ok(value)
}

/// Converts `amount` at the snapshot's bid rate, formatted with two decimals.
pub fn convert(amount: &str, snapshot: &RateSnapshot) -> Result<String, ConversionError> {
    let value = parse_amount(amount)?;
    Ok(format!("{:.2}", value * snapshot.bid_rate))
}
