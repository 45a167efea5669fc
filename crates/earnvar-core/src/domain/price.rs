use std::str::FromStr;

use rust_decimal::Decimal;

use crate::ValidationError;

/// Normalizes a currency string such as `"$1,234.56"` into a decimal.
pub fn parse_price(raw: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();

    Decimal::from_str(&cleaned).map_err(|_| ValidationError::InvalidPrice {
        value: raw.to_string(),
    })
}
