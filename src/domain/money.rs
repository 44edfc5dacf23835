use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::error::DomainError;

/// Parses a monetary amount such as `$12.50` or `0.5`.
///
/// Negative amounts are rejected: every amount in the cafe is a price or a
/// collected charge.
pub fn parse_money(raw: &str) -> Result<Decimal, DomainError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();

    if digits.is_empty() {
        return Err(DomainError::validation(format!(
            "invalid monetary amount: {raw:?}"
        )));
    }

    let amount = Decimal::from_str(digits)
        .map_err(|_| DomainError::validation(format!("invalid monetary amount: {raw:?}")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::validation(format!(
            "monetary amount must not be negative: {raw:?}"
        )));
    }

    Ok(amount)
}

pub fn parse_minutes(raw: &str) -> Result<u32, DomainError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("invalid duration in minutes: {raw:?}")))
}
