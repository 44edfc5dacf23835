use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::error::DomainError;
use crate::domain::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    Hourly,
    PerMinute,
    FlatRate,
}

impl BillingMode {
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "per_minute" | "perminute" => Ok(Self::PerMinute),
            "flat_rate" | "flatrate" => Ok(Self::FlatRate),
            other => Err(DomainError::validation(format!(
                "unknown billing mode: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingRate {
    pub amount: Decimal,
    pub mode: BillingMode,
}

impl BillingRate {
    pub fn hourly(amount: Decimal) -> Self {
        Self {
            amount,
            mode: BillingMode::Hourly,
        }
    }

    pub fn per_minute(amount: Decimal) -> Self {
        Self {
            amount,
            mode: BillingMode::PerMinute,
        }
    }

    pub fn flat(amount: Decimal) -> Self {
        Self {
            amount,
            mode: BillingMode::FlatRate,
        }
    }
}

/// Charge for a session of `duration_minutes` under `rate`.
///
/// Hourly billing rounds every started hour up to a full one; a zero-length
/// session costs nothing. Fails when the charge does not fit a `Decimal`.
pub fn calculate_cost(
    rate: &BillingRate,
    duration_minutes: u32,
) -> Result<Decimal, DomainError> {
    let units = match rate.mode {
        BillingMode::Hourly => duration_minutes.div_ceil(60),
        BillingMode::PerMinute => duration_minutes,
        BillingMode::FlatRate => return Ok(rate.amount),
    };

    rate.amount
        .checked_mul(Decimal::from(units))
        .ok_or_else(DomainError::amount_out_of_range)
}

pub fn calculate_session_cost(
    rate: &BillingRate,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<Decimal, DomainError> {
    calculate_cost(rate, session.duration_minutes(now))
}
