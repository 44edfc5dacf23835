use crate::app::AppError;
use crate::domain::billing::{BillingMode, BillingRate};
use crate::domain::money::parse_money;

const DEFAULT_RATE: &str = "3.00";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub billing_rate: BillingRate,
    pub kiosk_user_id: u32,
    pub kiosk_station_id: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            return Err(AppError::config(format!("failed to load .env: {error}")));
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_rate = non_empty(&lookup, "CAFE_RATE").unwrap_or_else(|| DEFAULT_RATE.to_string());
        let amount = parse_money(&raw_rate)
            .map_err(|_| AppError::config("CAFE_RATE must be a non-negative amount"))?;

        let mode = match non_empty(&lookup, "CAFE_BILLING_MODE") {
            Some(raw) => BillingMode::parse(&raw).map_err(|_| {
                AppError::config("CAFE_BILLING_MODE must be one of hourly, per_minute, flat_rate")
            })?,
            None => BillingMode::Hourly,
        };

        Ok(Self {
            billing_rate: BillingRate { amount, mode },
            kiosk_user_id: parse_or_default(&lookup, "KIOSK_USER_ID", 1_u32)?,
            kiosk_station_id: parse_or_default(&lookup, "KIOSK_STATION_ID", 1_u32)?,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{key} must be a valid number"))),
        None => Ok(default),
    }
}
