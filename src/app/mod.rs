pub mod config;
mod error;
mod logging;
pub mod runtime;
pub mod services;

pub use error::AppError;

pub fn run() -> Result<(), AppError> {
    logging::init()?;

    let config = config::AppConfig::from_env()?;

    tracing::info!(
        rate = %config.billing_rate.amount,
        billing_mode = ?config.billing_rate.mode,
        kiosk_user_id = config.kiosk_user_id,
        kiosk_station_id = config.kiosk_station_id,
        "application bootstrap initialized"
    );

    runtime::run(config)
}
