use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::app::config::AppConfig;
use crate::domain::auth::Credentials;
use crate::domain::billing::{BillingRate, calculate_cost, calculate_session_cost};
use crate::domain::error::DomainError;
use crate::domain::session::{Clock, Session};
use crate::domain::session_registry::SessionRegistry;
use crate::domain::station_registry::{Station, StationRegistry};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("registry lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub session_id: u64,
    pub station_id: u32,
    pub minutes: u32,
    pub charge: Decimal,
}

pub trait SessionCommandHandler {
    fn login(&self, username: &str, password: &str) -> Result<Session, ServiceError>;
    fn start_session(
        &self,
        user_id: u32,
        station_id: u32,
        game_name: Option<String>,
    ) -> Result<Session, ServiceError>;
    fn checkout(&self, session_id: u64) -> Result<Receipt, ServiceError>;
}

pub trait SessionQueryHandler {
    fn get_session(&self, session_id: u64) -> Result<Session, ServiceError>;
    fn active_sessions_for_station(&self, station_id: u32) -> Result<Vec<Session>, ServiceError>;
    fn list_sessions(&self, active_only: bool) -> Result<Vec<Session>, ServiceError>;
    fn quote(&self, duration_minutes: u32) -> Result<Decimal, ServiceError>;
}

pub trait StationHandler {
    fn heartbeat(&self, station_id: &str, status: &str) -> Result<Station, ServiceError>;
    fn get_station(&self, station_id: &str) -> Result<Station, ServiceError>;
    fn list_stations(&self, status: Option<&str>) -> Result<Vec<Station>, ServiceError>;
    fn record_revenue(&self, amount: Decimal) -> Result<Decimal, ServiceError>;
    fn total_revenue(&self) -> Result<Decimal, ServiceError>;
}

/// Front-desk facade over both registries.
///
/// Each registry sits behind its own lock, so the conflict check and the
/// insert of a new session happen under one acquisition.
pub struct CafeService<Cl> {
    sessions: Mutex<SessionRegistry<Cl>>,
    stations: Mutex<StationRegistry>,
    billing_rate: BillingRate,
    kiosk_user_id: u32,
    kiosk_station_id: u32,
}

impl<Cl> CafeService<Cl>
where
    Cl: Clock,
{
    pub fn new(config: &AppConfig, clock: Cl) -> Self {
        Self {
            sessions: Mutex::new(SessionRegistry::new(clock)),
            stations: Mutex::new(StationRegistry::new()),
            billing_rate: config.billing_rate,
            kiosk_user_id: config.kiosk_user_id,
            kiosk_station_id: config.kiosk_station_id,
        }
    }

    fn sessions(&self) -> Result<MutexGuard<'_, SessionRegistry<Cl>>, ServiceError> {
        self.sessions.lock().map_err(|_| ServiceError::LockPoisoned)
    }

    fn stations(&self) -> Result<MutexGuard<'_, StationRegistry>, ServiceError> {
        self.stations.lock().map_err(|_| ServiceError::LockPoisoned)
    }
}

impl<Cl> SessionCommandHandler for CafeService<Cl>
where
    Cl: Clock,
{
    fn login(&self, username: &str, password: &str) -> Result<Session, ServiceError> {
        let credentials = Credentials::new(username, password)?;
        let session = self.start_session(self.kiosk_user_id, self.kiosk_station_id, None)?;

        tracing::info!(
            username = credentials.username(),
            session_id = session.id(),
            "kiosk login"
        );

        Ok(session)
    }

    fn start_session(
        &self,
        user_id: u32,
        station_id: u32,
        game_name: Option<String>,
    ) -> Result<Session, ServiceError> {
        let mut sessions = self.sessions()?;
        Ok(sessions.create_session_with_game(user_id, station_id, game_name)?)
    }

    /// Ends the session and books its charge as revenue. The session is only
    /// completed once the charge has been recorded.
    fn checkout(&self, session_id: u64) -> Result<Receipt, ServiceError> {
        let mut sessions = self.sessions()?;
        let mut stations = self.stations()?;

        let (_, receipt) = sessions.end_session_with(session_id, |session, now| {
            let receipt = Receipt {
                session_id: session.id(),
                station_id: session.station_id(),
                minutes: session.duration_minutes(now),
                charge: calculate_session_cost(&self.billing_rate, session, now)?,
            };
            stations.record_revenue(receipt.charge)?;
            Ok(receipt)
        })?;

        tracing::info!(
            session_id,
            minutes = receipt.minutes,
            charge = %receipt.charge,
            "session checked out"
        );

        Ok(receipt)
    }
}

impl<Cl> SessionQueryHandler for CafeService<Cl>
where
    Cl: Clock,
{
    fn get_session(&self, session_id: u64) -> Result<Session, ServiceError> {
        let sessions = self.sessions()?;
        Ok(sessions.session(session_id)?.clone())
    }

    fn active_sessions_for_station(&self, station_id: u32) -> Result<Vec<Session>, ServiceError> {
        let sessions = self.sessions()?;
        Ok(sessions
            .active_sessions_for_station(station_id)
            .into_iter()
            .cloned()
            .collect())
    }

    fn list_sessions(&self, active_only: bool) -> Result<Vec<Session>, ServiceError> {
        let sessions = self.sessions()?;
        let listed = if active_only {
            sessions.active_sessions().cloned().collect()
        } else {
            sessions.sessions().cloned().collect()
        };
        Ok(listed)
    }

    fn quote(&self, duration_minutes: u32) -> Result<Decimal, ServiceError> {
        Ok(calculate_cost(&self.billing_rate, duration_minutes)?)
    }
}

impl<Cl> StationHandler for CafeService<Cl>
where
    Cl: Clock,
{
    fn heartbeat(&self, station_id: &str, status: &str) -> Result<Station, ServiceError> {
        let mut stations = self.stations()?;
        Ok(stations.heartbeat(station_id, status).clone())
    }

    fn get_station(&self, station_id: &str) -> Result<Station, ServiceError> {
        let stations = self.stations()?;
        Ok(stations.station(station_id)?.clone())
    }

    fn list_stations(&self, status: Option<&str>) -> Result<Vec<Station>, ServiceError> {
        let stations = self.stations()?;
        let listed = match status {
            Some(status) => stations.stations_with_status(status).cloned().collect(),
            None => stations.stations().cloned().collect(),
        };
        Ok(listed)
    }

    fn record_revenue(&self, amount: Decimal) -> Result<Decimal, ServiceError> {
        Ok(self.stations()?.record_revenue(amount)?)
    }

    fn total_revenue(&self) -> Result<Decimal, ServiceError> {
        Ok(self.stations()?.total_revenue())
    }
}
