use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::DomainError;

const RECOGNIZED_STATUSES: &[&str] = &["Available", "Occupied", "InUse", "Offline", "Maintenance"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Station {
    pub id: String,
    pub status: String,
}

/// Latest heartbeat per station plus the cafe's running revenue.
#[derive(Debug, Default)]
pub struct StationRegistry {
    stations: BTreeMap<String, Station>,
    revenue: Decimal,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recognized_status(status: &str) -> bool {
        RECOGNIZED_STATUSES.contains(&status)
    }

    /// Registers the station on its first heartbeat and replaces its status on
    /// every later one. Any status string is accepted.
    pub fn heartbeat(&mut self, station_id: &str, status: &str) -> &Station {
        tracing::debug!(
            station_id,
            status,
            recognized = Self::is_recognized_status(status),
            "station heartbeat"
        );

        let station = self
            .stations
            .entry(station_id.to_string())
            .or_insert_with(|| Station {
                id: station_id.to_string(),
                status: String::new(),
            });
        station.status = status.to_string();
        station
    }

    /// Adds `amount` to the running total. An addition that would overflow
    /// leaves the total untouched.
    pub fn record_revenue(&mut self, amount: Decimal) -> Result<Decimal, DomainError> {
        self.revenue = self
            .revenue
            .checked_add(amount)
            .ok_or_else(DomainError::amount_out_of_range)?;
        tracing::info!(%amount, total = %self.revenue, "revenue recorded");
        Ok(self.revenue)
    }

    pub fn total_revenue(&self) -> Decimal {
        self.revenue
    }

    pub fn station(&self, station_id: &str) -> Result<&Station, DomainError> {
        self.stations
            .get(station_id)
            .ok_or_else(|| DomainError::StationNotFound(station_id.to_string()))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn stations_with_status<'a>(
        &'a self,
        status: &'a str,
    ) -> impl Iterator<Item = &'a Station> {
        self.stations
            .values()
            .filter(move |station| station.status == status)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::StationRegistry;
    use crate::domain::error::DomainError;

    #[test]
    fn first_heartbeat_registers_station() {
        let mut registry = StationRegistry::new();

        registry.heartbeat("PC-01", "Available");

        assert_eq!(registry.station_count(), 1);
        assert_eq!(
            registry.station("PC-01").map(|station| station.status.as_str()),
            Ok("Available")
        );
    }

    #[test]
    fn repeated_heartbeat_keeps_station_count() {
        let mut registry = StationRegistry::new();

        registry.heartbeat("PC-01", "Available");
        registry.heartbeat("PC-01", "Available");
        registry.heartbeat("PC-02", "Available");

        assert_eq!(registry.station_count(), 2);
    }

    #[test]
    fn new_status_overwrites_previous_one() {
        let mut registry = StationRegistry::new();
        registry.heartbeat("PC-01", "Available");

        registry.heartbeat("PC-01", "Occupied");

        assert_eq!(registry.stations_with_status("Available").count(), 0);
        let occupied: Vec<&str> = registry
            .stations_with_status("Occupied")
            .map(|station| station.id.as_str())
            .collect();
        assert_eq!(occupied, vec!["PC-01"]);
    }

    #[test]
    fn accepts_unrecognized_status_strings() {
        let mut registry = StationRegistry::new();

        let station = registry.heartbeat("PC-09", "Rebooting");

        assert_eq!(station.status, "Rebooting");
        assert!(!StationRegistry::is_recognized_status("Rebooting"));
        assert!(StationRegistry::is_recognized_status("Maintenance"));
    }

    #[test]
    fn unknown_station_is_not_found() {
        let registry = StationRegistry::new();

        assert_eq!(
            registry.station("PC-42"),
            Err(DomainError::StationNotFound("PC-42".to_string()))
        );
    }

    #[test]
    fn lists_stations_ordered_by_id() {
        let mut registry = StationRegistry::new();
        registry.heartbeat("PC-03", "Offline");
        registry.heartbeat("PC-01", "Available");
        registry.heartbeat("PC-02", "Occupied");

        let ids: Vec<&str> = registry.stations().map(|station| station.id.as_str()).collect();

        assert_eq!(ids, vec!["PC-01", "PC-02", "PC-03"]);
    }

    #[test]
    fn accumulates_revenue() {
        let mut registry = StationRegistry::new();
        assert_eq!(registry.total_revenue(), Decimal::ZERO);

        registry
            .record_revenue(Decimal::from(50))
            .expect("revenue should be recorded");
        let total = registry.record_revenue(Decimal::from(75));

        assert_eq!(total, Ok(Decimal::from(125)));
        assert!(registry.total_revenue() >= Decimal::from(100));
    }

    #[test]
    fn overflowing_revenue_keeps_previous_total() {
        let mut registry = StationRegistry::new();
        registry
            .record_revenue(Decimal::MAX)
            .expect("maximum amount should be recorded");

        let result = registry.record_revenue(Decimal::ONE);

        assert_eq!(result, Err(DomainError::amount_out_of_range()));
        assert_eq!(registry.total_revenue(), Decimal::MAX);
    }
}
