use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::session::{Clock, Session};

/// In-memory owner of every session, completed ones included.
///
/// Active sessions are indexed by station so the one-active-per-station
/// check is a single lookup.
#[derive(Debug)]
pub struct SessionRegistry<Cl> {
    clock: Cl,
    sessions: BTreeMap<u64, Session>,
    active_by_station: HashMap<u32, u64>,
    last_id: u64,
}

impl<Cl> SessionRegistry<Cl>
where
    Cl: Clock,
{
    pub fn new(clock: Cl) -> Self {
        Self {
            clock,
            sessions: BTreeMap::new(),
            active_by_station: HashMap::new(),
            last_id: 0,
        }
    }

    pub fn create_session(
        &mut self,
        user_id: u32,
        station_id: u32,
    ) -> Result<Session, DomainError> {
        self.create_session_with_game(user_id, station_id, None)
    }

    pub fn create_session_with_game(
        &mut self,
        user_id: u32,
        station_id: u32,
        game_name: Option<String>,
    ) -> Result<Session, DomainError> {
        if self.active_by_station.contains_key(&station_id) {
            return Err(DomainError::ActiveSessionExists { station_id });
        }

        self.last_id += 1;
        let session = Session::start(
            self.last_id,
            user_id,
            station_id,
            self.clock.now(),
            game_name,
        );

        self.active_by_station.insert(station_id, session.id());
        self.sessions.insert(session.id(), session.clone());

        tracing::info!(
            session_id = session.id(),
            user_id,
            station_id,
            started_at = %session.start_time(),
            "session started"
        );

        Ok(session)
    }

    pub fn end_session(&mut self, session_id: u64) -> Result<Session, DomainError> {
        self.end_session_with(session_id, |_, _| Ok(()))
            .map(|(session, ())| session)
    }

    /// Ends an active session only if `settle` succeeds for it at the end
    /// time. On error the session stays active.
    pub fn end_session_with<T, F>(
        &mut self,
        session_id: u64,
        settle: F,
    ) -> Result<(Session, T), DomainError>
    where
        F: FnOnce(&Session, DateTime<Utc>) -> Result<T, DomainError>,
    {
        let now = self.clock.now();
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))?;

        if !session.is_active() {
            return Err(DomainError::SessionAlreadyCompleted(session_id));
        }

        let settled = settle(session, now)?;
        session.complete(now);
        self.active_by_station.remove(&session.station_id());

        tracing::info!(
            session_id,
            station_id = session.station_id(),
            ended_at = ?session.end_time(),
            "session ended"
        );

        Ok((session.clone(), settled))
    }

    pub fn session(&self, session_id: u64) -> Result<&Session, DomainError> {
        self.sessions
            .get(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))
    }

    pub fn active_session(&self, station_id: u32) -> Option<&Session> {
        self.active_by_station
            .get(&station_id)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn active_sessions_for_station(&self, station_id: u32) -> Vec<&Session> {
        self.active_session(station_id).into_iter().collect()
    }

    pub fn session_duration_minutes(&self, session_id: u64) -> Result<u32, DomainError> {
        self.session(session_id)
            .map(|session| session.duration_minutes(self.clock.now()))
    }

    /// Every session ever started, ordered by id.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn active_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(|session| session.is_active())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::SessionRegistry;
    use crate::domain::error::DomainError;
    use crate::domain::session::SessionStatus;
    use crate::test_support::ManualClock;

    fn registry() -> (SessionRegistry<ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap());
        (SessionRegistry::new(clock.clone()), clock)
    }

    #[test]
    fn assigns_monotonic_ids_starting_at_one() {
        let (mut registry, _) = registry();

        let first = registry.create_session(1, 1).expect("first session should start");
        let second = registry.create_session(2, 2).expect("second session should start");
        registry.end_session(first.id()).expect("first session should end");
        let third = registry.create_session(3, 1).expect("station 1 is free again");

        assert_eq!((first.id(), second.id(), third.id()), (1, 2, 3));
    }

    #[test]
    fn records_start_time_from_clock() {
        let (mut registry, clock) = registry();

        let session = registry.create_session(7, 4).expect("session should start");

        assert_eq!(session.start_time(), clock.now_utc());
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.end_time(), None);
    }

    #[test]
    fn rejects_second_active_session_on_same_station() {
        let (mut registry, _) = registry();
        registry.create_session(1, 1).expect("first session should start");

        let result = registry.create_session(2, 1);

        assert_eq!(result, Err(DomainError::ActiveSessionExists { station_id: 1 }));
        assert_eq!(registry.active_sessions_for_station(1).len(), 1);
        assert_eq!(registry.sessions().count(), 1);
    }

    #[test]
    fn allows_new_session_after_previous_one_ends() {
        let (mut registry, _) = registry();
        let first = registry.create_session(1, 1).expect("first session should start");
        registry.end_session(first.id()).expect("session should end");

        let second = registry.create_session(1, 1);

        assert!(second.is_ok());
        assert_eq!(registry.active_sessions_for_station(1).len(), 1);
    }

    #[test]
    fn ending_completes_session_and_frees_station() {
        let (mut registry, clock) = registry();
        let session = registry.create_session(1, 5).expect("session should start");
        assert_eq!(registry.active_sessions_for_station(5).len(), 1);

        clock.advance(Duration::minutes(30));
        registry.end_session(session.id()).expect("session should end");

        let stored = registry.session(session.id()).expect("session should be retained");
        assert_eq!(stored.status(), SessionStatus::Completed);
        let end_time = stored.end_time().expect("end time should be recorded");
        assert!(end_time >= stored.start_time());
        assert!(registry.active_sessions_for_station(5).is_empty());
        assert!(registry.active_session(5).is_none());
    }

    #[test]
    fn ending_unknown_session_is_not_found() {
        let (mut registry, _) = registry();

        assert_eq!(registry.end_session(99), Err(DomainError::SessionNotFound(99)));
    }

    #[test]
    fn ending_twice_is_rejected_and_keeps_first_end_time() {
        let (mut registry, clock) = registry();
        let session = registry.create_session(1, 1).expect("session should start");
        clock.advance(Duration::minutes(10));
        let ended = registry.end_session(session.id()).expect("session should end");

        clock.advance(Duration::minutes(10));
        let result = registry.end_session(session.id());

        assert_eq!(result, Err(DomainError::SessionAlreadyCompleted(session.id())));
        let stored = registry.session(session.id()).expect("session should exist");
        assert_eq!(stored.end_time(), ended.end_time());
    }

    #[test]
    fn measures_duration_of_running_session() {
        let (mut registry, clock) = registry();
        let session = registry.create_session(1, 1).expect("session should start");

        clock.advance(Duration::minutes(30));

        assert_eq!(registry.session_duration_minutes(session.id()), Ok(30));
        assert_eq!(
            registry.session_duration_minutes(1234),
            Err(DomainError::SessionNotFound(1234))
        );
    }

    #[test]
    fn active_sessions_are_per_station() {
        let (mut registry, _) = registry();
        registry.create_session(1, 1).expect("station 1 session should start");
        registry
            .create_session_with_game(2, 2, Some("Factorio".to_string()))
            .expect("station 2 session should start");

        assert_eq!(registry.active_sessions_for_station(1).len(), 1);
        assert_eq!(
            registry
                .active_session(2)
                .and_then(|session| session.game_name()),
            Some("Factorio")
        );
        assert!(registry.active_sessions_for_station(3).is_empty());
    }

    #[test]
    fn lists_sessions_in_id_order() {
        let (mut registry, _) = registry();
        for station_id in [9, 3, 5] {
            registry
                .create_session(1, station_id)
                .expect("session should start");
        }
        registry.end_session(2).expect("session should end");

        let all: Vec<(u64, u32)> = registry
            .sessions()
            .map(|session| (session.id(), session.station_id()))
            .collect();
        let active: Vec<u64> = registry.active_sessions().map(|session| session.id()).collect();

        assert_eq!(all, vec![(1, 9), (2, 3), (3, 5)]);
        assert_eq!(active, vec![1, 3]);
    }

    #[test]
    fn failed_settlement_keeps_session_active() {
        let (mut registry, clock) = registry();
        let session = registry.create_session(1, 1).expect("session should start");
        clock.advance(Duration::minutes(15));

        let result: Result<(_, ()), _> = registry.end_session_with(session.id(), |_, _| {
            Err(DomainError::amount_out_of_range())
        });

        assert_eq!(result, Err(DomainError::amount_out_of_range()));
        assert!(registry.active_session(1).is_some());

        let (ended, minutes) = registry
            .end_session_with(session.id(), |active, now| Ok(active.duration_minutes(now)))
            .expect("session should end");
        assert_eq!(minutes, 15);
        assert_eq!(ended.end_time(), Some(clock.now_utc()));
    }
}
