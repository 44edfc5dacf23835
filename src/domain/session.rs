use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seat occupied by one user on one station.
///
/// `end_time` is present exactly when the status is `Completed`; only the
/// session registry can move a session between the two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: u64,
    user_id: u32,
    station_id: u32,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    status: SessionStatus,
    game_name: Option<String>,
}

impl Session {
    pub(crate) fn start(
        id: u64,
        user_id: u32,
        station_id: u32,
        start_time: DateTime<Utc>,
        game_name: Option<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            station_id,
            start_time,
            end_time: None,
            status: SessionStatus::Active,
            game_name,
        }
    }

    pub(crate) fn complete(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);
        self.status = SessionStatus::Completed;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn station_id(&self) -> u32 {
        self.station_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn game_name(&self) -> Option<&str> {
        self.game_name.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whole minutes played, measured to the end time or to `now` while the
    /// session is still running.
    pub fn duration_minutes(&self, now: DateTime<Utc>) -> u32 {
        let until = self.end_time.unwrap_or(now);
        let minutes = (until - self.start_time).num_minutes().max(0);
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }
}
