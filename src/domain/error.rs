use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("station {station_id} already has an active session")]
    ActiveSessionExists { station_id: u32 },
    #[error("session {0} is already completed")]
    SessionAlreadyCompleted(u64),
    #[error("session {0} not found")]
    SessionNotFound(u64),
    #[error("station {0:?} not found")]
    StationNotFound(String),
    #[error("Please enter username and password.")]
    MissingCredentials,
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation<E: std::fmt::Display>(error: E) -> Self {
        Self::Validation(error.to_string())
    }

    pub fn amount_out_of_range() -> Self {
        Self::validation("amount out of range")
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ActiveSessionExists { .. } | Self::SessionAlreadyCompleted(_) => {
                ErrorKind::Conflict
            }
            Self::SessionNotFound(_) | Self::StationNotFound(_) => ErrorKind::NotFound,
            Self::MissingCredentials | Self::Validation(_) => ErrorKind::Validation,
        }
    }
}
