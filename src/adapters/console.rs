use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use crate::app::services::{Receipt, ServiceError};
use crate::domain::error::DomainError;
use crate::domain::money::{parse_minutes, parse_money};
use crate::domain::session::Session;
use crate::domain::station_registry::Station;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Start {
        user_id: u32,
        station_id: u32,
        game_name: Option<String>,
    },
    End {
        session_id: u64,
    },
    Status {
        session_id: u64,
    },
    Active {
        station_id: u32,
    },
    Sessions {
        active_only: bool,
    },
    Heartbeat {
        station_id: String,
        status: String,
    },
    Stations {
        status: Option<String>,
    },
    Revenue {
        amount: Option<Decimal>,
    },
    Quote {
        minutes: u32,
    },
    Quit,
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, DomainError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "login" => Command::Login {
            username: args.first().map(ToString::to_string).unwrap_or_default(),
            password: args.get(1).map(ToString::to_string).unwrap_or_default(),
        },
        "start" => {
            let [user, station, rest @ ..] = args.as_slice() else {
                return Err(usage("start <user> <station> [game]"));
            };
            Command::Start {
                user_id: parse_id(user, "user id")?,
                station_id: parse_id(station, "station id")?,
                game_name: (!rest.is_empty()).then(|| rest.join(" ")),
            }
        }
        "end" => Command::End {
            session_id: parse_id(single(&args, "end <session>")?, "session id")?,
        },
        "status" => Command::Status {
            session_id: parse_id(single(&args, "status <session>")?, "session id")?,
        },
        "active" => Command::Active {
            station_id: parse_id(single(&args, "active <station>")?, "station id")?,
        },
        "sessions" => Command::Sessions {
            active_only: match args.as_slice() {
                [] => false,
                [filter] if filter.eq_ignore_ascii_case("active") => true,
                _ => return Err(usage("sessions [active]")),
            },
        },
        "heartbeat" => {
            let [station, status @ ..] = args.as_slice() else {
                return Err(usage("heartbeat <station> <status>"));
            };
            if status.is_empty() {
                return Err(usage("heartbeat <station> <status>"));
            }
            Command::Heartbeat {
                station_id: (*station).to_string(),
                status: status.join(" "),
            }
        }
        "stations" => Command::Stations {
            status: (!args.is_empty()).then(|| args.join(" ")),
        },
        "revenue" => Command::Revenue {
            amount: match args.as_slice() {
                [] => None,
                [amount] => Some(parse_money(amount)?),
                _ => return Err(usage("revenue [amount]")),
            },
        },
        "quote" => Command::Quote {
            minutes: parse_minutes(single(&args, "quote <minutes>")?)?,
        },
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(DomainError::validation(format!("unknown command: {other}")));
        }
    };

    Ok(Some(command))
}

fn single<'a>(args: &[&'a str], usage_text: &str) -> Result<&'a str, DomainError> {
    match args {
        [value] => Ok(*value),
        _ => Err(usage(usage_text)),
    }
}

fn usage(text: &str) -> DomainError {
    DomainError::validation(format!("usage: {text}"))
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, DomainError> {
    raw.parse::<T>()
        .map_err(|_| DomainError::validation(format!("invalid {what}: {raw:?}")))
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: u64,
    pub user_id: u32,
    pub station_id: u32,
    pub status: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub game_name: Option<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id(),
            user_id: session.user_id(),
            station_id: session.station_id(),
            status: session.status().to_string(),
            started_at: timestamp_to_iso8601(session.start_time()),
            ended_at: session.end_time().map(timestamp_to_iso8601),
            game_name: session.game_name().map(ToString::to_string),
        }
    }
}

pub fn session_response(session: &Session) -> Value {
    json!(SessionResponse::from(session))
}

pub fn sessions_response(sessions: &[Session]) -> Value {
    let mapped: Vec<SessionResponse> = sessions.iter().map(SessionResponse::from).collect();
    json!(mapped)
}

pub fn receipt_response(receipt: &Receipt) -> Value {
    json!(receipt)
}

pub fn stations_response(stations: &[Station]) -> Value {
    json!({ "count": stations.len(), "stations": stations })
}

pub fn revenue_response(total: Decimal) -> Value {
    json!({ "totalRevenue": total })
}

pub fn quote_response(minutes: u32, charge: Decimal) -> Value {
    json!({ "minutes": minutes, "charge": charge })
}

pub fn error_response(error: &ServiceError) -> Value {
    match error {
        ServiceError::LockPoisoned => json!({
            "error": error.to_string(),
            "kind": "internal",
        }),
        ServiceError::Domain(domain) => json!({
            "error": domain.to_string(),
            "kind": domain.kind().as_str(),
        }),
    }
}

fn timestamp_to_iso8601(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
