use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::adapters::console::{
    Command, error_response, parse_command, quote_response, receipt_response, revenue_response,
    session_response, sessions_response, stations_response,
};
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::services::{
    CafeService, ServiceError, SessionCommandHandler, SessionQueryHandler, StationHandler,
};
use crate::domain::session::Clock;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Runs one command against the service and returns the JSON response.
pub fn execute<Cl: Clock>(
    service: &CafeService<Cl>,
    command: Command,
) -> Result<Value, ServiceError> {
    let response = match command {
        Command::Login { username, password } => {
            session_response(&service.login(&username, &password)?)
        }
        Command::Start {
            user_id,
            station_id,
            game_name,
        } => session_response(&service.start_session(user_id, station_id, game_name)?),
        Command::End { session_id } => receipt_response(&service.checkout(session_id)?),
        Command::Status { session_id } => session_response(&service.get_session(session_id)?),
        Command::Active { station_id } => {
            sessions_response(&service.active_sessions_for_station(station_id)?)
        }
        Command::Sessions { active_only } => {
            sessions_response(&service.list_sessions(active_only)?)
        }
        Command::Heartbeat { station_id, status } => {
            let station = service.heartbeat(&station_id, &status)?;
            serde_json::json!(station)
        }
        Command::Stations { status } => {
            stations_response(&service.list_stations(status.as_deref())?)
        }
        Command::Revenue { amount } => {
            let total = match amount {
                Some(amount) => service.record_revenue(amount)?,
                None => service.total_revenue()?,
            };
            revenue_response(total)
        }
        Command::Quote { minutes } => quote_response(minutes, service.quote(minutes)?),
        Command::Quit => Value::Null,
    };

    Ok(response)
}

fn handle_line<Cl: Clock>(service: &CafeService<Cl>, line: &str) -> (Flow, Option<Value>) {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return (Flow::Continue, None),
        Err(error) => {
            let error = ServiceError::from(error);
            tracing::warn!(error = %error, line, "rejected console command");
            return (Flow::Continue, Some(error_response(&error)));
        }
    };

    if command == Command::Quit {
        return (Flow::Quit, None);
    }

    match execute(service, command) {
        Ok(response) => (Flow::Continue, Some(response)),
        Err(error) => {
            tracing::warn!(error = %error, line, "console command failed");
            (Flow::Continue, Some(error_response(&error)))
        }
    }
}

/// Reads commands line by line until end of input or `quit`.
pub fn serve<Cl, R, W>(service: &CafeService<Cl>, input: R, mut output: W) -> Result<(), AppError>
where
    Cl: Clock,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line.map_err(AppError::runtime)?;
        let (flow, response) = handle_line(service, &line);

        if let Some(response) = response {
            writeln!(output, "{response}").map_err(AppError::runtime)?;
            output.flush().map_err(AppError::runtime)?;
        }

        if let Flow::Quit = flow {
            break;
        }
    }

    Ok(())
}

pub fn run(config: AppConfig) -> Result<(), AppError> {
    let service = CafeService::new(&config, SystemClock);

    tracing::info!("front desk ready, reading commands from stdin");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(&service, stdin.lock(), stdout.lock())?;

    tracing::info!("front desk closed");
    Ok(())
}
