pub mod auth;
pub mod billing;
pub mod error;
pub mod money;
pub mod session;
pub mod session_registry;
pub mod station_registry;
