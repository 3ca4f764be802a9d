//! Configuration module for the reservations backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("RESERVAS_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("RESERVAS_DB_PATH")
            .unwrap_or_else(|_| "./data/reservas.sqlite".to_string())
            .into();

        let bind_addr = env::var("RESERVAS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = env::var("RESERVAS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("RESERVAS_LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_json,
        })
    }
}
