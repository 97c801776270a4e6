//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Broadcast buffer per connected subscriber.
    pub event_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BIND_ADDR` | Server bind address | `127.0.0.1:5001` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:chatwire.db?mode=rwc` |
    /// | `EVENT_BUFFER` | Broadcast buffer per subscriber | `256` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:chatwire.db?mode=rwc".to_string());

        let event_buffer = match env::var("EVENT_BUFFER") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidEventBuffer)?,
            Err(_) => 256,
        };

        Ok(Self {
            addr,
            database_url,
            event_buffer,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BIND_ADDR format")]
    InvalidAddr,

    #[error("Invalid EVENT_BUFFER value")]
    InvalidEventBuffer,
}
