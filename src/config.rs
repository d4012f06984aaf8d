// src/config.rs

use std::{env, net::SocketAddr};

use thiserror::Error;

/// Number of fractional digits reported in a percentage score.
pub const SCORE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub log_dir: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// `.env` is expected to be loaded by the caller (see `main.rs`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let bind_addr = parsed("BIND_ADDR", "0.0.0.0:3000")?;
        let database_max_connections = parsed("DATABASE_MAX_CONNECTIONS", "5")?;

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            rust_log,
            bind_addr,
            log_dir,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
