use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Service configuration, read from the environment with per-variable
/// defaults. `.env` loading happens in `main` before this is called.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: parsed_var("BIND_ADDR", "0.0.0.0:8000")?,
            redis_host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            redis_port: parsed_var("REDIS_PORT", "6379")?,
            redis_db: parsed_var("REDIS_DB", "0")?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Connection URL for the configured logical database.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }
}

fn parsed_var<T: FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(move |_| ConfigError::Invalid { var, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url_includes_db_index() {
        let config = Config {
            bind_addr: "127.0.0.1:8000".parse().unwrap(),
            redis_host: "redis.internal".to_string(),
            redis_port: 6380,
            redis_db: 2,
            log_level: "info".to_string(),
        };
        assert_eq!(config.redis_url(), "redis://redis.internal:6380/2");
    }
}
