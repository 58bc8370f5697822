//! Runtime configuration read from the environment
//!
//! `main` loads an optional `.env` file first, so every variable below can
//! live there as well.

use std::time::Duration;
use thiserror::Error;

use crate::middleware::Credentials;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Log profile selected with `ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    /// Human-readable output, debug level
    Local,
    /// JSON output, debug level
    Dev,
    /// JSON output, info level
    Prod,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: Env,
    /// Path of the redb database file
    pub database_url: String,
    pub http: HttpServer,
}

#[derive(Debug, Clone)]
pub struct HttpServer {
    pub address: String,
    /// Upper bound for reading a request and writing its response
    pub timeout: Duration,
    pub user: String,
    pub password: String,
}

impl HttpServer {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user, &self.password)
    }
}

const DEFAULT_ADDRESS: &str = "localhost:8082";
const DEFAULT_TIMEOUT_SECS: u64 = 4;

impl Config {
    /// Reads the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |var: &'static str| lookup(var).filter(|v| !v.is_empty());
        let required = |var: &'static str| optional(var).ok_or(ConfigError::Missing(var));

        let env = match optional("ENV") {
            Some(value) => parse_env(&value)?,
            None => Env::Local,
        };

        let timeout = match optional("HTTP_TIMEOUT") {
            Some(value) => parse_secs("HTTP_TIMEOUT", value)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            env,
            database_url: required("DATABASE_URL")?,
            http: HttpServer {
                address: optional("HTTP_ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
                timeout,
                user: required("HTTP_USER")?,
                password: required("HTTP_SECRET_PASSWORD")?,
            },
        })
    }
}

fn parse_env(value: &str) -> Result<Env, ConfigError> {
    match value {
        "local" => Ok(Env::Local),
        "dev" => Ok(Env::Dev),
        "prod" => Ok(Env::Prod),
        _ => Err(ConfigError::Invalid {
            var: "ENV",
            value: value.to_string(),
            reason: "expected one of local, dev, prod".to_string(),
        }),
    }
}

fn parse_secs(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        Ok(_) => Err(ConfigError::Invalid {
            var,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Err(err) => Err(ConfigError::Invalid {
            var,
            reason: err.to_string(),
            value,
        }),
    }
}
