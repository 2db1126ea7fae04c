//! Gateway configuration from environment variables.
//!
//! `DRAWINGS_BACKEND` picks the storage (`postgres` by default, or `memory`).
//! The Postgres backend requires `DATABASE_URL` and honors `DB_MAX_CONNECTIONS`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use tracing::warn;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set for the postgres backend")]
    MissingDatabaseUrl,
    #[error("unknown DRAWINGS_BACKEND: {0}")]
    UnknownBackend(String),
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDatabaseUrl => "E_CONFIG_DATABASE_URL",
            Self::UnknownBackend(_) => "E_CONFIG_BACKEND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub backend: Backend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { backend: Backend::Postgres, database_url: None, max_connections: DEFAULT_MAX_CONNECTIONS }
    }
}

impl GatewayConfig {
    /// An in-memory configuration, mostly for tests and offline use.
    #[must_use]
    pub fn memory() -> Self {
        Self { backend: Backend::Memory, ..Self::default() }
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] for an unrecognized backend and
    /// [`ConfigError::MissingDatabaseUrl`] when Postgres has no URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("DRAWINGS_BACKEND") {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<Backend>()?,
            _ => Backend::default(),
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let max_connections = env_parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).max(1);

        if backend == Backend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        Ok(Self { backend, database_url, max_connections })
    }
}

fn env_parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    if let Ok(value) = raw.trim().parse() {
        value
    } else {
        warn!(key, value = %raw, "unparseable value; using default");
        default
    }
}
