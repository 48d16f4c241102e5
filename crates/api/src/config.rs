use std::path::PathBuf;

use todolist_db::datasource::DataSource;
use todolist_db::service::DeletePolicy;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Backing store for the service.
    pub data_source: DataSource,
    /// What deleting a todo list does to its todos.
    pub delete_policy: DeletePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            data_source: DataSource::Memory { data_dir: None },
            delete_policy: DeletePolicy::Orphan,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `DATA_SOURCE`          | `memory`                |
    /// | `DATABASE_URL`         | required for `postgres` |
    /// | `DATA_FILE_DIR`        | unset (no persistence)  |
    /// | `DELETE_POLICY`        | `orphan`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or(defaults.host);

        let port = match var("PORT") {
            Some(raw) => parse("PORT", raw)?,
            None => defaults.port,
        };

        let cors_origins = match var("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let request_timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse("REQUEST_TIMEOUT_SECS", raw)?,
            None => defaults.request_timeout_secs,
        };

        let data_source = match var("DATA_SOURCE").as_deref().map(str::trim) {
            None | Some("memory") => DataSource::Memory {
                data_dir: var("DATA_FILE_DIR").map(PathBuf::from),
            },
            Some("postgres") => DataSource::Postgres {
                database_url: var("DATABASE_URL").ok_or(ConfigError::Missing {
                    var: "DATABASE_URL",
                })?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "DATA_SOURCE",
                    value: other.to_string(),
                    reason: "expected `memory` or `postgres`".into(),
                })
            }
        };

        let delete_policy = match var("DELETE_POLICY") {
            Some(raw) => parse("DELETE_POLICY", raw)?,
            None => defaults.delete_policy,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_source,
            delete_policy,
        })
    }
}

fn parse<T>(var: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value: raw,
    })
}
