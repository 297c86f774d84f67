//! Core configuration: storage backend selection and token settings.

use std::fmt;

use chrono::Duration;
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Signing secret used when `JWT_SECRET` is unset. Never use in production.
pub const DEFAULT_JWT_SECRET: &str = "voidrunner-secret-change-in-production";

/// Default token lifetime: 24 hours.
pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 24 * 60 * 60;

/// Longest accepted token lifetime: 10 years.
pub const MAX_JWT_EXPIRATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

const DEFAULT_PG_HOST: &str = "localhost";
const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_PG_MAX_CONNECTIONS: u32 = 5;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid storage backend: {0}. Supported backends are: memory, postgres")]
    InvalidBackend(String),

    #[error("missing required PostgreSQL configuration: {0}")]
    MissingPostgres(String),

    #[error("invalid {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// PostgreSQL connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct PgSettings {
    /// Full connection URL. Takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl PgSettings {
    /// Build sqlx connect options from the URL or the discrete fields.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.url {
            Some(url) => url.parse(),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.database)),
        }
    }
}

impl fmt::Debug for PgSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSettings")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

/// Which credential store adapter to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres(PgSettings),
}

/// Core configuration.
#[derive(Clone)]
pub struct CoreConfig {
    pub storage: StorageBackend,
    /// HMAC secret for token signing.
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub jwt_expiration: Duration,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("storage", &self.storage)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration", &self.jwt_expiration)
            .finish()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration: Duration::seconds(DEFAULT_JWT_EXPIRATION_SECS),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable              | Default                                   |
    /// |-----------------------|-------------------------------------------|
    /// | `STORAGE_BACKEND`     | `memory` (`memory` or `postgres`)         |
    /// | `DATABASE_URL`        | unset; overrides the `PG_*` fields        |
    /// | `PG_HOST`             | `localhost`                               |
    /// | `PG_PORT`             | `5432`                                    |
    /// | `PG_USER`             | required for postgres without URL         |
    /// | `PG_PASSWORD`         | required for postgres without URL         |
    /// | `PG_DBNAME`           | required for postgres without URL         |
    /// | `PG_MAX_CONNECTIONS`  | `5`                                       |
    /// | `JWT_SECRET`          | [`DEFAULT_JWT_SECRET`]                    |
    /// | `JWT_EXPIRATION_SECS` | `86400` (at most [`MAX_JWT_EXPIRATION_SECS`]) |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let storage = match var("STORAGE_BACKEND", "memory").trim() {
            "" | "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres(pg_settings(&lookup)?),
            other => return Err(ConfigError::InvalidBackend(other.to_string())),
        };

        let jwt_secret = var("JWT_SECRET", DEFAULT_JWT_SECRET);

        let expiry_raw = var(
            "JWT_EXPIRATION_SECS",
            &DEFAULT_JWT_EXPIRATION_SECS.to_string(),
        );
        let jwt_expiration = expiry_raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|secs| (1..=MAX_JWT_EXPIRATION_SECS).contains(secs))
            .and_then(Duration::try_seconds)
            .ok_or(ConfigError::InvalidNumber {
                name: "JWT_EXPIRATION_SECS",
                value: expiry_raw.clone(),
            })?;

        Ok(Self {
            storage,
            jwt_secret,
            jwt_expiration,
        })
    }

    /// Whether the signing secret is the built-in development default.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn pg_settings<F>(lookup: &F) -> Result<PgSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let port = match non_empty("PG_PORT") {
        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            name: "PG_PORT",
            value: raw.clone(),
        })?,
        None => DEFAULT_PG_PORT,
    };
    let max_connections = match non_empty("PG_MAX_CONNECTIONS") {
        Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
            name: "PG_MAX_CONNECTIONS",
            value: raw.clone(),
        })?,
        None => DEFAULT_PG_MAX_CONNECTIONS,
    };

    let settings = PgSettings {
        url: non_empty("DATABASE_URL"),
        host: non_empty("PG_HOST").unwrap_or_else(|| DEFAULT_PG_HOST.to_string()),
        port,
        user: non_empty("PG_USER").unwrap_or_default(),
        password: non_empty("PG_PASSWORD").unwrap_or_default(),
        database: non_empty("PG_DBNAME").unwrap_or_default(),
        max_connections,
    };

    if settings.url.is_none() {
        let missing: Vec<&str> = [
            ("PG_USER", &settings.user),
            ("PG_PASSWORD", &settings.password),
            ("PG_DBNAME", &settings.database),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingPostgres(format!(
                "{} must be set when STORAGE_BACKEND is postgres",
                missing.join(", ")
            )));
        }
    }

    Ok(settings)
}
