//! API server configuration.

use std::time::Duration;

use voidrunner_core::config::{ConfigError, CoreConfig};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SWEEP_SECS: u64 = 300;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// How often expired ids are swept from the revocation set.
    pub revocation_sweep_interval: Duration,
    /// Storage and token settings.
    pub core: CoreConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default          |
    /// |--------------------------|------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:8080` |
    /// | `REVOCATION_SWEEP_SECS`  | `300`            |
    ///
    /// Storage and token variables are read by [`CoreConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sweep_secs = match lookup("REVOCATION_SWEEP_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "REVOCATION_SWEEP_SECS",
                    value: raw.clone(),
                })?,
            None => DEFAULT_SWEEP_SECS,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            revocation_sweep_interval: Duration::from_secs(sweep_secs),
            core: CoreConfig::from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.revocation_sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn overrides() {
        let config = ApiConfig::from_lookup(|key| match key {
            "BIND_ADDR" => Some("0.0.0.0:9000".into()),
            "REVOCATION_SWEEP_SECS" => Some("60".into()),
            "JWT_SECRET" => Some("s3cret".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.revocation_sweep_interval, Duration::from_secs(60));
        assert_eq!(config.core.jwt_secret, "s3cret");
    }

    #[test]
    fn rejects_zero_sweep_interval() {
        let result = ApiConfig::from_lookup(|key| {
            (key == "REVOCATION_SWEEP_SECS").then(|| "0".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
    }
}
