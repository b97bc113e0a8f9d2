//! Process configuration, read once at startup from the environment.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_millis(2000);
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub jwt_secret: String,
    /// Upper bound for a single registry call.
    pub storage_timeout: Duration,
    /// Postgres connection string; in-memory registries when absent.
    pub database_url: Option<String>,
    /// Load the demo store tree into empty in-memory registries.
    pub seed: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("GROCERY_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "GROCERY_PORT",
                expected: "a port number",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let storage_timeout = match lookup("STORAGE_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "STORAGE_TIMEOUT_MS",
                        expected: "a positive number of milliseconds",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_STORAGE_TIMEOUT,
        };

        let seed = match lookup("GROCERY_SEED").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "GROCERY_SEED",
                    expected: "true or false",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            port,
            jwt_secret,
            storage_timeout,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            seed,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("port", &self.port)
            .field("storage_timeout", &self.storage_timeout)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let c = config(&[]).unwrap();
        assert_eq!(c.port, DEFAULT_PORT);
        assert_eq!(c.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(c.storage_timeout, DEFAULT_STORAGE_TIMEOUT);
        assert_eq!(c.database_url, None);
        assert!(!c.seed);
    }

    #[test]
    fn reads_every_variable() {
        let c = config(&[
            ("GROCERY_PORT", "9090"),
            ("JWT_SECRET", "s3cret"),
            ("STORAGE_TIMEOUT_MS", "250"),
            ("DATABASE_URL", "postgres://localhost/grocery"),
            ("GROCERY_SEED", "true"),
        ])
        .unwrap();
        assert_eq!(c.bind_addr().port(), 9090);
        assert_eq!(c.jwt_secret, "s3cret");
        assert_eq!(c.storage_timeout, Duration::from_millis(250));
        assert_eq!(c.database_url.as_deref(), Some("postgres://localhost/grocery"));
        assert!(c.seed);
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(matches!(
            config(&[("GROCERY_PORT", "http")]),
            Err(ConfigError::Invalid { var: "GROCERY_PORT", .. })
        ));
        assert!(matches!(
            config(&[("STORAGE_TIMEOUT_MS", "0")]),
            Err(ConfigError::Invalid { var: "STORAGE_TIMEOUT_MS", .. })
        ));
        assert!(matches!(
            config(&[("GROCERY_SEED", "maybe")]),
            Err(ConfigError::Invalid { var: "GROCERY_SEED", .. })
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let c = config(&[("JWT_SECRET", "s3cret"), ("DATABASE_URL", "postgres://u:pw@h/db")]).unwrap();
        let rendered = format!("{c:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("pw@"));
    }
}
