//! Environment-driven server configuration.
//!
//! Every key has a default except the token secret, which must be set
//! unless development mode is explicitly allowed.
//!
//! Loading runs before the logger exists, so fallbacks are collected as
//! [`ConfigNotice`]s and emitted by [`Config::log_notices`] once logging is up.

use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEV_SECRET: &str = "secretsanta-dev-secret-change-me";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("{0} must be set (or set SANTA_ALLOW_DEV_SECRET=1 for local development)")]
    MissingSecret(&'static str),
}

/// Something worth reporting about how the configuration was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigNotice {
    Defaulted { key: &'static str, value: String },
    DevSecretInUse,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub secret_key: String,
    pub token_ttl: Duration,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub notices: Vec<ConfigNotice>,
}

impl Config {
    /// Loads configuration from process environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut loader = Loader {
            lookup,
            notices: Vec::new(),
        };

        let allow_dev_secret = loader.value::<u8>("SANTA_ALLOW_DEV_SECRET", "0")? == 1;
        let secret_key = match (loader.lookup)("SANTA_SECRET_KEY")
            .filter(|value| !value.trim().is_empty())
        {
            Some(secret) => secret,
            None if allow_dev_secret => {
                loader.notices.push(ConfigNotice::DevSecretInUse);
                DEV_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingSecret("SANTA_SECRET_KEY")),
        };

        let ttl_minutes: u64 = loader.value("SANTA_TOKEN_TTL_MINUTES", "1440")?;
        if ttl_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SANTA_TOKEN_TTL_MINUTES",
                message: "must be greater than zero".to_string(),
            });
        }
        let ttl_seconds = ttl_minutes
            .checked_mul(60)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "SANTA_TOKEN_TTL_MINUTES",
                message: format!("{ttl_minutes} minutes is too large"),
            })?;

        let bind = loader.value("SANTA_BIND", "0.0.0.0")?;
        let port = loader.value("SANTA_PORT", "8000")?;
        let db_path: String = loader.value("SANTA_DB_PATH", "secretsanta.sqlite3")?;
        let log_level = loader.value("SANTA_LOG_LEVEL", santa_core::default_log_level())?;
        let log_dir = (loader.lookup)("SANTA_LOG_DIR").filter(|value| !value.trim().is_empty());

        Ok(Self {
            bind,
            port,
            db_path: PathBuf::from(db_path),
            secret_key,
            token_ttl: Duration::from_secs(ttl_seconds),
            log_level,
            log_dir,
            notices: loader.notices,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Emits the notices gathered while loading. Call after logging starts.
    pub fn log_notices(&self) {
        for notice in &self.notices {
            match notice {
                ConfigNotice::Defaulted { key, value } => {
                    info!("{key} not set, using default: {value}")
                }
                ConfigNotice::DevSecretInUse => {
                    warn!("event=config_load module=config status=warn reason=dev_secret_in_use")
                }
            }
        }
    }
}

struct Loader<F> {
    lookup: F,
    notices: Vec<ConfigNotice>,
}

impl<F: Fn(&str) -> Option<String>> Loader<F> {
    fn value<T>(&mut self, key: &'static str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = match (self.lookup)(key) {
            Some(raw) => raw,
            None => {
                self.notices.push(ConfigNotice::Defaulted {
                    key,
                    value: default.to_string(),
                });
                default.to_string()
            }
        };

        raw.trim()
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                key,
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, ConfigNotice};
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("SANTA_SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.address(), "0.0.0.0:8000");
        assert_eq!(config.token_ttl, Duration::from_secs(1440 * 60));
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn defaulted_keys_are_recorded_as_notices() {
        let config = Config::from_lookup(lookup(&[
            ("SANTA_SECRET_KEY", "s3cret"),
            ("SANTA_PORT", "9000"),
        ]))
        .unwrap();

        assert!(config.notices.contains(&ConfigNotice::Defaulted {
            key: "SANTA_BIND",
            value: "0.0.0.0".to_string(),
        }));
        assert!(!config
            .notices
            .iter()
            .any(|notice| matches!(notice, ConfigNotice::Defaulted { key: "SANTA_PORT", .. })));
        assert!(!config.notices.contains(&ConfigNotice::DevSecretInUse));
    }

    #[test]
    fn missing_secret_is_an_error_unless_dev_mode() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret("SANTA_SECRET_KEY"));

        let config = Config::from_lookup(lookup(&[("SANTA_ALLOW_DEV_SECRET", "1")])).unwrap();
        assert!(!config.secret_key.is_empty());
        assert!(config.notices.contains(&ConfigNotice::DevSecretInUse));
    }

    #[test]
    fn invalid_port_is_reported_with_key() {
        let err = Config::from_lookup(lookup(&[
            ("SANTA_SECRET_KEY", "s3cret"),
            ("SANTA_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "SANTA_PORT",
                ..
            }
        ));
    }

    #[test]
    fn zero_token_ttl_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("SANTA_SECRET_KEY", "s3cret"),
            ("SANTA_TOKEN_TTL_MINUTES", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn token_ttl_too_large_for_seconds_is_rejected() {
        let max_minutes = u64::MAX.to_string();
        let err = Config::from_lookup(lookup(&[
            ("SANTA_SECRET_KEY", "s3cret"),
            ("SANTA_TOKEN_TTL_MINUTES", max_minutes.as_str()),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "SANTA_TOKEN_TTL_MINUTES",
                ..
            }
        ));
    }
}
