//! Process configuration read from the environment at startup.
//!
//! - `JAQPOT_API_KEY` / `JAQPOT_API_SECRET`: required credential pair.
//! - `JAQPOT_API_URL`: API base URL (default `https://api.jaqpot.org`).
//! - `JAQPOT_HTTP_TIMEOUT_SECS`: optional per-request HTTP timeout.
//! - `JAQPOT_HTTP_PROXY`: optional proxy URL for all API traffic.
//! - `JAQPOT_PREDICTION_TIMEOUT_SECS`: how long to wait for a prediction (default 60).
//! - `JAQPOT_PREDICTION_POLL_MS`: prediction poll interval (default 2000).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::options::{PredictionOptions, TransportOptions, DEFAULT_BASE_URL};

pub const API_KEY_VAR: &str = "JAQPOT_API_KEY";
pub const API_SECRET_VAR: &str = "JAQPOT_API_SECRET";
pub const API_URL_VAR: &str = "JAQPOT_API_URL";
pub const HTTP_TIMEOUT_VAR: &str = "JAQPOT_HTTP_TIMEOUT_SECS";
pub const HTTP_PROXY_VAR: &str = "JAQPOT_HTTP_PROXY";
pub const PREDICTION_TIMEOUT_VAR: &str = "JAQPOT_PREDICTION_TIMEOUT_SECS";
pub const PREDICTION_POLL_VAR: &str = "JAQPOT_PREDICTION_POLL_MS";

/// Fatal startup errors. Any of these prevents the server from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JAQPOT_API_KEY and JAQPOT_API_SECRET must be provided")]
    MissingCredentials,

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// API key and secret used to authenticate every backend request.
///
/// `Debug` never prints the values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Both values must be non-empty.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        let secret = secret.into();
        if key.is_empty() || secret.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(Self { key, secret })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Everything needed to construct the backend client.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub transport: TransportOptions,
    pub prediction: PredictionOptions,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(API_KEY_VAR).unwrap_or_default();
        let secret = lookup(API_SECRET_VAR).unwrap_or_default();
        let credentials = Credentials::new(key, secret)?;

        let base_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut transport = TransportOptions::new();
        if let Some(secs) = parse_var::<u64, _>(&lookup, HTTP_TIMEOUT_VAR)? {
            transport = transport.with_timeout(Duration::from_secs(secs));
        }
        if let Some(proxy) = lookup(HTTP_PROXY_VAR).filter(|p| !p.trim().is_empty()) {
            transport = transport.with_proxy(proxy.trim().to_string());
        }

        let mut prediction = PredictionOptions::default();
        if let Some(secs) = parse_var::<u64, _>(&lookup, PREDICTION_TIMEOUT_VAR)? {
            prediction = prediction.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, PREDICTION_POLL_VAR)? {
            prediction = prediction.with_poll_interval(Duration::from_millis(ms));
        }

        Ok(Self {
            credentials,
            base_url,
            transport,
            prediction,
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = ServerConfig::from_lookup(lookup(&[(API_KEY_VAR, "key")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
    }

    #[test]
    fn empty_key_is_fatal() {
        let err = ServerConfig::from_lookup(lookup(&[(API_KEY_VAR, ""), (API_SECRET_VAR, "s")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
    }

    #[test]
    fn defaults_apply() {
        let vars = lookup(&[(API_KEY_VAR, "k"), (API_SECRET_VAR, "s")]);
        let config = ServerConfig::from_lookup(vars).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.prediction, PredictionOptions::default());
        assert_eq!(config.credentials.key(), "k");
        assert_eq!(config.credentials.secret(), "s");
        match config.transport {
            TransportOptions::Http { timeout, proxy } => {
                assert_eq!(timeout, None);
                assert_eq!(proxy, None);
            }
        }
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ServerConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "k"),
            (API_SECRET_VAR, "s"),
            (API_URL_VAR, "http://localhost:8080/"),
            (PREDICTION_TIMEOUT_VAR, "5"),
            (PREDICTION_POLL_VAR, "100"),
            (HTTP_TIMEOUT_VAR, "15"),
            (HTTP_PROXY_VAR, " http://proxy.local:3128 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.prediction.timeout, Duration::from_secs(5));
        assert_eq!(config.prediction.poll_interval, Duration::from_millis(100));
        match config.transport {
            TransportOptions::Http { timeout, proxy } => {
                assert_eq!(timeout, Some(Duration::from_secs(15)));
                assert_eq!(proxy.as_deref(), Some("http://proxy.local:3128"));
            }
        }
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "k"),
            (API_SECRET_VAR, "s"),
            (HTTP_TIMEOUT_VAR, "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: HTTP_TIMEOUT_VAR,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn debug_redacts_credentials() {
        let creds = Credentials::new("top", "secret-value").unwrap();
        let printed = format!("{creds:?}");
        assert!(!printed.contains("top"));
        assert!(!printed.contains("secret-value"));
    }
}
