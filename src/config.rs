// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `EXPECTED_AUDIENCE` | Audience client tokens must carry | Required |
//! | `ISSUER_FORMAT` | `any` or `uuid` | `any` |
//! | `SECRET_LOOKUP_TIMEOUT_SECS` | Timeout for one secret lookup | `5` |
//! | `CLIENT_SECRETS_FILE` | JSON file of registered clients | Optional |
//! | `WELL_KNOWN_KEYS_URL` | Callback producer's key endpoint | Optional |
//! | `KEY_CACHE_TTL_SECS` | Key cache TTL | `300` |
//! | `KEY_MIN_REFRESH_INTERVAL_SECS` | Minimum spacing of key fetches | `60` |
//! | `KEY_FETCH_TIMEOUT_SECS` | HTTP timeout for key fetches | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::auth::{GateConfig, IssuerFormat};
use crate::keys::cache::{DEFAULT_MIN_REFRESH_INTERVAL, DEFAULT_TTL};
use crate::keys::source::DEFAULT_FETCH_TIMEOUT;
use crate::keys::KeyCacheConfig;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const EXPECTED_AUDIENCE_ENV: &str = "EXPECTED_AUDIENCE";
pub const ISSUER_FORMAT_ENV: &str = "ISSUER_FORMAT";
pub const SECRET_LOOKUP_TIMEOUT_ENV: &str = "SECRET_LOOKUP_TIMEOUT_SECS";
pub const CLIENT_SECRETS_FILE_ENV: &str = "CLIENT_SECRETS_FILE";
pub const WELL_KNOWN_KEYS_URL_ENV: &str = "WELL_KNOWN_KEYS_URL";
pub const KEY_CACHE_TTL_ENV: &str = "KEY_CACHE_TTL_SECS";
pub const KEY_MIN_REFRESH_INTERVAL_ENV: &str = "KEY_MIN_REFRESH_INTERVAL_SECS";
pub const KEY_FETCH_TIMEOUT_ENV: &str = "KEY_FETCH_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Everything the service needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub gate: GateConfig,
    pub client_secrets_file: Option<PathBuf>,
    pub well_known_keys_url: Option<Url>,
    pub key_cache: KeyCacheConfig,
    pub key_fetch_timeout: Duration,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => parse(PORT_ENV, &raw, |v| v.parse::<u16>().map_err(|e| e.to_string()))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = parse(HOST_ENV, &format!("{host}:{port}"), |v| {
            v.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;

        let expected_audience =
            var(EXPECTED_AUDIENCE_ENV).ok_or(ConfigError::Missing(EXPECTED_AUDIENCE_ENV))?;

        let issuer_format = match var(ISSUER_FORMAT_ENV) {
            Some(raw) => parse(ISSUER_FORMAT_ENV, &raw, |v| {
                v.parse::<IssuerFormat>().map_err(|e| e.to_string())
            })?,
            None => IssuerFormat::Any,
        };

        let lookup_timeout = seconds(&var, SECRET_LOOKUP_TIMEOUT_ENV, Duration::from_secs(5))?;

        let well_known_keys_url = match var(WELL_KNOWN_KEYS_URL_ENV) {
            Some(raw) => Some(parse(WELL_KNOWN_KEYS_URL_ENV, &raw, |v| {
                let url = Url::parse(v).map_err(|e| e.to_string())?;
                match url.scheme() {
                    "https" | "http" => Ok(url),
                    other => Err(format!("unsupported scheme {other:?}")),
                }
            })?),
            None => None,
        };

        let key_cache = KeyCacheConfig {
            ttl: seconds(&var, KEY_CACHE_TTL_ENV, DEFAULT_TTL)?,
            min_refresh_interval: seconds(
                &var,
                KEY_MIN_REFRESH_INTERVAL_ENV,
                DEFAULT_MIN_REFRESH_INTERVAL,
            )?,
        };
        let key_fetch_timeout = seconds(&var, KEY_FETCH_TIMEOUT_ENV, DEFAULT_FETCH_TIMEOUT)?;

        let log_format = match var(LOG_FORMAT_ENV).as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: v,
                    reason: "expected `json` or `pretty`".to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            gate: GateConfig::new(expected_audience)
                .with_issuer_format(issuer_format)
                .with_lookup_timeout(lookup_timeout),
            client_secrets_file: var(CLIENT_SECRETS_FILE_ENV).map(PathBuf::from),
            well_known_keys_url,
            key_cache,
            key_fetch_timeout,
            log_format,
        })
    }
}

fn parse<T>(
    name: &'static str,
    raw: &str,
    f: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    f(raw.trim()).map_err(|reason| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason,
    })
}

fn seconds(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match var(name) {
        Some(raw) => parse(name, &raw, |v| {
            v.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let settings = settings(&[(EXPECTED_AUDIENCE_ENV, "platform-api")]).unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.gate.expected_audience, "platform-api");
        assert_eq!(settings.gate.issuer_format, IssuerFormat::Any);
        assert_eq!(settings.gate.lookup_timeout, Duration::from_secs(5));
        assert_eq!(settings.key_cache, KeyCacheConfig::default());
        assert_eq!(settings.key_fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert!(settings.well_known_keys_url.is_none());
        assert!(settings.client_secrets_file.is_none());
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn audience_is_required() {
        assert_eq!(
            settings(&[]).unwrap_err(),
            ConfigError::Missing(EXPECTED_AUDIENCE_ENV)
        );
        assert_eq!(
            settings(&[(EXPECTED_AUDIENCE_ENV, "  ")]).unwrap_err(),
            ConfigError::Missing(EXPECTED_AUDIENCE_ENV)
        );
    }

    #[test]
    fn overrides() {
        let settings = settings(&[
            (EXPECTED_AUDIENCE_ENV, "platform-api"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (ISSUER_FORMAT_ENV, "uuid"),
            (SECRET_LOOKUP_TIMEOUT_ENV, "2"),
            (WELL_KNOWN_KEYS_URL_ENV, "https://select.example.com/.well-known/keys"),
            (KEY_CACHE_TTL_ENV, "30"),
            (KEY_MIN_REFRESH_INTERVAL_ENV, "120"),
            (KEY_FETCH_TIMEOUT_ENV, "3"),
            (CLIENT_SECRETS_FILE_ENV, "/etc/trust-gate/clients.json"),
            (LOG_FORMAT_ENV, "JSON"),
        ])
        .unwrap();

        assert_eq!(settings.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(settings.gate.issuer_format, IssuerFormat::Uuid);
        assert_eq!(settings.gate.lookup_timeout, Duration::from_secs(2));
        assert_eq!(
            settings.well_known_keys_url.unwrap().as_str(),
            "https://select.example.com/.well-known/keys"
        );
        assert_eq!(settings.key_cache.ttl, Duration::from_secs(30));
        assert_eq!(
            settings.key_cache.min_refresh_interval,
            Duration::from_secs(120)
        );
        assert_eq!(settings.key_fetch_timeout, Duration::from_secs(3));
        assert_eq!(
            settings.client_secrets_file,
            Some(PathBuf::from("/etc/trust-gate/clients.json"))
        );
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let cases = [
            (PORT_ENV, "eighty"),
            (ISSUER_FORMAT_ENV, "email"),
            (KEY_CACHE_TTL_ENV, "-1"),
            (WELL_KNOWN_KEYS_URL_ENV, "ftp://example.com/keys"),
            (WELL_KNOWN_KEYS_URL_ENV, "not a url"),
            (LOG_FORMAT_ENV, "xml"),
        ];
        for (name, value) in cases {
            let err = settings(&[(EXPECTED_AUDIENCE_ENV, "aud"), (name, value)]).unwrap_err();
            match err {
                ConfigError::Invalid { name: got, .. } => assert_eq!(got, name),
                other => panic!("unexpected error for {name}: {other:?}"),
            }
        }
    }
}
