use std::net::SocketAddr;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Moncton;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub teamsnap_client_id: String,
    /// Division whose tree, teams and season drive the whole site.
    pub root_division_id: i64,
    /// Zone used for week windows and "today".
    pub time_zone: Tz,
    pub bind_addr: SocketAddr,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            teamsnap_client_id: String::new(),
            root_division_id: -1,
            time_zone: DEFAULT_TIME_ZONE,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load from the process environment, after seeding it from `.env` when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take their defaults; present but
    /// unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let teamsnap_client_id = get("TEAMSNAP_CLIENT_ID").unwrap_or(defaults.teamsnap_client_id);
        let root_division_id = match get("TEAMSNAP_ROOT_DIVISION_ID") {
            Some(v) => parse(&v, "TEAMSNAP_ROOT_DIVISION_ID", "an integer")?,
            None => defaults.root_division_id,
        };
        let time_zone = match get("SITE_TIME_ZONE") {
            Some(v) => parse(&v, "SITE_TIME_ZONE", "an IANA time zone name")?,
            None => defaults.time_zone,
        };
        let bind_addr = match get("BIND_ADDR") {
            Some(v) => parse(&v, "BIND_ADDR", "a socket address")?,
            None => defaults.bind_addr,
        };
        let cache_ttl = match get("CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(parse(&v, "CACHE_TTL_SECS", "a number of seconds")?),
            None => defaults.cache_ttl,
        };
        let cache_capacity = match get("CACHE_CAPACITY") {
            Some(v) => parse(&v, "CACHE_CAPACITY", "a positive integer")?,
            None => defaults.cache_capacity,
        };
        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse(&v, "HTTP_TIMEOUT_SECS", "a number of seconds")?),
            None => defaults.http_timeout,
        };

        Ok(Config {
            teamsnap_client_id,
            root_division_id,
            time_zone,
            bind_addr,
            cache_ttl,
            cache_capacity,
            http_timeout,
        })
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str, expected: &'static str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    })
}
