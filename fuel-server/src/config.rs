//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_CACHE_PATH, DEFAULT_TTL};
use crate::feed::{DEFAULT_BRAND, DEFAULT_FEED_URL};

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default static assets directory.
const DEFAULT_STATIC_DIR: &str = "static";

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Station feed endpoint (`FUEL_FEED_URL`).
    pub feed_url: String,
    /// Local cache file (`FUEL_CACHE_PATH`).
    pub cache_path: PathBuf,
    /// Brand kept on the map (`FUEL_BRAND`).
    pub brand: String,
    /// Listen address (`FUEL_BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// Static assets directory (`FUEL_STATIC_DIR`).
    pub static_dir: String,
    /// Feed request timeout (`FUEL_FEED_TIMEOUT_SECS`); none if unset.
    pub feed_timeout: Option<Duration>,
    /// How often to revalidate against the feed (`FUEL_REFRESH_INTERVAL_SECS`).
    pub refresh_interval: Duration,
    /// Cache freshness window.
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            brand: DEFAULT_BRAND.to_string(),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3000))),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            feed_timeout: None,
            refresh_interval: DEFAULT_TTL,
            cache_ttl: DEFAULT_TTL,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("FUEL_FEED_URL") {
            config.feed_url = url;
        }
        if let Some(path) = get("FUEL_CACHE_PATH") {
            config.cache_path = PathBuf::from(path);
        }
        if let Some(brand) = get("FUEL_BRAND") {
            config.brand = brand;
        }
        if let Some(addr) = get("FUEL_BIND_ADDR") {
            config.bind_addr = addr.trim().parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    name: "FUEL_BIND_ADDR",
                    value: addr.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(dir) = get("FUEL_STATIC_DIR") {
            config.static_dir = dir;
        }
        if let Some(secs) = get("FUEL_FEED_TIMEOUT_SECS") {
            config.feed_timeout = Some(parse_secs("FUEL_FEED_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("FUEL_REFRESH_INTERVAL_SECS") {
            config.refresh_interval = parse_secs("FUEL_REFRESH_INTERVAL_SECS", &secs)?;
        }

        Ok(config)
    }
}

/// Parse a positive number of seconds.
fn parse_secs(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
