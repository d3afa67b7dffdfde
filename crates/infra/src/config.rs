//! Environment configuration.
//!
//! | variable | default |
//! |----------|---------|
//! | `AESTHETICA_BIND_ADDR` | `0.0.0.0:8080` |
//! | `DATABASE_URL` | unset: in-memory document store |
//! | `AESTHETICA_CACHE_TTL_SECS` | `300` |
//! | `AESTHETICA_CACHE_POLICY` | `legacy` |
//! | `AESTHETICA_STORAGE_DIR` | unset: in-memory object store |
//! | `AESTHETICA_PUBLIC_BASE_URL` | `http://localhost:8080/files` |
//! | `AESTHETICA_LOW_STOCK_THRESHOLD` | `10` |
//! | `AESTHETICA_LOG_FORMAT` | `json` |
//!
//! Empty values count as unset.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use aesthetica_observability::LogFormat;
use aesthetica_products::DEFAULT_LOW_STOCK_THRESHOLD;

use crate::cache::{CachePolicy, DEFAULT_CACHE_TTL};

pub const BIND_ADDR_VAR: &str = "AESTHETICA_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const CACHE_TTL_VAR: &str = "AESTHETICA_CACHE_TTL_SECS";
pub const CACHE_POLICY_VAR: &str = "AESTHETICA_CACHE_POLICY";
pub const STORAGE_DIR_VAR: &str = "AESTHETICA_STORAGE_DIR";
pub const PUBLIC_BASE_URL_VAR: &str = "AESTHETICA_PUBLIC_BASE_URL";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "AESTHETICA_LOW_STOCK_THRESHOLD";
pub const LOG_FORMAT_VAR: &str = "AESTHETICA_LOG_FORMAT";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/files";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub cache_ttl: Duration,
    pub cache_policy: CachePolicy,
    pub storage_dir: Option<PathBuf>,
    pub public_base_url: String,
    pub low_stock_threshold: i64,
    pub log_format: LogFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_policy: CachePolicy::default(),
            storage_dir: None,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            log_format: LogFormat::default(),
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            bind_addr: parse_or(&get, BIND_ADDR_VAR, defaults.bind_addr)?,
            database_url: get(DATABASE_URL_VAR),
            cache_ttl: parse_or(&get, CACHE_TTL_VAR, defaults.cache_ttl.as_secs())
                .map(Duration::from_secs)?,
            cache_policy: parse_or(&get, CACHE_POLICY_VAR, defaults.cache_policy)?,
            storage_dir: get(STORAGE_DIR_VAR).map(PathBuf::from),
            public_base_url: get(PUBLIC_BASE_URL_VAR).unwrap_or(defaults.public_base_url),
            low_stock_threshold: parse_or(&get, LOW_STOCK_THRESHOLD_VAR, defaults.low_stock_threshold)?,
            log_format: parse_or(&get, LOG_FORMAT_VAR, defaults.log_format)?,
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
