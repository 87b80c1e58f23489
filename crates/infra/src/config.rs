//! Configuration loading and representation.
//!
//! Everything comes from environment variables so the binary can run unchanged
//! in a container or on a laptop.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "PVTRACK_BIND_ADDR";
pub const SEED_FILE_VAR: &str = "PVTRACK_SEED_FILE";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address ({value}): {source}")]
    InvalidBindAddr {
        var: &'static str,
        value: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// JSON seed file loaded into the store at startup.
    pub seed_file: Option<PathBuf>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = match read(BIND_ADDR_VAR) {
            Some(value) => value.parse::<SocketAddr>().map_err(|source| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: value.clone(),
                source,
            })?,
            None => default_bind_addr(),
        };

        Ok(Self {
            bind_addr,
            seed_file: read(SEED_FILE_VAR).map(PathBuf::from),
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            seed_file: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn reads_bind_addr_and_seed_file() {
        let config = ApiConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (SEED_FILE_VAR, " /srv/pvtrack/seed.json "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.seed_file, Some(PathBuf::from("/srv/pvtrack/seed.json")));
    }

    #[test]
    fn blank_seed_file_is_unset() {
        let config = ApiConfig::from_lookup(lookup(&[(SEED_FILE_VAR, "  ")])).unwrap();
        assert_eq!(config.seed_file, None);
    }

    #[test]
    fn invalid_bind_addr_is_an_error() {
        let err = ApiConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "localhost")])).unwrap_err();
        assert!(err.to_string().starts_with("PVTRACK_BIND_ADDR is not a valid socket address"));
    }
}
