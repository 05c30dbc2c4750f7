use crate::error::ConfigError;
use crate::search::SearchLimits;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

const ADDR_VAR: &str = "SCHEDULER_ADDR";
const MAX_NODES_VAR: &str = "SCHEDULER_MAX_NODES";
const SEED_VAR: &str = "SCHEDULER_SEED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// `None` lets a search run until it finishes.
    pub max_nodes: Option<u64>,
    /// Seed used when a request does not bring its own.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_nodes: Some(500_000),
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for
    /// missing keys. A node limit of `0` disables the limit.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let addr = parse(ADDR_VAR, lookup(ADDR_VAR))?.unwrap_or(defaults.addr);
        let max_nodes = match parse::<u64>(MAX_NODES_VAR, lookup(MAX_NODES_VAR))? {
            Some(0) => None,
            Some(n) => Some(n),
            None => defaults.max_nodes,
        };
        let seed = parse(SEED_VAR, lookup(SEED_VAR))?;

        Ok(Self {
            addr,
            max_nodes,
            seed,
        })
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_nodes: self.max_nodes,
        }
    }
}

fn parse<T>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(load(&[]).unwrap(), ServerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            (ADDR_VAR, "0.0.0.0:9000"),
            (MAX_NODES_VAR, "1000"),
            (SEED_VAR, " 7 "),
        ])
        .unwrap();
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(config.search_limits(), SearchLimits::with_max_nodes(1000));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn zero_disables_node_limit() {
        let config = load(&[(MAX_NODES_VAR, "0")]).unwrap();
        assert_eq!(config.search_limits(), SearchLimits::unbounded());
    }

    #[test]
    fn rejects_garbage() {
        let err = load(&[(MAX_NODES_VAR, "lots")]).unwrap_err();
        assert!(err.to_string().contains(MAX_NODES_VAR));
    }
}
