//! Server configuration from environment variables.

use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;
use tradeflow_core::parse_amount;
use tradeflow_core::protocol::TradeLimits;

/// Listen address used when `TRADEFLOW_ADDR` is unset.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3030";

const ADDR_VAR: &str = "TRADEFLOW_ADDR";
const MAX_BALANCE_VAR: &str = "TRADEFLOW_MAX_BALANCE";
const MAX_SLIPPAGE_VAR: &str = "TRADEFLOW_MAX_SLIPPAGE";
const RECOMMENDED_SLIPPAGE_VAR: &str = "TRADEFLOW_RECOMMENDED_SLIPPAGE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TRADEFLOW_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("Invalid {name} {value:?}: expected a value like \"0.1 ETH\" or \"1.5%\"")]
    InvalidLimit { name: &'static str, value: String },
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Limits applied when a request does not carry its own.
    pub limits: TradeLimits,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Unset or empty variables
    /// take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_value = get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        let defaults = TradeLimits::default();
        let limit = |name: &'static str, fallback: String| match get(name) {
            Some(value) if parse_amount(&value).is_none() => {
                Err(ConfigError::InvalidLimit { name, value })
            }
            Some(value) => Ok(value),
            None => Ok(fallback),
        };

        let limits = TradeLimits {
            max_balance: limit(MAX_BALANCE_VAR, defaults.max_balance)?,
            max_slippage: limit(MAX_SLIPPAGE_VAR, defaults.max_slippage)?,
            recommended_slippage: limit(RECOMMENDED_SLIPPAGE_VAR, defaults.recommended_slippage)?,
        };

        Ok(Self { addr, limits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3030".parse::<SocketAddr>().unwrap());
        assert_eq!(config.limits, TradeLimits::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TRADEFLOW_ADDR", "127.0.0.1:8080"),
            ("TRADEFLOW_MAX_BALANCE", "200 AVAX"),
            ("TRADEFLOW_MAX_SLIPPAGE", "2%"),
            ("TRADEFLOW_RECOMMENDED_SLIPPAGE", ""),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.limits.max_balance, "200 AVAX");
        assert_eq!(config.limits.max_slippage, "2%");
        assert_eq!(config.limits.recommended_slippage, "1%");
    }

    #[test]
    fn test_invalid_addr() {
        let err = ServerConfig::from_lookup(lookup(&[("TRADEFLOW_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));
    }

    #[test]
    fn test_invalid_limit() {
        let err =
            ServerConfig::from_lookup(lookup(&[("TRADEFLOW_MAX_SLIPPAGE", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLimit { name: "TRADEFLOW_MAX_SLIPPAGE", .. }
        ));
    }
}
