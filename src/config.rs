//! Configuration module for linkwatch.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The probe target and interval are fixed and have no knobs here.

use std::env;
use std::net::IpAddr;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the dashboard (default: 8080)
    pub http_port: u16,
    /// Address the dashboard binds to (default: 0.0.0.0)
    pub bind_addr: IpAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LINKWATCH_HTTP_PORT`: HTTP port (default: 8080)
    /// - `LINKWATCH_BIND_ADDR`: bind address (default: "0.0.0.0")
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port) = lookup("LINKWATCH_HTTP_PORT").and_then(|s| s.parse().ok()) {
            cfg.http_port = port;
        }

        if let Some(addr) = lookup("LINKWATCH_BIND_ADDR").and_then(|s| s.parse().ok()) {
            cfg.bind_addr = addr;
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.bind_addr, IpAddr::from([0, 0, 0, 0]));
    }

    #[test]
    fn test_env_overrides() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[
            ("LINKWATCH_HTTP_PORT", "9090"),
            ("LINKWATCH_BIND_ADDR", "127.0.0.1"),
        ]));
        assert_eq!(cfg.http_port, 9090);
        assert_eq!(cfg.bind_addr, IpAddr::from([127, 0, 0, 1]));
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[
            ("LINKWATCH_HTTP_PORT", "eighty"),
            ("LINKWATCH_BIND_ADDR", "not-an-ip"),
        ]));
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.bind_addr, IpAddr::from([0, 0, 0, 0]));
    }
}
