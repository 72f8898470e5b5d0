//! Process-level settings for the HTTP/WebSocket listener.
//!
//! Values come from the environment so the same binary can run locally and in a container.

use std::env;

use log::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Load `BIND_HOST` / `BIND_PORT`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup("BIND_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(raw) = lookup("BIND_PORT") {
            match raw.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(e) => warn!("[Config] Ignoring invalid BIND_PORT '{}': {}", raw, e),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn reads_host_and_port() {
        let config = ServerConfig::from_lookup(|key| match key {
            "BIND_HOST" => Some("0.0.0.0".to_string()),
            "BIND_PORT" => Some("9000".to_string()),
            _ => None,
        });
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn invalid_port_keeps_default() {
        let config = ServerConfig::from_lookup(|key| (key == "BIND_PORT").then(|| "http".to_string()));
        assert_eq!(config.port, 8080);
    }
}
