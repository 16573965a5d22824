//! Server configuration
//!
//! Loaded from an optional `config.toml` with `PICO_FTP_*` environment
//! overrides. Every field has a default so the server runs with no
//! configuration file present.

use config::{Config, Environment, File};
use serde::Deserialize;

/// Server configuration loaded once at startup.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the control listener binds to.
    pub bind_address: String,

    /// Port for the FTP control connection.
    pub control_port: u16,

    /// Port range scanned for PASV data channel listeners.
    pub data_port_min: u16,
    pub data_port_max: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            control_port: 21,
            data_port_min: 2122,
            data_port_max: 2221,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (if present) and the
    /// environment, falling back to defaults for anything unset.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("PICO_FTP").separator("_"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Bind address and control port as a socket address string.
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    /// Inclusive port range scanned when opening a PASV listener.
    pub fn data_ports(&self) -> std::ops::RangeInclusive<u16> {
        self.data_port_min..=self.data_port_max
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.data_port_min > self.data_port_max {
            return Err(config::ConfigError::Message(
                "data_port_min must not exceed data_port_max".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_range_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.data_ports().contains(&config.data_port_min));
        assert!(config.data_ports().contains(&config.data_port_max));
    }

    #[test]
    fn inverted_port_range_is_rejected() {
        let config = ServerConfig {
            data_port_min: 3000,
            data_port_max: 2000,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn control_socket_joins_address_and_port() {
        let config = ServerConfig {
            bind_address: "127.0.0.1".into(),
            control_port: 2121,
            ..ServerConfig::default()
        };
        assert_eq!(config.control_socket(), "127.0.0.1:2121");
    }
}
