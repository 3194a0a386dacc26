//! Configuration for the Net F/T relay
//!
//! Loads configuration from a TOML file with the minimal parameters needed
//! to reach the device and the downstream consumer.

use crate::error::{Error, Result};
use crate::protocol::CMD_START_STREAMING;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub relay: RelayConfig,
    pub logging: LoggingConfig,
}

/// Net F/T device endpoint and streaming request parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device IP address
    pub address: String,
    /// UDP port the Net F/T always uses
    #[serde(default = "default_device_port")]
    pub port: u16,
    /// RDT command code (2 starts real-time streaming)
    #[serde(default = "default_command")]
    pub command: u16,
    /// Samples to request (0 = continuous streaming)
    #[serde(default)]
    pub sample_count: u32,
}

/// Downstream consumer endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Consumer IP address or hostname
    pub address: String,
    /// Consumer TCP port
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

fn default_device_port() -> u16 {
    49152
}

fn default_command() -> u16 {
    CMD_START_STREAMING
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Device endpoint as `address:port`
    pub fn device_addr(&self) -> String {
        format!("{}:{}", self.device.address, self.device.port)
    }

    /// Downstream endpoint as `address:port`
    pub fn relay_addr(&self) -> String {
        format!("{}:{}", self.relay.address, self.relay.port)
    }
}

impl Default for AppConfig {
    /// Loopback defaults suitable for testing; production deployments
    /// should use a TOML configuration file pointing at the real device.
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                address: "192.168.1.1".to_string(),
                port: default_device_port(),
                command: default_command(),
                sample_count: 0,
            },
            relay: RelayConfig {
                address: "127.0.0.1".to_string(),
                port: 4578,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
