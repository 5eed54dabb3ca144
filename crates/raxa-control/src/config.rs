//! Configuration file
//!
//! All sections are optional; a missing file behaves like an empty one.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use raxa_core::{LightConfig, LogConfig, DEFAULT_PAUSE, DEFAULT_REPEATS};

use crate::net::{COMMAND_PORT, DISCOVERY_PORT};
use crate::{ControlError, Result};

/// Bridge communication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Local address the listener binds
    pub listen_address: Ipv4Addr,
    /// Command port, used for listening and as send destination
    pub command_port: u16,
    /// Port discovery probes are sent to
    pub discovery_port: u16,
    /// Broadcast address discovery probes are sent to
    pub broadcast_address: Ipv4Addr,
    /// Seconds between discovery probes
    pub discovery_interval_secs: u64,
    /// RF repeat count placed in every envelope
    pub repeats: u8,
    /// Pause between RF repeats
    pub pause: u8,
    /// Forget bridges silent for this many seconds; 0 keeps them forever
    pub bridge_ttl_secs: u64,
    /// Bridges to address without waiting for discovery
    pub static_bridges: Vec<IpAddr>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_address: Ipv4Addr::UNSPECIFIED,
            command_port: COMMAND_PORT,
            discovery_port: DISCOVERY_PORT,
            broadcast_address: Ipv4Addr::BROADCAST,
            discovery_interval_secs: 600,
            repeats: DEFAULT_REPEATS,
            pause: DEFAULT_PAUSE,
            bridge_ttl_secs: 0,
            static_bridges: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Listener bind address
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((self.listen_address, self.command_port))
    }

    /// Discovery probe destination
    pub fn discovery_target(&self) -> SocketAddr {
        SocketAddr::from((self.broadcast_address, self.discovery_port))
    }

    /// Interval between discovery probes
    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_interval_secs)
    }

    /// Bridge expiry, if enabled
    pub fn bridge_ttl(&self) -> Option<Duration> {
        (self.bridge_ttl_secs > 0).then(|| Duration::from_secs(self.bridge_ttl_secs))
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaxaConfig {
    /// Bridge communication
    pub bridge: BridgeConfig,
    /// Logging
    pub logging: LogConfig,
    /// Configured lights
    pub lights: Vec<LightConfig>,
}

impl RaxaConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RaxaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load a configuration file, or return defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Check light addresses and name uniqueness
    pub fn validate(&self) -> Result<()> {
        if self.bridge.discovery_interval_secs == 0 {
            return Err(ControlError::InvalidConfig(
                "discovery_interval_secs must be greater than 0".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for light in &self.lights {
            light.validate().map_err(|e| {
                ControlError::InvalidConfig(format!("light '{}': {}", light.name, e))
            })?;
            if !names.insert(light.name.as_str()) {
                return Err(ControlError::InvalidConfig(format!(
                    "duplicate light name '{}'",
                    light.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a light by name
    pub fn light(&self, name: &str) -> Result<&LightConfig> {
        self.lights
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| ControlError::LightNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RaxaConfig::from_toml_str("").unwrap();
        assert_eq!(config.bridge.command_port, 42314);
        assert_eq!(config.bridge.discovery_port, 30303);
        assert_eq!(
            config.bridge.discovery_target(),
            "255.255.255.255:30303".parse().unwrap()
        );
        assert_eq!(config.bridge.listen_addr(), "0.0.0.0:42314".parse().unwrap());
        assert_eq!(config.bridge.repeats, 8);
        assert_eq!(config.bridge.pause, 15);
        assert_eq!(config.bridge.bridge_ttl(), None);
        assert!(config.lights.is_empty());
    }

    #[test]
    fn test_full_document() {
        let config = RaxaConfig::from_toml_str(
            r#"
            [bridge]
            discovery_interval_secs = 60
            bridge_ttl_secs = 1800
            static_bridges = ["192.168.1.40"]

            [logging]
            level = "debug"

            [[lights]]
            name = "Kitchen"
            device_code = 12345
            group_code = 0
            dimmable = true

            [[lights]]
            name = "Porch"
            device_code = 12345
            group_code = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.bridge.discovery_interval(), Duration::from_secs(60));
        assert_eq!(config.bridge.bridge_ttl(), Some(Duration::from_secs(1800)));
        assert_eq!(
            config.bridge.static_bridges,
            vec!["192.168.1.40".parse::<IpAddr>().unwrap()]
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.light("Kitchen").unwrap().dimmable);
        assert!(!config.light("Porch").unwrap().dimmable);
        assert!(matches!(
            config.light("Attic"),
            Err(ControlError::LightNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_bad_lights() {
        let out_of_range = r#"
            [[lights]]
            name = "Bad"
            device_code = 67234433
            group_code = 0
        "#;
        assert!(matches!(
            RaxaConfig::from_toml_str(out_of_range),
            Err(ControlError::InvalidConfig(_))
        ));

        let duplicate = r#"
            [[lights]]
            name = "Same"
            device_code = 1
            group_code = 0

            [[lights]]
            name = "Same"
            device_code = 2
            group_code = 0
        "#;
        assert!(matches!(
            RaxaConfig::from_toml_str(duplicate),
            Err(ControlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RaxaConfig::from_toml_str("[bridge]\ncommand_port = \"x\""),
            Err(ControlError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(
            RaxaConfig::load_or_default(&missing).unwrap(),
            RaxaConfig::default()
        );

        let path = dir.path().join("raxa.toml");
        std::fs::write(&path, "[bridge]\ncommand_port = 5000\n").unwrap();
        assert_eq!(RaxaConfig::load_or_default(&path).unwrap().bridge.command_port, 5000);
    }
}
