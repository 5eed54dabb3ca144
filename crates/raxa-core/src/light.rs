//! Configured Nexa self-learning lights

use serde::{Deserialize, Serialize};

use crate::command::{dim_level_from_brightness, Action, DeviceCommand};
use crate::{CommandError, Result, MAX_DEVICE_CODE, MAX_GROUP_CODE};

/// One light as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightConfig {
    /// Display name, unique within a configuration
    pub name: String,
    /// 26-bit device address the receiver was paired with
    pub device_code: u32,
    /// 4-bit group address (unit)
    pub group_code: u8,
    /// Receiver accepts absolute dim levels
    #[serde(default)]
    pub dimmable: bool,
}

impl LightConfig {
    /// Create a light entry
    pub fn new(name: impl Into<String>, device_code: u32, group_code: u8, dimmable: bool) -> Self {
        Self {
            name: name.into(),
            device_code,
            group_code,
            dimmable,
        }
    }

    /// Check the address fields against the protocol limits
    pub fn validate(&self) -> Result<()> {
        if self.device_code > MAX_DEVICE_CODE {
            return Err(CommandError::DeviceCodeOutOfRange(self.device_code));
        }
        if self.group_code > MAX_GROUP_CODE {
            return Err(CommandError::GroupCodeOutOfRange(self.group_code));
        }
        Ok(())
    }

    /// Stable identifier derived from the RF address
    pub fn unique_id(&self) -> String {
        format!("{}::{}", self.device_code, self.group_code)
    }

    /// Command for switching on, optionally at a brightness (0-255).
    ///
    /// Non-dimmable lights ignore the brightness and get a plain "on".
    pub fn turn_on_command(&self, brightness: Option<u8>) -> Result<DeviceCommand> {
        match brightness {
            Some(b) if self.dimmable => DeviceCommand::new(
                self.device_code,
                false,
                self.group_code,
                Action::Dim,
                Some(dim_level_from_brightness(b)),
            ),
            _ => DeviceCommand::on(self.device_code, self.group_code),
        }
    }

    /// Command for switching off
    pub fn turn_off_command(&self) -> Result<DeviceCommand> {
        DeviceCommand::off(self.device_code, self.group_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id() {
        let light = LightConfig::new("Kitchen", 12345, 2, false);
        assert_eq!(light.unique_id(), "12345::2");
    }

    #[test]
    fn test_validate() {
        assert!(LightConfig::new("ok", MAX_DEVICE_CODE, 15, true).validate().is_ok());
        assert!(LightConfig::new("bad", MAX_DEVICE_CODE + 1, 0, true)
            .validate()
            .is_err());
        assert!(LightConfig::new("bad", 1, 16, true).validate().is_err());
    }

    #[test]
    fn test_turn_on_dimmable() {
        let light = LightConfig::new("Hall", 42, 1, true);
        let cmd = light.turn_on_command(Some(200)).unwrap();
        assert_eq!(cmd.action(), Action::Dim);
        assert_eq!(cmd.dim_level(), Some(12));

        let cmd = light.turn_on_command(None).unwrap();
        assert_eq!(cmd.action(), Action::On);
    }

    #[test]
    fn test_turn_on_not_dimmable() {
        let light = LightConfig::new("Porch", 42, 1, false);
        let cmd = light.turn_on_command(Some(200)).unwrap();
        assert_eq!(cmd.action(), Action::On);
        assert_eq!(cmd.dim_level(), None);
    }

    #[test]
    fn test_dimmable_defaults_to_false() {
        let light: LightConfig = toml::from_str(
            r#"
            name = "Desk"
            device_code = 7
            group_code = 0
            "#,
        )
        .unwrap();
        assert!(!light.dimmable);
    }
}
