//! Nexa self-learning command model
//!
//! A [`DeviceCommand`] is validated once, at construction. Everything
//! downstream (encoder, framer, sender) can assume the fields fit their
//! bit widths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{pulse, CommandError, PulseTrain, Result};

/// Width of the device address in the self-learning protocol
pub const DEVICE_CODE_BITS: u32 = 26;
/// Width of the group address and of the dim level
pub const NIBBLE_BITS: u32 = 4;

/// Largest device code representable in 26 bits.
///
/// The legacy configuration schema allowed codes up to 67,234,433, which
/// needs 27 bits. Such codes are rejected here instead of being truncated
/// onto another receiver's address.
pub const MAX_DEVICE_CODE: u32 = (1 << DEVICE_CODE_BITS) - 1;
/// Largest group code (4 bits)
pub const MAX_GROUP_CODE: u8 = 0x0F;
/// Largest dim level (4 bits)
pub const MAX_DIM_LEVEL: u8 = 0x0F;

/// Action carried by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Switch the receiver off
    Off,
    /// Switch the receiver on
    On,
    /// Set an absolute dim level
    Dim,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Off => "off",
            Action::On => "on",
            Action::Dim => "dim",
        };
        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Action::Off),
            "on" => Ok(Action::On),
            "dim" => Ok(Action::Dim),
            other => Err(format!("unknown action '{}' (expected on, off or dim)", other)),
        }
    }
}

/// A validated request to control one self-learning receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceCommand {
    device_code: u32,
    group_mode: bool,
    group_code: u8,
    action: Action,
    dim_level: Option<u8>,
}

impl DeviceCommand {
    /// Build a command, rejecting any field that does not fit its bit width
    /// and any mismatch between `action` and `dim_level`.
    pub fn new(
        device_code: u32,
        group_mode: bool,
        group_code: u8,
        action: Action,
        dim_level: Option<u8>,
    ) -> Result<Self> {
        if device_code > MAX_DEVICE_CODE {
            return Err(CommandError::DeviceCodeOutOfRange(device_code));
        }
        if group_code > MAX_GROUP_CODE {
            return Err(CommandError::GroupCodeOutOfRange(group_code));
        }
        match (action, dim_level) {
            (Action::Dim, None) => return Err(CommandError::MissingDimLevel),
            (Action::Dim, Some(level)) if level > MAX_DIM_LEVEL => {
                return Err(CommandError::DimLevelOutOfRange(level));
            }
            (Action::On | Action::Off, Some(_)) => {
                return Err(CommandError::UnexpectedDimLevel(action));
            }
            _ => {}
        }

        Ok(Self {
            device_code,
            group_mode,
            group_code,
            action,
            dim_level,
        })
    }

    /// Shorthand for an unaddressed-group "on" command
    pub fn on(device_code: u32, group_code: u8) -> Result<Self> {
        Self::new(device_code, false, group_code, Action::On, None)
    }

    /// Shorthand for an unaddressed-group "off" command
    pub fn off(device_code: u32, group_code: u8) -> Result<Self> {
        Self::new(device_code, false, group_code, Action::Off, None)
    }

    /// Shorthand for a dim command
    pub fn dim(device_code: u32, group_code: u8, level: u8) -> Result<Self> {
        Self::new(device_code, false, group_code, Action::Dim, Some(level))
    }

    /// 26-bit device address
    pub fn device_code(&self) -> u32 {
        self.device_code
    }

    /// Group-mode flag
    pub fn group_mode(&self) -> bool {
        self.group_mode
    }

    /// 4-bit group address
    pub fn group_code(&self) -> u8 {
        self.group_code
    }

    /// Action to perform
    pub fn action(&self) -> Action {
        self.action
    }

    /// Dim level, present iff the action is [`Action::Dim`]
    pub fn dim_level(&self) -> Option<u8> {
        self.dim_level
    }

    /// Encode into the RF pulse-timing sequence
    pub fn encode(&self) -> PulseTrain {
        pulse::encode_command(self)
    }
}

/// Map an 8-bit brightness (0-255) onto the 16 dim steps of the receiver
pub fn dim_level_from_brightness(brightness: u8) -> u8 {
    // brightness / 256 * 16
    brightness >> 4
}
