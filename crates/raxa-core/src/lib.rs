//! Raxa Core - RF command model and TellStick Net wire formats
//!
//! This crate contains everything that does not touch the network:
//! - Nexa self-learning command model with range checking
//! - Pulse-timing encoder (and a matching decoder for verification)
//! - The TellStick Net "send" envelope
//! - Parsing of datagrams received from a TellStick Net
//! - Light and logging configuration types
//!
//! ## Quick Start
//!
//! ```rust
//! use raxa_core::{frame, Action, DeviceCommand};
//!
//! # fn main() -> raxa_core::Result<()> {
//! let command = DeviceCommand::new(12_345, false, 3, Action::On, None)?;
//! let envelope = frame(&command.encode(), 8, 15);
//! assert!(envelope.as_bytes().starts_with(b"4:sendh1:S"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use thiserror::Error;

pub mod command;
pub mod envelope;
pub mod light;
pub mod logging;
pub mod message;
pub mod pulse;

pub use command::{
    dim_level_from_brightness, Action, DeviceCommand, MAX_DEVICE_CODE, MAX_DIM_LEVEL,
    MAX_GROUP_CODE,
};
pub use envelope::{frame, frame_default, CommandEnvelope, DEFAULT_PAUSE, DEFAULT_REPEATS};
pub use light::LightConfig;
pub use logging::LogConfig;
pub use message::InboundMessage;
pub use pulse::{encode, PulseTrain, PulseWriter};

/// Errors raised while building or decoding RF commands
///
/// Every range variant is a caller error. Values are never masked down to
/// their bit width, since a truncated code addresses a different receiver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Device code does not fit into 26 bits
    #[error("Device code {0} out of range (must be 0-{max})", max = MAX_DEVICE_CODE)]
    DeviceCodeOutOfRange(u32),

    /// Group code does not fit into 4 bits
    #[error("Group code {0} out of range (must be 0-{max})", max = MAX_GROUP_CODE)]
    GroupCodeOutOfRange(u8),

    /// Dim level does not fit into 4 bits
    #[error("Dim level {0} out of range (must be 0-{max})", max = MAX_DIM_LEVEL)]
    DimLevelOutOfRange(u8),

    /// Dim action issued without a level
    #[error("Dim action requires a dim level")]
    MissingDimLevel,

    /// Dim level supplied with an action other than dim
    #[error("Dim level is only valid with the dim action (got {0:?})")]
    UnexpectedDimLevel(Action),

    /// Pulse train could not be decoded back into a command
    #[error("Malformed pulse train: {0}")]
    MalformedPulseTrain(String),
}

impl CommandError {
    /// Whether this error comes from range validation of caller input
    pub fn is_range_error(&self) -> bool {
        !matches!(self, CommandError::MalformedPulseTrain(_))
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CommandError>;
