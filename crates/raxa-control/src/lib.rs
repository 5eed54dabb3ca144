//! Raxa Control - TellStick Net bridge communication
//!
//! This crate talks to TellStick Net appliances over UDP:
//! - **Discovery**: periodic `D` broadcast on port 30303
//! - **Listener**: announcements and status reports on port 42314
//! - **Registry**: the set of bridges commands are sent to
//! - **Sender**: framed RF commands to every known bridge
//! - **Lights**: Nexa self-learning receivers on top of the above
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use raxa_control::{BridgeConfig, TellstickNet};
//! use raxa_core::DeviceCommand;
//!
//! # fn main() -> raxa_control::Result<()> {
//! let bridge = TellstickNet::new(BridgeConfig::default());
//! bridge.start()?;
//!
//! for event in bridge.events().iter().take(1) {
//!     println!("{:?}", event);
//! }
//!
//! bridge.send_command(&DeviceCommand::on(12_345, 0)?);
//! bridge.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`bridge`] - Handle owning the whole subsystem
//! - [`listener`] - Receive loop on the command port
//! - [`discovery`] - Periodic discovery probe
//! - [`registry`] - Known bridge addresses
//! - [`sender`] - Command fan-out
//! - [`light`] - Light adapter with assumed state
//! - [`config`] - Configuration file
//! - [`error`] - Error types

#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod light;
pub mod listener;
pub mod net;
pub mod registry;
pub mod sender;

// Re-exports
pub use bridge::TellstickNet;
pub use config::{BridgeConfig, RaxaConfig};
pub use discovery::{send_probe, DiscoveryBroadcaster, DISCOVERY_PROBE};
pub use error::{ControlError, Result};
pub use events::{BridgeEvent, EVENT_QUEUE_CAPACITY};
pub use light::NexaLight;
pub use listener::{Listener, ListenerState};
pub use net::{COMMAND_PORT, DISCOVERY_PORT};
pub use registry::BridgeRegistry;
pub use sender::CommandSender;
