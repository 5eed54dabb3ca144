//! Error types for the bridge control system
use std::net::SocketAddr;
use thiserror::Error;

/// Bridge control errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Command failed range validation
    #[error("Invalid command: {0}")]
    Command(#[from] raxa_core::CommandError),

    /// Listener could not bind its socket
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested bind address
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Listener thread exited before reporting readiness
    #[error("Listener thread exited during startup")]
    ListenerExited,

    /// Listener is already running
    #[error("Listener already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration is syntactically valid but inconsistent
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// No light with this name is configured
    #[error("Light not found: {0}")]
    LightNotFound(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
