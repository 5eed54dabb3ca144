//! Command transmission to every known bridge
//!
//! Each send opens a fresh socket per bridge, exactly as the bridge firmware
//! expects. There is no acknowledgment; reliability over RF comes from the
//! repeat count inside the envelope.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use raxa_core::CommandEnvelope;

use crate::net::ephemeral_udp;
use crate::registry::BridgeRegistry;

/// Sends framed commands to all bridges in a registry
#[derive(Debug, Clone)]
pub struct CommandSender {
    registry: Arc<BridgeRegistry>,
    port: u16,
}

impl CommandSender {
    /// Create a sender targeting `port` on every registered bridge
    pub fn new(registry: Arc<BridgeRegistry>, port: u16) -> Self {
        Self { registry, port }
    }

    /// Destination port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send `envelope` to every bridge currently registered.
    ///
    /// Returns the number of bridges the datagram was handed to. An empty
    /// registry is not an error; a failure for one bridge does not affect
    /// the others.
    pub fn send(&self, envelope: &CommandEnvelope) -> usize {
        let targets = self.registry.snapshot();
        if targets.is_empty() {
            tracing::debug!("No bridges known yet, command not sent");
            return 0;
        }

        let delivered = targets
            .iter()
            .filter(|ip| self.send_to(**ip, envelope))
            .count();

        tracing::debug!(
            "Sent {} byte command to {}/{} bridges",
            envelope.len(),
            delivered,
            targets.len()
        );
        delivered
    }

    fn send_to(&self, ip: IpAddr, envelope: &CommandEnvelope) -> bool {
        let target = SocketAddr::new(ip, self.port);
        let result = ephemeral_udp().and_then(|socket| socket.send_to(envelope.as_bytes(), target));
        match result {
            Ok(_) => {
                tracing::trace!("Sent command to {}", target);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send command to {}: {}", target, e);
                false
            }
        }
    }
}
