//! Bridge handle
//!
//! [`TellstickNet`] ties the listener, discovery broadcaster, registry and
//! sender together. It is built once by the application and shared (behind
//! an `Arc`) with everything that issues commands.

use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;

use raxa_core::{frame, CommandEnvelope, DeviceCommand};

use crate::config::BridgeConfig;
use crate::discovery::{send_probe, DiscoveryBroadcaster};
use crate::events::{BridgeEvent, EVENT_QUEUE_CAPACITY};
use crate::listener::{Listener, ListenerState};
use crate::registry::BridgeRegistry;
use crate::sender::CommandSender;
use crate::Result;

/// Connection to all TellStick Net bridges on the local network
pub struct TellstickNet {
    config: BridgeConfig,
    registry: Arc<BridgeRegistry>,
    sender: CommandSender,
    listener: Mutex<Listener>,
    discovery: Mutex<DiscoveryBroadcaster>,
    events: Receiver<BridgeEvent>,
}

impl TellstickNet {
    /// Build the handle. Nothing touches the network until [`start`](Self::start).
    pub fn new(config: BridgeConfig) -> Self {
        let registry = Arc::new(BridgeRegistry::new());
        for addr in &config.static_bridges {
            registry.pin(*addr);
        }

        let (events_tx, events) = bounded(EVENT_QUEUE_CAPACITY);
        let listener = Listener::new(config.listen_addr(), Arc::clone(&registry), events_tx);
        let discovery = DiscoveryBroadcaster::new(
            config.discovery_target(),
            config.discovery_interval(),
            Arc::clone(&registry),
        )
        .with_bridge_ttl(config.bridge_ttl());
        let sender = CommandSender::new(Arc::clone(&registry), config.command_port);

        Self {
            config,
            registry,
            sender,
            listener: Mutex::new(listener),
            discovery: Mutex::new(discovery),
            events,
        }
    }

    /// Bind the listener, then start periodic discovery.
    ///
    /// Discovery only begins after the listener socket is bound. A bind
    /// failure is returned and discovery is not started.
    pub fn start(&self) -> Result<SocketAddr> {
        let addr = self.listener.lock().start()?;
        if let Err(e) = self.discovery.lock().start() {
            // Commands still work for bridges that announce themselves
            tracing::error!("Failed to start discovery: {}", e);
        }
        Ok(addr)
    }

    /// Stop discovery and the listener. No events are emitted afterwards.
    pub fn stop(&self) {
        self.discovery.lock().stop();
        self.listener.lock().stop();
    }

    /// Whether the listener is running
    pub fn is_running(&self) -> bool {
        self.listener.lock().state() == ListenerState::Running
    }

    /// Address the listener is bound to, while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().local_addr()
    }

    /// Send a discovery probe immediately, outside the periodic schedule
    pub fn discover_now(&self) -> Result<()> {
        send_probe(self.config.discovery_target())?;
        Ok(())
    }

    /// Receiver for bridge events. All clones share one queue.
    ///
    /// The queue holds at most [`EVENT_QUEUE_CAPACITY`] events; while it is
    /// full, newly received events are dropped.
    pub fn events(&self) -> Receiver<BridgeEvent> {
        self.events.clone()
    }

    /// Known bridges
    pub fn registry(&self) -> &Arc<BridgeRegistry> {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Frame a command with the configured repeat and pause values
    pub fn envelope_for(&self, command: &DeviceCommand) -> CommandEnvelope {
        frame(&command.encode(), self.config.repeats, self.config.pause)
    }

    /// Encode, frame and send a command to every known bridge.
    ///
    /// Returns the number of bridges the command was sent to.
    pub fn send_command(&self, command: &DeviceCommand) -> usize {
        tracing::info!(
            "Sending {} to device {} group {}{}",
            command.action(),
            command.device_code(),
            command.group_code(),
            command
                .dim_level()
                .map(|l| format!(" level {}", l))
                .unwrap_or_default()
        );
        self.send_envelope(&self.envelope_for(command))
    }

    /// Send an already framed command to every known bridge
    pub fn send_envelope(&self, envelope: &CommandEnvelope) -> usize {
        self.sender.send(envelope)
    }
}

impl Drop for TellstickNet {
    fn drop(&mut self) {
        self.stop();
    }
}
