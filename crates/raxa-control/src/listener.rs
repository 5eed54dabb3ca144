//! Command-port listener
//!
//! Owns the socket bound to the command port and runs a blocking receive
//! loop on its own thread. Every datagram registers its sender as a bridge;
//! announcements and status reports are forwarded as [`BridgeEvent`]s over
//! a channel, in the order they were received. The channel is bounded:
//! when nobody drains it, new events are dropped rather than queued.

use crossbeam_channel::{bounded, Sender, TrySendError};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use raxa_core::InboundMessage;

use crate::events::BridgeEvent;
use crate::net::bind_udp;
use crate::registry::BridgeRegistry;
use crate::{ControlError, Result};

/// How often the receive loop wakes up to check for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Back-off after an unexpected receive error
const ERROR_BACKOFF: Duration = Duration::from_millis(100);
/// Receive buffer. Bridges send short text lines; anything longer than this
/// is truncated by the kernel and parsed as-is.
const RECV_BUFFER_SIZE: usize = 2048;
/// Log every this many dropped events while the queue stays full
const DROP_LOG_EVERY: u64 = 100;

/// Lifecycle of a [`Listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Constructed, not started
    Idle,
    /// Worker spawned, waiting for the bind result
    Binding,
    /// Receive loop running
    Running,
    /// Stopped; may be started again
    Stopped,
}

/// Receives announcements and status reports from bridges
pub struct Listener {
    bind_addr: SocketAddr,
    registry: Arc<BridgeRegistry>,
    events: Sender<BridgeEvent>,
    state: ListenerState,
    local_addr: Option<SocketAddr>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Listener {
    /// Create a listener that will bind `bind_addr` when started
    pub fn new(
        bind_addr: SocketAddr,
        registry: Arc<BridgeRegistry>,
        events: Sender<BridgeEvent>,
    ) -> Self {
        Self {
            bind_addr,
            registry,
            events,
            state: ListenerState::Idle,
            local_addr: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Address the socket is bound to, while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the socket and start the receive loop.
    ///
    /// Returns once the socket is bound, so replies to a discovery probe sent
    /// afterwards cannot be missed. A bind failure is returned here and the
    /// listener goes back to [`ListenerState::Idle`].
    pub fn start(&mut self) -> Result<SocketAddr> {
        if let (ListenerState::Running, Some(addr)) = (self.state, self.local_addr) {
            return Err(ControlError::AlreadyRunning(addr));
        }

        self.shutdown.store(false, Ordering::SeqCst);

        let (ready_tx, ready_rx) = bounded::<io::Result<SocketAddr>>(1);
        let bind_addr = self.bind_addr;
        let registry = Arc::clone(&self.registry);
        let events = self.events.clone();
        let shutdown = Arc::clone(&self.shutdown);

        let handle = thread::Builder::new()
            .name("raxa-listener".to_string())
            .spawn(move || {
                let socket = match open_socket(bind_addr) {
                    Ok(socket) => socket,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let local = socket.local_addr();
                let bound = local.is_ok();
                let _ = ready_tx.send(local);
                if bound {
                    receive_loop(socket, &registry, &events, &shutdown);
                }
            });
        let handle = match handle {
            Ok(handle) => handle,
            Err(e) => {
                self.state = ListenerState::Idle;
                return Err(e.into());
            }
        };
        self.state = ListenerState::Binding;

        match ready_rx.recv() {
            Ok(Ok(addr)) => {
                tracing::info!("Listening for TellStick Net traffic on {}", addr);
                self.local_addr = Some(addr);
                self.handle = Some(handle);
                self.state = ListenerState::Running;
                Ok(addr)
            }
            Ok(Err(source)) => {
                let _ = handle.join();
                self.state = ListenerState::Idle;
                Err(ControlError::Bind {
                    addr: bind_addr,
                    source,
                })
            }
            Err(_) => {
                let _ = handle.join();
                self.state = ListenerState::Idle;
                Err(ControlError::ListenerExited)
            }
        }
    }

    /// Stop the receive loop and wait for the thread to exit.
    ///
    /// No event is sent after this returns.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shutdown.store(true, Ordering::SeqCst);
        if handle.join().is_err() {
            tracing::error!("Listener thread panicked");
        }
        self.local_addr = None;
        self.state = ListenerState::Stopped;
        tracing::info!("Listener stopped");
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn open_socket(bind_addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = bind_udp(bind_addr, true)?;
    socket.set_read_timeout(Some(POLL_INTERVAL))?;
    Ok(socket)
}

fn receive_loop(
    socket: UdpSocket,
    registry: &BridgeRegistry,
    events: &Sender<BridgeEvent>,
    shutdown: &AtomicBool,
) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let mut dropped = 0u64;

    while !shutdown.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buf) {
            Ok((len, source)) => {
                if len == RECV_BUFFER_SIZE {
                    tracing::warn!(
                        "Datagram from {} filled the {} byte buffer and may be truncated",
                        source,
                        RECV_BUFFER_SIZE
                    );
                }
                if let Some(event) = handle_datagram(&buf[..len], source, registry) {
                    forward_event(events, event, &mut dropped);
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(e) => {
                tracing::warn!("Receive error on command port: {}", e);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    // socket dropped here, closing it
}

/// Queue an event without blocking the receive loop.
///
/// `dropped` counts events discarded since the queue last accepted one.
fn forward_event(events: &Sender<BridgeEvent>, event: BridgeEvent, dropped: &mut u64) {
    match events.try_send(event) {
        Ok(()) => {
            if *dropped > 0 {
                tracing::info!("Event queue drained, {} events were dropped", dropped);
                *dropped = 0;
            }
        }
        Err(TrySendError::Full(_)) => {
            *dropped += 1;
            if *dropped == 1 || *dropped % DROP_LOG_EVERY == 0 {
                tracing::warn!("Event queue full, dropped {} events", dropped);
            }
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("Event receiver dropped, discarding event");
        }
    }
}

/// Register the sender and turn the datagram into an event if it carries one
pub(crate) fn handle_datagram(
    data: &[u8],
    source: SocketAddr,
    registry: &BridgeRegistry,
) -> Option<BridgeEvent> {
    if registry.add(source.ip()) {
        tracing::info!("New bridge at {}", source.ip());
    }

    let message = InboundMessage::parse(data);
    tracing::debug!("Received {:?} from {} -> {:?}", String::from_utf8_lossy(data), source, message);

    if let InboundMessage::BridgeAnnouncement {
        mac,
        activation_code,
        version,
    } = &message
    {
        tracing::info!(
            "Found TellStick Net {} (activation code {}, firmware {}) at {}",
            mac,
            activation_code,
            version,
            source.ip()
        );
    }

    BridgeEvent::from_message(message, source.ip())
}
