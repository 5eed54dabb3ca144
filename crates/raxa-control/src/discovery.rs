//! Periodic discovery probe
//!
//! A TellStick Net answers a single `D` byte on the discovery port with an
//! announcement sent to the command port, where the [`Listener`] picks it up.
//! The broadcaster never waits for replies.
//!
//! [`Listener`]: crate::listener::Listener

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::net::ephemeral_udp;
use crate::registry::BridgeRegistry;

/// The discovery probe payload
pub const DISCOVERY_PROBE: &[u8] = b"D";

/// Send one discovery probe to `target`
pub fn send_probe(target: SocketAddr) -> io::Result<()> {
    let socket = ephemeral_udp()?;
    socket.send_to(DISCOVERY_PROBE, target)?;
    tracing::debug!("Sent discovery probe to {}", target);
    Ok(())
}

/// Sends discovery probes on a fixed interval from a background thread
pub struct DiscoveryBroadcaster {
    target: SocketAddr,
    interval: Duration,
    registry: Arc<BridgeRegistry>,
    bridge_ttl: Option<Duration>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DiscoveryBroadcaster {
    /// Create a broadcaster probing `target` every `interval`
    pub fn new(target: SocketAddr, interval: Duration, registry: Arc<BridgeRegistry>) -> Self {
        Self {
            target,
            interval,
            registry,
            bridge_ttl: None,
            stop_tx: None,
            handle: None,
        }
    }

    /// Prune bridges not heard from within `ttl` before every probe
    pub fn with_bridge_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.bridge_ttl = ttl;
        self
    }

    /// Whether the probe thread is running
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Send the first probe now and keep probing until [`stop`](Self::stop).
    ///
    /// A zero interval is rejected with [`io::ErrorKind::InvalidInput`].
    pub fn start(&mut self) -> io::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if self.interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "discovery interval must be greater than zero",
            ));
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let target = self.target;
        let interval = self.interval;
        let registry = Arc::clone(&self.registry);
        let bridge_ttl = self.bridge_ttl;

        let handle = thread::Builder::new()
            .name("raxa-discovery".to_string())
            .spawn(move || loop {
                if let Some(ttl) = bridge_ttl {
                    registry.prune_stale(ttl);
                }

                if let Err(e) = send_probe(target) {
                    tracing::warn!("Discovery probe to {} failed: {}", target, e);
                }

                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    // Stop requested or broadcaster dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::info!(
            "Discovery started: probing {} every {:?}",
            self.target,
            self.interval
        );
        self.stop_tx = Some(stop_tx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Wake the probe thread and wait for it to exit
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Discovery thread panicked");
            }
            tracing::info!("Discovery stopped");
        }
    }
}

impl Drop for DiscoveryBroadcaster {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket;
    use std::time::Instant;

    #[test]
    fn test_probe_payload() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();

        send_probe(receiver.local_addr().unwrap()).unwrap();

        let mut buf = [0u8; 16];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"D");
    }

    #[test]
    fn test_periodic_probes_and_stop() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();

        let mut broadcaster = DiscoveryBroadcaster::new(
            receiver.local_addr().unwrap(),
            Duration::from_millis(20),
            Arc::new(BridgeRegistry::new()),
        );
        broadcaster.start().unwrap();

        let mut buf = [0u8; 16];
        for _ in 0..3 {
            let (len, _) = receiver.recv_from(&mut buf).unwrap();
            assert_eq!(&buf[..len], b"D");
        }

        broadcaster.stop();
        assert!(!broadcaster.is_running());
    }

    #[test]
    fn test_stop_interrupts_long_interval() {
        let mut broadcaster = DiscoveryBroadcaster::new(
            SocketAddr::from(([127, 0, 0, 1], 9)),
            Duration::from_secs(3600),
            Arc::new(BridgeRegistry::new()),
        );
        broadcaster.start().unwrap();

        let started = Instant::now();
        broadcaster.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();

        let mut broadcaster = DiscoveryBroadcaster::new(
            receiver.local_addr().unwrap(),
            Duration::ZERO,
            Arc::new(BridgeRegistry::new()),
        );
        let err = broadcaster.start().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!broadcaster.is_running());

        let mut buf = [0u8; 16];
        assert!(receiver.recv_from(&mut buf).is_err());
    }

    #[test]
    fn test_ttl_prunes_on_each_cycle() {
        let registry = Arc::new(BridgeRegistry::new());
        registry.add("10.0.0.1".parse().unwrap());
        thread::sleep(Duration::from_millis(30));

        let mut broadcaster = DiscoveryBroadcaster::new(
            SocketAddr::from(([127, 0, 0, 1], 9)),
            Duration::from_secs(3600),
            Arc::clone(&registry),
        )
        .with_bridge_ttl(Some(Duration::from_millis(10)));
        broadcaster.start().unwrap();
        broadcaster.stop();

        assert!(registry.is_empty());
    }
}
