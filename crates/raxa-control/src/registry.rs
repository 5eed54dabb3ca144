//! Set of known TellStick Net addresses
//!
//! Written by the listener thread, read by whoever sends commands. Entries
//! record when the bridge was last heard from so that stale bridges can be
//! pruned when a TTL is configured; without one the set only grows.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct BridgeEntry {
    last_seen: Instant,
    /// Configured statically, never pruned
    pinned: bool,
}

/// Concurrent set of bridge addresses
#[derive(Debug, Default)]
pub struct BridgeRegistry {
    bridges: RwLock<HashMap<IpAddr, BridgeEntry>>,
}

impl BridgeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record traffic from `addr`. Returns `true` if the address was new.
    pub fn add(&self, addr: IpAddr) -> bool {
        let now = Instant::now();
        let mut bridges = self.bridges.write();
        match bridges.get_mut(&addr) {
            Some(entry) => {
                entry.last_seen = now;
                false
            }
            None => {
                bridges.insert(
                    addr,
                    BridgeEntry {
                        last_seen: now,
                        pinned: false,
                    },
                );
                true
            }
        }
    }

    /// Add an address that is exempt from pruning
    pub fn pin(&self, addr: IpAddr) {
        let mut bridges = self.bridges.write();
        let entry = bridges.entry(addr).or_insert(BridgeEntry {
            last_seen: Instant::now(),
            pinned: true,
        });
        entry.pinned = true;
    }

    /// Point-in-time copy of all addresses, sorted
    pub fn snapshot(&self) -> Vec<IpAddr> {
        let mut addrs: Vec<IpAddr> = self.bridges.read().keys().copied().collect();
        addrs.sort();
        addrs
    }

    /// Whether `addr` is known
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.bridges.read().contains_key(addr)
    }

    /// When `addr` was last heard from
    pub fn last_seen(&self, addr: &IpAddr) -> Option<Instant> {
        self.bridges.read().get(addr).map(|e| e.last_seen)
    }

    /// Number of known bridges
    pub fn len(&self) -> usize {
        self.bridges.read().len()
    }

    /// Whether no bridge is known
    pub fn is_empty(&self) -> bool {
        self.bridges.read().is_empty()
    }

    /// Drop unpinned bridges not heard from within `ttl`. Returns the removed addresses.
    pub fn prune_stale(&self, ttl: Duration) -> Vec<IpAddr> {
        let now = Instant::now();
        let mut removed = Vec::new();
        self.bridges.write().retain(|addr, entry| {
            let keep = entry.pinned || now.duration_since(entry.last_seen) <= ttl;
            if !keep {
                removed.push(*addr);
            }
            keep
        });
        for addr in &removed {
            tracing::info!("Pruned stale bridge {}", addr);
        }
        removed
    }
}
