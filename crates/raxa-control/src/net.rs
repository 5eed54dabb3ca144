//! UDP socket construction
//!
//! The TellStick Net protocol wants SO_REUSEADDR on every socket (the
//! listener shares the command port with outgoing sends) and SO_BROADCAST
//! on sockets that may address the subnet broadcast address.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, UdpSocket};

/// Port bridges listen on for commands and reply from
pub const COMMAND_PORT: u16 = 42314;
/// Port bridges listen on for discovery probes
pub const DISCOVERY_PORT: u16 = 30303;

/// Create a bound IPv4 UDP socket with address reuse and optional broadcast
pub fn bind_udp(addr: SocketAddr, broadcast: bool) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    if broadcast {
        socket.set_broadcast(true)?;
    }
    socket.bind(&addr.into())?;
    Ok(socket.into())
}

/// Ephemeral send socket on `0.0.0.0:0`
pub fn ephemeral_udp() -> io::Result<UdpSocket> {
    bind_udp(SocketAddr::from(([0, 0, 0, 0], 0)), true)
}
