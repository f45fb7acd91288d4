//! Application callbacks
//!
//! The stack calls into one [`LanHandler`] from inside
//! [`Lan::poll`](crate::Lan::poll). Every method has a no-op default, so an
//! application implements only what it uses. The handles passed in borrow
//! the shared frame buffer and are valid for the duration of the call only.

use super::config::IpConfig;
use super::tcp::{ConnectionId, TcpRequest, TcpSocket};
use super::udp::UdpDatagram;

/// Application side of the stack
pub trait LanHandler {
    /// A datagram arrived on a port not used by DHCP or SNTP
    fn udp_packet(&mut self, _datagram: &mut UdpDatagram<'_>) {}

    /// DHCP committed a new lease
    fn dhcp_configured(&mut self, _config: &IpConfig) {}

    /// SNTP delivered the current time, in Unix seconds
    fn sntp_time(&mut self, _unix_seconds: u32) {}

    /// A peer wants to connect; return `true` to accept
    fn tcp_accept(&mut self, _request: &TcpRequest) -> bool {
        false
    }

    /// The connection may send
    ///
    /// Called when the connection becomes established, after every accepted
    /// segment, and with `retransmit` set when the last data went
    /// unacknowledged: the application must then send the same data again.
    fn tcp_ready(&mut self, _socket: &mut TcpSocket<'_>, _retransmit: bool) {}

    /// Data arrived on the connection
    fn tcp_data(&mut self, _socket: &mut TcpSocket<'_>) {}

    /// The connection is gone; `hard` for a reset or timeout
    fn tcp_closed(&mut self, _id: ConnectionId, _hard: bool) {}
}

/// Handler that ignores everything and refuses connections
impl LanHandler for () {}
