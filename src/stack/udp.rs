//! UDP send/reply and the datagram handle given to the application

use super::iface::Interface;
use crate::error::{NetError, Result};
use crate::wire::ipv4::{self, protocol};
use crate::wire::udp::{self, HEADER_LEN, UdpHeader};
use crate::wire::{IP_OFFSET, Ipv4Address, TRANSPORT_OFFSET, UDP_PAYLOAD_OFFSET, checksum};

/// Start of the checksummed span: the IP source and destination addresses
const PSEUDO_OFFSET: usize = TRANSPORT_OFFSET - 8;

fn fill_checksum(frame: &mut [u8], udp_len: usize) {
    let segment = &mut frame[TRANSPORT_OFFSET..];
    udp::set_checksum(segment, 0);
    let sum = checksum(
        udp_len as u32 + u32::from(protocol::UDP),
        &frame[PSEUDO_OFFSET..TRANSPORT_OFFSET + udp_len],
    );
    udp::set_checksum(&mut frame[TRANSPORT_OFFSET..], sum);
}

/// Send the `payload_len` bytes at [`UDP_PAYLOAD_OFFSET`] to `remote`
pub(crate) fn send(
    iface: &mut dyn Interface,
    frame: &mut [u8],
    remote: Ipv4Address,
    remote_port: u16,
    local_port: u16,
    payload_len: usize,
) -> Result<()> {
    let udp_len = HEADER_LEN + payload_len;
    let local = iface.ip_config().address;

    let packet = &mut frame[IP_OFFSET..];
    ipv4::set_destination(packet, remote);
    ipv4::set_source(packet, local);
    ipv4::set_protocol(packet, protocol::UDP);

    UdpHeader {
        src_port: local_port,
        dst_port: remote_port,
        len: udp_len as u16,
        checksum: 0,
    }
    .emit(&mut frame[TRANSPORT_OFFSET..]);
    fill_checksum(frame, udp_len);

    iface.ip_send(frame, udp_len)
}

/// Answer the datagram in `frame` with `payload_len` bytes at [`UDP_PAYLOAD_OFFSET`]
pub(crate) fn reply(iface: &mut dyn Interface, frame: &mut [u8], payload_len: usize) -> Result<()> {
    let udp_len = HEADER_LEN + payload_len;
    let segment = &frame[TRANSPORT_OFFSET..];
    let (peer_port, local_port) = (udp::src_port(segment), udp::dst_port(segment));

    // An inbound broadcast must be answered from the unicast address
    let local = iface.ip_config().address;
    ipv4::set_destination(&mut frame[IP_OFFSET..], local);

    UdpHeader {
        src_port: local_port,
        dst_port: peer_port,
        len: udp_len as u16,
        checksum: 0,
    }
    .emit(&mut frame[TRANSPORT_OFFSET..]);
    fill_checksum(frame, udp_len);

    iface.ip_reply(frame, udp_len)
}

/// Parse the UDP header of an inbound packet of `len` bytes
///
/// Returns the header and the payload length, which is bounded by the IP
/// payload.
pub(crate) fn accept(frame: &[u8], len: usize) -> Option<(UdpHeader, usize)> {
    let segment = frame.get(TRANSPORT_OFFSET..TRANSPORT_OFFSET + len)?;
    let header = UdpHeader::parse(segment)?;
    let payload_len = header.payload_len()?;
    if HEADER_LEN + payload_len > len {
        return None;
    }
    Some((header, payload_len))
}

// =============================================================================
// Datagram Handle
// =============================================================================

/// A received datagram, borrowed from the shared frame buffer
///
/// Valid only for the duration of the callback: the next inbound frame
/// overwrites the buffer.
pub struct UdpDatagram<'a> {
    iface: &'a mut dyn Interface,
    frame: &'a mut [u8],
    len: usize,
}

impl<'a> UdpDatagram<'a> {
    pub(crate) fn new(iface: &'a mut dyn Interface, frame: &'a mut [u8], len: usize) -> Self {
        Self { iface, frame, len }
    }

    /// Sender address
    pub fn source(&self) -> Ipv4Address {
        ipv4::source(&self.frame[IP_OFFSET..])
    }

    /// Destination address (local or broadcast)
    pub fn destination(&self) -> Ipv4Address {
        ipv4::destination(&self.frame[IP_OFFSET..])
    }

    /// Sender port
    pub fn source_port(&self) -> u16 {
        udp::src_port(&self.frame[TRANSPORT_OFFSET..])
    }

    /// Local port the datagram was sent to
    pub fn destination_port(&self) -> u16 {
        udp::dst_port(&self.frame[TRANSPORT_OFFSET..])
    }

    /// Received payload
    pub fn payload(&self) -> &[u8] {
        &self.frame[UDP_PAYLOAD_OFFSET..UDP_PAYLOAD_OFFSET + self.len]
    }

    /// Whole payload area of the buffer, for building a reply in place
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.frame[UDP_PAYLOAD_OFFSET..]
    }

    /// Send the first `len` bytes of [`payload_mut`](Self::payload_mut) back
    /// to the sender
    ///
    /// The received payload is gone afterwards.
    pub fn reply(&mut self, len: usize) -> Result<()> {
        if len > self.frame.len() - UDP_PAYLOAD_OFFSET {
            return Err(NetError::PayloadTooLarge.into());
        }
        self.len = 0;
        reply(&mut *self.iface, &mut *self.frame, len)
    }
}

impl core::fmt::Debug for UdpDatagram<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UdpDatagram")
            .field("source", &self.source())
            .field("source_port", &self.source_port())
            .field("destination_port", &self.destination_port())
            .field("len", &self.len)
            .finish()
    }
}
