//! Ethernet, ARP and IPv4 layers
//!
//! [`Net`] owns the device, the addressing and the ARP cache. Every outgoing
//! frame is built in place in the caller's frame buffer and leaves through
//! one of three paths:
//!
//! | Path     | Link addressing                | IP header                            |
//! |----------|--------------------------------|--------------------------------------|
//! | `send`   | resolved next hop or broadcast | rebuilt, source = local address      |
//! | `reply`  | inbound source MAC             | addresses swapped, checksum redone   |
//! | `resend` | left as is                     | length and checksum only             |
//!
//! Protocol code above this layer sees the [`Interface`] trait only, so the
//! callback handles do not need to carry the device type.

use super::arp::ArpCache;
use super::config::IpConfig;
use crate::device::EthernetDevice;
use crate::error::{IoError, NetError, Result};
use crate::wire::arp::{self, ArpOperation, ArpPacket};
use crate::wire::ethernet::{self, ether_type};
use crate::wire::ipv4::{self, Ipv4Header, VERSION_IHL};
use crate::wire::{IP_OFFSET, Ipv4Address, MacAddress};

/// Network-layer services available to the protocol handlers
pub(crate) trait Interface {
    /// Local hardware address
    fn mac_address(&self) -> MacAddress;

    /// Current addressing
    fn ip_config(&self) -> &IpConfig;

    /// Mutable addressing, for the DHCP client
    fn ip_config_mut(&mut self) -> &mut IpConfig;

    /// Send the IP packet in `frame` carrying `payload_len` bytes
    ///
    /// Destination address and protocol must already be set. On an ARP miss
    /// `frame` is overwritten with the ARP request and
    /// [`NetError::Unresolved`] is returned.
    fn ip_send(&mut self, frame: &mut [u8], payload_len: usize) -> Result<()>;

    /// Send the packet back to where the inbound one in `frame` came from
    fn ip_reply(&mut self, frame: &mut [u8], payload_len: usize) -> Result<()>;

    /// Send `frame` again after a send or reply, with a new payload length
    fn ip_resend(&mut self, frame: &mut [u8], payload_len: usize) -> Result<()>;
}

/// Device, addressing and ARP state of one stack instance
pub(crate) struct Net<D, const ARP_SLOTS: usize> {
    pub(crate) device: D,
    pub(crate) mac: MacAddress,
    pub(crate) ip: IpConfig,
    pub(crate) arp: ArpCache<ARP_SLOTS>,
    pub(crate) ttl: u8,
}

impl<D, const ARP_SLOTS: usize> Net<D, ARP_SLOTS> {
    pub(crate) const fn new(device: D, mac: MacAddress, ip: IpConfig, ttl: u8) -> Self {
        Self {
            device,
            mac,
            ip,
            arp: ArpCache::new(),
            ttl,
        }
    }

    /// Validate an inbound IPv4 packet
    ///
    /// `len` is the Ethernet payload length. Returns the protocol and the
    /// payload length announced by the header when the packet is for us.
    pub(crate) fn accept_ipv4(&self, frame: &[u8], len: usize) -> Option<(u8, usize)> {
        let packet = frame.get(IP_OFFSET..IP_OFFSET + len)?;
        let header = Ipv4Header::parse(packet)?;
        if header.version_ihl != VERSION_IHL || !ipv4::verify_checksum(packet) {
            return None;
        }
        let to_us = header.dst == self.ip.address
            || header.dst == self.ip.broadcast()
            || header.dst == Ipv4Address::BROADCAST;
        if !to_us {
            return None;
        }
        let payload_len = header.payload_len()?;
        if header.total_len as usize > len {
            return None;
        }
        Some((header.protocol, payload_len))
    }
}

impl<D: EthernetDevice, const ARP_SLOTS: usize> Net<D, ARP_SLOTS> {
    // =========================================================================
    // Ethernet
    // =========================================================================

    fn eth_send(&mut self, frame: &mut [u8], len: usize) -> Result<()> {
        ethernet::set_source(frame, self.mac);
        self.eth_resend(frame, len)
    }

    fn eth_reply(&mut self, frame: &mut [u8], len: usize) -> Result<()> {
        let peer = ethernet::source(frame);
        ethernet::set_destination(frame, peer);
        self.eth_send(frame, len)
    }

    fn eth_resend(&mut self, frame: &mut [u8], len: usize) -> Result<()> {
        let total = ethernet::HEADER_LEN + len;
        let bytes = frame.get(..total).ok_or(IoError::BufferTooSmall)?;
        self.device.send_packet(bytes)?;
        Ok(())
    }

    // =========================================================================
    // ARP
    // =========================================================================

    /// Hardware address of `ip`, or broadcast a request for it
    fn arp_resolve(&mut self, frame: &mut [u8], ip: Ipv4Address) -> Result<MacAddress> {
        if let Some(mac) = self.arp.lookup(ip) {
            return Ok(mac);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("ARP request for {}", ip);

        ethernet::set_destination(frame, MacAddress::BROADCAST);
        ethernet::set_ether_type(frame, ether_type::ARP);
        ArpPacket::request(self.mac, self.ip.address, ip).emit(&mut frame[IP_OFFSET..]);
        self.eth_send(frame, arp::PACKET_LEN)?;
        Err(NetError::Unresolved.into())
    }

    /// Answer requests for the local address and learn from replies
    ///
    /// `len` is the Ethernet payload length.
    pub(crate) fn arp_filter(&mut self, frame: &mut [u8], len: usize) {
        let Some(packet) = frame.get(IP_OFFSET..IP_OFFSET + len).and_then(ArpPacket::parse) else {
            return;
        };
        if !packet.is_ethernet_ipv4() || packet.target_ip != self.ip.address {
            return;
        }

        match packet.operation {
            ArpOperation::Request => {
                let reply = ArpPacket {
                    operation: ArpOperation::Reply,
                    sender_mac: self.mac,
                    sender_ip: self.ip.address,
                    target_mac: packet.sender_mac,
                    target_ip: packet.sender_ip,
                    ..packet
                };
                reply.emit(&mut frame[IP_OFFSET..]);
                if let Err(_err) = self.eth_reply(frame, arp::PACKET_LEN) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ARP reply dropped: {}", _err);
                }
            }
            ArpOperation::Reply => {
                if self.arp.insert(packet.sender_ip, packet.sender_mac) {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("ARP learned {} at {}", packet.sender_ip, packet.sender_mac);
                }
            }
            ArpOperation::Unknown(_) => {}
        }
    }
}

impl<D: EthernetDevice, const ARP_SLOTS: usize> Interface for Net<D, ARP_SLOTS> {
    fn mac_address(&self) -> MacAddress {
        self.mac
    }

    fn ip_config(&self) -> &IpConfig {
        &self.ip
    }

    fn ip_config_mut(&mut self) -> &mut IpConfig {
        &mut self.ip
    }

    fn ip_send(&mut self, frame: &mut [u8], payload_len: usize) -> Result<()> {
        let dst = ipv4::destination(&frame[IP_OFFSET..]);
        let mac = if dst == self.ip.broadcast() || dst == Ipv4Address::BROADCAST {
            MacAddress::BROADCAST
        } else {
            let next_hop = self.ip.next_hop(dst);
            self.arp_resolve(frame, next_hop)?
        };
        ethernet::set_destination(frame, mac);
        ethernet::set_ether_type(frame, ether_type::IPV4);

        let len = ipv4::HEADER_LEN + payload_len;
        let header = Ipv4Header {
            version_ihl: VERSION_IHL,
            tos: 0,
            total_len: len as u16,
            ident: 0,
            flags_frag: 0,
            ttl: self.ttl,
            protocol: ipv4::protocol(&frame[IP_OFFSET..]),
            checksum: 0,
            src: self.ip.address,
            dst,
        };
        header.emit(&mut frame[IP_OFFSET..]);
        self.eth_send(frame, len)
    }

    fn ip_reply(&mut self, frame: &mut [u8], payload_len: usize) -> Result<()> {
        let packet = &mut frame[IP_OFFSET..];
        let Some(inbound) = Ipv4Header::parse(packet) else {
            return Err(IoError::BufferTooSmall.into());
        };
        let len = ipv4::HEADER_LEN + payload_len;
        let header = Ipv4Header {
            total_len: len as u16,
            ident: 0,
            flags_frag: 0,
            ttl: self.ttl,
            src: self.ip.address,
            dst: inbound.src,
            ..inbound
        };
        header.emit(packet);
        self.eth_reply(frame, len)
    }

    fn ip_resend(&mut self, frame: &mut [u8], payload_len: usize) -> Result<()> {
        let len = ipv4::HEADER_LEN + payload_len;
        let packet = &mut frame[IP_OFFSET..];
        ipv4::set_total_len(packet, len as u16);
        ipv4::fill_checksum(packet);
        self.eth_resend(frame, len)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
