//! ARP message for Ethernet/IPv4 (RFC 826)

use super::{Ipv4Address, MacAddress, ethernet, read_u16, write_u16};

/// Message length for Ethernet/IPv4
pub const PACKET_LEN: usize = 28;

/// Hardware type: Ethernet
pub const HW_TYPE_ETHERNET: u16 = 1;

/// Protocol type: IPv4
pub const PROTO_TYPE_IPV4: u16 = ethernet::ether_type::IPV4;

const HW_TYPE: usize = 0;
const PROTO_TYPE: usize = 2;
const HW_LEN: usize = 4;
const PROTO_LEN: usize = 5;
const OPERATION: usize = 6;
const SENDER_MAC: usize = 8;
const SENDER_IP: usize = 14;
const TARGET_MAC: usize = 18;
const TARGET_IP: usize = 24;

/// ARP operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArpOperation {
    /// Who has `target_ip`?
    Request,
    /// `sender_ip` is at `sender_mac`
    Reply,
    /// Any other opcode
    Unknown(u16),
}

impl From<u16> for ArpOperation {
    fn from(value: u16) -> Self {
        match value {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            other => ArpOperation::Unknown(other),
        }
    }
}

impl From<ArpOperation> for u16 {
    fn from(op: ArpOperation) -> Self {
        match op {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
            ArpOperation::Unknown(other) => other,
        }
    }
}

/// Ethernet/IPv4 ARP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArpPacket {
    /// Hardware type (1 for Ethernet)
    pub hw_type: u16,
    /// Protocol type (0x0800 for IPv4)
    pub proto_type: u16,
    /// Request or reply
    pub operation: ArpOperation,
    /// Sender hardware address
    pub sender_mac: MacAddress,
    /// Sender protocol address
    pub sender_ip: Ipv4Address,
    /// Target hardware address (zero in requests)
    pub target_mac: MacAddress,
    /// Target protocol address
    pub target_ip: Ipv4Address,
}

impl ArpPacket {
    /// Request for `target_ip` from `sender`
    pub const fn request(sender_mac: MacAddress, sender_ip: Ipv4Address, target_ip: Ipv4Address) -> Self {
        Self {
            hw_type: HW_TYPE_ETHERNET,
            proto_type: PROTO_TYPE_IPV4,
            operation: ArpOperation::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddress::ZERO,
            target_ip,
        }
    }

    /// Parse the message at the start of `buf`
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < PACKET_LEN {
            return None;
        }
        Some(Self {
            hw_type: read_u16(buf, HW_TYPE),
            proto_type: read_u16(buf, PROTO_TYPE),
            operation: read_u16(buf, OPERATION).into(),
            sender_mac: MacAddress::read(buf, SENDER_MAC),
            sender_ip: Ipv4Address::read(buf, SENDER_IP),
            target_mac: MacAddress::read(buf, TARGET_MAC),
            target_ip: Ipv4Address::read(buf, TARGET_IP),
        })
    }

    /// Whether the message describes Ethernet/IPv4 addresses
    pub fn is_ethernet_ipv4(&self) -> bool {
        self.hw_type == HW_TYPE_ETHERNET && self.proto_type == PROTO_TYPE_IPV4
    }

    /// Write the message at the start of `buf`
    pub fn emit(&self, buf: &mut [u8]) {
        write_u16(buf, HW_TYPE, self.hw_type);
        write_u16(buf, PROTO_TYPE, self.proto_type);
        buf[HW_LEN] = 6;
        buf[PROTO_LEN] = 4;
        write_u16(buf, OPERATION, self.operation.into());
        self.sender_mac.write(buf, SENDER_MAC);
        self.sender_ip.write(buf, SENDER_IP);
        self.target_mac.write(buf, TARGET_MAC);
        self.target_ip.write(buf, TARGET_IP);
    }
}
