//! Wire formats
//!
//! Offset-based encode/decode of every header the stack speaks. Parsing
//! copies the fixed fields out of a byte slice into a plain value type;
//! emitting writes them back at the same offsets. Nothing here casts a
//! buffer to a struct, so alignment and host endianness never matter.
//!
//! All multi-byte fields are big-endian on the wire.
//!
//! # Frame Layout
//!
//! The stack only builds IPv4 headers without options, so every outgoing
//! frame has the same shape:
//!
//! ```text
//! 0        14         34              42 / 54
//! | ETH 14 | IPv4 20  | UDP 8 / TCP 20 | payload ...
//! ```

pub mod arp;
pub mod checksum;
pub mod dhcp;
pub mod ethernet;
pub mod icmp;
pub mod ipv4;
pub mod ntp;
pub mod tcp;
pub mod udp;

pub use checksum::checksum;

/// Offset of the IPv4 header in a frame
pub const IP_OFFSET: usize = ethernet::HEADER_LEN;

/// Offset of the transport header in a frame
pub const TRANSPORT_OFFSET: usize = IP_OFFSET + ipv4::HEADER_LEN;

/// Offset of a UDP payload in a frame
pub const UDP_PAYLOAD_OFFSET: usize = TRANSPORT_OFFSET + udp::HEADER_LEN;

/// Offset of outgoing TCP data (fixed 20-byte header)
pub const TCP_PAYLOAD_OFFSET: usize = TRANSPORT_OFFSET + tcp::HEADER_LEN;

// =============================================================================
// Addresses
// =============================================================================

/// Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// All-ones broadcast address
    pub const BROADCAST: Self = Self([0xFF; 6]);
    /// All-zero address (ARP request target)
    pub const ZERO: Self = Self([0; 6]);

    /// Create an address from its six octets
    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The six octets
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Whether this is the broadcast address
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub(crate) fn read(buf: &[u8], offset: usize) -> Self {
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&buf[offset..offset + 6]);
        Self(octets)
    }

    pub(crate) fn write(&self, buf: &mut [u8], offset: usize) {
        buf[offset..offset + 6].copy_from_slice(&self.0);
    }
}

impl core::fmt::Display for MacAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MacAddress {
    fn format(&self, f: defmt::Formatter) {
        let [a, b, c, d, e, g] = self.0;
        defmt::write!(f, "{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}", a, b, c, d, e, g);
    }
}

/// IPv4 address in network byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Ipv4Address(pub [u8; 4]);

impl Ipv4Address {
    /// 0.0.0.0
    pub const UNSPECIFIED: Self = Self([0; 4]);
    /// 255.255.255.255
    pub const BROADCAST: Self = Self([0xFF; 4]);

    /// Create an address from four octets
    #[must_use]
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }

    /// Create an address from its big-endian integer form
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits.to_be_bytes())
    }

    /// Big-endian integer form, for mask arithmetic
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// The four octets
    #[must_use]
    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Whether this is 0.0.0.0
    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        self.to_bits() == 0
    }

    pub(crate) fn read(buf: &[u8], offset: usize) -> Self {
        let mut octets = [0u8; 4];
        octets.copy_from_slice(&buf[offset..offset + 4]);
        Self(octets)
    }

    pub(crate) fn write(&self, buf: &mut [u8], offset: usize) {
        buf[offset..offset + 4].copy_from_slice(&self.0);
    }
}

impl From<core::net::Ipv4Addr> for Ipv4Address {
    fn from(addr: core::net::Ipv4Addr) -> Self {
        Self(addr.octets())
    }
}

impl From<Ipv4Address> for core::net::Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        core::net::Ipv4Addr::from(addr.0)
    }
}

impl core::fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Ipv4Address {
    fn format(&self, f: defmt::Formatter) {
        let [a, b, c, d] = self.0;
        defmt::write!(f, "{=u8}.{=u8}.{=u8}.{=u8}", a, b, c, d);
    }
}

// =============================================================================
// Field Access
// =============================================================================

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

#[inline]
pub(crate) fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[inline]
pub(crate) fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}
