//! IPv4 header (RFC 791), fixed 20 bytes, no options

use super::{Ipv4Address, checksum, read_u16, write_u16};

/// Header length; options are never sent and never accepted
pub const HEADER_LEN: usize = 20;

/// Version 4, IHL 5
pub const VERSION_IHL: u8 = 0x45;

/// IP protocol numbers the stack dispatches on
pub mod protocol {
    /// ICMP
    pub const ICMP: u8 = 1;
    /// TCP
    pub const TCP: u8 = 6;
    /// UDP
    pub const UDP: u8 = 17;
}

const VER_IHL: usize = 0;
const TOS: usize = 1;
const TOTAL_LEN: usize = 2;
const IDENT: usize = 4;
const FLAGS_FRAG: usize = 6;
const TTL: usize = 8;
const PROTOCOL: usize = 9;
const CHECKSUM: usize = 10;
const SRC: usize = 12;
const DST: usize = 16;

/// IPv4 header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ipv4Header {
    /// Version and header length byte
    pub version_ihl: u8,
    /// Type of service
    pub tos: u8,
    /// Header plus payload length
    pub total_len: u16,
    /// Identification
    pub ident: u16,
    /// Flags and fragment offset
    pub flags_frag: u16,
    /// Time to live
    pub ttl: u8,
    /// Payload protocol
    pub protocol: u8,
    /// Header checksum as stored
    pub checksum: u16,
    /// Source address
    pub src: Ipv4Address,
    /// Destination address
    pub dst: Ipv4Address,
}

impl Ipv4Header {
    /// Parse the header at the start of `buf`
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            version_ihl: buf[VER_IHL],
            tos: buf[TOS],
            total_len: read_u16(buf, TOTAL_LEN),
            ident: read_u16(buf, IDENT),
            flags_frag: read_u16(buf, FLAGS_FRAG),
            ttl: buf[TTL],
            protocol: buf[PROTOCOL],
            checksum: read_u16(buf, CHECKSUM),
            src: Ipv4Address::read(buf, SRC),
            dst: Ipv4Address::read(buf, DST),
        })
    }

    /// Payload length announced by the header
    pub fn payload_len(&self) -> Option<usize> {
        (self.total_len as usize).checked_sub(HEADER_LEN)
    }

    /// Write the header at the start of `buf` and compute its checksum
    pub fn emit(&self, buf: &mut [u8]) {
        buf[VER_IHL] = self.version_ihl;
        buf[TOS] = self.tos;
        write_u16(buf, TOTAL_LEN, self.total_len);
        write_u16(buf, IDENT, self.ident);
        write_u16(buf, FLAGS_FRAG, self.flags_frag);
        buf[TTL] = self.ttl;
        buf[PROTOCOL] = self.protocol;
        self.src.write(buf, SRC);
        self.dst.write(buf, DST);
        fill_checksum(buf);
    }
}

/// Zero the checksum field, then store the checksum of the 20-byte header
pub fn fill_checksum(header: &mut [u8]) {
    write_u16(header, CHECKSUM, 0);
    let sum = checksum(0, &header[..HEADER_LEN]);
    write_u16(header, CHECKSUM, sum);
}

/// Whether the stored header checksum is valid
pub fn verify_checksum(header: &[u8]) -> bool {
    header.len() >= HEADER_LEN && checksum(0, &header[..HEADER_LEN]) == 0
}

pub(crate) fn set_total_len(header: &mut [u8], total_len: u16) {
    write_u16(header, TOTAL_LEN, total_len);
}

pub(crate) fn set_protocol(header: &mut [u8], protocol: u8) {
    header[PROTOCOL] = protocol;
}

pub(crate) fn protocol(header: &[u8]) -> u8 {
    header[PROTOCOL]
}

pub(crate) fn source(header: &[u8]) -> Ipv4Address {
    Ipv4Address::read(header, SRC)
}

pub(crate) fn set_source(header: &mut [u8], src: Ipv4Address) {
    src.write(header, SRC);
}

pub(crate) fn destination(header: &[u8]) -> Ipv4Address {
    Ipv4Address::read(header, DST)
}

pub(crate) fn set_destination(header: &mut [u8], dst: Ipv4Address) {
    dst.write(header, DST);
}
