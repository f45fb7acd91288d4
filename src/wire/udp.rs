//! UDP header (RFC 768)

use super::{read_u16, write_u16};

/// Header length
pub const HEADER_LEN: usize = 8;

const SRC_PORT: usize = 0;
const DST_PORT: usize = 2;
const LENGTH: usize = 4;
const CHECKSUM: usize = 6;

/// UDP header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UdpHeader {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Header plus payload length
    pub len: u16,
    /// Checksum as stored
    pub checksum: u16,
}

impl UdpHeader {
    /// Parse the header at the start of `buf`
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            src_port: read_u16(buf, SRC_PORT),
            dst_port: read_u16(buf, DST_PORT),
            len: read_u16(buf, LENGTH),
            checksum: read_u16(buf, CHECKSUM),
        })
    }

    /// Payload length announced by the header
    pub fn payload_len(&self) -> Option<usize> {
        (self.len as usize).checked_sub(HEADER_LEN)
    }

    /// Write the header at the start of `buf`
    pub fn emit(&self, buf: &mut [u8]) {
        write_u16(buf, SRC_PORT, self.src_port);
        write_u16(buf, DST_PORT, self.dst_port);
        write_u16(buf, LENGTH, self.len);
        write_u16(buf, CHECKSUM, self.checksum);
    }
}

pub(crate) fn src_port(buf: &[u8]) -> u16 {
    read_u16(buf, SRC_PORT)
}

pub(crate) fn dst_port(buf: &[u8]) -> u16 {
    read_u16(buf, DST_PORT)
}

pub(crate) fn set_checksum(buf: &mut [u8], sum: u16) {
    write_u16(buf, CHECKSUM, sum);
}
