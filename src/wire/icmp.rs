//! ICMP echo header (RFC 792)

use super::{checksum, read_u16, write_u16};

/// Echo header length (type, code, checksum, identifier, sequence)
pub const HEADER_LEN: usize = 8;

/// Echo reply message type
pub const ECHO_REPLY: u8 = 0;

/// Echo request message type
pub const ECHO_REQUEST: u8 = 8;

const TYPE: usize = 0;
const CODE: usize = 1;
const CHECKSUM: usize = 2;
const IDENT: usize = 4;
const SEQUENCE: usize = 6;

/// ICMP echo request/reply header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IcmpEcho {
    /// Message type
    pub msg_type: u8,
    /// Message code
    pub code: u8,
    /// Checksum over the whole ICMP message as stored
    pub checksum: u16,
    /// Identifier
    pub ident: u16,
    /// Sequence number
    pub sequence: u16,
}

impl IcmpEcho {
    /// Parse the header at the start of `buf`
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            msg_type: buf[TYPE],
            code: buf[CODE],
            checksum: read_u16(buf, CHECKSUM),
            ident: read_u16(buf, IDENT),
            sequence: read_u16(buf, SEQUENCE),
        })
    }

    /// Write the header to `buf`, then checksum the first `message_len` bytes
    pub fn emit(&self, buf: &mut [u8], message_len: usize) {
        buf[TYPE] = self.msg_type;
        buf[CODE] = self.code;
        write_u16(buf, IDENT, self.ident);
        write_u16(buf, SEQUENCE, self.sequence);
        write_u16(buf, CHECKSUM, 0);
        let sum = checksum(0, &buf[..message_len]);
        write_u16(buf, CHECKSUM, sum);
    }
}

pub(crate) fn set_type(buf: &mut [u8], msg_type: u8) {
    buf[TYPE] = msg_type;
}

pub(crate) fn stored_checksum(buf: &[u8]) -> u16 {
    read_u16(buf, CHECKSUM)
}

pub(crate) fn set_checksum(buf: &mut [u8], sum: u16) {
    write_u16(buf, CHECKSUM, sum);
}
