//! TCP header (RFC 793)

use core::ops::{BitAnd, BitOr, BitOrAssign};

use super::{read_u16, read_u32, write_u16, write_u32};

/// Header length without options
pub const HEADER_LEN: usize = 20;

/// Length of the MSS option attached to SYN segments
pub const MSS_OPTION_LEN: usize = 4;

/// MSS option kind
pub const OPTION_MSS: u8 = 2;

const SRC_PORT: usize = 0;
const DST_PORT: usize = 2;
const SEQ: usize = 4;
const ACK: usize = 8;
const DATA_OFFSET: usize = 12;
const FLAGS: usize = 13;
const WINDOW: usize = 14;
const CHECKSUM: usize = 16;
const URGENT: usize = 18;

/// TCP control flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TcpFlags(pub u8);

impl TcpFlags {
    /// No flags
    pub const NONE: Self = Self(0);
    /// Final segment from sender
    pub const FIN: Self = Self(0x01);
    /// Synchronize sequence numbers
    pub const SYN: Self = Self(0x02);
    /// Reset the connection
    pub const RST: Self = Self(0x04);
    /// Push buffered data
    pub const PSH: Self = Self(0x08);
    /// Acknowledgment field is significant
    pub const ACK: Self = Self(0x10);
    /// Urgent pointer is significant
    pub const URG: Self = Self(0x20);

    /// Whether every flag of `other` is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag of `other` is set
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for TcpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TcpFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TcpFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// TCP header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TcpHeader {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Sequence number
    pub seq: u32,
    /// Acknowledgment number
    pub ack: u32,
    /// Header length in bytes, options included
    pub header_len: usize,
    /// Control flags
    pub flags: TcpFlags,
    /// Receive window
    pub window: u16,
    /// Checksum as stored
    pub checksum: u16,
    /// Urgent pointer
    pub urgent: u16,
}

impl TcpHeader {
    /// Parse the header at the start of `buf`
    ///
    /// Fails when the data offset points outside `buf` or below the fixed header.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let header_len = ((buf[DATA_OFFSET] & 0xF0) >> 2) as usize;
        if header_len < HEADER_LEN || header_len > buf.len() {
            return None;
        }
        Some(Self {
            src_port: read_u16(buf, SRC_PORT),
            dst_port: read_u16(buf, DST_PORT),
            seq: read_u32(buf, SEQ),
            ack: read_u32(buf, ACK),
            header_len,
            flags: TcpFlags(buf[FLAGS]),
            window: read_u16(buf, WINDOW),
            checksum: read_u16(buf, CHECKSUM),
            urgent: read_u16(buf, URGENT),
        })
    }
}

pub(crate) fn src_port(buf: &[u8]) -> u16 {
    read_u16(buf, SRC_PORT)
}

pub(crate) fn dst_port(buf: &[u8]) -> u16 {
    read_u16(buf, DST_PORT)
}

pub(crate) fn set_ports(buf: &mut [u8], src: u16, dst: u16) {
    write_u16(buf, SRC_PORT, src);
    write_u16(buf, DST_PORT, dst);
}

pub(crate) fn set_seq_ack(buf: &mut [u8], seq: u32, ack: u32) {
    write_u32(buf, SEQ, seq);
    write_u32(buf, ACK, ack);
}

pub(crate) fn flags(buf: &[u8]) -> TcpFlags {
    TcpFlags(buf[FLAGS])
}

pub(crate) fn set_flags(buf: &mut [u8], flags: TcpFlags) {
    buf[FLAGS] = flags.0;
}

/// Store the header length (bytes, multiple of 4) in the data offset field
pub(crate) fn set_header_len(buf: &mut [u8], header_len: usize) {
    buf[DATA_OFFSET] = ((header_len as u8) >> 2) << 4;
}

pub(crate) fn set_window_urgent(buf: &mut [u8], window: u16, urgent: u16) {
    write_u16(buf, WINDOW, window);
    write_u16(buf, URGENT, urgent);
}

pub(crate) fn set_checksum(buf: &mut [u8], sum: u16) {
    write_u16(buf, CHECKSUM, sum);
}

/// Write the MSS option right after the fixed header
pub(crate) fn write_mss_option(buf: &mut [u8], mss: u16) {
    buf[HEADER_LEN] = OPTION_MSS;
    buf[HEADER_LEN + 1] = MSS_OPTION_LEN as u8;
    write_u16(buf, HEADER_LEN + 2, mss);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_operations() {
        let synack = TcpFlags::SYN | TcpFlags::ACK;
        assert_eq!(synack.0, 0x12);
        assert!(synack.contains(TcpFlags::ACK));
        assert!(!synack.contains(TcpFlags::SYN | TcpFlags::FIN));
        assert!(synack.intersects(TcpFlags::SYN | TcpFlags::FIN));
        assert_eq!(synack & TcpFlags::SYN, TcpFlags::SYN);
    }

    #[test]
    fn header_len_round_trips_through_data_offset() {
        let mut buf = [0u8; 24];
        set_header_len(&mut buf, 24);
        assert_eq!(buf[12], 0x60);
        assert_eq!(TcpHeader::parse(&buf).unwrap().header_len, 24);

        set_header_len(&mut buf, 20);
        assert_eq!(buf[12], 0x50);
    }

    #[test]
    fn data_offset_beyond_segment_rejected() {
        let mut buf = [0u8; 20];
        set_header_len(&mut buf, 24);
        assert!(TcpHeader::parse(&buf).is_none());

        set_header_len(&mut buf, 16);
        assert!(TcpHeader::parse(&buf).is_none());
    }

    #[test]
    fn mss_option_layout() {
        let mut buf = [0u8; 24];
        write_mss_option(&mut buf, 512);
        assert_eq!(&buf[20..24], &[2, 4, 0x02, 0x00]);
    }

    #[test]
    fn fields_are_big_endian() {
        let mut buf = [0u8; 20];
        set_ports(&mut buf, 80, 40000);
        set_seq_ack(&mut buf, 0x0102_0304, 0xA0B0_C0D0);
        set_flags(&mut buf, TcpFlags::PSH | TcpFlags::ACK);
        set_header_len(&mut buf, 20);
        set_window_urgent(&mut buf, 65535, 0);

        let header = TcpHeader::parse(&buf).unwrap();
        assert_eq!(header.src_port, 80);
        assert_eq!(header.dst_port, 40000);
        assert_eq!(header.seq, 0x0102_0304);
        assert_eq!(header.ack, 0xA0B0_C0D0);
        assert_eq!(header.flags, TcpFlags(0x18));
        assert_eq!(header.window, 65535);
        assert_eq!(&buf[4..8], &[1, 2, 3, 4]);
    }
}
