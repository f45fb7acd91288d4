//! Ethernet II header

use super::{MacAddress, read_u16, write_u16};

/// Header length (dst + src + EtherType)
pub const HEADER_LEN: usize = 14;

/// EtherType values the stack handles
pub mod ether_type {
    /// IPv4
    pub const IPV4: u16 = 0x0800;
    /// ARP
    pub const ARP: u16 = 0x0806;
}

const DST: usize = 0;
const SRC: usize = 6;
const TYPE: usize = 12;

/// Ethernet II header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EthernetHeader {
    /// Destination hardware address
    pub dst: MacAddress,
    /// Source hardware address
    pub src: MacAddress,
    /// Payload protocol
    pub ether_type: u16,
}

impl EthernetHeader {
    /// Parse the header at the start of `frame`
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            dst: MacAddress::read(frame, DST),
            src: MacAddress::read(frame, SRC),
            ether_type: read_u16(frame, TYPE),
        })
    }

    /// Write the header at the start of `frame`
    pub fn emit(&self, frame: &mut [u8]) {
        self.dst.write(frame, DST);
        self.src.write(frame, SRC);
        write_u16(frame, TYPE, self.ether_type);
    }
}

pub(crate) fn set_destination(frame: &mut [u8], dst: MacAddress) {
    dst.write(frame, DST);
}

pub(crate) fn set_source(frame: &mut [u8], src: MacAddress) {
    src.write(frame, SRC);
}

pub(crate) fn source(frame: &[u8]) -> MacAddress {
    MacAddress::read(frame, SRC)
}

pub(crate) fn set_ether_type(frame: &mut [u8], ether_type: u16) {
    write_u16(frame, TYPE, ether_type);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_emit_agree() {
        let header = EthernetHeader {
            dst: MacAddress::BROADCAST,
            src: MacAddress::new([0x00, 0x13, 0x37, 0x01, 0x23, 0x45]),
            ether_type: ether_type::ARP,
        };
        let mut frame = [0u8; 20];
        header.emit(&mut frame);

        assert_eq!(&frame[..6], &[0xFF; 6]);
        assert_eq!(&frame[12..14], &[0x08, 0x06]);
        assert_eq!(EthernetHeader::parse(&frame), Some(header));
    }

    #[test]
    fn short_frame_rejected() {
        assert_eq!(EthernetHeader::parse(&[0u8; 13]), None);
    }
}
