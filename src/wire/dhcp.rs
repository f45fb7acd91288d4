//! DHCP message (RFC 2131) and the options the client understands (RFC 2132)

use super::{Ipv4Address, MacAddress, read_u16, read_u32, write_u16, write_u32};

/// BOOTP fixed part (236 bytes) plus the magic cookie
pub const FIXED_LEN: usize = 240;

/// Magic cookie preceding the options
pub const MAGIC_COOKIE: u32 = 0x6382_5363;

/// `flags` bit asking the server to broadcast its reply
pub const FLAG_BROADCAST: u16 = 0x8000;

/// Hardware type: Ethernet
pub const HTYPE_ETHERNET: u8 = 1;

/// BOOTP operation codes
pub mod op {
    /// Client to server
    pub const REQUEST: u8 = 1;
    /// Server to client
    pub const REPLY: u8 = 2;
}

/// DHCP message types (option 53)
pub mod message_type {
    /// Client looks for servers
    pub const DISCOVER: u8 = 1;
    /// Server offers an address
    pub const OFFER: u8 = 2;
    /// Client requests the offered (or held) address
    pub const REQUEST: u8 = 3;
    /// Server commits the lease
    pub const ACK: u8 = 5;
    /// Server refuses the request
    pub const NAK: u8 = 6;
}

/// Option codes
pub mod option {
    /// Padding
    pub const PAD: u8 = 0;
    /// Subnet mask
    pub const SUBNET_MASK: u8 = 1;
    /// Router (gateway)
    pub const ROUTER: u8 = 3;
    /// Requested IP address
    pub const REQUESTED_ADDR: u8 = 50;
    /// Lease time in seconds
    pub const LEASE_TIME: u8 = 51;
    /// DHCP message type
    pub const MESSAGE_TYPE: u8 = 53;
    /// Server identifier
    pub const SERVER_ID: u8 = 54;
    /// Renewal (T1) time in seconds
    pub const RENEW_TIME: u8 = 58;
    /// Rebinding (T2) time in seconds
    pub const REBIND_TIME: u8 = 59;
    /// End of options
    pub const END: u8 = 255;
}

const OP: usize = 0;
const HTYPE: usize = 1;
const HLEN: usize = 2;
const XID: usize = 4;
const SECS: usize = 8;
const FLAGS: usize = 10;
const CIADDR: usize = 12;
const YIADDR: usize = 16;
const SIADDR: usize = 20;
const GIADDR: usize = 24;
const CHADDR: usize = 28;
const COOKIE: usize = 236;

/// Fixed part of a DHCP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DhcpMessage {
    /// BOOTP operation
    pub op: u8,
    /// Hardware address type
    pub htype: u8,
    /// Hardware address length
    pub hlen: u8,
    /// Transaction id
    pub xid: u32,
    /// Seconds since the client began acquisition
    pub secs: u16,
    /// Flags (broadcast bit)
    pub flags: u16,
    /// Client address, when already bound
    pub ciaddr: Ipv4Address,
    /// Address offered to the client
    pub yiaddr: Ipv4Address,
    /// Next server address
    pub siaddr: Ipv4Address,
    /// Relay agent address
    pub giaddr: Ipv4Address,
    /// Client hardware address
    pub chaddr: MacAddress,
    /// Magic cookie
    pub cookie: u32,
}

impl DhcpMessage {
    /// Client message with everything zeroed except the fields given
    pub const fn client(xid: u32, flags: u16, ciaddr: Ipv4Address, chaddr: MacAddress) -> Self {
        Self {
            op: op::REQUEST,
            htype: HTYPE_ETHERNET,
            hlen: 6,
            xid,
            secs: 0,
            flags,
            ciaddr,
            yiaddr: Ipv4Address::UNSPECIFIED,
            siaddr: Ipv4Address::UNSPECIFIED,
            giaddr: Ipv4Address::UNSPECIFIED,
            chaddr,
            cookie: MAGIC_COOKIE,
        }
    }

    /// Parse the fixed part at the start of `buf`
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < FIXED_LEN {
            return None;
        }
        Some(Self {
            op: buf[OP],
            htype: buf[HTYPE],
            hlen: buf[HLEN],
            xid: read_u32(buf, XID),
            secs: read_u16(buf, SECS),
            flags: read_u16(buf, FLAGS),
            ciaddr: Ipv4Address::read(buf, CIADDR),
            yiaddr: Ipv4Address::read(buf, YIADDR),
            siaddr: Ipv4Address::read(buf, SIADDR),
            giaddr: Ipv4Address::read(buf, GIADDR),
            chaddr: MacAddress::read(buf, CHADDR),
            cookie: read_u32(buf, COOKIE),
        })
    }

    /// Write the fixed part to `buf`, zeroing hops, sname and file
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`FIXED_LEN`].
    pub fn emit(&self, buf: &mut [u8]) {
        buf[..FIXED_LEN].fill(0);
        buf[OP] = self.op;
        buf[HTYPE] = self.htype;
        buf[HLEN] = self.hlen;
        write_u32(buf, XID, self.xid);
        write_u16(buf, SECS, self.secs);
        write_u16(buf, FLAGS, self.flags);
        self.ciaddr.write(buf, CIADDR);
        self.yiaddr.write(buf, YIADDR);
        self.siaddr.write(buf, SIADDR);
        self.giaddr.write(buf, GIADDR);
        self.chaddr.write(buf, CHADDR);
        write_u32(buf, COOKIE, self.cookie);
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options the client acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DhcpOptions {
    /// DHCP message type
    pub message_type: Option<u8>,
    /// Subnet mask
    pub subnet_mask: Option<Ipv4Address>,
    /// First router
    pub router: Option<Ipv4Address>,
    /// Requested address echo
    pub requested_addr: Option<Ipv4Address>,
    /// Lease time in seconds
    pub lease_time: Option<u32>,
    /// Server identifier
    pub server_id: Option<Ipv4Address>,
    /// Renewal time in seconds
    pub renew_time: Option<u32>,
}

impl DhcpOptions {
    /// Parse the option area following the magic cookie
    ///
    /// Unknown options are skipped by their declared length. Parsing stops at
    /// END or at the first option running past the buffer.
    pub fn parse(mut buf: &[u8]) -> Self {
        let mut options = Self::default();
        while buf.len() >= 2 {
            let code = buf[0];
            if code == option::PAD {
                buf = &buf[1..];
                continue;
            }
            if code == option::END {
                break;
            }
            let len = buf[1] as usize;
            let Some(value) = buf.get(2..2 + len) else {
                break;
            };
            match (code, len) {
                (option::MESSAGE_TYPE, 1) => options.message_type = Some(value[0]),
                (option::SUBNET_MASK, 4) => options.subnet_mask = Some(Ipv4Address::read(value, 0)),
                (option::ROUTER, n) if n >= 4 => options.router = Some(Ipv4Address::read(value, 0)),
                (option::REQUESTED_ADDR, 4) => {
                    options.requested_addr = Some(Ipv4Address::read(value, 0));
                }
                (option::LEASE_TIME, 4) => options.lease_time = Some(read_u32(value, 0)),
                (option::SERVER_ID, 4) => options.server_id = Some(Ipv4Address::read(value, 0)),
                (option::RENEW_TIME, 4) => options.renew_time = Some(read_u32(value, 0)),
                _ => {}
            }
            buf = &buf[2 + len..];
        }
        options
    }
}

/// Appends options after the fixed part
///
/// Each option is written as code, length, value. A value of odd length is
/// followed by one PAD byte so the next option starts on an even offset.
pub struct OptionWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> OptionWriter<'a> {
    /// Start writing at the beginning of `buf` (the byte after the cookie)
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn raw(&mut self, code: u8, value: &[u8]) -> &mut Self {
        let len = value.len();
        self.buf[self.pos] = code;
        self.buf[self.pos + 1] = len as u8;
        self.buf[self.pos + 2..self.pos + 2 + len].copy_from_slice(value);
        self.pos += 2 + len;
        if len % 2 == 1 {
            self.buf[self.pos] = option::PAD;
            self.pos += 1;
        }
        self
    }

    /// Message type option
    pub fn message_type(&mut self, msg_type: u8) -> &mut Self {
        self.raw(option::MESSAGE_TYPE, &[msg_type])
    }

    /// Address-valued option (requested address, server identifier, ...)
    pub fn address(&mut self, code: u8, addr: Ipv4Address) -> &mut Self {
        self.raw(code, &addr.octets())
    }

    /// Terminate the option list and return the bytes written
    pub fn end(&mut self) -> usize {
        self.buf[self.pos] = option::END;
        self.pos += 1;
        self.pos
    }
}
