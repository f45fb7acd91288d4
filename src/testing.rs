//! Testing utilities and mock implementations
//!
//! Mock devices and frame builders for exercising the stack on the host.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::collections::VecDeque;
use std::vec;
use std::vec::Vec;

use embedded_hal::spi::Operation;

use crate::device::EthernetDevice;
use crate::error::{IoError, IoResult, Result};
use crate::internal::constants::{BUFFER_END, CRC_SIZE, RX_END, RX_START};
use crate::internal::enc28j60_regs::{
    ADDR_MASK, COMMON_START, bank_of, econ1, econ2, eir, estat, is_common, micmd, mistat, opcode, phy, reg,
};
use crate::stack::{ConnectionId, IpConfig, LanHandler, TcpOptions, TcpRequest, TcpSocket, UdpDatagram};
use crate::wire::dhcp::{DhcpMessage, DhcpOptions, FIXED_LEN, op, option};
use crate::wire::ethernet::{EthernetHeader, ether_type};
use crate::wire::icmp::IcmpEcho;
use crate::wire::ipv4::{Ipv4Header, VERSION_IHL, protocol};
use crate::wire::tcp::TcpFlags;
use crate::wire::udp::UdpHeader;
use crate::wire::{Ipv4Address, MacAddress, checksum, ntp};

/// Default local address of [`LanConfig`](crate::LanConfig)
pub const LOCAL_IP: Ipv4Address = Ipv4Address::new(10, 1, 20, 55);
/// Default local MAC of [`LanConfig`](crate::LanConfig)
pub const LOCAL_MAC: MacAddress = MacAddress::new([0x00, 0x13, 0x37, 0x01, 0x23, 0x45]);
/// A host on the local subnet (also the default gateway)
pub const PEER_IP: Ipv4Address = Ipv4Address::new(10, 1, 20, 1);
pub const PEER_MAC: MacAddress = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x01]);

// =============================================================================
// Mock Ethernet Device
// =============================================================================

/// In-memory Ethernet device
///
/// Records every transmitted frame and hands out queued inbound frames.
#[derive(Debug, Default)]
pub struct MockDevice {
    sent: Vec<Vec<u8>>,
    inbound: VecDeque<Vec<u8>>,
    init_calls: Vec<MacAddress>,
    fail_sends: bool,
    fail_recv: bool,
    fail_init: bool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames transmitted so far, oldest first
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Queue a frame for `recv_packet`
    pub fn inject(&mut self, frame: Vec<u8>) {
        self.inbound.push_back(frame);
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// MAC addresses passed to `init`
    pub fn init_calls(&self) -> &[MacAddress] {
        &self.init_calls
    }

    pub fn fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    pub fn fail_recv(&mut self, fail: bool) {
        self.fail_recv = fail;
    }

    pub fn fail_init(&mut self, fail: bool) {
        self.fail_init = fail;
    }
}

impl EthernetDevice for MockDevice {
    fn init(&mut self, mac: MacAddress) -> Result<()> {
        if self.fail_init {
            return Err(IoError::Timeout.into());
        }
        self.init_calls.push(mac);
        Ok(())
    }

    fn send_packet(&mut self, frame: &[u8]) -> IoResult<()> {
        if self.fail_sends {
            return Err(IoError::Spi);
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        if self.fail_recv {
            return Err(IoError::Spi);
        }
        let Some(frame) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        Ok(len)
    }
}

// =============================================================================
// Frame Builders
// =============================================================================

/// Ethernet frame addressed to [`LOCAL_MAC`]
pub fn ethernet_frame(src_mac: MacAddress, ether_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 14 + payload.len()];
    EthernetHeader {
        dst: LOCAL_MAC,
        src: src_mac,
        ether_type,
    }
    .emit(&mut frame);
    frame[14..].copy_from_slice(payload);
    frame
}

/// IPv4 packet with a valid header checksum, wrapped in Ethernet
pub fn ipv4_frame(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_ip: Ipv4Address,
    proto: u8,
    payload: &[u8],
) -> Vec<u8> {
    let mut packet = vec![0u8; 20 + payload.len()];
    Ipv4Header {
        version_ihl: VERSION_IHL,
        tos: 0,
        total_len: packet.len() as u16,
        ident: 0x1234,
        flags_frag: 0x4000,
        ttl: 64,
        protocol: proto,
        checksum: 0,
        src: src_ip,
        dst: dst_ip,
    }
    .emit(&mut packet);
    packet[20..].copy_from_slice(payload);
    ethernet_frame(src_mac, ether_type::IPV4, &packet)
}

fn arp_frame(
    operation: u16,
    sender_mac: MacAddress,
    sender_ip: Ipv4Address,
    target_mac: MacAddress,
    target_ip: Ipv4Address,
) -> Vec<u8> {
    let mut packet = vec![0u8; 28];
    packet[0..2].copy_from_slice(&1u16.to_be_bytes());
    packet[2..4].copy_from_slice(&ether_type::IPV4.to_be_bytes());
    packet[4] = 6;
    packet[5] = 4;
    packet[6..8].copy_from_slice(&operation.to_be_bytes());
    packet[8..14].copy_from_slice(&sender_mac.octets());
    packet[14..18].copy_from_slice(&sender_ip.octets());
    packet[18..24].copy_from_slice(&target_mac.octets());
    packet[24..28].copy_from_slice(&target_ip.octets());
    ethernet_frame(sender_mac, ether_type::ARP, &packet)
}

/// Broadcast-style ARP request asking for `target_ip`
pub fn arp_request_frame(sender_mac: MacAddress, sender_ip: Ipv4Address, target_ip: Ipv4Address) -> Vec<u8> {
    arp_frame(1, sender_mac, sender_ip, MacAddress::ZERO, target_ip)
}

/// ARP reply telling `target` where `sender_ip` lives
pub fn arp_reply_frame(
    sender_mac: MacAddress,
    sender_ip: Ipv4Address,
    target_mac: MacAddress,
    target_ip: Ipv4Address,
) -> Vec<u8> {
    arp_frame(2, sender_mac, sender_ip, target_mac, target_ip)
}

/// ICMP echo message with a valid checksum
pub fn icmp_echo_frame(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_ip: Ipv4Address,
    msg_type: u8,
    ident: u16,
    sequence: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut message = vec![0u8; 8 + payload.len()];
    message[8..].copy_from_slice(payload);
    let len = message.len();
    IcmpEcho {
        msg_type,
        code: 0,
        checksum: 0,
        ident,
        sequence,
    }
    .emit(&mut message, len);
    ipv4_frame(src_mac, src_ip, dst_ip, protocol::ICMP, &message)
}

/// UDP datagram without checksum
pub fn udp_frame(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_ip: Ipv4Address,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut datagram = vec![0u8; 8 + payload.len()];
    UdpHeader {
        src_port,
        dst_port,
        len: datagram.len() as u16,
        checksum: 0,
    }
    .emit(&mut datagram);
    datagram[8..].copy_from_slice(payload);
    ipv4_frame(src_mac, src_ip, dst_ip, protocol::UDP, &datagram)
}

/// TCP segment without options, with a valid checksum
#[allow(clippy::too_many_arguments)]
pub fn tcp_frame(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_ip: Ipv4Address,
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack: u32,
    flags: TcpFlags,
    data: &[u8],
) -> Vec<u8> {
    let mut segment = vec![0u8; 20 + data.len()];
    segment[0..2].copy_from_slice(&src_port.to_be_bytes());
    segment[2..4].copy_from_slice(&dst_port.to_be_bytes());
    segment[4..8].copy_from_slice(&seq.to_be_bytes());
    segment[8..12].copy_from_slice(&ack.to_be_bytes());
    segment[12] = 5 << 4;
    segment[13] = flags.0;
    segment[14..16].copy_from_slice(&1024u16.to_be_bytes());
    segment[20..].copy_from_slice(data);

    let mut frame = ipv4_frame(src_mac, src_ip, dst_ip, protocol::TCP, &segment);
    let sum = checksum(segment.len() as u32 + u32::from(protocol::TCP), &frame[26..]);
    frame[50..52].copy_from_slice(&sum.to_be_bytes());
    frame
}

/// DHCP reply from a server to [`LOCAL_MAC`], broadcast
///
/// Carries mask 255.255.255.0, the server as router and, when given, a
/// lease time.
pub fn dhcp_reply_frame(
    server_mac: MacAddress,
    server_ip: Ipv4Address,
    xid: u32,
    yiaddr: Ipv4Address,
    msg_type: u8,
    server_id: Ipv4Address,
    lease: Option<u32>,
) -> Vec<u8> {
    let mut payload = vec![0u8; FIXED_LEN];
    DhcpMessage {
        op: op::REPLY,
        yiaddr,
        siaddr: server_ip,
        ..DhcpMessage::client(xid, 0, Ipv4Address::UNSPECIFIED, LOCAL_MAC)
    }
    .emit(&mut payload);

    payload.extend_from_slice(&[option::MESSAGE_TYPE, 1, msg_type]);
    payload.extend_from_slice(&[option::SERVER_ID, 4]);
    payload.extend_from_slice(&server_id.octets());
    payload.extend_from_slice(&[option::SUBNET_MASK, 4, 255, 255, 255, 0]);
    payload.extend_from_slice(&[option::ROUTER, 4]);
    payload.extend_from_slice(&server_ip.octets());
    if let Some(lease) = lease {
        payload.extend_from_slice(&[option::LEASE_TIME, 4]);
        payload.extend_from_slice(&lease.to_be_bytes());
    }
    payload.push(option::END);

    udp_frame(server_mac, server_ip, Ipv4Address::BROADCAST, 67, 68, &payload)
}

/// Decode a DHCP message sent by the stack
pub fn sent_dhcp(frame: &[u8]) -> (DhcpMessage, DhcpOptions) {
    let message = DhcpMessage::parse(&frame[42..]).unwrap();
    let options = DhcpOptions::parse(&frame[42 + FIXED_LEN..]);
    (message, options)
}

/// SNTP server response carrying `unix_seconds` as transmit timestamp
pub fn ntp_response_frame(server_mac: MacAddress, server_ip: Ipv4Address, unix_seconds: u32) -> Vec<u8> {
    let mut payload = vec![0u8; ntp::PACKET_LEN];
    payload[0] = 0x24;
    payload[1] = 2;
    let ntp_seconds = unix_seconds.wrapping_add(ntp::UNIX_EPOCH_OFFSET);
    payload[40..44].copy_from_slice(&ntp_seconds.to_be_bytes());
    udp_frame(server_mac, server_ip, LOCAL_IP, 123, 124, &payload)
}

// =============================================================================
// Recording Handler
// =============================================================================

/// Callback observed by [`RecordingHandler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// source port, destination port, payload
    Udp(u16, u16, Vec<u8>),
    Dhcp(IpConfig),
    Sntp(u32),
    /// slot, remote port, local port
    Accept(usize, u16, u16),
    /// slot, retransmit
    Ready(usize, bool),
    Data(usize, Vec<u8>),
    /// slot, hard
    Closed(usize, bool),
}

/// Handler that records every callback and can be scripted to answer
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub events: Vec<Event>,
    /// Accept incoming connections
    pub accept: bool,
    /// Send this from every `tcp_ready`
    pub respond: Option<Vec<u8>>,
    /// Close the connection with the response
    pub close_after_respond: bool,
    /// Reply to every datagram with this
    pub udp_echo: Option<Vec<u8>>,
}

impl LanHandler for RecordingHandler {
    fn udp_packet(&mut self, datagram: &mut UdpDatagram<'_>) {
        self.events.push(Event::Udp(
            datagram.source_port(),
            datagram.destination_port(),
            datagram.payload().to_vec(),
        ));
        if let Some(reply) = &self.udp_echo {
            datagram.payload_mut()[..reply.len()].copy_from_slice(reply);
            datagram.reply(reply.len()).unwrap();
        }
    }

    fn dhcp_configured(&mut self, config: &IpConfig) {
        self.events.push(Event::Dhcp(*config));
    }

    fn sntp_time(&mut self, unix_seconds: u32) {
        self.events.push(Event::Sntp(unix_seconds));
    }

    fn tcp_accept(&mut self, request: &TcpRequest) -> bool {
        self.events.push(Event::Accept(
            request.id().index(),
            request.remote_port(),
            request.local_port(),
        ));
        self.accept
    }

    fn tcp_ready(&mut self, socket: &mut TcpSocket<'_>, retransmit: bool) {
        self.events.push(Event::Ready(socket.id().index(), retransmit));
        if let Some(response) = &self.respond {
            socket.buffer_mut()[..response.len()].copy_from_slice(response);
            let options = if self.close_after_respond {
                TcpOptions::CLOSE
            } else {
                TcpOptions::PUSH
            };
            // Ignored when the connection is not established
            let _ = socket.send(response.len(), options);
        }
    }

    fn tcp_data(&mut self, socket: &mut TcpSocket<'_>) {
        self.events.push(Event::Data(socket.id().index(), socket.received().to_vec()));
    }

    fn tcp_closed(&mut self, id: ConnectionId, hard: bool) {
        self.events.push(Event::Closed(id.index(), hard));
    }
}

// =============================================================================
// Simulated ENC28J60
// =============================================================================

/// Register-level ENC28J60 model behind an SPI device
///
/// Decodes the SPI instruction set, keeps banked registers, buffer memory
/// and PHY registers, and models the receive ring, transmission and the
/// stuck-TXRTS errata.
#[derive(Debug)]
pub struct MockEnc28j60 {
    /// Bank 0-3 registers; common registers live in bank 0
    regs: [[u8; 32]; 4],
    memory: Vec<u8>,
    phy: [u16; 32],
    rx_write: u16,
    transmitted: Vec<Vec<u8>>,
    resets: u32,
    tx_resets: u32,
    bank_switches: u32,
    stick_next: u32,
    tx_stuck: u32,
    mii_busy: bool,
    hold_in_reset: bool,
    fail_spi: bool,
}

impl MockEnc28j60 {
    pub const REVISION: u8 = 0x06;

    const ECON1: usize = 0x1F;
    const ECON2: usize = 0x1E;
    const ESTAT: usize = 0x1D;
    const EIR: usize = 0x1C;

    pub fn new() -> Self {
        let mut chip = Self {
            regs: [[0; 32]; 4],
            memory: vec![0; 0x2000],
            phy: [0; 32],
            rx_write: 0,
            transmitted: Vec::new(),
            resets: 0,
            tx_resets: 0,
            bank_switches: 0,
            stick_next: 0,
            tx_stuck: 0,
            mii_busy: false,
            hold_in_reset: false,
            fail_spi: false,
        };
        chip.phy[usize::from(phy::PHID1)] = phy::ID1;
        chip.phy[usize::from(phy::PHID2)] = 0x1400;
        chip.power_on();
        chip
    }

    fn power_on(&mut self) {
        self.regs = [[0; 32]; 4];
        self.regs[0][Self::ECON2] = econ2::AUTOINC;
        self.regs[3][usize::from(reg::EREVID & ADDR_MASK)] = Self::REVISION;
        self.rx_write = RX_START;
    }

    // -- knobs --

    pub fn hold_in_reset(&mut self, hold: bool) {
        self.hold_in_reset = hold;
    }

    pub fn fail_spi(&mut self, fail: bool) {
        self.fail_spi = fail;
    }

    pub fn stick_mii_busy(&mut self, busy: bool) {
        self.mii_busy = busy;
    }

    pub fn set_link(&mut self, up: bool) {
        let stat = &mut self.phy[usize::from(phy::PHSTAT2)];
        if up {
            *stat |= phy::PHSTAT2_LSTAT;
        } else {
            *stat &= !phy::PHSTAT2_LSTAT;
        }
    }

    /// Leave TXRTS set on the next transmission until `resets` TX resets
    pub fn stick_tx(&mut self, resets: u32) {
        self.stick_next = resets;
    }

    /// Place a packet in the receive ring, as the hardware would
    pub fn receive(&mut self, frame: &[u8], ok: bool) {
        let byte_count = frame.len() + CRC_SIZE;
        let ring = usize::from(RX_END - RX_START) + 1;
        let mut end = usize::from(self.rx_write - RX_START) + 6 + byte_count;
        end += end % 2;
        let next = RX_START + (end % ring) as u16;

        let status: u8 = if ok { 0x80 } else { 0x00 };
        let [n0, n1] = next.to_le_bytes();
        let [c0, c1] = (byte_count as u16).to_le_bytes();
        let mut addr = self.rx_write;
        for &byte in [n0, n1, c0, c1, status, 0x00]
            .iter()
            .chain(frame)
            .chain(&[0xDE, 0xAD, 0xBE, 0xEF])
        {
            self.memory[usize::from(addr)] = byte;
            addr = if addr == RX_END { RX_START } else { addr + 1 };
        }
        self.rx_write = next;
        let count = &mut self.regs[1][usize::from(reg::EPKTCNT & ADDR_MASK)];
        *count = count.wrapping_add(1);
    }

    pub fn clear_log(&mut self) {
        self.bank_switches = 0;
    }

    // -- inspection --

    /// Register value by its encoded address
    pub fn reg(&self, addr: u8) -> u8 {
        let a = usize::from(addr & ADDR_MASK);
        if is_common(addr) { self.regs[0][a] } else { self.regs[usize::from(bank_of(addr))][a] }
    }

    pub fn reg16(&self, addr: u8) -> u16 {
        u16::from_le_bytes([self.reg(addr), self.reg(addr + 1)])
    }

    pub fn mac_address(&self) -> [u8; 6] {
        reg::MAADR.map(|addr| self.reg(addr))
    }

    pub fn phy(&self, addr: u8) -> u16 {
        self.phy[usize::from(addr)]
    }

    pub fn memory(&self, addr: u16, len: usize) -> &[u8] {
        &self.memory[usize::from(addr)..usize::from(addr) + len]
    }

    pub fn transmitted(&self) -> &[Vec<u8>] {
        &self.transmitted
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn tx_resets(&self) -> u32 {
        self.tx_resets
    }

    pub fn bank_switches(&self) -> u32 {
        self.bank_switches
    }

    // -- register file --

    fn bank(&self) -> usize {
        usize::from(self.regs[0][Self::ECON1] & econ1::BSEL)
    }

    /// Bank and index of a 5-bit operand under the current bank selection
    fn locate(&self, a: u8) -> (usize, usize) {
        let a = a & ADDR_MASK;
        if a >= COMMON_START { (0, usize::from(a)) } else { (self.bank(), usize::from(a)) }
    }

    fn is_mac_mii(&self, a: u8) -> bool {
        let a = a & ADDR_MASK;
        match self.bank() {
            2 => a < COMMON_START,
            3 => a <= 0x05 || a == 0x0A,
            _ => false,
        }
    }

    fn pointer(&self, bank: usize, low: u8) -> u16 {
        let i = usize::from(low & ADDR_MASK);
        u16::from_le_bytes([self.regs[bank][i], self.regs[bank][i + 1]])
    }

    fn set_pointer(&mut self, low: u8, value: u16) {
        let i = usize::from(low & ADDR_MASK);
        let [l, h] = value.to_le_bytes();
        self.regs[0][i] = l;
        self.regs[0][i + 1] = h;
    }

    fn read_register(&self, a: u8) -> u8 {
        let (bank, i) = self.locate(a);
        let value = self.regs[bank][i];
        match (bank, i) {
            (0, Self::ESTAT) if !self.hold_in_reset => value | estat::CLKRDY,
            (3, 0x0A) if self.mii_busy => value | mistat::BUSY,
            _ => value,
        }
    }

    fn write_register(&mut self, a: u8, value: u8) {
        let (bank, i) = self.locate(a);
        let old = self.regs[bank][i];
        self.regs[bank][i] = value;

        match (bank, i) {
            (0, Self::ECON1) => self.econ1_changed(old, value),
            (0, Self::ECON2) if value & econ2::PKTDEC != 0 => {
                self.regs[0][Self::ECON2] &= !econ2::PKTDEC;
                let count = &mut self.regs[1][usize::from(reg::EPKTCNT & ADDR_MASK)];
                *count = count.saturating_sub(1);
            }
            // MICMD.MIIRD
            (2, 0x12) if value & micmd::MIIRD != 0 => {
                let data = self.phy[usize::from(self.regs[2][0x14] & 0x1F)];
                let [l, h] = data.to_le_bytes();
                self.regs[2][0x18] = l;
                self.regs[2][0x19] = h;
            }
            // MIWRH
            (2, 0x17) => {
                let data = u16::from_le_bytes([self.regs[2][0x16], value]);
                self.phy[usize::from(self.regs[2][0x14] & 0x1F)] = data;
            }
            _ => {}
        }
    }

    fn econ1_changed(&mut self, old: u8, new: u8) {
        let rising = new & !old;
        if rising & econ1::TXRST != 0 {
            self.tx_resets += 1;
            if self.tx_stuck > 0 {
                self.tx_stuck -= 1;
                if self.tx_stuck == 0 {
                    self.regs[0][Self::ECON1] &= !econ1::TXRTS;
                    self.regs[0][Self::EIR] &= !eir::TXERIF;
                }
            }
        }
        if rising & econ1::TXRTS != 0 {
            let start = usize::from(self.pointer(0, reg::ETXSTL));
            let end = usize::from(self.pointer(0, reg::ETXNDL));
            // Skip the per-packet control byte
            self.transmitted.push(self.memory[start + 1..=end].to_vec());
            if self.stick_next > 0 {
                self.tx_stuck = core::mem::take(&mut self.stick_next);
                self.regs[0][Self::EIR] |= eir::TXERIF;
            } else {
                self.regs[0][Self::ECON1] &= !econ1::TXRTS;
                self.regs[0][Self::EIR] |= eir::TXIF;
            }
        }
    }

    /// Clock one byte through the instruction decoder
    fn clock(&mut self, cmd: &mut Option<u8>, index: &mut usize, mosi: u8) -> u8 {
        let Some(op) = *cmd else {
            *cmd = Some(mosi);
            *index = 0;
            if mosi == opcode::SC {
                self.resets += 1;
                self.power_on();
            }
            return 0;
        };
        let n = *index;
        *index += 1;
        let arg = op & ADDR_MASK;

        match op {
            opcode::RBM => {
                let ptr = self.pointer(0, reg::ERDPTL);
                let byte = self.memory[usize::from(ptr)];
                let next = if ptr == self.pointer(0, reg::ERXNDL) {
                    self.pointer(0, reg::ERXSTL)
                } else {
                    (ptr + 1) & BUFFER_END
                };
                self.set_pointer(reg::ERDPTL, next);
                byte
            }
            opcode::WBM => {
                let ptr = self.pointer(0, reg::EWRPTL);
                self.memory[usize::from(ptr)] = mosi;
                self.set_pointer(reg::EWRPTL, (ptr + 1) & BUFFER_END);
                0
            }
            opcode::SC => 0,
            _ => match op & !ADDR_MASK {
                opcode::RCR => {
                    let dummy = usize::from(self.is_mac_mii(arg));
                    if n == dummy { self.read_register(arg) } else { 0 }
                }
                opcode::WCR if n == 0 => {
                    self.write_register(arg, mosi);
                    0
                }
                opcode::BFS if n == 0 => {
                    let (bank, i) = self.locate(arg);
                    self.write_register(arg, self.regs[bank][i] | mosi);
                    0
                }
                opcode::BFC if n == 0 => {
                    if usize::from(arg) == Self::ECON1 && mosi & econ1::BSEL == econ1::BSEL {
                        self.bank_switches += 1;
                    }
                    let (bank, i) = self.locate(arg);
                    self.write_register(arg, self.regs[bank][i] & !mosi);
                    0
                }
                _ => 0,
            },
        }
    }
}

impl Default for MockEnc28j60 {
    fn default() -> Self {
        Self::new()
    }
}

impl embedded_hal::spi::ErrorType for MockEnc28j60 {
    type Error = embedded_hal::spi::ErrorKind;
}

impl embedded_hal::spi::SpiDevice for MockEnc28j60 {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> core::result::Result<(), Self::Error> {
        if self.fail_spi {
            return Err(embedded_hal::spi::ErrorKind::Other);
        }
        // Chip select spans the whole transaction
        let mut cmd = None;
        let mut index = 0;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.clock(&mut cmd, &mut index, 0);
                    }
                }
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.clock(&mut cmd, &mut index, byte);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let miso = self.clock(&mut cmd, &mut index, write.get(i).copied().unwrap_or(0));
                        if let Some(slot) = read.get_mut(i) {
                            *slot = miso;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.clock(&mut cmd, &mut index, *byte);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// Delay provider that only accumulates the requested time
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_us(&self) -> u32 {
        (self.total_ns / 1_000) as u32
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
