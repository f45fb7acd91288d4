//! TCP engine
//!
//! A fixed pool of connections, each a small state machine:
//!
//! ```text
//!                open()                SYN+ACK / send ACK
//!   Closed ─────────────► SynSent ───────────────────────────┐
//!     │                                                       ▼
//!     │ SYN, accepted                 ACK                Established ──── FIN+ACK ───► Closed
//!     └──────────────► SynReceived ─────────────────────►    │             (passive close)
//!                                                             │ send(.., close)
//!                                                             ▼
//!                                                          FinWait ────── FIN+ACK ───► Closed
//! ```
//!
//! There is no receive queue and no reordering: a segment is accepted only
//! when it starts exactly at the expected sequence number and acknowledges
//! everything sent so far. Anything else is dropped.
//!
//! Outgoing segments are built in the shared frame buffer. The first segment
//! of a turn either goes out as a reply to the inbound segment (addressing
//! taken from it) or as a fresh send (addressing from the connection). Any
//! further segment in the same turn reuses the buffer as it stands and only
//! patches lengths and checksums.

use super::config::TcpTimeout;
use super::handler::LanHandler;
use super::iface::Interface;
use crate::error::{NetError, NetResult, Result};
use crate::time::Instant;
use crate::wire::ipv4::{self, protocol};
use crate::wire::tcp::{self, HEADER_LEN, MSS_OPTION_LEN, TcpFlags, TcpHeader};
use crate::wire::{IP_OFFSET, Ipv4Address, TCP_PAYLOAD_OFFSET, TRANSPORT_OFFSET, checksum};

/// Start of the checksummed span: the IP source and destination addresses
const PSEUDO_OFFSET: usize = TRANSPORT_OFFSET - 8;

// =============================================================================
// Public Types
// =============================================================================

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TcpStatus {
    /// Slot is free
    #[default]
    Closed,
    /// SYN sent, waiting for SYN+ACK
    SynSent,
    /// SYN+ACK sent, waiting for ACK
    SynReceived,
    /// Data may flow both ways
    Established,
    /// FIN sent, waiting for the peer's FIN
    FinWait,
}

/// Index of a connection slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionId(pub(crate) usize);

impl ConnectionId {
    /// Slot index in the connection pool
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Options for [`TcpSocket::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TcpOptions {
    /// Set PSH
    pub push: bool,
    /// Set FIN and start closing the connection
    pub close: bool,
}

impl TcpOptions {
    /// Plain data segment
    pub const NONE: Self = Self {
        push: false,
        close: false,
    };
    /// Data segment with PSH
    pub const PUSH: Self = Self {
        push: true,
        close: false,
    };
    /// Last data segment, with PSH and FIN
    pub const CLOSE: Self = Self {
        push: true,
        close: true,
    };
}

// =============================================================================
// Connection State
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub(crate) struct Connection {
    status: TcpStatus,
    event_time: Instant,
    /// Next sequence number to send
    seq: u32,
    /// Next sequence number expected from the peer
    ack: u32,
    remote_addr: Ipv4Address,
    remote_port: u16,
    local_port: u16,
    /// Our FIN was acknowledged while the peer still had data to flush
    is_closing: bool,
    rexmit_count: u8,
    /// Sequence number at the last accepted segment, restored on retransmit
    seq_saved: u32,
}

impl Connection {
    const CLOSED: Self = Self {
        status: TcpStatus::Closed,
        event_time: Instant::ZERO,
        seq: 0,
        ack: 0,
        remote_addr: Ipv4Address::UNSPECIFIED,
        remote_port: 0,
        local_port: 0,
        is_closing: false,
        rexmit_count: 0,
        seq_saved: 0,
    };

    fn open(
        status: TcpStatus,
        now: Instant,
        ack: u32,
        remote_addr: Ipv4Address,
        remote_port: u16,
        local_port: u16,
    ) -> Self {
        let isn = now.seed();
        Self {
            status,
            event_time: now,
            seq: isn,
            ack,
            remote_addr,
            remote_port,
            local_port,
            is_closing: false,
            rexmit_count: 0,
            seq_saved: isn,
        }
    }
}

/// How the next segment leaves the frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendMode {
    /// Fresh segment: addressing from the connection
    Send,
    /// Answer to the inbound segment: addressing from the buffer
    Reply,
    /// Repeat of the segment already in the buffer
    Resend,
}

#[derive(Debug, Clone)]
pub(crate) struct Transmitter {
    mode: SendMode,
    ack_sent: bool,
    window: u16,
    mss: u16,
}

impl Transmitter {
    /// Finish the segment in `frame` and send it
    ///
    /// `len` bytes of data must already be at [`TCP_PAYLOAD_OFFSET`]. SYN
    /// segments carry the MSS option instead of data.
    fn xmit(
        &mut self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        conn: &mut Connection,
        flags: TcpFlags,
        len: usize,
    ) -> Result<()> {
        if self.mode == SendMode::Send {
            let local = iface.ip_config().address;
            let packet = &mut frame[IP_OFFSET..];
            ipv4::set_destination(packet, conn.remote_addr);
            ipv4::set_source(packet, local);
            ipv4::set_protocol(packet, protocol::TCP);
            tcp::set_ports(&mut frame[TRANSPORT_OFFSET..], conn.local_port, conn.remote_port);
        }

        let segment = &mut frame[TRANSPORT_OFFSET..];
        if self.mode == SendMode::Reply {
            let (src, dst) = (tcp::src_port(segment), tcp::dst_port(segment));
            tcp::set_ports(segment, dst, src);
        }
        if self.mode != SendMode::Resend {
            tcp::set_window_urgent(segment, self.window, 0);
        }

        let mut segment_len = if flags.contains(TcpFlags::SYN) {
            tcp::set_header_len(segment, HEADER_LEN + MSS_OPTION_LEN);
            tcp::write_mss_option(segment, self.mss);
            MSS_OPTION_LEN
        } else {
            tcp::set_header_len(segment, HEADER_LEN);
            len
        };
        segment_len += HEADER_LEN;

        tcp::set_flags(segment, flags);
        tcp::set_seq_ack(segment, conn.seq, conn.ack);
        tcp::set_checksum(segment, 0);
        let sum = checksum(
            segment_len as u32 + u32::from(protocol::TCP),
            &frame[PSEUDO_OFFSET..TRANSPORT_OFFSET + segment_len],
        );
        tcp::set_checksum(&mut frame[TRANSPORT_OFFSET..], sum);

        let result = match self.mode {
            SendMode::Send => {
                let result = iface.ip_send(frame, segment_len);
                // An ARP miss leaves a request in the buffer; stay in Send
                if result.is_ok() {
                    self.mode = SendMode::Resend;
                }
                result
            }
            SendMode::Reply => {
                self.mode = SendMode::Resend;
                iface.ip_reply(frame, segment_len)
            }
            SendMode::Resend => iface.ip_resend(frame, segment_len),
        };

        conn.seq = conn.seq.wrapping_add(len as u32);
        if flags.intersects(TcpFlags::SYN | TcpFlags::FIN) {
            conn.seq = conn.seq.wrapping_add(1);
        }
        if flags.contains(TcpFlags::ACK) && result.is_ok() {
            self.ack_sent = true;
        }
        result
    }

    fn xmit_logged(
        &mut self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        conn: &mut Connection,
        flags: TcpFlags,
    ) {
        if let Err(_err) = self.xmit(iface, frame, conn, flags, 0) {
            #[cfg(feature = "defmt")]
            defmt::debug!("TCP segment to {} dropped: {}", conn.remote_addr, _err);
        }
    }
}

// =============================================================================
// Callback Handles
// =============================================================================

/// Incoming connection offered to [`LanHandler::tcp_accept`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TcpRequest {
    id: ConnectionId,
    remote_address: Ipv4Address,
    remote_port: u16,
    local_port: u16,
}

impl TcpRequest {
    /// Slot the connection will occupy if accepted
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Peer address
    pub const fn remote_address(&self) -> Ipv4Address {
        self.remote_address
    }

    /// Peer port
    pub const fn remote_port(&self) -> u16 {
        self.remote_port
    }

    /// Local port the SYN was sent to
    pub const fn local_port(&self) -> u16 {
        self.local_port
    }
}

/// A connection inside a callback, with access to the shared frame buffer
///
/// Received data and outgoing data share the buffer: writing through
/// [`buffer_mut`](Self::buffer_mut) may overwrite [`received`](Self::received).
pub struct TcpSocket<'a> {
    id: ConnectionId,
    iface: &'a mut dyn Interface,
    frame: &'a mut [u8],
    conn: &'a mut Connection,
    tx: &'a mut Transmitter,
    data_offset: usize,
    received_len: usize,
}

impl TcpSocket<'_> {
    /// Connection slot
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Peer address
    pub fn remote_address(&self) -> Ipv4Address {
        self.conn.remote_addr
    }

    /// Peer port
    pub fn remote_port(&self) -> u16 {
        self.conn.remote_port
    }

    /// Local port
    pub fn local_port(&self) -> u16 {
        self.conn.local_port
    }

    /// Connection state
    pub fn status(&self) -> TcpStatus {
        self.conn.status
    }

    /// Data carried by the segment being processed
    pub fn received(&self) -> &[u8] {
        &self.frame[self.data_offset..self.data_offset + self.received_len]
    }

    /// Outgoing data area of the buffer
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.frame[TCP_PAYLOAD_OFFSET..]
    }

    /// Send the first `len` bytes of [`buffer_mut`](Self::buffer_mut)
    ///
    /// Only valid while established. With [`TcpOptions::close`] the segment
    /// also carries FIN and the connection moves to `FinWait`.
    pub fn send(&mut self, len: usize, options: TcpOptions) -> Result<()> {
        if self.conn.status != TcpStatus::Established {
            return Err(NetError::NotEstablished.into());
        }
        if len > self.frame.len() - TCP_PAYLOAD_OFFSET {
            return Err(NetError::PayloadTooLarge.into());
        }

        let mut flags = TcpFlags::ACK;
        if options.push {
            flags |= TcpFlags::PSH;
        }
        if options.close {
            flags |= TcpFlags::FIN;
            self.conn.status = TcpStatus::FinWait;
        }
        self.received_len = 0;
        self.tx.xmit(&mut *self.iface, &mut *self.frame, &mut *self.conn, flags, len)
    }
}

impl core::fmt::Debug for TcpSocket<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TcpSocket")
            .field("id", &self.id)
            .field("remote_address", &self.conn.remote_addr)
            .field("remote_port", &self.conn.remote_port)
            .field("local_port", &self.conn.local_port)
            .field("status", &self.conn.status)
            .field("received_len", &self.received_len)
            .finish()
    }
}

// =============================================================================
// Engine
// =============================================================================

pub(crate) struct TcpEngine<const N: usize> {
    conns: [Connection; N],
    tx: Transmitter,
    timeout: TcpTimeout,
}

impl<const N: usize> TcpEngine<N> {
    pub(crate) const fn new(window: u16, mss: u16, timeout: TcpTimeout) -> Self {
        Self {
            conns: [Connection::CLOSED; N],
            tx: Transmitter {
                mode: SendMode::Send,
                ack_sent: false,
                window,
                mss,
            },
            timeout,
        }
    }

    pub(crate) fn status(&self, id: ConnectionId) -> NetResult<TcpStatus> {
        self.conns
            .get(id.0)
            .map(|conn| conn.status)
            .ok_or(NetError::InvalidConnection)
    }

    /// Active open: send a SYN from a free slot
    pub(crate) fn open(
        &mut self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        remote: Ipv4Address,
        port: u16,
        local_port: u16,
        now: Instant,
    ) -> Result<ConnectionId> {
        let id = self
            .conns
            .iter()
            .position(|conn| conn.status == TcpStatus::Closed)
            .ok_or(NetError::NoFreeConnection)?;
        let conn = &mut self.conns[id];
        *conn = Connection::open(TcpStatus::SynSent, now, 0, remote, port, local_port);

        self.tx.mode = SendMode::Send;
        if let Err(err) = self.tx.xmit(iface, frame, conn, TcpFlags::SYN, 0) {
            conn.status = TcpStatus::Closed;
            return Err(err);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("TCP #{=usize} connecting to {}:{=u16}", id, remote, port);

        Ok(ConnectionId(id))
    }

    /// Process an inbound segment of `len` bytes
    pub(crate) fn filter<H: LanHandler>(
        &mut self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        len: usize,
        now: Instant,
        handler: &mut H,
    ) {
        let Self { conns, tx, .. } = self;

        let packet = &frame[IP_OFFSET..];
        if ipv4::destination(packet) != iface.ip_config().address {
            return;
        }
        let remote = ipv4::source(packet);
        let Some(header) = frame
            .get(TRANSPORT_OFFSET..TRANSPORT_OFFSET + len)
            .and_then(TcpHeader::parse)
        else {
            return;
        };
        let data_len = len - header.header_len;
        let data_offset = TRANSPORT_OFFSET + header.header_len;
        let flags = header.flags & (TcpFlags::SYN | TcpFlags::ACK | TcpFlags::RST | TcpFlags::FIN);

        tx.mode = SendMode::Reply;
        tx.ack_sent = false;

        let found = conns.iter().position(|conn| {
            conn.status != TcpStatus::Closed
                && conn.remote_addr == remote
                && conn.remote_port == header.src_port
                && conn.local_port == header.dst_port
        });

        let Some(id) = found else {
            if flags != TcpFlags::SYN {
                return;
            }
            let Some(id) = conns.iter().position(|conn| conn.status == TcpStatus::Closed) else {
                return;
            };
            let request = TcpRequest {
                id: ConnectionId(id),
                remote_address: remote,
                remote_port: header.src_port,
                local_port: header.dst_port,
            };
            if !handler.tcp_accept(&request) {
                return;
            }

            let conn = &mut conns[id];
            *conn = Connection::open(
                TcpStatus::SynReceived,
                now,
                header.seq.wrapping_add(1),
                remote,
                header.src_port,
                header.dst_port,
            );

            #[cfg(feature = "defmt")]
            defmt::info!("TCP #{=usize} accepted from {}:{=u16}", id, remote, header.src_port);

            tx.xmit_logged(iface, frame, conn, TcpFlags::SYN | TcpFlags::ACK);
            return;
        };

        let conn = &mut conns[id];
        let cid = ConnectionId(id);

        if flags.contains(TcpFlags::RST) {
            if matches!(conn.status, TcpStatus::Established | TcpStatus::FinWait) {
                handler.tcp_closed(cid, true);
            }
            conn.status = TcpStatus::Closed;

            #[cfg(feature = "defmt")]
            defmt::info!("TCP #{=usize} reset by peer", id);
            return;
        }

        // The peer's initial sequence number is learned from its SYN+ACK
        let expected_seq = if conn.status == TcpStatus::SynSent { header.seq } else { conn.ack };
        if header.seq != expected_seq || header.ack != conn.seq || !flags.contains(TcpFlags::ACK) {
            return;
        }
        if conn.status == TcpStatus::SynSent {
            conn.ack = header.seq;
        }

        conn.seq_saved = conn.seq;
        conn.rexmit_count = 0;
        conn.ack = conn.ack.wrapping_add(data_len as u32);
        if flags.intersects(TcpFlags::FIN | TcpFlags::SYN) {
            conn.ack = conn.ack.wrapping_add(1);
        }
        conn.event_time = now;

        macro_rules! socket {
            ($received:expr) => {
                TcpSocket {
                    id: cid,
                    iface: &mut *iface,
                    frame: &mut *frame,
                    conn: &mut *conn,
                    tx: &mut *tx,
                    data_offset,
                    received_len: $received,
                }
            };
        }

        match conn.status {
            TcpStatus::SynSent => {
                if flags != TcpFlags::SYN | TcpFlags::ACK {
                    conn.status = TcpStatus::Closed;
                    return;
                }
                tx.xmit_logged(iface, frame, conn, TcpFlags::ACK);
                conn.status = TcpStatus::Established;

                #[cfg(feature = "defmt")]
                defmt::info!("TCP #{=usize} established", id);

                handler.tcp_ready(&mut socket!(0), false);
            }
            TcpStatus::SynReceived => {
                if flags != TcpFlags::ACK {
                    conn.status = TcpStatus::Closed;
                    return;
                }
                conn.status = TcpStatus::Established;

                #[cfg(feature = "defmt")]
                defmt::info!("TCP #{=usize} established", id);

                handler.tcp_ready(&mut socket!(0), false);
            }
            TcpStatus::Established => {
                if flags == TcpFlags::FIN | TcpFlags::ACK {
                    if data_len > 0 {
                        handler.tcp_data(&mut socket!(data_len));
                    }
                    tx.xmit_logged(iface, frame, conn, TcpFlags::FIN | TcpFlags::ACK);
                    conn.status = TcpStatus::Closed;

                    #[cfg(feature = "defmt")]
                    defmt::info!("TCP #{=usize} closed by peer", id);

                    handler.tcp_closed(cid, false);
                } else if flags == TcpFlags::ACK {
                    if data_len > 0 {
                        handler.tcp_data(&mut socket!(data_len));
                    }
                    handler.tcp_ready(&mut socket!(0), false);
                    if data_len > 0 && !tx.ack_sent {
                        tx.xmit_logged(iface, frame, conn, TcpFlags::ACK);
                    }
                }
            }
            TcpStatus::FinWait => {
                if flags == TcpFlags::FIN | TcpFlags::ACK {
                    if data_len > 0 {
                        handler.tcp_data(&mut socket!(data_len));
                    }
                    tx.xmit_logged(iface, frame, conn, TcpFlags::ACK);
                    conn.status = TcpStatus::Closed;

                    #[cfg(feature = "defmt")]
                    defmt::info!("TCP #{=usize} closed", id);

                    handler.tcp_closed(cid, false);
                } else if flags == TcpFlags::ACK && data_len > 0 {
                    handler.tcp_data(&mut socket!(data_len));
                    tx.xmit_logged(iface, frame, conn, TcpFlags::ACK);
                    conn.is_closing = true;
                }
            }
            TcpStatus::Closed => {}
        }
    }

    /// Run the timeout policy over every open connection
    pub(crate) fn poll<H: LanHandler>(
        &mut self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        now: Instant,
        handler: &mut H,
    ) {
        let Self { conns, tx, timeout } = self;

        for (id, conn) in conns.iter_mut().enumerate() {
            if conn.status == TcpStatus::Closed || now.elapsed_since(conn.event_time) <= timeout.timeout_ms() {
                continue;
            }
            let cid = ConnectionId(id);

            let limit = match *timeout {
                TcpTimeout::IdleClose { .. } => {
                    conn.status = TcpStatus::Closed;
                    handler.tcp_closed(cid, true);

                    #[cfg(feature = "defmt")]
                    defmt::info!("TCP #{=usize} idle timeout", id);
                    continue;
                }
                TcpTimeout::Retransmit { limit, .. } => limit,
            };

            if conn.rexmit_count > limit {
                conn.status = TcpStatus::Closed;
                handler.tcp_closed(cid, true);

                #[cfg(feature = "defmt")]
                defmt::info!("TCP #{=usize} retransmission limit reached", id);
                continue;
            }

            conn.event_time = now;
            conn.rexmit_count += 1;
            conn.seq = conn.seq_saved;
            tx.mode = SendMode::Send;
            tx.ack_sent = false;

            #[cfg(feature = "defmt")]
            defmt::debug!("TCP #{=usize} retransmit {=u8}", id, conn.rexmit_count);

            match conn.status {
                TcpStatus::SynSent => tx.xmit_logged(iface, frame, conn, TcpFlags::SYN),
                TcpStatus::SynReceived => tx.xmit_logged(iface, frame, conn, TcpFlags::SYN | TcpFlags::ACK),
                TcpStatus::FinWait if conn.is_closing => tx.xmit_logged(iface, frame, conn, TcpFlags::ACK),
                TcpStatus::FinWait | TcpStatus::Established => {
                    // Data and FIN go out again through the ready callback
                    conn.status = TcpStatus::Established;
                    let mut socket = TcpSocket {
                        id: cid,
                        iface: &mut *iface,
                        frame: &mut *frame,
                        conn: &mut *conn,
                        tx: &mut *tx,
                        data_offset: TCP_PAYLOAD_OFFSET,
                        received_len: 0,
                    };
                    handler.tcp_ready(&mut socket, true);
                    if !tx.ack_sent {
                        tx.xmit_logged(iface, frame, conn, TcpFlags::ACK);
                    }
                }
                TcpStatus::Closed => {}
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
