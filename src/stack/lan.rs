//! The stack facade
//!
//! [`Lan`] owns the device, the shared frame buffer and every protocol
//! state machine. The application drives it by calling [`Lan::poll`] from
//! its main loop with the current millisecond tick.

use super::arp::ArpCache;
use super::config::{IpConfig, LanConfig};
use super::dhcp::{DhcpClient, DhcpStatus};
use super::handler::LanHandler;
use super::icmp;
use super::iface::Net;
use super::sntp::{SntpClient, SntpStatus};
use super::tcp::{ConnectionId, TcpEngine, TcpStatus};
use super::udp::{self, UdpDatagram};
use crate::device::EthernetDevice;
use crate::error::{ConfigError, IoError, NetError, Result};
use crate::internal::constants::{
    DEFAULT_ARP_SLOTS, DEFAULT_TCP_SLOTS, DHCP_CLIENT_PORT, FRAME_BUFFER_SIZE, NTP_CLIENT_PORT,
};
use crate::time::Instant;
use crate::wire::ethernet::{self, EthernetHeader, ether_type};
use crate::wire::ipv4::protocol;
use crate::wire::{Ipv4Address, UDP_PAYLOAD_OFFSET};

/// ENC28J60 TCP/IP stack
///
/// # Type Parameters
/// * `D` - Ethernet device, usually [`Enc28j60`](crate::driver::Enc28j60)
/// * `H` - Application callbacks
/// * `ARP_SLOTS` - ARP cache capacity (default 3)
/// * `TCP_SLOTS` - TCP connection pool size (default 5)
///
/// # Example
/// ```ignore
/// let driver = Enc28j60::new(spi, delay);
/// let mut lan: Lan<_, WebServer> = Lan::new(driver, WebServer::default(), LanConfig::new());
/// lan.init(Instant::from_millis(ticks()))?;
///
/// loop {
///     lan.poll(Instant::from_millis(ticks()))?;
/// }
/// ```
pub struct Lan<D, H, const ARP_SLOTS: usize = DEFAULT_ARP_SLOTS, const TCP_SLOTS: usize = DEFAULT_TCP_SLOTS> {
    net: Net<D, ARP_SLOTS>,
    buf: [u8; FRAME_BUFFER_SIZE],
    tcp: TcpEngine<TCP_SLOTS>,
    dhcp: DhcpClient,
    sntp: SntpClient,
    handler: H,
    config: LanConfig,
    initialized: bool,
    now: Instant,
}

impl<D, H, const ARP_SLOTS: usize, const TCP_SLOTS: usize> Lan<D, H, ARP_SLOTS, TCP_SLOTS> {
    /// Create a stack instance
    ///
    /// No I/O happens until [`init`](Self::init).
    pub const fn new(device: D, handler: H, config: LanConfig) -> Self {
        Self {
            net: Net::new(device, config.mac_address, config.ip, config.ttl),
            buf: [0u8; FRAME_BUFFER_SIZE],
            tcp: TcpEngine::new(config.tcp_window, config.tcp_mss, config.tcp_timeout),
            dhcp: DhcpClient::new(),
            sntp: SntpClient::new(config.sntp_server, config.sntp_resync_ms),
            handler,
            config,
            initialized: false,
            now: Instant::ZERO,
        }
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Whether the interface has an address (static or leased)
    pub fn is_up(&self) -> bool {
        !self.net.ip.address.is_unspecified()
    }

    /// Current addressing
    pub fn ip_config(&self) -> &IpConfig {
        &self.net.ip
    }

    /// DHCP client state
    pub fn dhcp_status(&self) -> DhcpStatus {
        self.dhcp.status()
    }

    /// SNTP client state
    pub fn sntp_status(&self) -> SntpStatus {
        self.sntp.status()
    }

    /// State of a TCP connection
    pub fn tcp_status(&self, id: ConnectionId) -> Result<TcpStatus> {
        Ok(self.tcp.status(id)?)
    }

    /// ARP cache contents
    pub fn arp_cache(&self) -> &ArpCache<ARP_SLOTS> {
        &self.net.arp
    }

    /// Configuration the stack was created with
    pub fn config(&self) -> &LanConfig {
        &self.config
    }

    /// Tick of the last [`init`](Self::init) or [`poll`](Self::poll)
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Application callbacks
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Application callbacks, mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Underlying device
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.net.device
    }
}

impl<D: EthernetDevice, H: LanHandler, const ARP_SLOTS: usize, const TCP_SLOTS: usize>
    Lan<D, H, ARP_SLOTS, TCP_SLOTS>
{
    /// Validate the configuration, bring up the controller and arm the
    /// DHCP and SNTP timers
    pub fn init(&mut self, now: Instant) -> Result<()> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        self.config.validate()?;
        self.net.device.init(self.net.mac)?;

        self.now = now;
        if self.config.protocols.dhcp {
            self.dhcp.init(now);
        }
        if self.config.protocols.sntp {
            self.sntp.init(now);
        }
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!("LAN up: {} address {}", self.net.mac, self.net.ip.address);

        Ok(())
    }

    /// Process every pending frame, then run the protocol timers
    ///
    /// A receive error stops the drain for this call; it is returned after
    /// the timers ran.
    pub fn poll(&mut self, now: Instant) -> Result<()> {
        if !self.initialized {
            return Err(IoError::InvalidState.into());
        }
        self.now = now;

        let mut rx_error = None;
        loop {
            match self.net.device.recv_packet(&mut self.buf) {
                Ok(0) => break,
                Ok(len) => self.receive(len),
                Err(err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("LAN receive failed: {}", err);
                    rx_error = Some(err);
                    break;
                }
            }
        }

        let protocols = self.config.protocols;
        if protocols.dhcp {
            self.dhcp.poll(&mut self.net, &mut self.buf, now);
        }
        if protocols.tcp {
            self.tcp.poll(&mut self.net, &mut self.buf, now, &mut self.handler);
        }
        if protocols.sntp {
            self.sntp.poll(&mut self.net, &mut self.buf, now);
        }

        match rx_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Open a TCP connection to `remote:port` from `local_port`
    ///
    /// Fails with [`NetError::Unresolved`] when the next hop is not in the
    /// ARP cache yet; a request was sent and the call can be repeated on a
    /// later tick.
    pub fn tcp_open(&mut self, remote: Ipv4Address, port: u16, local_port: u16) -> Result<ConnectionId> {
        if !self.initialized {
            return Err(IoError::InvalidState.into());
        }
        if !self.config.protocols.tcp {
            return Err(NetError::ProtocolDisabled.into());
        }
        self.tcp
            .open(&mut self.net, &mut self.buf, remote, port, local_port, self.now)
    }

    /// Send one datagram
    pub fn udp_send(&mut self, remote: Ipv4Address, remote_port: u16, local_port: u16, payload: &[u8]) -> Result<()> {
        if !self.initialized {
            return Err(IoError::InvalidState.into());
        }
        if !self.config.protocols.udp {
            return Err(NetError::ProtocolDisabled.into());
        }
        let area = &mut self.buf[UDP_PAYLOAD_OFFSET..];
        if payload.len() > area.len() {
            return Err(NetError::PayloadTooLarge.into());
        }
        area[..payload.len()].copy_from_slice(payload);
        udp::send(&mut self.net, &mut self.buf, remote, remote_port, local_port, payload.len())
    }

    // =========================================================================
    // Inbound Dispatch
    // =========================================================================

    fn receive(&mut self, len: usize) {
        let Some(header) = EthernetHeader::parse(&self.buf[..len]) else {
            return;
        };
        let payload_len = len - ethernet::HEADER_LEN;

        match header.ether_type {
            ether_type::ARP => self.net.arp_filter(&mut self.buf, payload_len),
            ether_type::IPV4 => self.ip_filter(payload_len),
            _ => {}
        }
    }

    fn ip_filter(&mut self, len: usize) {
        let Some((proto, payload_len)) = self.net.accept_ipv4(&self.buf, len) else {
            return;
        };
        let protocols = self.config.protocols;

        match proto {
            protocol::ICMP if protocols.icmp => icmp::filter(&mut self.net, &mut self.buf, payload_len),
            protocol::UDP if protocols.udp => self.udp_filter(payload_len),
            protocol::TCP if protocols.tcp => {
                self.tcp
                    .filter(&mut self.net, &mut self.buf, payload_len, self.now, &mut self.handler);
            }
            _ => {}
        }
    }

    fn udp_filter(&mut self, len: usize) {
        let Some((header, payload_len)) = udp::accept(&self.buf, len) else {
            return;
        };
        let protocols = self.config.protocols;

        match header.dst_port {
            DHCP_CLIENT_PORT if protocols.dhcp => {
                if let Some(config) = self.dhcp.filter(&mut self.net, &mut self.buf, payload_len, self.now) {
                    self.handler.dhcp_configured(&config);
                }
            }
            NTP_CLIENT_PORT if protocols.sntp => {
                if let Some(unix_seconds) = self.sntp.filter(&self.buf, payload_len, self.now) {
                    self.handler.sntp_time(unix_seconds);
                }
            }
            _ => {
                let mut datagram = UdpDatagram::new(&mut self.net, &mut self.buf, payload_len);
                self.handler.udp_packet(&mut datagram);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
