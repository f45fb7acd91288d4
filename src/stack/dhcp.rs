//! DHCP client
//!
//! ```text
//!            retry deadline              OFFER (xid ok)          ACK with lease
//!   Init ──────────────────► WaitingOffer ─────────────► WaitingAck ───────────► Assigned
//!                                 ▲                       ▲  renewal REQUEST sent   │
//!                                 │                       └─────────────────────────┤
//!                                 └──────────────── lease deadline ─────────────────┘
//! ```
//!
//! Every retry deadline broadcasts a DISCOVER with a fresh transaction id and
//! takes the interface down (address, netmask and gateway zeroed) until an
//! ACK commits a new configuration. While a lease is held the client sends a
//! unicast REQUEST to the server once the renewal deadline passes and waits
//! for the ACK in `WaitingAck`, keeping the current address. A REQUEST that
//! could not be sent is retried after five seconds.

use super::config::IpConfig;
use super::iface::Interface;
use super::udp;
use crate::error::Result;
use crate::internal::constants::{
    DHCP_CLIENT_PORT, DHCP_INIT_DELAY_MS, DHCP_MAX_LEASE_SECS, DHCP_RENEW_RETRY_MS,
    DHCP_RETRY_INTERVAL_MS, DHCP_SERVER_PORT,
};
use crate::time::Instant;
use crate::wire::dhcp::{
    DhcpMessage, DhcpOptions, FIXED_LEN, FLAG_BROADCAST, MAGIC_COOKIE, OptionWriter, message_type, op,
    option,
};
use crate::wire::{IP_OFFSET, Ipv4Address, UDP_PAYLOAD_OFFSET, ipv4};

/// DHCP client state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhcpStatus {
    /// No lease, nothing sent yet
    #[default]
    Init,
    /// DISCOVER broadcast, waiting for an OFFER
    WaitingOffer,
    /// REQUEST sent for an offered or renewed address, waiting for the ACK
    WaitingAck,
    /// Lease active
    Assigned,
}

/// Lease negotiation state of one stack instance
#[derive(Debug, Clone)]
pub(crate) struct DhcpClient {
    status: DhcpStatus,
    server: Ipv4Address,
    renew_at: Instant,
    retry_at: Instant,
    xid: u32,
}

impl DhcpClient {
    pub(crate) const fn new() -> Self {
        Self {
            status: DhcpStatus::Init,
            server: Ipv4Address::UNSPECIFIED,
            renew_at: Instant::ZERO,
            retry_at: Instant::ZERO,
            xid: 0,
        }
    }

    pub(crate) const fn status(&self) -> DhcpStatus {
        self.status
    }

    /// Schedule the first DISCOVER
    pub(crate) fn init(&mut self, now: Instant) {
        self.retry_at = now + DHCP_INIT_DELAY_MS;
    }

    /// Run the discovery and renewal timers
    pub(crate) fn poll(&mut self, iface: &mut dyn Interface, frame: &mut [u8], now: Instant) {
        if now.has_reached(self.retry_at) {
            self.status = DhcpStatus::WaitingOffer;
            self.retry_at = now + DHCP_RETRY_INTERVAL_MS;
            self.xid = now.seed();

            // Network down until a lease is committed
            *iface.ip_config_mut() = IpConfig::UNSPECIFIED;

            let message =
                DhcpMessage::client(self.xid, FLAG_BROADCAST, Ipv4Address::UNSPECIFIED, iface.mac_address());
            let dhcp = &mut frame[UDP_PAYLOAD_OFFSET..];
            message.emit(dhcp);
            let options_len = OptionWriter::new(&mut dhcp[FIXED_LEN..])
                .message_type(message_type::DISCOVER)
                .end();

            #[cfg(feature = "defmt")]
            defmt::debug!("DHCP discover, xid {=u32:#010x}", self.xid);

            Self::send(iface, frame, Ipv4Address::BROADCAST, FIXED_LEN + options_len).ok();
        }

        if self.status == DhcpStatus::Assigned && now.has_reached(self.renew_at) {
            self.xid = now.seed();
            let address = iface.ip_config().address;

            let message = DhcpMessage::client(self.xid, 0, address, iface.mac_address());
            let dhcp = &mut frame[UDP_PAYLOAD_OFFSET..];
            message.emit(dhcp);
            let options_len = OptionWriter::new(&mut dhcp[FIXED_LEN..])
                .message_type(message_type::REQUEST)
                .address(option::REQUESTED_ADDR, address)
                .address(option::SERVER_ID, self.server)
                .end();

            #[cfg(feature = "defmt")]
            defmt::debug!("DHCP renew {} from {}", address, self.server);

            match Self::send(iface, frame, self.server, FIXED_LEN + options_len) {
                Ok(()) => self.status = DhcpStatus::WaitingAck,
                Err(_) => self.renew_at = now + DHCP_RENEW_RETRY_MS,
            }
        }
    }

    /// Handle a datagram received on the client port
    ///
    /// `len` is the UDP payload length. Returns the new configuration when an
    /// ACK committed a lease.
    pub(crate) fn filter(
        &mut self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        len: usize,
        now: Instant,
    ) -> Option<IpConfig> {
        let payload = frame.get(UDP_PAYLOAD_OFFSET..UDP_PAYLOAD_OFFSET + len)?;
        let message = DhcpMessage::parse(payload)?;
        if message.op != op::REPLY || message.xid != self.xid || message.cookie != MAGIC_COOKIE {
            return None;
        }
        let options = DhcpOptions::parse(&payload[FIXED_LEN..]);
        let server = options
            .server_id
            .unwrap_or_else(|| ipv4::source(&frame[IP_OFFSET..]));

        match options.message_type? {
            message_type::OFFER => {
                if self.status == DhcpStatus::WaitingOffer && !message.yiaddr.is_unspecified() {
                    self.status = DhcpStatus::WaitingAck;
                    self.request_offer(iface, frame, &message, server);
                }
                None
            }
            message_type::ACK => {
                if self.status != DhcpStatus::WaitingAck {
                    return None;
                }
                let lease = options.lease_time.filter(|&t| t != 0)?.min(DHCP_MAX_LEASE_SECS);
                let renew = options
                    .renew_time
                    .map_or(lease / 2, |t| t.min(DHCP_MAX_LEASE_SECS));

                self.status = DhcpStatus::Assigned;
                self.server = server;
                self.renew_at = now + renew * 1000;
                self.retry_at = now + lease * 1000;

                let config = IpConfig::new(
                    message.yiaddr,
                    options.subnet_mask.unwrap_or(Ipv4Address::UNSPECIFIED),
                    options.router.unwrap_or(Ipv4Address::UNSPECIFIED),
                );
                *iface.ip_config_mut() = config;

                #[cfg(feature = "defmt")]
                defmt::info!(
                    "DHCP lease {} mask {} gateway {} for {=u32} s",
                    config.address,
                    config.netmask,
                    config.gateway,
                    lease
                );

                Some(config)
            }
            _ => None,
        }
    }

    /// Broadcast a REQUEST for the address in `offer`
    fn request_offer(
        &self,
        iface: &mut dyn Interface,
        frame: &mut [u8],
        offer: &DhcpMessage,
        server: Ipv4Address,
    ) {
        let message = DhcpMessage {
            giaddr: offer.giaddr,
            ..DhcpMessage::client(self.xid, FLAG_BROADCAST, Ipv4Address::UNSPECIFIED, offer.chaddr)
        };
        let dhcp = &mut frame[UDP_PAYLOAD_OFFSET..];
        message.emit(dhcp);
        let options_len = OptionWriter::new(&mut dhcp[FIXED_LEN..])
            .message_type(message_type::REQUEST)
            .address(option::REQUESTED_ADDR, offer.yiaddr)
            .address(option::SERVER_ID, server)
            .end();

        #[cfg(feature = "defmt")]
        defmt::debug!("DHCP request {} from {}", offer.yiaddr, server);

        Self::send(iface, frame, Ipv4Address::BROADCAST, FIXED_LEN + options_len).ok();
    }

    fn send(iface: &mut dyn Interface, frame: &mut [u8], to: Ipv4Address, len: usize) -> Result<()> {
        let result = udp::send(iface, frame, to, DHCP_SERVER_PORT, DHCP_CLIENT_PORT, len);
        #[cfg(feature = "defmt")]
        if let Err(err) = &result {
            defmt::debug!("DHCP send failed: {}", err);
        }
        result
    }
}
