//! SNTP client
//!
//! Queries one server until a response arrives, then stays synchronized.
//! With a resync interval configured it queries again once the interval
//! has passed.

use super::iface::Interface;
use super::udp;
use crate::internal::constants::{NTP_CLIENT_PORT, NTP_SERVER_PORT, SNTP_INIT_DELAY_MS, SNTP_RETRY_INTERVAL_MS};
use crate::time::Instant;
use crate::wire::{Ipv4Address, UDP_PAYLOAD_OFFSET, ntp};

/// SNTP client state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SntpStatus {
    /// Nothing sent yet
    #[default]
    Init,
    /// Request sent, no answer yet
    Connecting,
    /// Time received
    Synchronized,
}

#[derive(Debug, Clone)]
pub(crate) struct SntpClient {
    status: SntpStatus,
    server: Ipv4Address,
    resync_ms: Option<u32>,
    retry_at: Instant,
}

impl SntpClient {
    pub(crate) const fn new(server: Ipv4Address, resync_ms: Option<u32>) -> Self {
        Self {
            status: SntpStatus::Init,
            server,
            resync_ms,
            retry_at: Instant::ZERO,
        }
    }

    pub(crate) const fn status(&self) -> SntpStatus {
        self.status
    }

    pub(crate) fn init(&mut self, now: Instant) {
        self.retry_at = now + SNTP_INIT_DELAY_MS;
    }

    pub(crate) fn poll(&mut self, iface: &mut dyn Interface, frame: &mut [u8], now: Instant) {
        if !now.has_reached(self.retry_at) {
            return;
        }
        if self.status == SntpStatus::Synchronized && self.resync_ms.is_none() {
            return;
        }

        self.status = SntpStatus::Connecting;
        self.retry_at = now + SNTP_RETRY_INTERVAL_MS;

        ntp::emit_request(&mut frame[UDP_PAYLOAD_OFFSET..]);
        let result = udp::send(
            iface,
            frame,
            self.server,
            NTP_SERVER_PORT,
            NTP_CLIENT_PORT,
            ntp::PACKET_LEN,
        );
        if let Err(_err) = result {
            #[cfg(feature = "defmt")]
            defmt::debug!("SNTP request to {} failed: {}", self.server, _err);
        }
    }

    /// Handle a datagram on the client port; returns Unix seconds
    pub(crate) fn filter(&mut self, frame: &[u8], len: usize, now: Instant) -> Option<u32> {
        let payload = frame.get(UDP_PAYLOAD_OFFSET..UDP_PAYLOAD_OFFSET + len)?;
        let unix_time = ntp::unix_time(payload)?;

        self.status = SntpStatus::Synchronized;
        if let Some(interval) = self.resync_ms {
            self.retry_at = now + interval;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("SNTP synchronized: {=u32}", unix_time);

        Some(unix_time)
    }
}
