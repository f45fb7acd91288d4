//! Configuration types for the LAN stack

use crate::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_GATEWAY, DEFAULT_IP_ADDR, DEFAULT_MAC_ADDR, DEFAULT_NETMASK, DEFAULT_SNTP_SERVER,
    DEFAULT_TCP_IDLE_TIMEOUT_MS, DEFAULT_TCP_MSS, DEFAULT_TCP_REXMIT_LIMIT, DEFAULT_TCP_REXMIT_TIMEOUT_MS,
    DEFAULT_TCP_WINDOW, DEFAULT_TTL,
};
use crate::wire::{Ipv4Address, MacAddress};

/// Interface addressing: address, netmask and default gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpConfig {
    /// Local address (0.0.0.0 while unconfigured)
    pub address: Ipv4Address,
    /// Subnet mask
    pub netmask: Ipv4Address,
    /// Default gateway
    pub gateway: Ipv4Address,
}

impl IpConfig {
    /// Unconfigured interface
    pub const UNSPECIFIED: Self = Self {
        address: Ipv4Address::UNSPECIFIED,
        netmask: Ipv4Address::UNSPECIFIED,
        gateway: Ipv4Address::UNSPECIFIED,
    };

    /// Create a configuration
    #[must_use]
    pub const fn new(address: Ipv4Address, netmask: Ipv4Address, gateway: Ipv4Address) -> Self {
        Self {
            address,
            netmask,
            gateway,
        }
    }

    /// Subnet broadcast address (`address | !netmask`)
    #[must_use]
    pub const fn broadcast(&self) -> Ipv4Address {
        Ipv4Address::from_bits(self.address.to_bits() | !self.netmask.to_bits())
    }

    /// Whether `addr` is on the local subnet
    #[must_use]
    pub const fn is_local(&self, addr: Ipv4Address) -> bool {
        (addr.to_bits() ^ self.address.to_bits()) & self.netmask.to_bits() == 0
    }

    /// Next hop for `dst`: the destination itself on-link, else the gateway
    #[must_use]
    pub const fn next_hop(&self, dst: Ipv4Address) -> Ipv4Address {
        if self.is_local(dst) { dst } else { self.gateway }
    }
}

/// Protocols handled by the stack
///
/// Disabled protocols drop their traffic as if it were unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Protocols {
    /// Answer ICMP echo requests
    pub icmp: bool,
    /// UDP send/receive (required by DHCP and SNTP)
    pub udp: bool,
    /// TCP engine
    pub tcp: bool,
    /// DHCP client
    pub dhcp: bool,
    /// SNTP client
    pub sntp: bool,
}

impl Protocols {
    /// Every protocol enabled
    pub const ALL: Self = Self {
        icmp: true,
        udp: true,
        tcp: true,
        dhcp: true,
        sntp: true,
    };

    /// Static addressing, no time sync
    pub const STATIC: Self = Self {
        icmp: true,
        udp: true,
        tcp: true,
        dhcp: false,
        sntp: false,
    };
}

impl Default for Protocols {
    fn default() -> Self {
        Self::ALL
    }
}

/// What happens to a TCP connection that goes quiet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TcpTimeout {
    /// Resend the last segment every `timeout_ms`; drop the connection
    /// when the timeout expires again after `limit + 1` resends
    Retransmit {
        /// Time without an accepted segment before resending
        timeout_ms: u32,
        /// Resend count past which the connection is dropped
        limit: u8,
    },
    /// Drop the connection after `timeout_ms` without an accepted segment
    IdleClose {
        /// Idle time before the connection is dropped
        timeout_ms: u32,
    },
}

impl TcpTimeout {
    /// Idle-close policy with the default 2.5 s timeout
    pub const IDLE_CLOSE: Self = TcpTimeout::IdleClose {
        timeout_ms: DEFAULT_TCP_IDLE_TIMEOUT_MS,
    };

    /// Configured timeout in milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u32 {
        match self {
            TcpTimeout::Retransmit { timeout_ms, .. } | TcpTimeout::IdleClose { timeout_ms } => {
                *timeout_ms
            }
        }
    }
}

impl Default for TcpTimeout {
    fn default() -> Self {
        TcpTimeout::Retransmit {
            timeout_ms: DEFAULT_TCP_REXMIT_TIMEOUT_MS,
            limit: DEFAULT_TCP_REXMIT_LIMIT,
        }
    }
}

/// Complete stack configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LanConfig {
    /// Hardware address
    pub mac_address: MacAddress,
    /// Static addressing, used until DHCP replaces it
    pub ip: IpConfig,
    /// TTL of outgoing IP packets
    pub ttl: u8,
    /// Receive window advertised in TCP segments
    pub tcp_window: u16,
    /// MSS option value sent with SYN segments
    pub tcp_mss: u16,
    /// Timeout policy for quiet TCP connections
    pub tcp_timeout: TcpTimeout,
    /// SNTP server queried by the time client
    pub sntp_server: Ipv4Address,
    /// Re-query interval after synchronization (`None` for one-shot)
    pub sntp_resync_ms: Option<u32>,
    /// Enabled protocols
    pub protocols: Protocols,
}

impl Default for LanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LanConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: MacAddress(DEFAULT_MAC_ADDR),
            ip: IpConfig {
                address: Ipv4Address(DEFAULT_IP_ADDR),
                netmask: Ipv4Address(DEFAULT_NETMASK),
                gateway: Ipv4Address(DEFAULT_GATEWAY),
            },
            ttl: DEFAULT_TTL,
            tcp_window: DEFAULT_TCP_WINDOW,
            tcp_mss: DEFAULT_TCP_MSS,
            tcp_timeout: TcpTimeout::Retransmit {
                timeout_ms: DEFAULT_TCP_REXMIT_TIMEOUT_MS,
                limit: DEFAULT_TCP_REXMIT_LIMIT,
            },
            sntp_server: Ipv4Address(DEFAULT_SNTP_SERVER),
            sntp_resync_ms: None,
            protocols: Protocols::ALL,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, mac: MacAddress) -> Self {
        self.mac_address = mac;
        self
    }

    /// Set the static address, netmask and gateway
    #[must_use]
    pub const fn with_ip(mut self, ip: IpConfig) -> Self {
        self.ip = ip;
        self
    }

    /// Set the IP time-to-live
    #[must_use]
    pub const fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the advertised TCP window
    #[must_use]
    pub const fn with_tcp_window(mut self, window: u16) -> Self {
        self.tcp_window = window;
        self
    }

    /// Set the MSS option value
    #[must_use]
    pub const fn with_tcp_mss(mut self, mss: u16) -> Self {
        self.tcp_mss = mss;
        self
    }

    /// Set the TCP timeout policy
    #[must_use]
    pub const fn with_tcp_timeout(mut self, timeout: TcpTimeout) -> Self {
        self.tcp_timeout = timeout;
        self
    }

    /// Set the SNTP server
    #[must_use]
    pub const fn with_sntp_server(mut self, server: Ipv4Address) -> Self {
        self.sntp_server = server;
        self
    }

    /// Re-query the SNTP server every `interval_ms` after synchronizing
    #[must_use]
    pub const fn with_sntp_resync_ms(mut self, interval_ms: u32) -> Self {
        self.sntp_resync_ms = Some(interval_ms);
        self
    }

    /// Set the enabled protocols
    #[must_use]
    pub const fn with_protocols(mut self, protocols: Protocols) -> Self {
        self.protocols = protocols;
        self
    }

    /// Enable or disable the DHCP client
    #[must_use]
    pub const fn with_dhcp(mut self, enabled: bool) -> Self {
        self.protocols.dhcp = enabled;
        self
    }

    /// Enable or disable the SNTP client
    #[must_use]
    pub const fn with_sntp(mut self, enabled: bool) -> Self {
        self.protocols.sntp = enabled;
        self
    }

    /// Check the configuration for values the stack cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ttl == 0 || self.tcp_mss == 0 || self.tcp_timeout.timeout_ms() == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.sntp_resync_ms == Some(0) {
            return Err(ConfigError::InvalidConfig);
        }
        if (self.protocols.dhcp || self.protocols.sntp) && !self.protocols.udp {
            return Err(ConfigError::ProtocolDependency);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
