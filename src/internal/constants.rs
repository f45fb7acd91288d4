//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers
//! used throughout the stack.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions
//! - **Default configuration**: Addresses and tuning values used by `LanConfig::new()`
//! - **Well-known ports**: DHCP and NTP
//! - **Timing**: DHCP/SNTP retry intervals and clamps
//! - **Controller**: ENC28J60 buffer layout and retry bounds
//!
//! # Note
//!
//! Field offsets of the wire formats live in their `wire` modules and the
//! ENC28J60 register bits live in `enc28j60_regs`.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Size of the shared frame buffer (1500 MTU + 14 header, CRC stripped)
pub const FRAME_BUFFER_SIZE: usize = 1514;

/// Maximum frame length programmed into the controller (including CRC)
pub const MAX_FRAME_LEN: u16 = 1518;

/// Ethernet CRC/FCS size at end of frame
pub const CRC_SIZE: usize = 4;

// =============================================================================
// Default Configuration
// =============================================================================

/// Default MAC address
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x00, 0x13, 0x37, 0x01, 0x23, 0x45];

/// Default static IP address
pub const DEFAULT_IP_ADDR: [u8; 4] = [10, 1, 20, 55];

/// Default netmask
pub const DEFAULT_NETMASK: [u8; 4] = [255, 255, 255, 0];

/// Default gateway
pub const DEFAULT_GATEWAY: [u8; 4] = [10, 1, 20, 1];

/// Default SNTP server
pub const DEFAULT_SNTP_SERVER: [u8; 4] = [213, 161, 194, 93];

/// Default IP time-to-live
pub const DEFAULT_TTL: u8 = 64;

/// Default advertised TCP receive window
pub const DEFAULT_TCP_WINDOW: u16 = 65535;

/// Default MSS option value sent with SYN segments
pub const DEFAULT_TCP_MSS: u16 = 512;

/// Default TCP retransmission timeout in milliseconds
pub const DEFAULT_TCP_REXMIT_TIMEOUT_MS: u32 = 1000;

/// Default number of retransmissions before a connection is dropped
pub const DEFAULT_TCP_REXMIT_LIMIT: u8 = 5;

/// Default idle timeout when retransmission is disabled
pub const DEFAULT_TCP_IDLE_TIMEOUT_MS: u32 = 2500;

/// Default ARP cache capacity
pub const DEFAULT_ARP_SLOTS: usize = 3;

/// Default TCP connection pool size
pub const DEFAULT_TCP_SLOTS: usize = 5;

// =============================================================================
// Well-known Ports
// =============================================================================

/// DHCP server port
pub const DHCP_SERVER_PORT: u16 = 67;

/// DHCP client port
pub const DHCP_CLIENT_PORT: u16 = 68;

/// NTP server port
pub const NTP_SERVER_PORT: u16 = 123;

/// Local port the SNTP client sends from and listens on
pub const NTP_CLIENT_PORT: u16 = 124;

// =============================================================================
// Timing Constants
// =============================================================================

/// Delay between `init` and the first DHCP DISCOVER
pub const DHCP_INIT_DELAY_MS: u32 = 2_000;

/// Interval between DISCOVER attempts while no lease is held
pub const DHCP_RETRY_INTERVAL_MS: u32 = 15_000;

/// Retry interval for a renewal REQUEST
pub const DHCP_RENEW_RETRY_MS: u32 = 5_000;

/// Upper bound applied to lease and renew times (seconds)
pub const DHCP_MAX_LEASE_SECS: u32 = 21_600;

/// Delay between `init` and the first SNTP query
pub const SNTP_INIT_DELAY_MS: u32 = 5_000;

/// Interval between SNTP queries until synchronized
pub const SNTP_RETRY_INTERVAL_MS: u32 = 30_000;

// =============================================================================
// ENC28J60 Controller
// =============================================================================

/// First byte of the receive ring
pub const RX_START: u16 = 0x0000;

/// Last byte of the receive ring
pub const RX_END: u16 = 0x19FF;

/// First byte of the transmit buffer
pub const TX_START: u16 = 0x1A00;

/// Last address of the controller buffer memory
pub const BUFFER_END: u16 = 0x1FFF;

/// Delay after a system reset command in microseconds
pub const RESET_DELAY_US: u32 = 1_000;

/// Maximum TX logic resets while waiting for a stuck transmit request
pub const TX_RESET_ATTEMPTS: u32 = 16;

/// Maximum polls of the transmit-request bit between resets
pub const TX_WAIT_POLLS: u32 = 10_000;

/// Maximum iterations waiting for a PHY (MII) operation
pub const MII_BUSY_TIMEOUT: u32 = 10_000;

/// Wait between MII busy polls in microseconds
pub const MII_POLL_INTERVAL_US: u32 = 10;
