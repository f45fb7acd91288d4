//! ENC28J60 LAN Stack
//!
//! A `no_std`, `no_alloc` TCP/IP stack for the Microchip ENC28J60 SPI
//! Ethernet controller.
//!
//! The whole stack works in one shared frame buffer: a received frame is
//! parsed in place and, where a reply is due, rewritten in place and sent
//! back. Nothing is queued and nothing is allocated.
//!
//! # Architecture
//!
//! 1. **Driver** ([`driver`]): ENC28J60 over `embedded-hal` SPI, behind the
//!    [`EthernetDevice`] trait
//! 2. **Wire** ([`wire`]): header layouts, field offsets and checksums
//! 3. **Stack** ([`stack`]): ARP, IPv4, ICMP echo, UDP, TCP, DHCP and SNTP
//!    tied together by the [`Lan`] facade
//!
//! ## Standard Compliance
//!
//! - **RFC 826**: ARP request/reply
//! - **RFC 791 / 792**: IPv4 (no fragmentation, no options), ICMP echo
//! - **RFC 768 / 793**: UDP, a reduced TCP (no out-of-order reassembly)
//! - **RFC 2131**: DHCP client with renewal
//! - **RFC 4330**: SNTP client
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and log output
//! - `critical-section`: Enable the ISR-safe [`SharedLan`](sync::SharedLan) wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_enc28j60_lan::{Enc28j60, Instant, Lan, LanConfig, LanHandler, TcpRequest, TcpSocket, TcpOptions};
//!
//! struct Hello;
//!
//! impl LanHandler for Hello {
//!     fn tcp_accept(&mut self, request: &TcpRequest) -> bool {
//!         request.local_port() == 80
//!     }
//!
//!     fn tcp_data(&mut self, socket: &mut TcpSocket<'_>) {
//!         let body = b"HTTP/1.0 200 OK\r\n\r\nhello";
//!         socket.buffer_mut()[..body.len()].copy_from_slice(body);
//!         socket.send(body.len(), TcpOptions::CLOSE).ok();
//!     }
//! }
//!
//! let config = LanConfig::new().with_dhcp(true);
//! let mut lan: Lan<_, _> = Lan::new(Enc28j60::new(spi, delay), Hello, config);
//! lan.init(Instant::from_millis(ticks()))?;
//!
//! loop {
//!     lan.poll(Instant::from_millis(ticks()))?;
//! }
//! ```
//!
//! # Memory Requirements
//!
//! With default configuration (3 ARP entries, 5 TCP connections):
//! - Frame buffer: 1514 bytes
//! - Protocol state: a few hundred bytes
//!
//! All of it lives inside [`Lan`], so placement (stack, `static`) is up to
//! the application.

#![no_std]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod device;
pub mod driver;
pub mod error;
pub mod stack;
pub mod time;
pub mod wire;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use device::EthernetDevice;
pub use driver::Enc28j60;
pub use error::{ConfigError, ConfigResult, Error, IoError, IoResult, NetError, NetResult, Result};
pub use stack::{
    ArpCache, ArpEntry, ConnectionId, DhcpStatus, IpConfig, Lan, LanConfig, LanHandler, Protocols,
    SntpStatus, TcpOptions, TcpRequest, TcpSocket, TcpStatus, TcpTimeout, UdpDatagram,
};
pub use time::Instant;
pub use wire::{Ipv4Address, MacAddress};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedLan};
