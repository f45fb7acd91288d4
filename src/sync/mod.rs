//! Interrupt-safe sharing
//!
//! - [`CriticalSectionCell`] - ISR-safe interior mutability
//! - [`SharedLan`] - a [`Lan`](crate::Lan) living in a `static`
//!
//! Requires the `critical-section` feature; the critical section
//! implementation itself comes from the HAL or runtime crate.
//!
//! # Example
//!
//! ```ignore
//! use ph_enc28j60_lan::sync::SharedLan;
//!
//! static LAN: SharedLan<Enc28j60<Spi, Delay>, App> = SharedLan::new();
//!
//! fn main() {
//!     LAN.install(Lan::new(Enc28j60::new(spi, delay), App::new(), LanConfig::new()));
//!     LAN.with(|lan| lan.init(now())).unwrap().unwrap();
//!     loop {
//!         LAN.poll(now()).ok();
//!     }
//! }
//! ```

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::SharedLan;
