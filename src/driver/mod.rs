//! Ethernet controller drivers
//!
//! - [`enc28j60`] - Microchip ENC28J60 over `embedded-hal` SPI
//!
//! Drivers implement [`EthernetDevice`](crate::EthernetDevice), the only
//! interface the stack needs from the hardware.
//!
//! # Example
//!
//! ```ignore
//! use ph_enc28j60_lan::driver::Enc28j60;
//!
//! let mut enc = Enc28j60::new(spi_device, delay);
//! enc.init(mac)?;
//! let up = enc.is_link_up()?;
//! ```

pub mod enc28j60;

pub use enc28j60::Enc28j60;
