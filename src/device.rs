//! Ethernet device abstraction
//!
//! The stack talks to the MAC/PHY through this trait only. The bundled
//! [`Enc28j60`](crate::driver::Enc28j60) driver implements it over SPI;
//! tests implement it with an in-memory frame queue.

use crate::error::{IoResult, Result};
use crate::wire::MacAddress;

/// Ethernet controller used by the stack
///
/// Calls are synchronous and bounded: `send_packet` returns once the
/// controller accepted the frame, `recv_packet` never waits for one.
pub trait EthernetDevice {
    /// Reset and configure the controller to receive frames for `mac`
    fn init(&mut self, mac: MacAddress) -> Result<()>;

    /// Transmit one frame (Ethernet header included, CRC appended by hardware)
    fn send_packet(&mut self, frame: &[u8]) -> IoResult<()>;

    /// Copy the next pending frame into `buf`, CRC stripped
    ///
    /// Returns the frame length, truncated to `buf.len()`, or 0 when nothing
    /// is pending.
    fn recv_packet(&mut self, buf: &mut [u8]) -> IoResult<usize>;
}

impl<T: EthernetDevice + ?Sized> EthernetDevice for &mut T {
    fn init(&mut self, mac: MacAddress) -> Result<()> {
        (**self).init(mac)
    }

    fn send_packet(&mut self, frame: &[u8]) -> IoResult<()> {
        (**self).send_packet(frame)
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        (**self).recv_packet(buf)
    }
}
