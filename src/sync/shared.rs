//! ISR-safe stack wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::device::EthernetDevice;
use crate::error::{IoError, Result};
use crate::internal::constants::{DEFAULT_ARP_SLOTS, DEFAULT_TCP_SLOTS};
use crate::stack::{Lan, LanHandler};
use crate::time::Instant;

/// A [`Lan`] that can live in a `static`
///
/// Starts empty; the stack is moved in with [`install`](Self::install) once
/// the SPI bus and delay exist. All access goes through
/// `critical_section::with()`.
///
/// # Example
///
/// ```ignore
/// static LAN: SharedLan<MyDevice, MyHandler> = SharedLan::new();
///
/// LAN.install(Lan::new(device, handler, LanConfig::new()));
/// LAN.with(|lan| lan.udp_send(peer, 5000, 5000, b"hello"));
/// ```
pub struct SharedLan<
    D,
    H,
    const ARP_SLOTS: usize = DEFAULT_ARP_SLOTS,
    const TCP_SLOTS: usize = DEFAULT_TCP_SLOTS,
> {
    inner: CriticalSectionCell<Option<Lan<D, H, ARP_SLOTS, TCP_SLOTS>>>,
}

impl<D, H, const ARP_SLOTS: usize, const TCP_SLOTS: usize> SharedLan<D, H, ARP_SLOTS, TCP_SLOTS> {
    /// Create an empty wrapper (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }

    /// Move a stack in, returning the one it replaces
    pub fn install(&self, lan: Lan<D, H, ARP_SLOTS, TCP_SLOTS>) -> Option<Lan<D, H, ARP_SLOTS, TCP_SLOTS>> {
        self.inner.with(|slot| slot.replace(lan))
    }

    /// Move the stack out again
    pub fn take(&self) -> Option<Lan<D, H, ARP_SLOTS, TCP_SLOTS>> {
        self.inner.with(Option::take)
    }

    /// Whether a stack has been installed
    pub fn is_installed(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Execute a closure with exclusive access to the stack.
    ///
    /// Returns `None` when nothing is installed. Interrupts are disabled for
    /// the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Lan<D, H, ARP_SLOTS, TCP_SLOTS>) -> R,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Like [`with`](Self::with), but returns `None` instead of panicking
    /// when the stack is already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Lan<D, H, ARP_SLOTS, TCP_SLOTS>) -> R,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }
}

impl<D: EthernetDevice, H: LanHandler, const ARP_SLOTS: usize, const TCP_SLOTS: usize>
    SharedLan<D, H, ARP_SLOTS, TCP_SLOTS>
{
    /// Run one [`Lan::poll`] inside a critical section
    ///
    /// # Errors
    /// - `InvalidState` - no stack installed
    /// - anything [`Lan::poll`] returns
    pub fn poll(&self, now: Instant) -> Result<()> {
        self.with(|lan| lan.poll(now))
            .unwrap_or(Err(IoError::InvalidState.into()))
    }
}

impl<D, H, const ARP_SLOTS: usize, const TCP_SLOTS: usize> Default for SharedLan<D, H, ARP_SLOTS, TCP_SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}
