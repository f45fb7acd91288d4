//! Synchronization primitives for ISR-safe access.

use core::cell::RefCell;
use critical_section::Mutex;

// =============================================================================
// CriticalSectionCell
// =============================================================================

/// A cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` so the wrapped value
/// can be reached from both the main loop and interrupt handlers.
///
/// # Example
///
/// ```ignore
/// use ph_enc28j60_lan::sync::CriticalSectionCell;
///
/// static TICKS: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
///
/// #[interrupt]
/// fn SYSTICK() {
///     TICKS.with(|t| *t = t.wrapping_add(1));
/// }
/// ```
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive access to the wrapped value.
    ///
    /// Interrupts are disabled for the duration of the closure.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside another `with` on the
    /// same cell.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

impl<T: Default> Default for CriticalSectionCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
