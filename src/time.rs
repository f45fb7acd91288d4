//! Millisecond tick supplied by the caller
//!
//! The stack has no clock of its own. Every call to [`Lan::poll`](crate::Lan::poll)
//! carries the current value of a free-running millisecond counter (a SysTick
//! or HAL tick on STM32). The counter is allowed to wrap: comparisons use
//! wrapping arithmetic, so deadlines stay correct across the 49.7 day rollover
//! as long as they lie less than half the range in the future.

use core::ops::Add;

/// Point in time, in milliseconds of a wrapping 32-bit tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant {
    millis: u32,
}

impl Instant {
    /// Tick zero
    pub const ZERO: Self = Self { millis: 0 };

    /// Create an instant from a raw millisecond tick
    #[must_use]
    pub const fn from_millis(millis: u32) -> Self {
        Self { millis }
    }

    /// Raw millisecond tick
    #[must_use]
    pub const fn as_millis(self) -> u32 {
        self.millis
    }

    /// Milliseconds elapsed from `earlier` to `self`
    #[must_use]
    pub const fn elapsed_since(self, earlier: Instant) -> u32 {
        self.millis.wrapping_sub(earlier.millis)
    }

    /// Whether `self` is at or past `deadline`
    #[must_use]
    pub const fn has_reached(self, deadline: Instant) -> bool {
        (self.millis.wrapping_sub(deadline.millis) as i32) >= 0
    }

    /// Instant `millis` milliseconds later
    #[must_use]
    pub const fn add_millis(self, millis: u32) -> Self {
        Self {
            millis: self.millis.wrapping_add(millis),
        }
    }

    /// Seed for sequence numbers and transaction ids: `t + (t << 16)`
    #[must_use]
    pub const fn seed(self) -> u32 {
        self.millis.wrapping_add(self.millis << 16)
    }
}

impl Add<u32> for Instant {
    type Output = Instant;

    fn add(self, millis: u32) -> Self::Output {
        self.add_millis(millis)
    }
}
