//! ARP cache
//!
//! Fixed-size ring of resolved IPv4 to MAC mappings. Entries never expire;
//! when the ring is full the oldest entry is overwritten, whether or not it
//! was used recently. A peer that changes its MAC keeps the stale entry
//! until capacity pressure pushes it out.

use crate::wire::{Ipv4Address, MacAddress};

/// One resolved address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArpEntry {
    /// Protocol address
    pub ip: Ipv4Address,
    /// Hardware address
    pub mac: MacAddress,
}

/// Ring buffer of `N` ARP entries with FIFO overwrite
#[derive(Debug, Clone)]
pub struct ArpCache<const N: usize> {
    entries: [Option<ArpEntry>; N],
    cursor: usize,
}

impl<const N: usize> Default for ArpCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ArpCache<N> {
    /// Create an empty cache
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [None; N],
            cursor: 0,
        }
    }

    /// Capacity of the cache
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Hardware address cached for `ip`
    pub fn lookup(&self, ip: Ipv4Address) -> Option<MacAddress> {
        self.iter().find(|entry| entry.ip == ip).map(|entry| entry.mac)
    }

    /// Store a mapping unless `ip` is already cached
    ///
    /// Returns `true` when the entry was added. The slot under the write
    /// cursor is overwritten and the cursor advances modulo the capacity.
    pub fn insert(&mut self, ip: Ipv4Address, mac: MacAddress) -> bool {
        if N == 0 || self.lookup(ip).is_some() {
            return false;
        }
        self.entries[self.cursor] = Some(ArpEntry { ip, mac });
        self.cursor = (self.cursor + 1) % N;
        true
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether nothing has been learned yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = &ArpEntry> {
        self.entries.iter().flatten()
    }
}
