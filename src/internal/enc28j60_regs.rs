//! ENC28J60 Register Definitions
//!
//! Register addresses and bit definitions for the Microchip ENC28J60
//! stand-alone Ethernet controller.
//!
//! # Address Encoding
//!
//! Control register addresses are encoded in one byte:
//! - bits 0-4: register address within the bank
//! - bits 5-6: bank number (0-3)
//! - bit 7: MAC/MII register (reads clock out a dummy byte first)
//!
//! Addresses 0x1B-0x1F are mapped into every bank.
//!
//! # Module Organization
//!
//! - `opcode`: SPI instruction opcodes
//! - `reg`: Control register addresses
//! - `econ1`, `econ2`, `eir`, `estat`: common register bits
//! - `erxfcon`, `macon1`, `macon3`, `micmd`, `mistat`: bank register bits
//! - `phy`: PHY register addresses and bits
//!
//! # References
//!
//! - ENC28J60 Data Sheet (DS39662)
//! - ENC28J60 Silicon Errata (DS80349)

#![allow(dead_code)]

/// Mask selecting the in-bank register address
pub const ADDR_MASK: u8 = 0x1F;

/// First register address shared by all banks
pub const COMMON_START: u8 = 0x1B;

/// MAC/MII register marker (dummy byte on read)
pub const MAC_MII_FLAG: u8 = 0x80;

/// Bank number encoded in a register address
#[inline(always)]
pub const fn bank_of(addr: u8) -> u8 {
    (addr >> 5) & 0x03
}

/// Whether the register is reachable regardless of the selected bank
#[inline(always)]
pub const fn is_common(addr: u8) -> bool {
    (addr & ADDR_MASK) >= COMMON_START
}

// =============================================================================
// SPI Opcodes
// =============================================================================

/// SPI instruction opcodes
pub mod opcode {
    /// Read Control Register
    pub const RCR: u8 = 0x00;
    /// Read Buffer Memory
    pub const RBM: u8 = 0x3A;
    /// Write Control Register
    pub const WCR: u8 = 0x40;
    /// Write Buffer Memory
    pub const WBM: u8 = 0x7A;
    /// Bit Field Set
    pub const BFS: u8 = 0x80;
    /// Bit Field Clear
    pub const BFC: u8 = 0xA0;
    /// System Command (soft reset)
    pub const SC: u8 = 0xFF;
}

// =============================================================================
// Control Registers
// =============================================================================

/// Control register addresses (bank encoded in bits 5-6)
pub mod reg {
    // Common (all banks)
    /// Interrupt enable
    pub const EIE: u8 = 0x1B;
    /// Interrupt request flags
    pub const EIR: u8 = 0x1C;
    /// Status
    pub const ESTAT: u8 = 0x1D;
    /// Control 2
    pub const ECON2: u8 = 0x1E;
    /// Control 1 (bank select lives here)
    pub const ECON1: u8 = 0x1F;

    // Bank 0
    /// Buffer read pointer
    pub const ERDPTL: u8 = 0x00;
    /// Buffer write pointer
    pub const EWRPTL: u8 = 0x02;
    /// Transmit start
    pub const ETXSTL: u8 = 0x04;
    /// Transmit end
    pub const ETXNDL: u8 = 0x06;
    /// Receive ring start
    pub const ERXSTL: u8 = 0x08;
    /// Receive ring end
    pub const ERXNDL: u8 = 0x0A;
    /// Receive read pointer (hardware may not overwrite past it)
    pub const ERXRDPTL: u8 = 0x0C;
    /// Receive write pointer
    pub const ERXWRPTL: u8 = 0x0E;

    // Bank 1
    /// Receive filter control
    pub const ERXFCON: u8 = 0x18 | 0x20;
    /// Pending packet count
    pub const EPKTCNT: u8 = 0x19 | 0x20;

    // Bank 2 (MAC/MII)
    /// MAC control 1
    pub const MACON1: u8 = 0x00 | 0x40 | 0x80;
    /// MAC control 2 (reserved on rev B5+, cleared on init)
    pub const MACON2: u8 = 0x01 | 0x40 | 0x80;
    /// MAC control 3
    pub const MACON3: u8 = 0x02 | 0x40 | 0x80;
    /// Back-to-back inter-packet gap
    pub const MABBIPG: u8 = 0x04 | 0x40 | 0x80;
    /// Non-back-to-back inter-packet gap, low
    pub const MAIPGL: u8 = 0x06 | 0x40 | 0x80;
    /// Non-back-to-back inter-packet gap, high
    pub const MAIPGH: u8 = 0x07 | 0x40 | 0x80;
    /// Maximum frame length
    pub const MAMXFLL: u8 = 0x0A | 0x40 | 0x80;
    /// MII command
    pub const MICMD: u8 = 0x12 | 0x40 | 0x80;
    /// MII register address
    pub const MIREGADR: u8 = 0x14 | 0x40 | 0x80;
    /// MII write data, low
    pub const MIWRL: u8 = 0x16 | 0x40 | 0x80;
    /// MII write data, high (writing starts the transaction)
    pub const MIWRH: u8 = 0x17 | 0x40 | 0x80;
    /// MII read data, low
    pub const MIRDL: u8 = 0x18 | 0x40 | 0x80;
    /// MII read data, high
    pub const MIRDH: u8 = 0x19 | 0x40 | 0x80;

    // Bank 3
    /// MAC address byte 1
    pub const MAADR1: u8 = 0x00 | 0x60 | 0x80;
    /// MAC address byte 0
    pub const MAADR0: u8 = 0x01 | 0x60 | 0x80;
    /// MAC address byte 3
    pub const MAADR3: u8 = 0x02 | 0x60 | 0x80;
    /// MAC address byte 2
    pub const MAADR2: u8 = 0x03 | 0x60 | 0x80;
    /// MAC address byte 5
    pub const MAADR5: u8 = 0x04 | 0x60 | 0x80;
    /// MAC address byte 4
    pub const MAADR4: u8 = 0x05 | 0x60 | 0x80;
    /// MII status
    pub const MISTAT: u8 = 0x0A | 0x60 | 0x80;
    /// Silicon revision
    pub const EREVID: u8 = 0x12 | 0x60;

    /// MAC address registers in wire order (first octet first)
    pub const MAADR: [u8; 6] = [MAADR5, MAADR4, MAADR3, MAADR2, MAADR1, MAADR0];
}

// =============================================================================
// Common Register Bits
// =============================================================================

/// ECON1 bits
pub mod econ1 {
    /// Transmit logic reset
    pub const TXRST: u8 = 0x80;
    /// Receive logic reset
    pub const RXRST: u8 = 0x40;
    /// Transmit request to send
    pub const TXRTS: u8 = 0x08;
    /// Receive enable
    pub const RXEN: u8 = 0x04;
    /// Bank select mask
    pub const BSEL: u8 = 0x03;
}

/// ECON2 bits
pub mod econ2 {
    /// Automatic buffer pointer increment
    pub const AUTOINC: u8 = 0x80;
    /// Decrement the pending packet counter
    pub const PKTDEC: u8 = 0x40;
}

/// EIR bits
pub mod eir {
    /// Receive packet pending
    pub const PKTIF: u8 = 0x40;
    /// Transmit complete
    pub const TXIF: u8 = 0x08;
    /// Transmit error
    pub const TXERIF: u8 = 0x02;
    /// Receive error (buffer overflow)
    pub const RXERIF: u8 = 0x01;
}

/// ESTAT bits
pub mod estat {
    /// Oscillator start-up timer expired
    pub const CLKRDY: u8 = 0x01;
    /// Transmit aborted
    pub const TXABRT: u8 = 0x02;
}

// =============================================================================
// Bank Register Bits
// =============================================================================

/// ERXFCON bits
pub mod erxfcon {
    /// Accept unicast frames addressed to us
    pub const UCEN: u8 = 0x80;
    /// Drop frames with an invalid CRC
    pub const CRCEN: u8 = 0x20;
    /// Accept broadcast frames
    pub const BCEN: u8 = 0x01;
}

/// MACON1 bits
pub mod macon1 {
    /// Transmit pause frames
    pub const TXPAUS: u8 = 0x08;
    /// Honor received pause frames
    pub const RXPAUS: u8 = 0x04;
    /// MAC receive enable
    pub const MARXEN: u8 = 0x01;
}

/// MACON3 bits
pub mod macon3 {
    /// Pad short frames to 60 bytes
    pub const PADCFG0: u8 = 0x20;
    /// Append CRC on transmit
    pub const TXCRCEN: u8 = 0x10;
    /// Frame length checking
    pub const FRMLNEN: u8 = 0x02;
    /// Full duplex
    pub const FULDPX: u8 = 0x01;
}

/// MICMD bits
pub mod micmd {
    /// Start a PHY register read
    pub const MIIRD: u8 = 0x01;
}

/// MISTAT bits
pub mod mistat {
    /// MII operation in progress
    pub const BUSY: u8 = 0x01;
}

/// Receive status vector bits (byte 2 of the per-packet header)
pub mod rsv {
    /// Packet received OK
    pub const RECEIVED_OK: u16 = 0x0080;
}

/// Inter-packet gap values for full duplex
pub mod ipg {
    /// Back-to-back gap
    pub const BACK_TO_BACK: u8 = 0x15;
    /// Non-back-to-back gap, low byte
    pub const NON_BACK_TO_BACK_LOW: u8 = 0x12;
    /// Non-back-to-back gap, high byte
    pub const NON_BACK_TO_BACK_HIGH: u8 = 0x0C;
}

// =============================================================================
// PHY Registers
// =============================================================================

/// PHY register addresses and bits (accessed through MII)
pub mod phy {
    /// PHY control 1
    pub const PHCON1: u8 = 0x00;
    /// PHY status 1
    pub const PHSTAT1: u8 = 0x01;
    /// PHY identifier 1
    pub const PHID1: u8 = 0x02;
    /// PHY identifier 2
    pub const PHID2: u8 = 0x03;
    /// PHY control 2
    pub const PHCON2: u8 = 0x10;
    /// PHY status 2
    pub const PHSTAT2: u8 = 0x11;
    /// LED configuration
    pub const PHLCON: u8 = 0x14;

    /// PHCON1: full duplex
    pub const PHCON1_PDPXMD: u16 = 0x0100;
    /// PHCON2: half-duplex loopback disable
    pub const PHCON2_HDLDIS: u16 = 0x0100;
    /// PHSTAT1: latching link status
    pub const PHSTAT1_LLSTAT: u16 = 0x0004;
    /// PHSTAT2: current link status
    pub const PHSTAT2_LSTAT: u16 = 0x0400;

    /// LED A: link status and receive activity, LED B: transmit/receive
    /// activity, stretched pulses
    pub const PHLCON_LEDS: u16 = 0x0400 | 0x0040 | 0x0020 | 0x0010 | 0x0004 | 0x0002;

    /// PHID1 value of every ENC28J60
    pub const ID1: u16 = 0x0083;
}
