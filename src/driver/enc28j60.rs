//! ENC28J60 Driver
//!
//! SPI driver for the Microchip ENC28J60. The controller keeps an 8 KB
//! buffer memory split into a receive ring and a single transmit slot:
//!
//! ```text
//! 0x0000 ┌────────────────────┐
//!        │ RX ring            │  hardware writes, ERXRDPT guards
//! 0x19FF ├────────────────────┤
//! 0x1A00 │ TX control + frame │  one frame in flight
//! 0x1FFF └────────────────────┘
//! ```
//!
//! Every received packet in the ring is preceded by a 6-byte header: the
//! little-endian pointer to the next packet, the byte count (CRC included)
//! and the receive status vector.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::device::EthernetDevice;
use crate::error::{ConfigError, IoError, IoResult, Result};
use crate::internal::constants::{
    BUFFER_END, CRC_SIZE, MAX_FRAME_LEN, MII_BUSY_TIMEOUT, MII_POLL_INTERVAL_US, RESET_DELAY_US,
    RX_END, RX_START, TX_RESET_ATTEMPTS, TX_START, TX_WAIT_POLLS,
};
use crate::internal::enc28j60_regs::{
    ADDR_MASK, MAC_MII_FLAG, bank_of, econ1, econ2, eir, erxfcon, estat, ipg, is_common, macon1,
    macon3, micmd, mistat, opcode, phy, reg, rsv,
};
use crate::wire::MacAddress;

/// Polls of ESTAT.CLKRDY after a reset before giving up
const CLKRDY_POLLS: u32 = 100;

/// Per-packet header in the receive ring
const RX_HEADER_LEN: usize = 6;

/// ERXRDPT value releasing everything before `next`
///
/// Errata: the pointer must be odd, so it trails the next packet by one
/// byte and wraps to the end of the ring.
#[inline(always)]
const fn rx_read_pointer(next: u16) -> u16 {
    if next == RX_START { RX_END } else { next - 1 }
}

// =============================================================================
// Driver
// =============================================================================

/// ENC28J60 Ethernet controller on an SPI bus
///
/// # Type Parameters
///
/// * `SPI` - SPI device with the controller's chip select
/// * `D` - Delay provider for the reset and MII waits
///
/// # Example
///
/// ```ignore
/// use ph_enc28j60_lan::{Enc28j60, Lan, LanConfig};
///
/// let device = Enc28j60::new(spi_device, delay);
/// let mut lan: Lan<_, _> = Lan::new(device, handler, LanConfig::new());
/// lan.init(now)?;
/// ```
#[derive(Debug)]
pub struct Enc28j60<SPI, D> {
    spi: SPI,
    delay: D,
    /// Currently selected register bank
    bank: u8,
    /// Ring address of the next unread packet
    next_packet: u16,
}

impl<SPI: SpiDevice, D: DelayNs> Enc28j60<SPI, D> {
    /// Create a driver; the controller is untouched until `init`
    #[must_use]
    pub const fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            bank: 0,
            next_packet: RX_START,
        }
    }

    /// Give back the SPI device and delay provider
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    // =========================================================================
    // SPI Primitives
    // =========================================================================

    fn read_op(&mut self, op: u8, addr: u8) -> IoResult<u8> {
        let mut frame = [op | (addr & ADDR_MASK), 0, 0];
        // MAC and MII registers shift out a dummy byte first
        let len = if addr & MAC_MII_FLAG != 0 { 3 } else { 2 };
        self.spi
            .transfer_in_place(&mut frame[..len])
            .map_err(|_| IoError::Spi)?;
        Ok(frame[len - 1])
    }

    fn write_op(&mut self, op: u8, addr: u8, data: u8) -> IoResult<()> {
        self.spi
            .write(&[op | (addr & ADDR_MASK), data])
            .map_err(|_| IoError::Spi)
    }

    fn select_bank(&mut self, addr: u8) -> IoResult<()> {
        if is_common(addr) {
            return Ok(());
        }
        let bank = bank_of(addr);
        if bank != self.bank {
            self.write_op(opcode::BFC, reg::ECON1, econ1::BSEL)?;
            self.write_op(opcode::BFS, reg::ECON1, bank)?;
            self.bank = bank;
        }
        Ok(())
    }

    fn read_reg(&mut self, addr: u8) -> IoResult<u8> {
        self.select_bank(addr)?;
        self.read_op(opcode::RCR, addr)
    }

    fn read_reg16(&mut self, addr: u8) -> IoResult<u16> {
        let low = self.read_reg(addr)?;
        let high = self.read_reg(addr + 1)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    fn write_reg(&mut self, addr: u8, value: u8) -> IoResult<()> {
        self.select_bank(addr)?;
        self.write_op(opcode::WCR, addr, value)
    }

    fn write_reg16(&mut self, addr: u8, value: u16) -> IoResult<()> {
        let [low, high] = value.to_le_bytes();
        self.write_reg(addr, low)?;
        self.write_reg(addr + 1, high)
    }

    /// Set bits of an ETH register (not valid on MAC/MII registers)
    fn bit_set(&mut self, addr: u8, mask: u8) -> IoResult<()> {
        self.select_bank(addr)?;
        self.write_op(opcode::BFS, addr, mask)
    }

    fn bit_clear(&mut self, addr: u8, mask: u8) -> IoResult<()> {
        self.select_bank(addr)?;
        self.write_op(opcode::BFC, addr, mask)
    }

    /// Read buffer memory at ERDPT (auto-incrementing, wraps within the ring)
    fn read_buffer(&mut self, buf: &mut [u8]) -> IoResult<()> {
        self.spi
            .transaction(&mut [Operation::Write(&[opcode::RBM]), Operation::Read(buf)])
            .map_err(|_| IoError::Spi)
    }

    /// Write a per-packet control byte and `frame` at EWRPT
    fn write_tx_buffer(&mut self, frame: &[u8]) -> IoResult<()> {
        // Control byte 0x00: use the MACON3 settings for padding and CRC
        self.spi
            .transaction(&mut [
                Operation::Write(&[opcode::WBM, 0x00]),
                Operation::Write(frame),
            ])
            .map_err(|_| IoError::Spi)
    }

    // =========================================================================
    // PHY Access
    // =========================================================================

    fn wait_mii(&mut self) -> IoResult<()> {
        for _ in 0..MII_BUSY_TIMEOUT {
            if self.read_reg(reg::MISTAT)? & mistat::BUSY == 0 {
                return Ok(());
            }
            self.delay.delay_us(MII_POLL_INTERVAL_US);
        }
        Err(IoError::Timeout)
    }

    /// Read a PHY register through the MII interface
    ///
    /// # Errors
    /// - `Timeout` - MII stayed busy
    /// - `Spi` - bus failure
    pub fn read_phy(&mut self, addr: u8) -> IoResult<u16> {
        self.write_reg(reg::MIREGADR, addr)?;
        self.write_reg(reg::MICMD, micmd::MIIRD)?;
        self.wait_mii()?;
        self.write_reg(reg::MICMD, 0)?;
        self.read_reg16(reg::MIRDL)
    }

    /// Write a PHY register through the MII interface
    ///
    /// # Errors
    /// - `Timeout` - MII stayed busy
    /// - `Spi` - bus failure
    pub fn write_phy(&mut self, addr: u8, value: u16) -> IoResult<()> {
        self.write_reg(reg::MIREGADR, addr)?;
        // Writing MIWRH starts the transaction
        self.write_reg16(reg::MIWRL, value)?;
        self.wait_mii()
    }

    /// Current link state from PHSTAT2
    pub fn is_link_up(&mut self) -> IoResult<bool> {
        Ok(self.read_phy(phy::PHSTAT2)? & phy::PHSTAT2_LSTAT != 0)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Number of packets waiting in the receive ring
    pub fn pending_packets(&mut self) -> IoResult<u8> {
        self.read_reg(reg::EPKTCNT)
    }

    /// Silicon revision (EREVID)
    pub fn revision(&mut self) -> IoResult<u8> {
        self.read_reg(reg::EREVID)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    fn soft_reset(&mut self) -> Result<()> {
        self.spi.write(&[opcode::SC]).map_err(|_| IoError::Spi)?;
        // Reset clears ECON1, and with it the bank selection
        self.bank = 0;
        self.delay.delay_us(RESET_DELAY_US);

        for _ in 0..CLKRDY_POLLS {
            if self.read_reg(reg::ESTAT)? & estat::CLKRDY != 0 {
                return Ok(());
            }
            self.delay.delay_us(RESET_DELAY_US);
        }
        Err(ConfigError::ResetFailed.into())
    }

    fn configure(&mut self, mac: MacAddress) -> IoResult<()> {
        // Buffer layout
        self.next_packet = RX_START;
        self.write_reg16(reg::ERXSTL, RX_START)?;
        self.write_reg16(reg::ERXRDPTL, rx_read_pointer(RX_START))?;
        self.write_reg16(reg::ERXNDL, RX_END)?;
        self.write_reg16(reg::ETXSTL, TX_START)?;

        // MAC: flow control, padding with CRC, full duplex
        self.write_reg(reg::MACON1, macon1::TXPAUS | macon1::RXPAUS | macon1::MARXEN)?;
        self.write_reg(reg::MACON2, 0)?;
        self.write_reg(
            reg::MACON3,
            macon3::PADCFG0 | macon3::TXCRCEN | macon3::FRMLNEN | macon3::FULDPX,
        )?;
        self.write_reg16(reg::MAMXFLL, MAX_FRAME_LEN)?;
        self.write_reg(reg::MABBIPG, ipg::BACK_TO_BACK)?;
        self.write_reg(reg::MAIPGL, ipg::NON_BACK_TO_BACK_LOW)?;
        self.write_reg(reg::MAIPGH, ipg::NON_BACK_TO_BACK_HIGH)?;

        for (addr, octet) in reg::MAADR.into_iter().zip(mac.octets()) {
            self.write_reg(addr, octet)?;
        }

        self.write_reg(reg::ERXFCON, erxfcon::UCEN | erxfcon::CRCEN | erxfcon::BCEN)?;

        // PHY: full duplex to match the MAC, no half-duplex loopback
        self.write_phy(phy::PHCON1, phy::PHCON1_PDPXMD)?;
        self.write_phy(phy::PHCON2, phy::PHCON2_HDLDIS)?;
        self.write_phy(phy::PHLCON, phy::PHLCON_LEDS)?;

        self.bit_set(reg::ECON1, econ1::RXEN)
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Wait for the previous frame to leave, resetting stuck TX logic
    ///
    /// Errata: a collision can leave TXRTS set forever with TXERIF raised.
    fn wait_tx_idle(&mut self) -> IoResult<()> {
        let mut resets = 0;
        let mut polls = 0;
        while self.read_reg(reg::ECON1)? & econ1::TXRTS != 0 {
            if self.read_reg(reg::EIR)? & eir::TXERIF != 0 {
                if resets == TX_RESET_ATTEMPTS {
                    return Err(IoError::TxAborted);
                }
                resets += 1;
                #[cfg(feature = "defmt")]
                defmt::warn!("enc28j60: TX stuck, resetting transmit logic ({})", resets);
                self.bit_set(reg::ECON1, econ1::TXRST)?;
                self.bit_clear(reg::ECON1, econ1::TXRST)?;
            } else {
                polls += 1;
                if polls >= TX_WAIT_POLLS {
                    return Err(IoError::Timeout);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// EthernetDevice Implementation
// =============================================================================

impl<SPI: SpiDevice, D: DelayNs> EthernetDevice for Enc28j60<SPI, D> {
    fn init(&mut self, mac: MacAddress) -> Result<()> {
        self.soft_reset()?;
        self.configure(mac)?;

        #[cfg(feature = "defmt")]
        if let Ok(rev) = self.revision() {
            defmt::info!("enc28j60: initialized, revision {}, mac {}", rev, mac);
        }
        Ok(())
    }

    fn send_packet(&mut self, frame: &[u8]) -> IoResult<()> {
        // Control byte plus frame must fit between TX_START and the end
        if frame.is_empty() || frame.len() > usize::from(BUFFER_END - TX_START) {
            return Err(IoError::BufferTooSmall);
        }
        self.wait_tx_idle()?;

        self.write_reg16(reg::EWRPTL, TX_START)?;
        self.write_tx_buffer(frame)?;

        // ETXND points at the last frame byte; the control byte sits at TX_START
        self.write_reg16(reg::ETXSTL, TX_START)?;
        self.write_reg16(reg::ETXNDL, TX_START + frame.len() as u16)?;
        self.bit_set(reg::ECON1, econ1::TXRTS)
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        while self.read_reg(reg::EPKTCNT)? > 0 {
            self.write_reg16(reg::ERDPTL, self.next_packet)?;

            let mut header = [0u8; RX_HEADER_LEN];
            self.read_buffer(&mut header)?;
            let next = u16::from_le_bytes([header[0], header[1]]);
            let byte_count = usize::from(u16::from_le_bytes([header[2], header[3]]));
            let status = u16::from_le_bytes([header[4], header[5]]);

            let len = if status & rsv::RECEIVED_OK != 0 {
                let len = byte_count.saturating_sub(CRC_SIZE).min(buf.len());
                self.read_buffer(&mut buf[..len])?;
                len
            } else {
                0
            };

            self.next_packet = next;
            self.write_reg16(reg::ERXRDPTL, rx_read_pointer(next))?;
            self.bit_set(reg::ECON2, econ2::PKTDEC)?;

            if len > 0 {
                return Ok(len);
            }
            #[cfg(feature = "defmt")]
            defmt::debug!("enc28j60: dropped packet, status {=u16:#x}", status);
        }
        Ok(0)
    }
}
