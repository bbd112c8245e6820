//! Radio Link
//!
//! The transceiver seam. Chip drivers implement [`RadioLink`]; demos only ever
//! talk to the radio through it.

use core::ops::{BitAnd, BitOr, BitOrAssign};

use super::payload::Payload;
use super::settings::RadioSettings;

/// Failure reported by a radio operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum RadioError {
    /// The chip refused the parameter set or command
    Rejected,
    /// The chip stayed busy past the command deadline
    Busy,
    /// Transport (SPI) failure
    Bus,
}

/// Chip interrupt flags
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqMask(u32);

impl IrqMask {
    /// No interrupt
    pub const NONE: Self = Self(0);
    /// Transmission finished
    pub const TX_DONE: Self = Self(1 << 2);
    /// Packet received
    pub const RX_DONE: Self = Self(1 << 3);
    /// Preamble detected
    pub const PREAMBLE_DETECTED: Self = Self(1 << 4);
    /// Sync word or LoRa header valid
    pub const SYNC_WORD_HEADER_VALID: Self = Self(1 << 5);
    /// LoRa header CRC error
    pub const HEADER_ERROR: Self = Self(1 << 6);
    /// Payload CRC error
    pub const CRC_ERROR: Self = Self(1 << 7);
    /// Channel activity detection finished
    pub const CAD_DONE: Self = Self(1 << 8);
    /// Channel activity detected
    pub const CAD_DETECTED: Self = Self(1 << 9);
    /// RX or TX timeout
    pub const TIMEOUT: Self = Self(1 << 10);
    /// Every flag the demos consume
    pub const ALL: Self = Self(0x0000_07FC);

    /// Build from raw register bits
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw register bits
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag of `other` is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Whether any flag of `other` is set
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no flag is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the packet failed its integrity checks
    #[must_use]
    pub const fn is_rx_error(self) -> bool {
        self.intersects(Self(Self::CRC_ERROR.0 | Self::HEADER_ERROR.0))
    }
}

impl BitOr for IrqMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for IrqMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for IrqMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl core::fmt::Debug for IrqMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "IrqMask({:#06x})", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for IrqMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "IrqMask({=u32:#x})", self.0);
    }
}

/// Result of the last chip command, from the status register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum CommandStatus {
    /// Command failed
    Fail,
    /// Command had a parameter error
    ParameterError,
    /// Command succeeded
    #[default]
    Ok,
    /// Command succeeded and returned data
    Data,
}

/// Status registers returned with the interrupt flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct ChipStatus {
    /// First status byte
    pub stat1: u8,
    /// Second status byte
    pub stat2: u8,
}

impl ChipStatus {
    /// Decode the command status bits of `stat1`
    #[must_use]
    pub const fn command_status(self) -> CommandStatus {
        match (self.stat1 >> 1) & 0x07 {
            0 => CommandStatus::Fail,
            1 => CommandStatus::ParameterError,
            3 => CommandStatus::Data,
            _ => CommandStatus::Ok,
        }
    }

    /// Whether the chip still has an interrupt pending
    #[must_use]
    pub const fn irq_pending(self) -> bool {
        self.stat1 & 0x01 != 0
    }
}

/// Packet counters kept by the chip
///
/// GFSK length errors are reported as header errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PhyStats {
    /// Packets received
    pub packets_received: u16,
    /// Packets with a payload CRC error
    pub crc_errors: u16,
    /// Packets with a header (or length) error
    pub header_errors: u16,
    /// LoRa false synchronizations
    pub false_syncs: u16,
}

/// A packet pulled out of the radio buffer
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ReceivedPacket {
    /// Payload bytes
    pub payload: Payload,
    /// Signal strength of the packet in dBm
    pub rssi_dbm: i8,
}

/// Transceiver driver interface
///
/// Operations start work on the chip and return immediately; completion is
/// signaled through the interrupt line and read back with
/// [`read_status_and_irq`](Self::read_status_and_irq).
pub trait RadioLink {
    /// Apply a PHY parameter set
    ///
    /// # Errors
    ///
    /// [`RadioError::Rejected`] when the chip refuses the settings.
    fn configure(&mut self, settings: &RadioSettings) -> Result<(), RadioError>;

    /// Start sending `payload`
    ///
    /// # Errors
    ///
    /// Any [`RadioError`] reported by the chip.
    fn transmit(&mut self, payload: &[u8], timeout_ms: u32) -> Result<(), RadioError>;

    /// Start an unmodulated carrier
    ///
    /// # Errors
    ///
    /// Any [`RadioError`] reported by the chip.
    fn transmit_continuous_wave(&mut self) -> Result<(), RadioError>;

    /// Open a single receive window
    ///
    /// The radio returns to standby after `RX_DONE`, a packet error or `TIMEOUT`.
    ///
    /// # Errors
    ///
    /// Any [`RadioError`] reported by the chip.
    fn receive(&mut self, timeout_ms: u32) -> Result<(), RadioError>;

    /// Read the status registers and the pending interrupt flags
    ///
    /// # Errors
    ///
    /// Any [`RadioError`] reported by the chip.
    fn read_status_and_irq(&mut self) -> Result<(ChipStatus, IrqMask), RadioError>;

    /// Acknowledge interrupt flags
    fn clear_irq(&mut self, mask: IrqMask);

    /// Fetch the last received packet and its RSSI
    ///
    /// # Errors
    ///
    /// Any [`RadioError`] reported by the chip.
    fn read_packet(&mut self) -> Result<ReceivedPacket, RadioError>;

    /// Read the chip packet counters
    ///
    /// # Errors
    ///
    /// Any [`RadioError`] reported by the chip.
    fn read_stats(&mut self) -> Result<PhyStats, RadioError>;

    /// Zero the chip packet counters
    fn reset_stats(&mut self);

    /// Abort any operation and idle the radio
    fn standby(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_mask_queries() {
        let mask = IrqMask::RX_DONE | IrqMask::CRC_ERROR;
        assert!(mask.contains(IrqMask::RX_DONE));
        assert!(!mask.contains(IrqMask::TX_DONE));
        assert!(mask.is_rx_error());
        assert!(!IrqMask::NONE.contains(IrqMask::NONE));
        assert!(IrqMask::ALL.contains(IrqMask::TIMEOUT | IrqMask::TX_DONE));
    }

    #[test]
    fn chip_status_decoding() {
        let status = ChipStatus { stat1: 0b0000_0101, stat2: 0 };
        assert_eq!(status.command_status(), CommandStatus::Ok);
        assert!(status.irq_pending());
        assert_eq!(ChipStatus { stat1: 0, stat2: 0 }.command_status(), CommandStatus::Fail);
    }
}
