//! PHY Settings
//!
//! Parameter sets handed to [`RadioLink::configure`](super::link::RadioLink::configure).
//! Every enum carries its chip encoding so settings travel as plain value blobs.

use crate::config::{self, gfsk, lora, MAX_PAYLOAD_LENGTH};
use crate::demo::config::ConfigError;
use crate::types::RfFrequency;

/// Packet engine used for the demo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum PacketType {
    /// LoRa chirp spread spectrum
    #[default]
    LoRa,
    /// Gaussian frequency shift keying
    Gfsk,
}

impl PacketType {
    /// Wire encoding
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Gfsk => 0x01,
            Self::LoRa => 0x02,
        }
    }

    /// Decode from the wire encoding
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Gfsk),
            0x02 => Some(Self::LoRa),
            _ => None,
        }
    }
}

/// Power amplifier path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum PaSelect {
    /// Low-power PA, up to +15 dBm
    #[default]
    LowPower,
    /// High-power PA, up to +22 dBm
    HighPower,
}

impl PaSelect {
    /// Accepted TX power range in dBm
    #[must_use]
    pub const fn power_range_dbm(self) -> (i8, i8) {
        match self {
            Self::LowPower => (-17, 15),
            Self::HighPower => (-9, 22),
        }
    }

    /// Wire encoding
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::LowPower => 0x00,
            Self::HighPower => 0x01,
        }
    }

    /// Decode from the wire encoding
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::LowPower),
            0x01 => Some(Self::HighPower),
            _ => None,
        }
    }
}

/// PA ramp time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum RampTime {
    Us16,
    Us32,
    Us48,
    Us64,
    Us80,
    Us96,
    Us112,
    Us128,
    Us144,
    Us160,
    Us176,
    Us192,
    Us208,
    #[default]
    Us240,
    Us272,
    Us304,
}

impl RampTime {
    const TABLE: [Self; 16] = [
        Self::Us16,
        Self::Us32,
        Self::Us48,
        Self::Us64,
        Self::Us80,
        Self::Us96,
        Self::Us112,
        Self::Us128,
        Self::Us144,
        Self::Us160,
        Self::Us176,
        Self::Us192,
        Self::Us208,
        Self::Us240,
        Self::Us272,
        Self::Us304,
    ];

    /// Ramp duration in microseconds
    #[must_use]
    pub const fn as_us(self) -> u16 {
        match self {
            Self::Us16 => 16,
            Self::Us32 => 32,
            Self::Us48 => 48,
            Self::Us64 => 64,
            Self::Us80 => 80,
            Self::Us96 => 96,
            Self::Us112 => 112,
            Self::Us128 => 128,
            Self::Us144 => 144,
            Self::Us160 => 160,
            Self::Us176 => 176,
            Self::Us192 => 192,
            Self::Us208 => 208,
            Self::Us240 => 240,
            Self::Us272 => 272,
            Self::Us304 => 304,
        }
    }

    /// Wire encoding (chip register value)
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode from the wire encoding
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::TABLE.get(usize::from(value)).copied()
    }
}

/// LoRa spreading factor
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum SpreadingFactor {
    Sf5,
    Sf6,
    #[default]
    Sf7,
    Sf8,
    Sf9,
    Sf10,
    Sf11,
    Sf12,
}

impl SpreadingFactor {
    /// Numeric spreading factor (chip encoding)
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Sf5 => 5,
            Self::Sf6 => 6,
            Self::Sf7 => 7,
            Self::Sf8 => 8,
            Self::Sf9 => 9,
            Self::Sf10 => 10,
            Self::Sf11 => 11,
            Self::Sf12 => 12,
        }
    }

    /// Decode from the numeric spreading factor
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            5 => Some(Self::Sf5),
            6 => Some(Self::Sf6),
            7 => Some(Self::Sf7),
            8 => Some(Self::Sf8),
            9 => Some(Self::Sf9),
            10 => Some(Self::Sf10),
            11 => Some(Self::Sf11),
            12 => Some(Self::Sf12),
            _ => None,
        }
    }
}

/// LoRa bandwidth
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum LoRaBandwidth {
    /// 62.5 kHz
    Khz62,
    /// 125 kHz
    Khz125,
    /// 250 kHz
    #[default]
    Khz250,
    /// 500 kHz
    Khz500,
}

impl LoRaBandwidth {
    /// Bandwidth in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        match self {
            Self::Khz62 => 62_500,
            Self::Khz125 => 125_000,
            Self::Khz250 => 250_000,
            Self::Khz500 => 500_000,
        }
    }

    /// Chip encoding
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Khz62 => 0x03,
            Self::Khz125 => 0x04,
            Self::Khz250 => 0x05,
            Self::Khz500 => 0x06,
        }
    }

    /// Decode from the chip encoding
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(Self::Khz62),
            0x04 => Some(Self::Khz125),
            0x05 => Some(Self::Khz250),
            0x06 => Some(Self::Khz500),
            _ => None,
        }
    }
}

/// LoRa forward error correction rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum CodingRate {
    #[default]
    Cr4_5,
    Cr4_6,
    Cr4_7,
    Cr4_8,
}

impl CodingRate {
    /// Chip encoding
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Cr4_5 => 0x01,
            Self::Cr4_6 => 0x02,
            Self::Cr4_7 => 0x03,
            Self::Cr4_8 => 0x04,
        }
    }

    /// Decode from the chip encoding
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Cr4_5),
            0x02 => Some(Self::Cr4_6),
            0x03 => Some(Self::Cr4_7),
            0x04 => Some(Self::Cr4_8),
            _ => None,
        }
    }
}

/// GFSK Gaussian filter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum PulseShape {
    Off,
    Bt03,
    #[default]
    Bt05,
    Bt07,
    Bt1,
}

impl PulseShape {
    /// Chip encoding
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::Bt03 => 0x08,
            Self::Bt05 => 0x09,
            Self::Bt07 => 0x0A,
            Self::Bt1 => 0x0B,
        }
    }

    /// Decode from the chip encoding
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Off),
            0x08 => Some(Self::Bt03),
            0x09 => Some(Self::Bt05),
            0x0A => Some(Self::Bt07),
            0x0B => Some(Self::Bt1),
            _ => None,
        }
    }
}

/// GFSK CRC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum GfskCrc {
    Off,
    OneByte,
    #[default]
    TwoBytes,
    OneByteInverted,
    TwoBytesInverted,
}

impl GfskCrc {
    /// Chip encoding
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Off => 0x01,
            Self::OneByte => 0x00,
            Self::TwoBytes => 0x02,
            Self::OneByteInverted => 0x04,
            Self::TwoBytesInverted => 0x06,
        }
    }

    /// Decode from the chip encoding
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Off),
            0x00 => Some(Self::OneByte),
            0x02 => Some(Self::TwoBytes),
            0x04 => Some(Self::OneByteInverted),
            0x06 => Some(Self::TwoBytesInverted),
            _ => None,
        }
    }
}

/// LoRa modulation and packet parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct LoRaParams {
    /// Spreading factor
    pub spreading_factor: SpreadingFactor,
    /// Bandwidth
    pub bandwidth: LoRaBandwidth,
    /// Coding rate
    pub coding_rate: CodingRate,
    /// Preamble length in symbols
    pub preamble_symbols: u16,
    /// Payload CRC enabled
    pub crc_on: bool,
    /// Fixed-length header
    pub implicit_header: bool,
    /// Inverted IQ
    pub invert_iq: bool,
}

impl LoRaParams {
    fn validate(&self) -> Result<(), ConfigError> {
        // SF5/SF6 need at least 12 preamble symbols to lock
        let min_preamble = if self.spreading_factor <= SpreadingFactor::Sf6 { 12 } else { 1 };
        if self.preamble_symbols < min_preamble {
            return Err(ConfigError::InvalidLoRa);
        }
        Ok(())
    }
}

impl Default for LoRaParams {
    fn default() -> Self {
        Self {
            spreading_factor: lora::SPREADING_FACTOR,
            bandwidth: lora::BANDWIDTH,
            coding_rate: lora::CODING_RATE,
            preamble_symbols: lora::PREAMBLE_SYMBOLS,
            crc_on: lora::CRC_ON,
            implicit_header: lora::IMPLICIT_HEADER,
            invert_iq: lora::INVERT_IQ,
        }
    }
}

/// GFSK modulation and packet parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct GfskParams {
    /// Bit rate in bits per second
    pub bitrate_bps: u32,
    /// Frequency deviation in Hz
    pub fdev_hz: u32,
    /// Gaussian filter
    pub pulse_shape: PulseShape,
    /// Receiver bandwidth in Hz
    pub rx_bandwidth_hz: u32,
    /// CRC type
    pub crc: GfskCrc,
    /// Preamble length in bits
    pub preamble_bits: u16,
    /// Sync word length in bits
    pub sync_word_bits: u8,
}

impl GfskParams {
    fn validate(&self) -> Result<(), ConfigError> {
        let bitrate_ok =
            self.bitrate_bps >= gfsk::MIN_BITRATE_BPS && self.bitrate_bps <= gfsk::MAX_BITRATE_BPS;
        // Carson's rule: the receiver must fit both sidebands
        let bandwidth_ok =
            self.rx_bandwidth_hz >= self.fdev_hz.saturating_mul(2).saturating_add(self.bitrate_bps);
        if !bitrate_ok
            || self.fdev_hz == 0
            || !bandwidth_ok
            || self.preamble_bits < 8
            || self.sync_word_bits > 64
            || self.sync_word_bits % 8 != 0
        {
            return Err(ConfigError::InvalidGfsk);
        }
        Ok(())
    }
}

impl Default for GfskParams {
    fn default() -> Self {
        Self {
            bitrate_bps: gfsk::BITRATE_BPS,
            fdev_hz: gfsk::FDEV_HZ,
            pulse_shape: gfsk::PULSE_SHAPE,
            rx_bandwidth_hz: gfsk::RX_BANDWIDTH_HZ,
            crc: gfsk::CRC,
            preamble_bits: gfsk::PREAMBLE_BITS,
            sync_word_bits: gfsk::SYNC_WORD_BITS,
        }
    }
}

/// Complete PHY configuration for one demo
///
/// Both modulation blocks are always present; `packet_type` selects the one applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct RadioSettings {
    /// Carrier frequency in Hz
    pub rf_frequency_hz: u32,
    /// TX power in dBm
    pub tx_power_dbm: i8,
    /// Power amplifier path
    pub pa: PaSelect,
    /// PA ramp time
    pub ramp_time: RampTime,
    /// Packet engine
    pub packet_type: PacketType,
    /// Payload length in bytes
    pub payload_length: u8,
    /// LoRa parameters
    pub lora: LoRaParams,
    /// GFSK parameters
    pub gfsk: GfskParams,
}

impl RadioSettings {
    /// Validated carrier frequency
    #[must_use]
    pub const fn rf_frequency(&self) -> Option<RfFrequency> {
        RfFrequency::from_hz(self.rf_frequency_hz)
    }

    /// Payload length as a buffer size
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.payload_length as usize
    }

    /// Check every field against the chip limits
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rf_frequency().is_none() {
            return Err(ConfigError::FrequencyOutOfRange(self.rf_frequency_hz));
        }
        let (min_dbm, max_dbm) = self.pa.power_range_dbm();
        if self.tx_power_dbm < min_dbm || self.tx_power_dbm > max_dbm {
            return Err(ConfigError::TxPowerOutOfRange(self.tx_power_dbm));
        }
        if self.payload_length == 0 || self.payload_len() > MAX_PAYLOAD_LENGTH {
            return Err(ConfigError::InvalidPayloadLength(self.payload_length));
        }
        match self.packet_type {
            PacketType::LoRa => self.lora.validate(),
            PacketType::Gfsk => self.gfsk.validate(),
        }
    }
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            rf_frequency_hz: config::DEFAULT_RF_FREQUENCY_HZ,
            tx_power_dbm: config::DEFAULT_TX_POWER_DBM,
            pa: config::DEFAULT_PA,
            ramp_time: config::DEFAULT_RAMP_TIME,
            packet_type: PacketType::LoRa,
            payload_length: config::DEFAULT_PAYLOAD_LENGTH,
            lora: LoRaParams::default(),
            gfsk: GfskParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_time_encoding_matches_table() {
        for code in 0..16u8 {
            let ramp = RampTime::from_u8(code).unwrap();
            assert_eq!(ramp.as_u8(), code);
        }
        assert_eq!(RampTime::from_u8(16), None);
        assert_eq!(RampTime::Us240.as_u8(), 13);
    }

    #[test]
    fn default_gfsk_fits_receiver_bandwidth() {
        assert!(GfskParams::default().validate().is_ok());
    }
}
