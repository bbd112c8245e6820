//! System configuration and compiled-in defaults
//!
//! This module defines compile-time constants for the evaluation kit demos.
//! Factory default settings, protocol timings and host link limits are centralized here.

use crate::radio::settings::{
    CodingRate, GfskCrc, LoRaBandwidth, PaSelect, PulseShape, RampTime, SpreadingFactor,
};

/// Lowest RF frequency accepted by the sub-GHz front end
pub const MIN_RF_FREQUENCY_HZ: u32 = 150_000_000;

/// Highest RF frequency accepted by the sub-GHz front end
pub const MAX_RF_FREQUENCY_HZ: u32 = 960_000_000;

/// Default RF frequency (EU868 sub-band)
pub const DEFAULT_RF_FREQUENCY_HZ: u32 = 868_200_000;

/// Default TX power in dBm
pub const DEFAULT_TX_POWER_DBM: i8 = 14;

/// Default power amplifier
pub const DEFAULT_PA: PaSelect = PaSelect::LowPower;

/// Default PA ramp time
pub const DEFAULT_RAMP_TIME: RampTime = RampTime::Us240;

/// Default payload length in bytes
pub const DEFAULT_PAYLOAD_LENGTH: u8 = 20;

/// Largest payload the radio buffer holds
pub const MAX_PAYLOAD_LENGTH: usize = 255;

/// Default number of packets for the PER demos
pub const DEFAULT_NB_OF_PACKETS: u32 = 10;

/// Receive timeout value meaning "no chip-side timeout"
pub const RX_TIMEOUT_NONE: u32 = 0xFFFF_FFFF;

/// Transmit timeout value meaning "no chip-side timeout"
pub const TX_TIMEOUT_NONE: u32 = 0xFFFF_FFFF;

pub mod lora {
    //! LoRa modulation defaults

    use super::{CodingRate, LoRaBandwidth, SpreadingFactor};

    /// Default spreading factor
    pub const SPREADING_FACTOR: SpreadingFactor = SpreadingFactor::Sf7;

    /// Default bandwidth
    pub const BANDWIDTH: LoRaBandwidth = LoRaBandwidth::Khz250;

    /// Default coding rate
    pub const CODING_RATE: CodingRate = CodingRate::Cr4_5;

    /// Preamble length in symbols
    pub const PREAMBLE_SYMBOLS: u16 = 8;

    /// Payload CRC enabled
    pub const CRC_ON: bool = true;

    /// Implicit (fixed-length) header
    pub const IMPLICIT_HEADER: bool = false;

    /// Inverted IQ
    pub const INVERT_IQ: bool = false;
}

pub mod gfsk {
    //! GFSK modulation defaults

    use super::{GfskCrc, PulseShape};

    /// Bit rate in bits per second
    pub const BITRATE_BPS: u32 = 150_000;

    /// Frequency deviation in Hz
    pub const FDEV_HZ: u32 = 50_000;

    /// Gaussian filter
    pub const PULSE_SHAPE: PulseShape = PulseShape::Bt05;

    /// Receiver bandwidth in Hz
    pub const RX_BANDWIDTH_HZ: u32 = 312_000;

    /// CRC type
    pub const CRC: GfskCrc = GfskCrc::TwoBytes;

    /// Preamble length in bits
    pub const PREAMBLE_BITS: u16 = 16;

    /// Sync word length in bits
    pub const SYNC_WORD_BITS: u8 = 24;

    /// Lowest accepted bit rate
    pub const MIN_BITRATE_BPS: u32 = 600;

    /// Highest accepted bit rate
    pub const MAX_BITRATE_BPS: u32 = 300_000;
}

pub mod ping_pong {
    //! Ping-pong link test timing

    /// Interval between two Pings sent by the Master (`T_ping`)
    pub const PING_PERIOD_MS: u32 = 1000;

    /// Delay between Ping reception and Pong transmission (`T_ping_to_pong`)
    pub const PING_TO_PONG_MS: u32 = 400;

    /// Margin kept before the next scheduled Ping
    pub const WINDOW_GUARD_MS: u32 = 5;

    /// Master receive window, measured from Ping tx-done
    pub const PONG_WINDOW_MS: u32 = PING_PERIOD_MS - WINDOW_GUARD_MS;

    /// Slave wait for the next Ping, measured from the previous Ping reception
    pub const SLAVE_TIMEOUT_MS: u32 = 2 * (PING_PERIOD_MS - WINDOW_GUARD_MS);
}

pub mod per {
    //! Packet error rate demo timing

    /// Delay between two PER packets
    pub const INTER_PACKET_DELAY_MS: u32 = 1000;

    /// Receive window per expected packet
    pub const RX_TIMEOUT_MS: u32 = 3000;

    /// Extra time granted to the chip before the clock bound fires
    pub const TIMEOUT_MARGIN_MS: u32 = 100;
}

pub mod host {
    //! Host serial link limits

    /// Size of the frame header (command code + payload length)
    pub const HEADER_LEN: usize = 4;

    /// Largest command payload accepted from the host
    pub const MAX_PAYLOAD_LEN: usize = 256;

    /// Largest response frame sent to the host
    pub const MAX_RESPONSE_LEN: usize = 64;

    /// Maximum gap between two payload bytes
    pub const OPERAND_TIMEOUT_MS: u32 = 1000;
}
