//! Settings and Results Blobs
//!
//! Fixed-layout little-endian encodings of [`DemoConfig`] and [`DemoResults`]
//! as carried by CONFIGURE and FETCH_RESULT.
//!
//! ```text
//! radio settings (34 bytes)
//!   0  rf_frequency_hz u32    4  tx_power i8     5  pa u8
//!   6  ramp_time u8           7  packet_type u8  8  payload_length u8
//!   9  sf u8  10 bw u8  11 cr u8  12 preamble u16  14 crc 15 implicit 16 iq
//!  17  bitrate u32  21 fdev u32  25 pulse u8  26 rx_bw u32  30 crc u8
//!  31  preamble_bits u16  33 sync_word_bits u8
//! ping-pong (+16): ping_period, ping_to_pong, pong_window, slave_timeout (u32)
//! PER (+12):       nb_of_packets, inter_packet_delay, rx_timeout (u32)
//! ```

use heapless::Vec;

use crate::demo::config::{DemoConfig, PerConfig, PingPongConfig, TxCwConfig};
use crate::demo::results::DemoResults;
use crate::radio::link::PhyStats;
use crate::radio::settings::{
    CodingRate, GfskCrc, GfskParams, LoRaBandwidth, LoRaParams, PacketType, PaSelect, PulseShape,
    RadioSettings, RampTime, SpreadingFactor,
};
use crate::types::{DemoKind, ResultStatus};

use super::ProtocolError;

/// Encoded size of [`RadioSettings`]
pub const RADIO_SETTINGS_LEN: usize = 34;

/// Extra bytes after the radio settings for ping-pong
pub const PING_PONG_EXTRA_LEN: usize = 16;

/// Extra bytes after the radio settings for PER
pub const PER_EXTRA_LEN: usize = 12;

/// Largest encoded configuration, demo id included
pub const MAX_CONFIG_LEN: usize = 1 + RADIO_SETTINGS_LEN + PING_PONG_EXTRA_LEN;

/// Largest encoded results blob
pub const MAX_RESULTS_LEN: usize = 32;

/// Cursor over a received payload
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let (head, rest) = self
            .data
            .split_first_chunk::<N>()
            .ok_or(ProtocolError::InvalidPayload)?;
        self.data = rest;
        Ok(*head)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take::<1>()?[0])
    }

    fn i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    fn bool(&mut self) -> Result<bool, ProtocolError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ProtocolError::InvalidPayload),
        }
    }

    fn u16(&mut self) -> Result<u16, ProtocolError> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    fn u32(&mut self) -> Result<u32, ProtocolError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    /// Decode a one-byte enum with its `from_u8`
    fn code<T>(&mut self, decode: impl FnOnce(u8) -> Option<T>) -> Result<T, ProtocolError> {
        decode(self.u8()?).ok_or(ProtocolError::InvalidPayload)
    }

    fn finish(self) -> Result<(), ProtocolError> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::InvalidPayload)
        }
    }
}

fn read_radio_settings(reader: &mut Reader<'_>) -> Result<RadioSettings, ProtocolError> {
    Ok(RadioSettings {
        rf_frequency_hz: reader.u32()?,
        tx_power_dbm: reader.i8()?,
        pa: reader.code(PaSelect::from_u8)?,
        ramp_time: reader.code(RampTime::from_u8)?,
        packet_type: reader.code(PacketType::from_u8)?,
        payload_length: reader.u8()?,
        lora: LoRaParams {
            spreading_factor: reader.code(SpreadingFactor::from_u8)?,
            bandwidth: reader.code(LoRaBandwidth::from_u8)?,
            coding_rate: reader.code(CodingRate::from_u8)?,
            preamble_symbols: reader.u16()?,
            crc_on: reader.bool()?,
            implicit_header: reader.bool()?,
            invert_iq: reader.bool()?,
        },
        gfsk: GfskParams {
            bitrate_bps: reader.u32()?,
            fdev_hz: reader.u32()?,
            pulse_shape: reader.code(PulseShape::from_u8)?,
            rx_bandwidth_hz: reader.u32()?,
            crc: reader.code(GfskCrc::from_u8)?,
            preamble_bits: reader.u16()?,
            sync_word_bits: reader.u8()?,
        },
    })
}

/// Decode a CONFIGURE payload: demo id, radio settings, kind-specific tail
///
/// The settings are decoded but not validated.
///
/// # Errors
///
/// [`ProtocolError::UnknownDemo`] for an unknown id, or
/// [`ProtocolError::InvalidPayload`] for a wrong size or enum value.
pub fn decode_config(payload: &[u8]) -> Result<DemoConfig, ProtocolError> {
    let mut reader = Reader::new(payload);
    let id = reader.u8()?;
    let kind = DemoKind::from_id(id).ok_or(ProtocolError::UnknownDemo(id))?;
    let radio = read_radio_settings(&mut reader)?;

    let config = match kind {
        DemoKind::PingPong => DemoConfig::PingPong(PingPongConfig {
            radio,
            ping_period_ms: reader.u32()?,
            ping_to_pong_ms: reader.u32()?,
            pong_window_ms: reader.u32()?,
            slave_timeout_ms: reader.u32()?,
        }),
        DemoKind::TxCw => DemoConfig::TxCw(TxCwConfig { radio }),
        DemoKind::PerTx | DemoKind::PerRx => {
            let per = PerConfig {
                radio,
                nb_of_packets: reader.u32()?,
                inter_packet_delay_ms: reader.u32()?,
                rx_timeout_ms: reader.u32()?,
            };
            if kind == DemoKind::PerTx {
                DemoConfig::PerTx(per)
            } else {
                DemoConfig::PerRx(per)
            }
        }
    };
    reader.finish()?;
    Ok(config)
}

fn push<const N: usize>(buffer: &mut Vec<u8, N>, bytes: &[u8]) {
    // Buffers are sized for the largest blob
    let _ = buffer.extend_from_slice(bytes);
}

fn write_radio_settings<const N: usize>(buffer: &mut Vec<u8, N>, s: &RadioSettings) {
    push(buffer, &s.rf_frequency_hz.to_le_bytes());
    push(buffer, &s.tx_power_dbm.to_le_bytes());
    push(
        buffer,
        &[
            s.pa.as_u8(),
            s.ramp_time.as_u8(),
            s.packet_type.as_u8(),
            s.payload_length,
            s.lora.spreading_factor.as_u8(),
            s.lora.bandwidth.as_u8(),
            s.lora.coding_rate.as_u8(),
        ],
    );
    push(buffer, &s.lora.preamble_symbols.to_le_bytes());
    push(
        buffer,
        &[
            u8::from(s.lora.crc_on),
            u8::from(s.lora.implicit_header),
            u8::from(s.lora.invert_iq),
        ],
    );
    push(buffer, &s.gfsk.bitrate_bps.to_le_bytes());
    push(buffer, &s.gfsk.fdev_hz.to_le_bytes());
    push(buffer, &[s.gfsk.pulse_shape.as_u8()]);
    push(buffer, &s.gfsk.rx_bandwidth_hz.to_le_bytes());
    push(buffer, &[s.gfsk.crc.as_u8()]);
    push(buffer, &s.gfsk.preamble_bits.to_le_bytes());
    push(buffer, &[s.gfsk.sync_word_bits]);
}

/// Encode a CONFIGURE payload
#[must_use]
pub fn encode_config(config: &DemoConfig) -> Vec<u8, MAX_CONFIG_LEN> {
    let mut buffer = Vec::new();
    push(&mut buffer, &[config.kind().id()]);
    write_radio_settings(&mut buffer, config.radio());
    match config {
        DemoConfig::PingPong(c) => {
            let timings = [
                c.ping_period_ms,
                c.ping_to_pong_ms,
                c.pong_window_ms,
                c.slave_timeout_ms,
            ];
            for value in timings {
                push(&mut buffer, &value.to_le_bytes());
            }
        }
        DemoConfig::TxCw(_) => {}
        DemoConfig::PerTx(c) | DemoConfig::PerRx(c) => {
            for value in [c.nb_of_packets, c.inter_packet_delay_ms, c.rx_timeout_ms] {
                push(&mut buffer, &value.to_le_bytes());
            }
        }
    }
    buffer
}

fn write_counters<const N: usize>(
    buffer: &mut Vec<u8, N>,
    counters: [u32; 4],
    rssi: i8,
    stats: &PhyStats,
) {
    for value in counters {
        push(buffer, &value.to_le_bytes());
    }
    push(buffer, &rssi.to_le_bytes());
    for value in [
        stats.packets_received,
        stats.crc_errors,
        stats.header_errors,
        stats.false_syncs,
    ] {
        push(buffer, &value.to_le_bytes());
    }
}

const fn status_byte(status: ResultStatus) -> u8 {
    match status {
        ResultStatus::Ok => 0,
        ResultStatus::Error => 1,
    }
}

/// Encode a FETCH_RESULT payload
///
/// ```text
/// kind u8, status u8, then for ping-pong and PER:
///   count_tx, rx_correct, rx_wrong, rx_timeout (u32), last_rssi i8,
///   received, crc_errors, header_errors, false_syncs (u16)
/// then role u8 (ping-pong) or PER per-mille u16 (PER)
/// ```
#[must_use]
pub fn encode_results(results: &DemoResults) -> Vec<u8, MAX_RESULTS_LEN> {
    let mut buffer = Vec::new();
    push(&mut buffer, &[results.kind().id(), status_byte(results.status())]);
    match results {
        DemoResults::PingPong(r) => {
            let counters = [
                r.count_tx,
                r.count_rx_correct_packet,
                r.count_rx_wrong_packet,
                r.count_rx_timeout,
            ];
            write_counters(&mut buffer, counters, r.last_rssi_dbm, &r.stats);
            push(&mut buffer, &[r.role.as_u8()]);
        }
        DemoResults::TxCw(_) => {}
        DemoResults::PerTx(r) | DemoResults::PerRx(r) => {
            let counters = [
                r.count_tx,
                r.count_rx_correct_packet,
                r.count_rx_wrong_packet,
                r.count_rx_timeout,
            ];
            write_counters(&mut buffer, counters, r.last_rssi_dbm, &r.stats);
            let permille = u16::try_from(r.packet_error_rate_permille()).unwrap_or(u16::MAX);
            push(&mut buffer, &permille.to_le_bytes());
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radio_settings_blob_has_documented_size() {
        let mut buffer: Vec<u8, 64> = Vec::new();
        write_radio_settings(&mut buffer, &RadioSettings::default());
        assert_eq!(buffer.len(), RADIO_SETTINGS_LEN);
    }

    #[test]
    fn reader_rejects_trailing_bytes() {
        let mut reader = Reader::new(&[1, 2]);
        assert_eq!(reader.u8(), Ok(1));
        assert_eq!(reader.finish(), Err(ProtocolError::InvalidPayload));
    }
}
