//! Configuration and Constants Tests
//!
//! Tests to verify configuration values are valid and consistent, and that
//! demo settings are validated before use.
//! Run with: cargo test --test config_tests

use lr1110_demo::config::*;
use lr1110_demo::demo::config::{
    ConfigError, DemoConfig, DemoConfigs, PerConfig, PingPongConfig, TxCwConfig,
};
use lr1110_demo::radio::settings::{
    GfskCrc, PacketType, PaSelect, RadioSettings, RampTime, SpreadingFactor,
};
use lr1110_demo::types::DemoKind;

// =============================================================================
// Radio Defaults
// =============================================================================

#[test]
fn default_frequency_in_band() {
    assert!(RadioSettings::default().rf_frequency().is_some());
    assert!(DEFAULT_RF_FREQUENCY_HZ >= MIN_RF_FREQUENCY_HZ);
    assert!(DEFAULT_RF_FREQUENCY_HZ <= MAX_RF_FREQUENCY_HZ);
}

#[test]
fn default_power_fits_default_pa() {
    let (min, max) = DEFAULT_PA.power_range_dbm();
    assert!((min..=max).contains(&DEFAULT_TX_POWER_DBM));
}

#[test]
fn default_payload_fits_buffer() {
    assert!(DEFAULT_PAYLOAD_LENGTH > 0);
    assert!(usize::from(DEFAULT_PAYLOAD_LENGTH) <= MAX_PAYLOAD_LENGTH);
}

#[test]
fn default_radio_settings_are_valid() {
    assert_eq!(RadioSettings::default().validate(), Ok(()));
    let gfsk = RadioSettings {
        packet_type: PacketType::Gfsk,
        ..RadioSettings::default()
    };
    assert_eq!(gfsk.validate(), Ok(()));
}

#[test]
fn gfsk_defaults_respect_carson_rule() {
    assert!(gfsk::RX_BANDWIDTH_HZ >= 2 * gfsk::FDEV_HZ + gfsk::BITRATE_BPS);
    assert!((gfsk::MIN_BITRATE_BPS..=gfsk::MAX_BITRATE_BPS).contains(&gfsk::BITRATE_BPS));
    assert_eq!(gfsk::SYNC_WORD_BITS % 8, 0);
}

#[test]
fn ramp_time_encoding() {
    assert_eq!(RampTime::from_u8(DEFAULT_RAMP_TIME.as_u8()), Some(DEFAULT_RAMP_TIME));
    assert_eq!(RampTime::from_u8(0x10), None);
}

// =============================================================================
// Ping-Pong Timing
// =============================================================================

#[test]
fn ping_pong_timings_interlock() {
    use ping_pong::*;
    assert!(PING_TO_PONG_MS < PONG_WINDOW_MS);
    assert!(PONG_WINDOW_MS < PING_PERIOD_MS);
    assert!(SLAVE_TIMEOUT_MS > PING_PERIOD_MS);
    assert_eq!(PONG_WINDOW_MS, 995);
    assert_eq!(SLAVE_TIMEOUT_MS, 1990);
}

#[test]
fn ping_pong_timing_validation() {
    let config = PingPongConfig::default();
    assert_eq!(config.validate(), Ok(()));

    let late_pong = PingPongConfig {
        ping_to_pong_ms: config.pong_window_ms,
        ..config
    };
    assert_eq!(late_pong.validate(), Err(ConfigError::InvalidTiming));

    let short_slave = PingPongConfig {
        slave_timeout_ms: config.ping_period_ms,
        ..config
    };
    assert_eq!(short_slave.validate(), Err(ConfigError::InvalidTiming));
}

// =============================================================================
// Settings Validation
// =============================================================================

#[test]
fn out_of_band_frequency_refused() {
    let mut settings = RadioSettings::default();
    settings.rf_frequency_hz = 2_400_000_000;
    assert_eq!(
        settings.validate(),
        Err(ConfigError::FrequencyOutOfRange(2_400_000_000))
    );
}

#[test]
fn tx_power_depends_on_pa() {
    let mut settings = RadioSettings::default();
    settings.tx_power_dbm = 20;
    assert_eq!(settings.validate(), Err(ConfigError::TxPowerOutOfRange(20)));

    settings.pa = PaSelect::HighPower;
    assert_eq!(settings.validate(), Ok(()));
}

#[test]
fn zero_payload_refused() {
    let mut settings = RadioSettings::default();
    settings.payload_length = 0;
    assert_eq!(settings.validate(), Err(ConfigError::InvalidPayloadLength(0)));
}

#[test]
fn low_spreading_factor_needs_long_preamble() {
    let mut settings = RadioSettings::default();
    settings.lora.spreading_factor = SpreadingFactor::Sf6;
    assert_eq!(settings.validate(), Err(ConfigError::InvalidLoRa));

    settings.lora.preamble_symbols = 12;
    assert_eq!(settings.validate(), Ok(()));
}

#[test]
fn gfsk_bandwidth_too_narrow_refused() {
    let mut settings = RadioSettings {
        packet_type: PacketType::Gfsk,
        ..RadioSettings::default()
    };
    settings.gfsk.rx_bandwidth_hz = 100_000;
    assert_eq!(settings.validate(), Err(ConfigError::InvalidGfsk));

    settings.gfsk.rx_bandwidth_hz = 312_000;
    settings.gfsk.crc = GfskCrc::Off;
    settings.gfsk.sync_word_bits = 12;
    assert_eq!(settings.validate(), Err(ConfigError::InvalidGfsk));
}

#[test]
fn per_needs_packets_and_timings() {
    let no_packets = PerConfig {
        nb_of_packets: 0,
        ..PerConfig::default()
    };
    assert_eq!(no_packets.validate(), Err(ConfigError::NoPackets));

    let no_delay = PerConfig {
        inter_packet_delay_ms: 0,
        ..PerConfig::default()
    };
    assert_eq!(no_delay.validate(), Err(ConfigError::InvalidTiming));
}

// =============================================================================
// Config Table
// =============================================================================

#[test]
fn table_starts_with_factory_defaults() {
    let table = DemoConfigs::default();
    for kind in DemoKind::ALL {
        assert_eq!(table.get(kind), DemoConfig::factory(kind));
    }
}

#[test]
fn table_rejects_invalid_settings_unchanged() {
    let mut table = DemoConfigs::factory();
    let mut config = TxCwConfig::default();
    config.radio.payload_length = 0;

    assert!(table.set(DemoConfig::TxCw(config)).is_err());
    assert_eq!(table.get(DemoKind::TxCw), DemoConfig::TxCw(TxCwConfig::default()));
}

#[test]
fn per_sides_are_stored_separately() {
    let mut table = DemoConfigs::factory();
    let config = PerConfig {
        nb_of_packets: 50,
        ..PerConfig::default()
    };
    table.set(DemoConfig::PerRx(config)).unwrap();

    assert_eq!(table.get(DemoKind::PerRx), DemoConfig::PerRx(config));
    assert_eq!(table.get(DemoKind::PerTx), DemoConfig::PerTx(PerConfig::default()));

    table.restore_default(DemoKind::PerRx);
    assert_eq!(table.get(DemoKind::PerRx), DemoConfig::PerRx(PerConfig::default()));
}
