//! Demo Configuration
//!
//! Per-kind settings with their factory defaults. The engine keeps one
//! current [`DemoConfig`] per [`DemoKind`] in a [`DemoConfigs`] table.

use crate::config::{per, ping_pong, DEFAULT_NB_OF_PACKETS};
use crate::radio::settings::RadioSettings;
use crate::types::DemoKind;

/// Rejected configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum ConfigError {
    /// Carrier outside the supported band (Hz)
    FrequencyOutOfRange(u32),
    /// TX power outside the selected PA's range (dBm)
    TxPowerOutOfRange(i8),
    /// Payload length outside `1..=255`
    InvalidPayloadLength(u8),
    /// Inconsistent LoRa parameters
    InvalidLoRa,
    /// Inconsistent GFSK parameters
    InvalidGfsk,
    /// PER demo with no packet to send or receive
    NoPackets,
    /// Ping-pong or PER timings that cannot interlock
    InvalidTiming,
    /// The kind is running; `stop()` first
    DemoRunning(DemoKind),
}

/// Ping-pong link test settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PingPongConfig {
    /// PHY settings shared by both nodes
    pub radio: RadioSettings,
    /// Master Ping period (`T_ping`)
    pub ping_period_ms: u32,
    /// Slave delay from Ping reception to Pong (`T_ping_to_pong`)
    pub ping_to_pong_ms: u32,
    /// Master receive window after Ping tx-done
    pub pong_window_ms: u32,
    /// Slave wait for the next Ping after the previous one
    pub slave_timeout_ms: u32,
}

impl PingPongConfig {
    /// Check the PHY settings and that the timings interlock
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.radio.validate()?;
        let interlocked = self.ping_to_pong_ms > 0
            && self.ping_to_pong_ms < self.pong_window_ms
            && self.pong_window_ms < self.ping_period_ms
            && self.slave_timeout_ms > self.ping_period_ms;
        if interlocked {
            Ok(())
        } else {
            Err(ConfigError::InvalidTiming)
        }
    }
}

impl Default for PingPongConfig {
    fn default() -> Self {
        Self {
            radio: RadioSettings::default(),
            ping_period_ms: ping_pong::PING_PERIOD_MS,
            ping_to_pong_ms: ping_pong::PING_TO_PONG_MS,
            pong_window_ms: ping_pong::PONG_WINDOW_MS,
            slave_timeout_ms: ping_pong::SLAVE_TIMEOUT_MS,
        }
    }
}

/// Packet error rate settings (both sides)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PerConfig {
    /// PHY settings shared by both sides
    pub radio: RadioSettings,
    /// Packets to send, or receive windows to open
    pub nb_of_packets: u32,
    /// Gap between two transmissions
    pub inter_packet_delay_ms: u32,
    /// Receive window per expected packet
    pub rx_timeout_ms: u32,
}

impl PerConfig {
    /// Check the PHY settings and the packet plan
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.radio.validate()?;
        if self.nb_of_packets == 0 {
            return Err(ConfigError::NoPackets);
        }
        if self.inter_packet_delay_ms == 0 || self.rx_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        Ok(())
    }
}

impl Default for PerConfig {
    fn default() -> Self {
        Self {
            radio: RadioSettings::default(),
            nb_of_packets: DEFAULT_NB_OF_PACKETS,
            inter_packet_delay_ms: per::INTER_PACKET_DELAY_MS,
            rx_timeout_ms: per::RX_TIMEOUT_MS,
        }
    }
}

/// Continuous-wave settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct TxCwConfig {
    /// Carrier frequency, power and PA
    pub radio: RadioSettings,
}

/// Settings for one demo kind
///
/// The variant is the kind the settings belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DemoConfig {
    /// Ping-pong link test
    PingPong(PingPongConfig),
    /// Continuous wave
    TxCw(TxCwConfig),
    /// PER transmitter
    PerTx(PerConfig),
    /// PER receiver
    PerRx(PerConfig),
}

impl DemoConfig {
    /// Compiled-in defaults for `kind`
    #[must_use]
    pub fn factory(kind: DemoKind) -> Self {
        match kind {
            DemoKind::PingPong => Self::PingPong(PingPongConfig::default()),
            DemoKind::TxCw => Self::TxCw(TxCwConfig::default()),
            DemoKind::PerTx => Self::PerTx(PerConfig::default()),
            DemoKind::PerRx => Self::PerRx(PerConfig::default()),
        }
    }

    /// Kind these settings belong to
    #[must_use]
    pub const fn kind(&self) -> DemoKind {
        match self {
            Self::PingPong(_) => DemoKind::PingPong,
            Self::TxCw(_) => DemoKind::TxCw,
            Self::PerTx(_) => DemoKind::PerTx,
            Self::PerRx(_) => DemoKind::PerRx,
        }
    }

    /// PHY settings
    #[must_use]
    pub const fn radio(&self) -> &RadioSettings {
        match self {
            Self::PingPong(config) => &config.radio,
            Self::TxCw(config) => &config.radio,
            Self::PerTx(config) | Self::PerRx(config) => &config.radio,
        }
    }

    /// Check the settings
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::PingPong(config) => config.validate(),
            Self::TxCw(config) => config.radio.validate(),
            Self::PerTx(config) | Self::PerRx(config) => config.validate(),
        }
    }
}

/// Current configuration of every kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoConfigs {
    ping_pong: PingPongConfig,
    tx_cw: TxCwConfig,
    per_tx: PerConfig,
    per_rx: PerConfig,
}

impl DemoConfigs {
    /// Table filled with factory defaults
    #[must_use]
    pub fn factory() -> Self {
        Self {
            ping_pong: PingPongConfig::default(),
            tx_cw: TxCwConfig::default(),
            per_tx: PerConfig::default(),
            per_rx: PerConfig::default(),
        }
    }

    /// Current settings for `kind`
    #[must_use]
    pub fn get(&self, kind: DemoKind) -> DemoConfig {
        match kind {
            DemoKind::PingPong => DemoConfig::PingPong(self.ping_pong),
            DemoKind::TxCw => DemoConfig::TxCw(self.tx_cw),
            DemoKind::PerTx => DemoConfig::PerTx(self.per_tx),
            DemoKind::PerRx => DemoConfig::PerRx(self.per_rx),
        }
    }

    /// Validate and store settings for the kind named by the variant
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found; the table is unchanged.
    pub fn set(&mut self, config: DemoConfig) -> Result<(), ConfigError> {
        config.validate()?;
        match config {
            DemoConfig::PingPong(c) => self.ping_pong = c,
            DemoConfig::TxCw(c) => self.tx_cw = c,
            DemoConfig::PerTx(c) => self.per_tx = c,
            DemoConfig::PerRx(c) => self.per_rx = c,
        }
        Ok(())
    }

    /// Put `kind` back to its factory defaults
    pub fn restore_default(&mut self, kind: DemoKind) {
        match kind {
            DemoKind::PingPong => self.ping_pong = PingPongConfig::default(),
            DemoKind::TxCw => self.tx_cw = TxCwConfig::default(),
            DemoKind::PerTx => self.per_tx = PerConfig::default(),
            DemoKind::PerRx => self.per_rx = PerConfig::default(),
        }
    }
}

impl Default for DemoConfigs {
    fn default() -> Self {
        Self::factory()
    }
}
