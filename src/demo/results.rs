//! Demo Results
//!
//! Per-kind output records. They are overwritten in place as the state
//! machine advances and handed out by value.

use crate::radio::link::PhyStats;
use crate::types::{DemoKind, PingPongRole, ResultStatus};

/// Ping-pong link test counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PingPongResults {
    /// Packets whose tx-done was seen
    pub count_tx: u32,
    /// Expected frames received
    pub count_rx_correct_packet: u32,
    /// Corrupted or unexpected frames received
    pub count_rx_wrong_packet: u32,
    /// Receive windows that closed empty
    pub count_rx_timeout: u32,
    /// RSSI of the last received packet
    pub last_rssi_dbm: i8,
    /// Chip counters, fetched after each tx/rx event
    pub stats: PhyStats,
    /// Health of the run
    pub status: ResultStatus,
    /// Current role
    pub role: PingPongRole,
}

impl PingPongResults {
    /// Zero every counter, keeping status and role
    pub fn clear_counters(&mut self) {
        self.count_tx = 0;
        self.count_rx_correct_packet = 0;
        self.count_rx_wrong_packet = 0;
        self.count_rx_timeout = 0;
    }
}

/// Packet error rate counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PerResults {
    /// Packets whose tx-done was seen
    pub count_tx: u32,
    /// Expected frames received
    pub count_rx_correct_packet: u32,
    /// Corrupted or unexpected frames received
    pub count_rx_wrong_packet: u32,
    /// Receive windows that closed empty
    pub count_rx_timeout: u32,
    /// RSSI of the last received packet
    pub last_rssi_dbm: i8,
    /// Chip counters, fetched after each tx/rx event
    pub stats: PhyStats,
    /// Health of the run
    pub status: ResultStatus,
}

impl PerResults {
    /// Zero every counter, keeping status
    pub fn clear_counters(&mut self) {
        self.count_tx = 0;
        self.count_rx_correct_packet = 0;
        self.count_rx_wrong_packet = 0;
        self.count_rx_timeout = 0;
    }

    /// Receive outcomes recorded so far
    #[must_use]
    pub const fn rx_attempts(&self) -> u32 {
        self.count_rx_correct_packet
            .saturating_add(self.count_rx_wrong_packet)
            .saturating_add(self.count_rx_timeout)
    }

    /// Lost or corrupted packets per thousand receive attempts
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn packet_error_rate_permille(&self) -> u32 {
        let attempts = u64::from(self.rx_attempts());
        if attempts == 0 {
            return 0;
        }
        let failed = attempts - u64::from(self.count_rx_correct_packet);
        // failed <= attempts so the ratio fits
        (failed * 1000 / attempts) as u32
    }
}

/// Continuous-wave outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct TxCwResults {
    /// Health of the run
    pub status: ResultStatus,
}

/// Results of the active demo
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DemoResults {
    /// Ping-pong link test
    PingPong(PingPongResults),
    /// Continuous wave
    TxCw(TxCwResults),
    /// PER transmitter
    PerTx(PerResults),
    /// PER receiver
    PerRx(PerResults),
}

impl DemoResults {
    /// Kind that produced these results
    #[must_use]
    pub const fn kind(&self) -> DemoKind {
        match self {
            Self::PingPong(_) => DemoKind::PingPong,
            Self::TxCw(_) => DemoKind::TxCw,
            Self::PerTx(_) => DemoKind::PerTx,
            Self::PerRx(_) => DemoKind::PerRx,
        }
    }

    /// Health of the run
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        match self {
            Self::PingPong(r) => r.status,
            Self::TxCw(r) => r.status,
            Self::PerTx(r) | Self::PerRx(r) => r.status,
        }
    }
}
