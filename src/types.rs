//! Shared types used across modules
//!
//! Newtypes and enums that enforce domain invariants at construction time.

use core::fmt;

use crate::config::{MAX_RF_FREQUENCY_HZ, MIN_RF_FREQUENCY_HZ};

/// RF carrier frequency in Hz
///
/// Guaranteed to lie inside the sub-GHz range supported by the front end.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RfFrequency(u32);

impl RfFrequency {
    /// Create a frequency from Hz, returning `None` when out of range
    #[must_use]
    pub const fn from_hz(hz: u32) -> Option<Self> {
        if hz >= MIN_RF_FREQUENCY_HZ && hz <= MAX_RF_FREQUENCY_HZ {
            Some(Self(hz))
        } else {
            None
        }
    }

    /// Get frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for RfFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mhz = self.0 / 1_000_000;
        let khz = (self.0 % 1_000_000) / 1000;
        write!(f, "{mhz}.{khz:03} MHz")
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RfFrequency {
    fn format(&self, f: defmt::Formatter) {
        let mhz = self.0 / 1_000_000;
        let khz = (self.0 % 1_000_000) / 1000;
        defmt::write!(f, "{}.{:03} MHz", mhz, khz);
    }
}

/// Demo scenario selected by the user or the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DemoKind {
    /// Two-node Master/Slave link test
    PingPong,
    /// Continuous-wave carrier
    TxCw,
    /// Packet error rate, transmitting side
    PerTx,
    /// Packet error rate, receiving side
    PerRx,
}

impl DemoKind {
    /// Every kind, in host id order
    pub const ALL: [Self; 4] = [Self::PingPong, Self::TxCw, Self::PerTx, Self::PerRx];

    /// Identifier used on the host link
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::PingPong => 5,
            Self::TxCw => 6,
            Self::PerTx => 7,
            Self::PerRx => 8,
        }
    }

    /// Look up a kind from its host identifier
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            5 => Some(Self::PingPong),
            6 => Some(Self::TxCw),
            7 => Some(Self::PerTx),
            8 => Some(Self::PerRx),
            _ => None,
        }
    }

    /// Whether the demo only ends on `stop()`
    #[must_use]
    pub const fn runs_indefinitely(self) -> bool {
        matches!(self, Self::PingPong | Self::TxCw)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DemoKind {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::PingPong => defmt::write!(f, "PING-PONG"),
            Self::TxCw => defmt::write!(f, "TX CW"),
            Self::PerTx => defmt::write!(f, "PER TX"),
            Self::PerRx => defmt::write!(f, "PER RX"),
        }
    }
}

/// Role of a node in the ping-pong link test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PingPongRole {
    /// Sends Pings and waits for Pongs
    #[default]
    Master,
    /// Answers Pings with Pongs
    Slave,
}

impl PingPongRole {
    /// Wire encoding used in result blobs
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Master => 0,
            Self::Slave => 1,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PingPongRole {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Master => defmt::write!(f, "MASTER"),
            Self::Slave => defmt::write!(f, "SLAVE"),
        }
    }
}

/// Outcome reported in a demo's results
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResultStatus {
    /// Demo is healthy
    #[default]
    Ok,
    /// The radio rejected an operation; `stop()` then `start()` to recover
    Error,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ResultStatus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Ok => defmt::write!(f, "OK"),
            Self::Error => defmt::write!(f, "ERROR"),
        }
    }
}

/// Milliseconds elapsed between two clock readings
///
/// Uses modular subtraction so the result stays correct across the 2^32 wrap.
#[must_use]
pub const fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Whether strictly more than `bound_ms` elapsed since `since_ms`
#[must_use]
pub const fn has_elapsed(now_ms: u32, since_ms: u32, bound_ms: u32) -> bool {
    elapsed_ms(now_ms, since_ms) > bound_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_across_wrap() {
        assert_eq!(elapsed_ms(5, u32::MAX - 4), 10);
        assert!(has_elapsed(3, u32::MAX - 1000, 1000));
        assert!(!has_elapsed(3, u32::MAX - 995, 1000));
    }

    #[test]
    fn demo_kind_ids_round_trip() {
        for kind in DemoKind::ALL {
            assert_eq!(DemoKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(DemoKind::from_id(0), None);
    }
}
