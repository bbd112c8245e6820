//! Payloads
//!
//! Fixed-capacity packet buffer and the canonical frames exchanged by the demos.
//! Frames carry no header: they are told apart by byte-exact comparison only.

use heapless::Vec;

use crate::config::MAX_PAYLOAD_LENGTH;

/// Packet payload, at most [`MAX_PAYLOAD_LENGTH`] bytes
///
/// Equality compares size and every byte.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Payload {
    bytes: Vec<u8, MAX_PAYLOAD_LENGTH>,
}

impl Payload {
    /// Byte repeated in a Ping
    pub const PING_BYTE: u8 = 0x00;

    /// Byte repeated in a Pong
    pub const PONG_BYTE: u8 = 0x01;

    /// Empty payload
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Payload of `len` copies of `byte` (clamped to capacity)
    #[must_use]
    pub fn filled(len: usize, byte: u8) -> Self {
        let mut bytes = Vec::new();
        let _ = bytes.resize(len.min(MAX_PAYLOAD_LENGTH), byte);
        Self { bytes }
    }

    /// Copy a slice, returning `None` when it exceeds capacity
    #[must_use]
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        Vec::from_slice(data).ok().map(|bytes| Self { bytes })
    }

    /// Canonical Ping of `len` bytes
    #[must_use]
    pub fn ping(len: usize) -> Self {
        Self::filled(len, Self::PING_BYTE)
    }

    /// Canonical Pong of `len` bytes
    #[must_use]
    pub fn pong(len: usize) -> Self {
        Self::filled(len, Self::PONG_BYTE)
    }

    /// PER frame of `len` bytes: byte `i` holds `i`
    #[must_use]
    pub fn per_sequence(len: usize) -> Self {
        let mut bytes = Vec::new();
        for i in 0..len.min(MAX_PAYLOAD_LENGTH) {
            // i < 255 so the cast is exact
            #[allow(clippy::cast_possible_truncation)]
            let _ = bytes.push(i as u8);
        }
        Self { bytes }
    }

    /// Payload bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl core::fmt::Debug for Payload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Payload({:02x?})", self.bytes.as_slice())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Payload {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Payload({=[u8]:x})", self.bytes.as_slice());
    }
}

/// Classification of a received ping-pong frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Frame {
    /// Matches the canonical Ping
    Ping,
    /// Matches the canonical Pong
    Pong,
    /// Matches neither
    Unknown,
}

impl Frame {
    /// Classify `received` against the two canonical payloads
    #[must_use]
    pub fn classify(received: &Payload, ping: &Payload, pong: &Payload) -> Self {
        if received == ping {
            Self::Ping
        } else if received == pong {
            Self::Pong
        } else {
            Self::Unknown
        }
    }
}
