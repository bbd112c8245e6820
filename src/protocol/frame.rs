//! Host Framing
//!
//! Every frame starts with a 4-byte header: command (or response) code and
//! payload length, both little-endian `u16`, followed by the payload.

use heapless::Vec;

use crate::config::host::{HEADER_LEN, MAX_PAYLOAD_LEN, MAX_RESPONSE_LEN, OPERAND_TIMEOUT_MS};
use crate::types::has_elapsed;

use super::ProtocolError;

/// Command codes sent by the host
pub mod com_code {
    //! Host to device command codes

    /// Report engine state
    pub const STATUS: u16 = 0x00;
    /// Start a demo
    pub const START: u16 = 0x01;
    /// Store demo settings
    pub const CONFIGURE: u16 = 0x02;
    /// Read the active demo's results
    pub const FETCH_RESULT: u16 = 0x03;
    /// Stop the active demo
    pub const RESET: u16 = 0x04;
    /// Set date and location (scan demos)
    pub const SET_DATE_LOC: u16 = 0x05;
    /// Report the firmware version
    pub const GET_VERSION: u16 = 0x06;
    /// Read almanac dates (scan demos)
    pub const GET_ALMANAC_DATES: u16 = 0x07;
    /// Push an almanac chunk (scan demos)
    pub const UPDATE_ALMANAC: u16 = 0x08;
    /// Verify the almanac (scan demos)
    pub const CHECK_ALMANAC_UPDATE: u16 = 0x09;
}

/// Response codes sent to the host
pub mod resp_code {
    //! Device to host response codes

    /// Command acknowledged, optional payload
    pub const EVENT: u16 = 0x80;
    /// Radio demo results
    pub const RADIO_RESULT: u16 = 0x85;
    /// Command failed, one-byte error code
    pub const ERROR: u16 = 0x90;
}

/// A complete frame received from the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostFrame {
    /// Command code
    pub com_code: u16,
    /// Payload bytes
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

/// Byte-fed frame parser
pub struct FrameParser {
    /// Header bytes collected so far
    header: Vec<u8, HEADER_LEN>,
    /// Payload bytes collected so far
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
    /// Command code and payload length once the header is complete
    expected: Option<(u16, usize)>,
    /// Arrival time of the last byte
    last_byte_ms: u32,
}

impl FrameParser {
    /// Create a new parser
    #[must_use]
    pub const fn new() -> Self {
        Self {
            header: Vec::new(),
            payload: Vec::new(),
            expected: None,
            last_byte_ms: 0,
        }
    }

    /// Feed a byte received at `now_ms`
    /// Returns a frame if one is complete
    ///
    /// # Errors
    ///
    /// [`ProtocolError::OperandTimeout`] if the previous byte of an unfinished
    /// frame is too old (the new byte is discarded), or
    /// [`ProtocolError::PayloadTooLong`] when the header announces more than
    /// the parser holds. The parser is cleared in both cases.
    pub fn feed(&mut self, byte: u8, now_ms: u32) -> Result<Option<HostFrame>, ProtocolError> {
        self.poll(now_ms)?;
        self.last_byte_ms = now_ms;

        let Some((com_code, len)) = self.expected else {
            let _ = self.header.push(byte);
            if self.header.len() < HEADER_LEN {
                return Ok(None);
            }
            let com_code = u16::from_le_bytes([self.header[0], self.header[1]]);
            let len = u16::from_le_bytes([self.header[2], self.header[3]]);
            self.header.clear();
            if usize::from(len) > MAX_PAYLOAD_LEN {
                return Err(ProtocolError::PayloadTooLong(len));
            }
            if len == 0 {
                return Ok(Some(HostFrame {
                    com_code,
                    payload: Vec::new(),
                }));
            }
            self.expected = Some((com_code, usize::from(len)));
            return Ok(None);
        };

        let _ = self.payload.push(byte);
        if self.payload.len() < len {
            return Ok(None);
        }
        self.expected = None;
        Ok(Some(HostFrame {
            com_code,
            payload: core::mem::take(&mut self.payload),
        }))
    }

    /// Check the operand timeout without new input
    ///
    /// # Errors
    ///
    /// [`ProtocolError::OperandTimeout`] if an unfinished frame stalled; the
    /// parser is cleared.
    pub fn poll(&mut self, now_ms: u32) -> Result<(), ProtocolError> {
        if !self.is_idle() && has_elapsed(now_ms, self.last_byte_ms, OPERAND_TIMEOUT_MS) {
            self.clear();
            return Err(ProtocolError::OperandTimeout);
        }
        Ok(())
    }

    /// Whether no frame is in progress
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.header.is_empty() && self.expected.is_none()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.header.clear();
        self.payload.clear();
        self.expected = None;
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Response formatter
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    buffer: Vec<u8, MAX_RESPONSE_LEN>,
}

impl Response {
    /// Frame `payload` under `code`
    ///
    /// Payloads longer than the response buffer are truncated.
    #[must_use]
    pub fn new(code: u16, payload: &[u8]) -> Self {
        let room = MAX_RESPONSE_LEN - HEADER_LEN;
        let payload = &payload[..payload.len().min(room)];
        // payload.len() <= room < u16::MAX
        #[allow(clippy::cast_possible_truncation)]
        let len = payload.len() as u16;

        let mut buffer = Vec::new();
        let _ = buffer.extend_from_slice(&code.to_le_bytes());
        let _ = buffer.extend_from_slice(&len.to_le_bytes());
        let _ = buffer.extend_from_slice(payload);
        Self { buffer }
    }

    /// Acknowledge with an optional payload
    #[must_use]
    pub fn event(payload: &[u8]) -> Self {
        Self::new(resp_code::EVENT, payload)
    }

    /// Report a failed command
    #[must_use]
    pub fn error(err: &ProtocolError) -> Self {
        Self::new(resp_code::ERROR, &[err.code()])
    }

    /// Response code
    #[must_use]
    pub fn code(&self) -> u16 {
        u16::from_le_bytes([self.buffer[0], self.buffer[1]])
    }

    /// Payload after the header
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.buffer[HEADER_LEN..]
    }

    /// Get the response bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl core::fmt::Debug for Response {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Response({:#04x}, {:02x?})", self.code(), self.payload())
    }
}
