//! Communication Protocols
//!
//! Binary host command protocol of the evaluation kit. The host (a PC GUI)
//! sends framed commands over the serial link; each complete frame is
//! answered with exactly one response frame.
//!
//! Only the radio demo commands are served here. The scan-demo commands
//! (date/location and almanac handling) are recognized and refused.

pub mod codec;
pub mod command;
pub mod frame;

use crate::demo::config::ConfigError;
use crate::demo::engine::DemoEngine;
use crate::log::{debug, warn};
use crate::platform::{Clock, Signaling};
use crate::radio::link::RadioLink;

use command::HostCommand;
use frame::{FrameParser, Response};

/// Host command failure, reported in an ERROR response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum ProtocolError {
    /// Header announced a payload larger than the receive buffer
    PayloadTooLong(u16),
    /// Frame left unfinished for too long
    OperandTimeout,
    /// Command code not defined
    UnknownCommand(u16),
    /// Command defined but not served by this firmware
    Unsupported(u16),
    /// Payload of the wrong size or with an out-of-range field
    InvalidPayload,
    /// Demo id not defined
    UnknownDemo(u8),
    /// Settings refused by the engine
    Config(ConfigError),
    /// FETCH_RESULT with no demo instantiated
    NoActiveDemo,
}

impl ProtocolError {
    /// One-byte code carried by the ERROR response
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::PayloadTooLong(_) => 0x01,
            Self::OperandTimeout => 0x02,
            Self::UnknownCommand(_) => 0x03,
            Self::InvalidPayload => 0x04,
            Self::UnknownDemo(_) => 0x05,
            Self::Config(ConfigError::DemoRunning(_)) => 0x07,
            Self::Config(_) => 0x06,
            Self::NoActiveDemo => 0x08,
            Self::Unsupported(_) => 0x09,
        }
    }
}

impl From<ConfigError> for ProtocolError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Serial session with the host
///
/// Feeds received bytes through a [`FrameParser`] and runs each complete
/// command against the engine.
pub struct HostLink {
    parser: FrameParser,
    error_count: u32,
}

impl HostLink {
    /// Create an idle session
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parser: FrameParser::new(),
            error_count: 0,
        }
    }

    /// Handle one received byte
    ///
    /// Returns the response to send back, if the byte completed a frame or
    /// broke one.
    pub fn on_byte<R, C, S>(
        &mut self,
        engine: &mut DemoEngine<'_, R, C, S>,
        byte: u8,
        now_ms: u32,
    ) -> Option<Response>
    where
        R: RadioLink,
        C: Clock,
        S: Signaling,
    {
        let result = self
            .parser
            .feed(byte, now_ms)
            .and_then(|frame| frame.map(|f| HostCommand::decode(&f)).transpose());

        match result {
            Ok(Some(cmd)) => {
                debug!("host command {}", cmd);
                Some(command::execute(engine, &cmd))
            }
            Ok(None) => None,
            Err(err) => Some(self.reject(err)),
        }
    }

    /// Drop a stalled frame
    ///
    /// Call periodically while no bytes arrive; returns the ERROR response
    /// to send if a frame timed out.
    pub fn poll(&mut self, now_ms: u32) -> Option<Response> {
        self.parser.poll(now_ms).err().map(|err| self.reject(err))
    }

    /// Number of frames rejected before reaching the engine
    #[must_use]
    pub const fn error_count(&self) -> u32 {
        self.error_count
    }

    fn reject(&mut self, err: ProtocolError) -> Response {
        warn!("host frame rejected: {}", err);
        self.error_count = self.error_count.wrapping_add(1);
        Response::error(&err)
    }
}

impl Default for HostLink {
    fn default() -> Self {
        Self::new()
    }
}
