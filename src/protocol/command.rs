//! Host Commands
//!
//! Decoding of complete frames into [`HostCommand`]s and their execution
//! against a [`DemoEngine`].

use crate::demo::config::DemoConfig;
use crate::demo::engine::DemoEngine;
use crate::platform::{Clock, Signaling};
use crate::radio::link::RadioLink;
use crate::types::DemoKind;

use super::codec::{decode_config, encode_results};
use super::frame::{com_code, resp_code, HostFrame, Response};
use super::ProtocolError;

/// Firmware version reported by GET_VERSION
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command decoded from a host frame
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum HostCommand {
    /// Report the active kind and its flags
    Status,
    /// Start a demo with its stored settings
    Start(DemoKind),
    /// Store settings for a kind
    Configure(DemoConfig),
    /// Read the active demo's results
    FetchResult,
    /// Stop the active demo
    Reset,
    /// Report the firmware version
    GetVersion,
}

impl HostCommand {
    /// Decode a complete frame
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnknownCommand`] or [`ProtocolError::Unsupported`] for
    /// codes not served, otherwise the payload decoding error.
    pub fn decode(frame: &HostFrame) -> Result<Self, ProtocolError> {
        let payload = frame.payload.as_slice();
        match frame.com_code {
            com_code::STATUS => expect_empty(payload).map(|()| Self::Status),
            com_code::START => match payload {
                [id] => DemoKind::from_id(*id)
                    .map(Self::Start)
                    .ok_or(ProtocolError::UnknownDemo(*id)),
                _ => Err(ProtocolError::InvalidPayload),
            },
            com_code::CONFIGURE => decode_config(payload).map(Self::Configure),
            com_code::FETCH_RESULT => expect_empty(payload).map(|()| Self::FetchResult),
            com_code::RESET => expect_empty(payload).map(|()| Self::Reset),
            com_code::GET_VERSION => expect_empty(payload).map(|()| Self::GetVersion),
            com_code::SET_DATE_LOC
            | com_code::GET_ALMANAC_DATES
            | com_code::UPDATE_ALMANAC
            | com_code::CHECK_ALMANAC_UPDATE => Err(ProtocolError::Unsupported(frame.com_code)),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}

fn expect_empty(payload: &[u8]) -> Result<(), ProtocolError> {
    if payload.is_empty() {
        Ok(())
    } else {
        Err(ProtocolError::InvalidPayload)
    }
}

/// Run `cmd` and build the response
pub fn execute<R, C, S>(engine: &mut DemoEngine<'_, R, C, S>, cmd: &HostCommand) -> Response
where
    R: RadioLink,
    C: Clock,
    S: Signaling,
{
    let outcome = match cmd {
        HostCommand::Status => {
            let kind = engine.active_kind().map_or(0, DemoKind::id);
            return Response::event(&[
                kind,
                u8::from(engine.is_running()),
                u8::from(engine.has_intermediate_results()),
            ]);
        }
        HostCommand::Start(kind) => engine.start(*kind).map_err(ProtocolError::from),
        HostCommand::Configure(config) => engine.set_config(*config).map_err(ProtocolError::from),
        HostCommand::FetchResult => {
            return match engine.fetch_results() {
                Some(results) => Response::new(resp_code::RADIO_RESULT, &encode_results(&results)),
                None => Response::error(&ProtocolError::NoActiveDemo),
            };
        }
        HostCommand::Reset => {
            engine.stop();
            Ok(())
        }
        HostCommand::GetVersion => return Response::event(VERSION.as_bytes()),
    };

    match outcome {
        Ok(()) => Response::event(&[]),
        Err(err) => Response::error(&err),
    }
}
