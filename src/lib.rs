//! LR1110 Evaluation Kit Demo Library
//!
//! This library provides the demo execution core of the LR1110 evaluation
//! kit firmware: an engine that runs exactly one long-lived, interrupt-driven
//! radio demo at a time, the demos themselves, and the host command layer
//! that drives them over a serial link.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Host Protocol  │  Scheduler Loop  │  Radio IRQ              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       DEMO LAYER                             │
//! │  DemoEngine  │  Ping-Pong  │  PER TX/RX  │  TX CW            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    PLATFORM SEAMS                            │
//! │  RadioLink (LR1110 driver)  │  Clock  │  Signaling (LEDs)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Never block**: every `runtime()` call does one step of work and returns
//! - **Type-driven design**: settings are validated before any radio activity
//! - **No unsafe in application code**: the interrupt mailbox uses a critical section
//! - **Wrapping time**: all deadlines use modular millisecond arithmetic
//! - **Explicit error handling**: radio failures become a demo's Error state

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_time;

mod log;

/// Demo Execution
///
/// The engine, the interrupt mailbox, and the demo state machines.
pub mod demo;

/// Radio Abstractions
///
/// Driver seam, PHY settings and payload buffers.
pub mod radio;

/// Platform Services
///
/// Clock and user feedback hooks.
pub mod platform;

/// Communication Protocols
///
/// Host command framing and dispatch into the demo engine.
pub mod protocol;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::demo::config::{
        ConfigError, DemoConfig, PerConfig, PingPongConfig, TxCwConfig,
    };
    pub use crate::demo::engine::DemoEngine;
    pub use crate::demo::mailbox::{IrqEvent, IrqMailbox};
    pub use crate::demo::results::{DemoResults, PerResults, PingPongResults, TxCwResults};
    pub use crate::demo::DemoStatus;
    pub use crate::platform::{Clock, NoSignaling, Signaling};
    pub use crate::radio::link::{IrqMask, PhyStats, RadioError, RadioLink, ReceivedPacket};
    pub use crate::radio::payload::Payload;
    pub use crate::radio::settings::RadioSettings;
    pub use crate::types::*;

    // Embassy
    #[cfg(feature = "embedded")]
    pub use crate::platform::EmbassyClock;
}
