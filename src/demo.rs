//! Demo Execution
//!
//! The engine that runs one interrupt-driven demo at a time, and the
//! demos themselves. Every demo is a non-blocking state machine advanced
//! by one step per scheduler tick.
//!
//! Waiting for the radio follows the same pattern everywhere: arm an
//! [`IrqWait`] before starting the operation, check the drained interrupt
//! first thing on every tick, read the chip's status and payload, and only
//! then disarm. Each wait also carries a clock bound so a lost interrupt
//! never stalls the machine.

pub mod config;
pub mod engine;
pub mod mailbox;
pub mod results;

mod per;
mod ping_pong;
mod tx_cw;

use crate::log::{debug, trace};
use crate::radio::link::{IrqMask, RadioError, RadioLink};
use crate::types::has_elapsed;

use mailbox::IrqEvent;

/// What the scheduler learns from one `runtime()` call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DemoStatus {
    /// No demo is started
    Idle,
    /// The active demo wants more ticks
    Running,
    /// The active demo finished; call `stop()`
    Terminated,
}

/// Resources lent to the active demo for one step
pub(crate) struct DemoContext<'a, R, S> {
    pub(crate) radio: &'a mut R,
    pub(crate) signaling: &'a mut S,
    pub(crate) now_ms: u32,
    pub(crate) irq: Option<IrqEvent>,
}

/// Private "waiting for interrupt" flag of a demo
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct IrqWait {
    armed: bool,
    armed_at_ms: u32,
}

impl IrqWait {
    /// Start waiting
    pub(crate) fn arm(&mut self, now_ms: u32) {
        self.armed = true;
        self.armed_at_ms = now_ms;
    }

    /// Stop waiting
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }

    /// The drained interrupt, if this demo is waiting for one
    ///
    /// Interrupts arriving while nothing is armed are late completions and are dropped.
    pub(crate) fn fired(&self, event: Option<IrqEvent>) -> Option<IrqEvent> {
        match event {
            Some(event) if self.armed => Some(event),
            Some(event) => {
                debug!("late irq at {} ms dropped", event.instant_ms);
                None
            }
            None => None,
        }
    }

    /// Whether the current wait exceeded `bound_ms`
    pub(crate) const fn expired(&self, now_ms: u32, bound_ms: u32) -> bool {
        self.armed && has_elapsed(now_ms, self.armed_at_ms, bound_ms)
    }
}

/// Read the chip status and interrupt flags, then acknowledge the flags
pub(crate) fn acknowledge_irq<R: RadioLink>(radio: &mut R) -> Result<IrqMask, RadioError> {
    let (status, irq) = radio.read_status_and_irq()?;
    trace!("chip status {} irq {}", status, irq);
    radio.clear_irq(irq);
    Ok(irq)
}
