//! Interrupt Mailbox
//!
//! Single-slot hand-off between the radio interrupt and the scheduler loop.
//! A second post before the slot is drained overwrites the first.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::log::debug;

/// A radio interrupt, timestamped when it was captured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct IrqEvent {
    /// Clock reading at capture time
    pub instant_ms: u32,
}

/// At-most-one-pending interrupt slot
///
/// `post` may run in interrupt context; `take` runs once per scheduler tick.
pub struct IrqMailbox {
    slot: Mutex<CriticalSectionRawMutex, Cell<Option<IrqEvent>>>,
}

impl IrqMailbox {
    /// Create an empty mailbox
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Store an event, replacing any undrained one
    pub fn post(&self, event: IrqEvent) {
        let previous = self.slot.lock(|slot| slot.replace(Some(event)));
        if let Some(lost) = previous {
            debug!("irq at {} ms overwritten", lost.instant_ms);
        }
    }

    /// Drain the slot
    pub fn take(&self) -> Option<IrqEvent> {
        self.slot.lock(Cell::take)
    }

    /// Whether an event is waiting
    pub fn is_pending(&self) -> bool {
        self.slot.lock(|slot| slot.get().is_some())
    }

    /// Discard any pending event
    pub fn clear(&self) {
        self.slot.lock(|slot| slot.set(None));
    }
}

impl Default for IrqMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_post_overwrites_first() {
        let mailbox = IrqMailbox::new();
        mailbox.post(IrqEvent { instant_ms: 10 });
        mailbox.post(IrqEvent { instant_ms: 20 });
        assert_eq!(mailbox.take(), Some(IrqEvent { instant_ms: 20 }));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn clear_discards_pending() {
        let mailbox = IrqMailbox::new();
        mailbox.post(IrqEvent { instant_ms: 1 });
        assert!(mailbox.is_pending());
        mailbox.clear();
        assert!(!mailbox.is_pending());
    }
}
