//! Shared Test Fixtures
//!
//! A simulated air interface with any number of radios, a manual clock and a
//! recording signaling sink. Transmissions reach every other radio that is
//! currently receiving, instantly.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lr1110_demo::prelude::*;
use lr1110_demo::radio::link::ChipStatus;

// =============================================================================
// Clock
// =============================================================================

/// Manually advanced millisecond clock, shared by clones
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

impl SimClock {
    pub fn starting_at(ms: u32) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    pub fn now(&self) -> u32 {
        self.0.get()
    }

    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

// =============================================================================
// Signaling
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordingSignaling {
    pub tx: u32,
    pub rx: u32,
    pub continuous_tx_start: u32,
    pub continuous_tx_stop: u32,
}

impl Signaling for RecordingSignaling {
    fn on_tx(&mut self) {
        self.tx += 1;
    }

    fn on_rx(&mut self) {
        self.rx += 1;
    }

    fn on_continuous_tx_start(&mut self) {
        self.continuous_tx_start += 1;
    }

    fn on_continuous_tx_stop(&mut self) {
        self.continuous_tx_stop += 1;
    }
}

// =============================================================================
// Radio
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RadioMode {
    #[default]
    Standby,
    Rx,
    ContinuousWave,
}

/// Observable state of one simulated chip
#[derive(Debug, Default)]
pub struct RadioState {
    pub mode: RadioMode,
    /// Pending interrupt flags
    pub irq: IrqMask,
    /// Interrupt line raised and not yet serviced by the test loop
    pub irq_line: bool,
    pub rx_packet: Option<ReceivedPacket>,
    pub stats: PhyStats,
    pub transmitted: Vec<Vec<u8>>,
    pub configured: Vec<RadioSettings>,
    pub rx_timeouts: Vec<u32>,
    pub standby_calls: u32,
    pub stats_resets: u32,
    pub reject_configure: bool,
    pub reject_transmit: bool,
    /// Suppress the TX_DONE interrupt after a transmission
    pub swallow_tx_done: bool,
}

impl RadioState {
    fn raise(&mut self, mask: IrqMask) {
        self.irq |= mask;
        self.irq_line = true;
    }
}

/// Decides whether a frame on air is lost
pub type DropRule = Box<dyn FnMut(&[u8]) -> bool>;

#[derive(Default)]
pub struct Air {
    pub radios: Vec<RadioState>,
    pub drop_rule: Option<DropRule>,
}

/// Handle on a shared [`Air`]
#[derive(Clone, Default)]
pub struct AirHandle(pub Rc<RefCell<Air>>);

impl AirHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new radio
    pub fn radio(&self) -> MockRadio {
        let mut air = self.0.borrow_mut();
        air.radios.push(RadioState::default());
        MockRadio {
            id: air.radios.len() - 1,
            air: self.clone(),
        }
    }

    /// Inspect one radio's state
    pub fn with<T>(&self, id: usize, f: impl FnOnce(&mut RadioState) -> T) -> T {
        f(&mut self.0.borrow_mut().radios[id])
    }

    /// Take the interrupt line of a radio
    pub fn take_irq_line(&self, id: usize) -> bool {
        self.with(id, |radio| std::mem::take(&mut radio.irq_line))
    }

    /// Inject a received frame into a radio, as if sent by an unseen peer
    pub fn deliver(&self, id: usize, payload: &[u8], rssi_dbm: i8) {
        self.with(id, |radio| {
            radio.rx_packet = Some(ReceivedPacket {
                payload: Payload::from_slice(payload).unwrap(),
                rssi_dbm,
            });
            radio.stats.packets_received += 1;
            radio.mode = RadioMode::Standby;
            radio.raise(IrqMask::RX_DONE);
        });
    }

    /// Raise arbitrary interrupt flags on a radio
    pub fn raise(&self, id: usize, mask: IrqMask) {
        self.with(id, |radio| {
            if mask.intersects(IrqMask::RX_DONE | IrqMask::TIMEOUT | IrqMask::CRC_ERROR) {
                radio.mode = RadioMode::Standby;
            }
            if mask.is_rx_error() {
                radio.stats.crc_errors += 1;
            }
            radio.raise(mask);
        });
    }

    pub fn set_drop_rule(&self, rule: DropRule) {
        self.0.borrow_mut().drop_rule = Some(rule);
    }
}

/// Radio attached to an [`Air`]
pub struct MockRadio {
    pub id: usize,
    air: AirHandle,
}

impl MockRadio {
    fn state<T>(&self, f: impl FnOnce(&mut RadioState) -> T) -> T {
        self.air.with(self.id, f)
    }
}

impl RadioLink for MockRadio {
    fn configure(&mut self, settings: &RadioSettings) -> Result<(), RadioError> {
        self.state(|radio| {
            if radio.reject_configure {
                return Err(RadioError::Rejected);
            }
            radio.configured.push(*settings);
            Ok(())
        })
    }

    fn transmit(&mut self, payload: &[u8], _timeout_ms: u32) -> Result<(), RadioError> {
        let mut air = self.air.0.borrow_mut();
        let air = &mut *air;
        let me = &mut air.radios[self.id];
        if me.reject_transmit {
            return Err(RadioError::Rejected);
        }
        me.transmitted.push(payload.to_vec());
        me.mode = RadioMode::Standby;
        if !me.swallow_tx_done {
            me.raise(IrqMask::TX_DONE);
        }

        let lost = air.drop_rule.as_mut().is_some_and(|rule| rule(payload));
        if lost {
            return Ok(());
        }
        for (id, peer) in air.radios.iter_mut().enumerate() {
            if id != self.id && peer.mode == RadioMode::Rx {
                peer.rx_packet = Some(ReceivedPacket {
                    payload: Payload::from_slice(payload).unwrap(),
                    rssi_dbm: -40,
                });
                peer.stats.packets_received += 1;
                peer.mode = RadioMode::Standby;
                peer.raise(IrqMask::RX_DONE);
            }
        }
        Ok(())
    }

    fn transmit_continuous_wave(&mut self) -> Result<(), RadioError> {
        self.state(|radio| {
            if radio.reject_transmit {
                return Err(RadioError::Rejected);
            }
            radio.mode = RadioMode::ContinuousWave;
            Ok(())
        })
    }

    fn receive(&mut self, timeout_ms: u32) -> Result<(), RadioError> {
        self.state(|radio| {
            radio.mode = RadioMode::Rx;
            radio.rx_timeouts.push(timeout_ms);
        });
        Ok(())
    }

    fn read_status_and_irq(&mut self) -> Result<(ChipStatus, IrqMask), RadioError> {
        Ok((ChipStatus::default(), self.state(|radio| radio.irq)))
    }

    fn clear_irq(&mut self, mask: IrqMask) {
        self.state(|radio| radio.irq = IrqMask::from_bits(radio.irq.bits() & !mask.bits()));
    }

    fn read_packet(&mut self) -> Result<ReceivedPacket, RadioError> {
        self.state(|radio| radio.rx_packet.clone().ok_or(RadioError::Rejected))
    }

    fn read_stats(&mut self) -> Result<PhyStats, RadioError> {
        Ok(self.state(|radio| radio.stats))
    }

    fn reset_stats(&mut self) {
        self.state(|radio| {
            radio.stats = PhyStats::default();
            radio.stats_resets += 1;
        });
    }

    fn standby(&mut self) {
        self.state(|radio| {
            radio.mode = RadioMode::Standby;
            radio.standby_calls += 1;
        });
    }
}

// =============================================================================
// Nodes
// =============================================================================

pub type Engine = DemoEngine<'static, MockRadio, SimClock, RecordingSignaling>;

/// One engine on the shared air
pub struct Node {
    pub engine: Engine,
    pub id: usize,
    /// Where an interrupt routine would post
    pub mailbox: &'static IrqMailbox,
}

impl Node {
    pub fn new(air: &AirHandle, clock: &SimClock) -> Self {
        let radio = air.radio();
        let id = radio.id;
        let mailbox: &'static IrqMailbox = Box::leak(Box::new(IrqMailbox::new()));
        Self {
            engine: DemoEngine::new(radio, clock.clone(), RecordingSignaling::default(), mailbox),
            id,
            mailbox,
        }
    }

    /// Service the interrupt line, then run one scheduler step
    pub fn tick(&mut self, air: &AirHandle) -> DemoStatus {
        if air.take_irq_line(self.id) {
            self.engine.interrupt_handler();
        }
        self.engine.runtime()
    }

    pub fn ping_pong(&self) -> PingPongResults {
        match self.engine.results() {
            Some(DemoResults::PingPong(results)) => results,
            other => panic!("expected ping-pong results, got {other:?}"),
        }
    }

    pub fn per(&self) -> PerResults {
        match self.engine.results() {
            Some(DemoResults::PerTx(results) | DemoResults::PerRx(results)) => results,
            other => panic!("expected PER results, got {other:?}"),
        }
    }
}

/// A single engine with its own air and clock
pub struct Bench {
    pub air: AirHandle,
    pub clock: SimClock,
    pub node: Node,
}

impl Bench {
    pub fn new() -> Self {
        let air = AirHandle::new();
        let clock = SimClock::starting_at(0);
        let node = Node::new(&air, &clock);
        Self { air, clock, node }
    }

    pub fn starting_at(ms: u32) -> Self {
        let bench = Self::new();
        bench.clock.set(ms);
        bench
    }

    pub fn tick(&mut self) -> DemoStatus {
        self.node.tick(&self.air)
    }

    /// Advance the clock by `ms`, ticking once per millisecond
    pub fn run_for(&mut self, ms: u32) -> DemoStatus {
        let mut status = DemoStatus::Idle;
        for _ in 0..ms {
            self.clock.advance(1);
            status = self.tick();
        }
        status
    }

    /// Tick every millisecond up to and including `ms`
    pub fn run_until(&mut self, ms: u32) -> DemoStatus {
        self.run_for(ms.wrapping_sub(self.clock.now()))
    }

    pub fn radio<T>(&self, f: impl FnOnce(&mut RadioState) -> T) -> T {
        self.air.with(self.node.id, f)
    }

    pub fn last_transmitted(&self) -> Option<Vec<u8>> {
        self.radio(|radio| radio.transmitted.last().cloned())
    }
}
