//! Packet Error Rate
//!
//! One side sends `nb_of_packets` numbered frames at a fixed interval; the
//! other opens as many receive windows and sorts each outcome into correct,
//! wrong or timed out.

use crate::config::{per::TIMEOUT_MARGIN_MS, TX_TIMEOUT_NONE};
use crate::log::{error, info, warn};
use crate::platform::Signaling;
use crate::radio::link::{IrqMask, RadioError, RadioLink};
use crate::radio::payload::Payload;
use crate::types::{has_elapsed, DemoKind, ResultStatus};

use super::config::PerConfig;
use super::mailbox::IrqEvent;
use super::results::PerResults;
use super::{acknowledge_irq, DemoContext, DemoStatus, IrqWait};

/// Which side of the test this node plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub(crate) enum PerMode {
    /// Sends the frames
    Tx,
    /// Counts the frames
    Rx,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
enum PerState {
    #[default]
    Init,
    Send,
    WaitTxDone,
    StartRx,
    WaitRx,
    Terminated,
    Error,
}

/// PER demo, either side
#[derive(Clone, Debug)]
pub(crate) struct RadioPer {
    mode: PerMode,
    config: PerConfig,
    state: PerState,
    results: PerResults,
    /// Frame sent, or frame expected
    payload: Payload,
    irq: IrqWait,
    packets_sent: u32,
    last_tx_done_ms: u32,
    has_intermediate_results: bool,
}

impl RadioPer {
    pub(crate) fn new(mode: PerMode, config: PerConfig) -> Self {
        Self {
            mode,
            config,
            state: PerState::Init,
            results: PerResults::default(),
            payload: Payload::per_sequence(config.radio.payload_len()),
            irq: IrqWait::default(),
            packets_sent: 0,
            last_tx_done_ms: 0,
            has_intermediate_results: false,
        }
    }

    pub(crate) fn reset(&mut self, config: PerConfig) {
        *self = Self::new(self.mode, config);
    }

    pub(crate) const fn kind(&self) -> DemoKind {
        match self.mode {
            PerMode::Tx => DemoKind::PerTx,
            PerMode::Rx => DemoKind::PerRx,
        }
    }

    pub(crate) const fn results(&self) -> PerResults {
        self.results
    }

    pub(crate) const fn has_intermediate_results(&self) -> bool {
        self.has_intermediate_results
    }

    pub(crate) fn clear_intermediate_results(&mut self) {
        self.has_intermediate_results = false;
    }

    pub(crate) fn runtime<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> DemoStatus {
        let previous = self.state;
        let before = self.results;
        self.state = match self.step(ctx) {
            Ok(next) => next,
            Err(err) => {
                error!("PER radio error: {}", err);
                self.irq.disarm();
                ctx.radio.standby();
                self.results.status = ResultStatus::Error;
                PerState::Error
            }
        };

        if self.state != previous || self.results != before {
            self.has_intermediate_results = true;
            if self.state == PerState::Terminated {
                info!(
                    "PER {} done: tx {} rx ok {} rx wrong {} rx timeout {} PER {}/1000",
                    self.mode,
                    self.results.count_tx,
                    self.results.count_rx_correct_packet,
                    self.results.count_rx_wrong_packet,
                    self.results.count_rx_timeout,
                    self.results.packet_error_rate_permille()
                );
            }
        }

        if self.state == PerState::Terminated {
            DemoStatus::Terminated
        } else {
            DemoStatus::Running
        }
    }

    pub(crate) fn stop<R: RadioLink>(&mut self, radio: &mut R) {
        radio.standby();
        self.irq.disarm();
        self.results.clear_counters();
        self.packets_sent = 0;
        self.state = PerState::Init;
    }

    fn step<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PerState, RadioError> {
        let fired = self.irq.fired(ctx.irq);
        match self.state {
            PerState::Init => self.init(ctx),
            PerState::Send => self.send(ctx),
            PerState::WaitTxDone => self.wait_tx_done(ctx, fired),
            PerState::StartRx => self.start_rx(ctx),
            PerState::WaitRx => self.wait_rx(ctx, fired),
            PerState::Terminated => Ok(PerState::Terminated),
            PerState::Error => Ok(PerState::Error),
        }
    }

    fn init<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PerState, RadioError> {
        self.results.status = ResultStatus::Ok;
        ctx.radio.configure(&self.config.radio)?;
        ctx.radio.reset_stats();
        self.last_tx_done_ms = ctx.now_ms;
        info!("PER {} started for {} packets", self.mode, self.config.nb_of_packets);
        Ok(match self.mode {
            PerMode::Tx => PerState::Send,
            PerMode::Rx => PerState::StartRx,
        })
    }

    fn send<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PerState, RadioError> {
        if !has_elapsed(ctx.now_ms, self.last_tx_done_ms, self.config.inter_packet_delay_ms) {
            return Ok(PerState::Send);
        }
        self.irq.arm(ctx.now_ms);
        ctx.radio.transmit(self.payload.as_slice(), TX_TIMEOUT_NONE)?;
        ctx.signaling.on_tx();
        self.packets_sent += 1;
        Ok(PerState::WaitTxDone)
    }

    fn wait_tx_done<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
        fired: Option<IrqEvent>,
    ) -> Result<PerState, RadioError> {
        if let Some(event) = fired {
            let irq = acknowledge_irq(ctx.radio)?;
            if irq.contains(IrqMask::TX_DONE) {
                self.irq.disarm();
                self.results.count_tx += 1;
                self.results.stats = ctx.radio.read_stats()?;
                self.last_tx_done_ms = event.instant_ms;
                return Ok(self.after_send(ctx.radio));
            }
            if irq.contains(IrqMask::TIMEOUT) {
                warn!("PER tx timed out");
                self.irq.disarm();
                self.last_tx_done_ms = event.instant_ms;
                return Ok(self.after_send(ctx.radio));
            }
        }
        if self.irq.expired(ctx.now_ms, self.config.inter_packet_delay_ms) {
            warn!("PER tx-done lost");
            self.irq.disarm();
            ctx.radio.standby();
            self.last_tx_done_ms = ctx.now_ms;
            return Ok(self.after_send(ctx.radio));
        }
        Ok(PerState::WaitTxDone)
    }

    fn after_send<R: RadioLink>(&self, radio: &mut R) -> PerState {
        if self.packets_sent >= self.config.nb_of_packets {
            radio.standby();
            PerState::Terminated
        } else {
            PerState::Send
        }
    }

    fn start_rx<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PerState, RadioError> {
        self.irq.arm(ctx.now_ms);
        ctx.radio.receive(self.config.rx_timeout_ms)?;
        Ok(PerState::WaitRx)
    }

    fn wait_rx<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
        fired: Option<IrqEvent>,
    ) -> Result<PerState, RadioError> {
        if fired.is_some() {
            let irq = acknowledge_irq(ctx.radio)?;
            if irq.is_rx_error() {
                self.irq.disarm();
                self.results.count_rx_wrong_packet += 1;
                return Ok(self.after_receive(ctx.radio));
            }
            if irq.contains(IrqMask::RX_DONE) {
                let packet = ctx.radio.read_packet()?;
                self.irq.disarm();
                self.results.last_rssi_dbm = packet.rssi_dbm;
                if packet.payload == self.payload {
                    ctx.signaling.on_rx();
                    self.results.count_rx_correct_packet += 1;
                    self.results.stats = ctx.radio.read_stats()?;
                } else {
                    warn!("unexpected PER frame: {}", packet.payload);
                    self.results.count_rx_wrong_packet += 1;
                }
                return Ok(self.after_receive(ctx.radio));
            }
            if irq.contains(IrqMask::TIMEOUT) {
                self.irq.disarm();
                self.results.count_rx_timeout += 1;
                return Ok(self.after_receive(ctx.radio));
            }
        }
        let bound = self.config.rx_timeout_ms.saturating_add(TIMEOUT_MARGIN_MS);
        if self.irq.expired(ctx.now_ms, bound) {
            self.irq.disarm();
            ctx.radio.standby();
            self.results.count_rx_timeout += 1;
            return Ok(self.after_receive(ctx.radio));
        }
        Ok(PerState::WaitRx)
    }

    fn after_receive<R: RadioLink>(&self, radio: &mut R) -> PerState {
        if self.results.rx_attempts() >= self.config.nb_of_packets {
            radio.standby();
            PerState::Terminated
        } else {
            PerState::StartRx
        }
    }
}
