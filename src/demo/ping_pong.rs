//! Ping-Pong Link Test
//!
//! Two identically configured nodes negotiate Master/Slave roles at runtime
//! and then alternate Ping and Pong frames.
//!
//! ```text
//!  Master: ──PING──┐                 ┌─(T_ping after tx-done)──PING──
//!                  │  pong window    │
//!  Slave:          └─(T_ping_to_pong)─PONG──┘
//! ```
//!
//! Every node boots as Master. A Master that receives a Ping takes it as a
//! role offer and becomes Slave. A Slave that hears a Pong, or no Ping for
//! `slave_timeout_ms`, reverts to Master. A Master whose Pong window closes
//! empty only counts a timeout and pings again on schedule.
//!
//! All deadlines are offsets from the instant captured at the triggering
//! event, compared with wrapping arithmetic.

use crate::config::{RX_TIMEOUT_NONE, TX_TIMEOUT_NONE};
use crate::log::{error, info, warn};
use crate::platform::Signaling;
use crate::radio::link::{IrqMask, RadioError, RadioLink};
use crate::radio::payload::{Frame, Payload};
use crate::types::{has_elapsed, PingPongRole, ResultStatus};

use super::config::PingPongConfig;
use super::mailbox::IrqEvent;
use super::results::PingPongResults;
use super::{acknowledge_irq, DemoContext, DemoStatus, IrqWait};

/// Ping-pong state machine states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub(crate) enum PingPongState {
    /// Configure the radio and become Master
    #[default]
    Init,
    /// Master waiting for the next Ping slot
    MasterSendPing,
    /// Master waiting for the Ping tx-done
    MasterWaitPingTxDone,
    /// Master listening for the Pong
    MasterWaitPong,
    /// Slave waiting for the Pong slot
    SlaveSendPong,
    /// Slave waiting for the Pong tx-done
    SlaveWaitPongTxDone,
    /// Slave listening for the next Ping
    SlaveWaitPing,
    /// The radio rejected an operation
    Error,
}

/// Ping-pong demo
#[derive(Clone, Debug)]
pub(crate) struct PingPong {
    config: PingPongConfig,
    state: PingPongState,
    role: PingPongRole,
    results: PingPongResults,
    ping: Payload,
    pong: Payload,
    irq: IrqWait,
    /// Master schedule anchor: last Ping tx-done
    last_tx_done_ms: u32,
    /// Slave schedule anchor: last Ping reception
    last_rx_done_ms: u32,
    has_intermediate_results: bool,
}

impl PingPong {
    pub(crate) fn new(config: PingPongConfig) -> Self {
        let len = config.radio.payload_len();
        Self {
            config,
            state: PingPongState::Init,
            role: PingPongRole::Master,
            results: PingPongResults::default(),
            ping: Payload::ping(len),
            pong: Payload::pong(len),
            irq: IrqWait::default(),
            last_tx_done_ms: 0,
            last_rx_done_ms: 0,
            has_intermediate_results: false,
        }
    }

    /// Start over with fresh settings
    pub(crate) fn reset(&mut self, config: PingPongConfig) {
        *self = Self::new(config);
    }

    pub(crate) const fn results(&self) -> PingPongResults {
        self.results
    }

    pub(crate) const fn has_intermediate_results(&self) -> bool {
        self.has_intermediate_results
    }

    pub(crate) fn clear_intermediate_results(&mut self) {
        self.has_intermediate_results = false;
    }

    /// Advance one step
    ///
    /// Never terminates on its own; only `stop` ends a run.
    pub(crate) fn runtime<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> DemoStatus {
        let previous = self.state;
        let before = self.results;
        self.state = match self.step(ctx) {
            Ok(next) => next,
            Err(err) => {
                error!("ping-pong radio error: {}", err);
                self.irq.disarm();
                ctx.radio.standby();
                self.results.status = ResultStatus::Error;
                PingPongState::Error
            }
        };

        self.results.role = self.role;
        if self.state != previous || self.results != before {
            self.has_intermediate_results = true;
            info!(
                "{} {}: tx {} rx ok {} rx wrong {} rx timeout {} rssi {} dBm",
                self.role,
                self.state,
                self.results.count_tx,
                self.results.count_rx_correct_packet,
                self.results.count_rx_wrong_packet,
                self.results.count_rx_timeout,
                self.results.last_rssi_dbm
            );
        }
        DemoStatus::Running
    }

    /// Idle the radio, zero the counters and rewind to `Init`
    pub(crate) fn stop<R: RadioLink>(&mut self, radio: &mut R) {
        radio.standby();
        self.irq.disarm();
        self.results.clear_counters();
        self.state = PingPongState::Init;
    }

    fn step<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PingPongState, RadioError> {
        let fired = self.irq.fired(ctx.irq);
        match self.state {
            PingPongState::Init => self.init(ctx),
            PingPongState::MasterSendPing => self.send_ping(ctx),
            PingPongState::MasterWaitPingTxDone => self.wait_ping_tx_done(ctx, fired),
            PingPongState::MasterWaitPong => self.wait_pong(ctx, fired),
            PingPongState::SlaveSendPong => self.send_pong(ctx),
            PingPongState::SlaveWaitPongTxDone => self.wait_pong_tx_done(ctx, fired),
            PingPongState::SlaveWaitPing => self.wait_ping(ctx, fired),
            PingPongState::Error => Ok(PingPongState::Error),
        }
    }

    fn init<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PingPongState, RadioError> {
        self.role = PingPongRole::Master;
        self.results.status = ResultStatus::Ok;
        ctx.radio.configure(&self.config.radio)?;
        ctx.radio.reset_stats();
        self.last_tx_done_ms = ctx.now_ms;
        info!("ping-pong started as {}", self.role);
        Ok(PingPongState::MasterSendPing)
    }

    fn send_ping<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PingPongState, RadioError> {
        if !has_elapsed(ctx.now_ms, self.last_tx_done_ms, self.config.ping_period_ms) {
            return Ok(PingPongState::MasterSendPing);
        }
        self.irq.arm(ctx.now_ms);
        ctx.radio.transmit(self.ping.as_slice(), TX_TIMEOUT_NONE)?;
        ctx.signaling.on_tx();
        Ok(PingPongState::MasterWaitPingTxDone)
    }

    fn wait_ping_tx_done<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
        fired: Option<IrqEvent>,
    ) -> Result<PingPongState, RadioError> {
        if let Some(event) = fired {
            let irq = acknowledge_irq(ctx.radio)?;
            if irq.contains(IrqMask::TX_DONE) {
                self.irq.disarm();
                self.results.count_tx += 1;
                self.results.stats = ctx.radio.read_stats()?;
                self.last_tx_done_ms = event.instant_ms;
                self.listen(ctx)?;
                return Ok(PingPongState::MasterWaitPong);
            }
            if irq.contains(IrqMask::TIMEOUT) {
                warn!("ping tx timed out");
                self.irq.disarm();
                self.last_tx_done_ms = event.instant_ms;
                return Ok(PingPongState::MasterSendPing);
            }
        }
        if self.irq.expired(ctx.now_ms, self.config.ping_period_ms) {
            warn!("ping tx-done lost");
            self.irq.disarm();
            ctx.radio.standby();
            self.last_tx_done_ms = ctx.now_ms;
            return Ok(PingPongState::MasterSendPing);
        }
        Ok(PingPongState::MasterWaitPingTxDone)
    }

    fn wait_pong<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
        fired: Option<IrqEvent>,
    ) -> Result<PingPongState, RadioError> {
        if let Some(event) = fired {
            let irq = acknowledge_irq(ctx.radio)?;
            if irq.is_rx_error() {
                self.count_wrong_packet(None);
                ctx.radio.receive(RX_TIMEOUT_NONE)?;
                return Ok(PingPongState::MasterWaitPong);
            }
            if irq.contains(IrqMask::RX_DONE) {
                let packet = ctx.radio.read_packet()?;
                self.results.last_rssi_dbm = packet.rssi_dbm;
                match Frame::classify(&packet.payload, &self.ping, &self.pong) {
                    Frame::Pong => {
                        self.irq.disarm();
                        self.count_correct_packet(ctx)?;
                        return Ok(PingPongState::MasterSendPing);
                    }
                    Frame::Ping => {
                        // Another Master is pinging: take the offer
                        self.irq.disarm();
                        self.count_correct_packet(ctx)?;
                        self.role = PingPongRole::Slave;
                        self.last_rx_done_ms = event.instant_ms;
                        info!("ping received as MASTER, switching to SLAVE");
                        return Ok(PingPongState::SlaveSendPong);
                    }
                    Frame::Unknown => {
                        self.count_wrong_packet(Some(&packet.payload));
                        ctx.radio.receive(RX_TIMEOUT_NONE)?;
                        return Ok(PingPongState::MasterWaitPong);
                    }
                }
            }
            if irq.contains(IrqMask::TIMEOUT) {
                self.irq.disarm();
                self.results.count_rx_timeout += 1;
                return Ok(PingPongState::MasterSendPing);
            }
        }
        if has_elapsed(ctx.now_ms, self.last_tx_done_ms, self.config.pong_window_ms) {
            self.irq.disarm();
            ctx.radio.standby();
            self.results.count_rx_timeout += 1;
            return Ok(PingPongState::MasterSendPing);
        }
        Ok(PingPongState::MasterWaitPong)
    }

    fn send_pong<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<PingPongState, RadioError> {
        if !has_elapsed(ctx.now_ms, self.last_rx_done_ms, self.config.ping_to_pong_ms) {
            return Ok(PingPongState::SlaveSendPong);
        }
        self.irq.arm(ctx.now_ms);
        ctx.radio.transmit(self.pong.as_slice(), TX_TIMEOUT_NONE)?;
        ctx.signaling.on_tx();
        Ok(PingPongState::SlaveWaitPongTxDone)
    }

    fn wait_pong_tx_done<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
        fired: Option<IrqEvent>,
    ) -> Result<PingPongState, RadioError> {
        if fired.is_some() {
            let irq = acknowledge_irq(ctx.radio)?;
            if irq.contains(IrqMask::TX_DONE) {
                self.irq.disarm();
                self.results.count_tx += 1;
                self.results.stats = ctx.radio.read_stats()?;
                self.listen(ctx)?;
                return Ok(PingPongState::SlaveWaitPing);
            }
            if irq.contains(IrqMask::TIMEOUT) {
                warn!("pong tx timed out");
                self.irq.disarm();
                return Ok(self.revert_to_master(self.last_rx_done_ms));
            }
        }
        if self.irq.expired(ctx.now_ms, self.config.ping_period_ms) {
            warn!("pong tx-done lost");
            self.irq.disarm();
            ctx.radio.standby();
            return Ok(self.revert_to_master(self.last_rx_done_ms));
        }
        Ok(PingPongState::SlaveWaitPongTxDone)
    }

    fn wait_ping<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
        fired: Option<IrqEvent>,
    ) -> Result<PingPongState, RadioError> {
        if let Some(event) = fired {
            let irq = acknowledge_irq(ctx.radio)?;
            if irq.is_rx_error() {
                self.count_wrong_packet(None);
                ctx.radio.receive(RX_TIMEOUT_NONE)?;
                return Ok(PingPongState::SlaveWaitPing);
            }
            if irq.contains(IrqMask::RX_DONE) {
                let packet = ctx.radio.read_packet()?;
                self.results.last_rssi_dbm = packet.rssi_dbm;
                match Frame::classify(&packet.payload, &self.ping, &self.pong) {
                    Frame::Ping => {
                        self.irq.disarm();
                        self.count_correct_packet(ctx)?;
                        self.last_rx_done_ms = event.instant_ms;
                        return Ok(PingPongState::SlaveSendPong);
                    }
                    Frame::Pong => {
                        // Someone else answers Pings here: desync
                        warn!("pong received as SLAVE");
                        self.irq.disarm();
                        return Ok(self.revert_to_master(event.instant_ms));
                    }
                    Frame::Unknown => {
                        self.count_wrong_packet(Some(&packet.payload));
                        ctx.radio.receive(RX_TIMEOUT_NONE)?;
                        return Ok(PingPongState::SlaveWaitPing);
                    }
                }
            }
            if irq.contains(IrqMask::TIMEOUT) {
                self.irq.disarm();
                self.results.count_rx_timeout += 1;
                return Ok(self.revert_to_master(self.last_rx_done_ms));
            }
        }
        if has_elapsed(ctx.now_ms, self.last_rx_done_ms, self.config.slave_timeout_ms) {
            self.irq.disarm();
            ctx.radio.standby();
            self.results.count_rx_timeout += 1;
            return Ok(self.revert_to_master(self.last_rx_done_ms));
        }
        Ok(PingPongState::SlaveWaitPing)
    }

    /// Arm the interrupt wait and open a receive window
    fn listen<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<(), RadioError> {
        self.irq.arm(ctx.now_ms);
        ctx.radio.receive(RX_TIMEOUT_NONE)
    }

    /// Become Master again, pinging one period after `anchor_ms`
    fn revert_to_master(&mut self, anchor_ms: u32) -> PingPongState {
        info!("{} reverting to MASTER", self.role);
        self.role = PingPongRole::Master;
        self.last_tx_done_ms = anchor_ms;
        PingPongState::MasterSendPing
    }

    fn count_correct_packet<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<(), RadioError> {
        ctx.signaling.on_rx();
        self.results.count_rx_correct_packet += 1;
        self.results.stats = ctx.radio.read_stats()?;
        Ok(())
    }

    fn count_wrong_packet(&mut self, payload: Option<&Payload>) {
        self.results.count_rx_wrong_packet += 1;
        if let Some(payload) = payload {
            warn!("unexpected frame: {}", payload);
        } else {
            warn!("packet with CRC or header error");
        }
    }
}
