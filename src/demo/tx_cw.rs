//! Continuous Wave
//!
//! Keys an unmodulated carrier until stopped.

use crate::log::{error, info};
use crate::platform::Signaling;
use crate::radio::link::{RadioError, RadioLink};
use crate::types::ResultStatus;

use super::config::TxCwConfig;
use super::results::TxCwResults;
use super::{DemoContext, DemoStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
enum TxCwState {
    #[default]
    Init,
    Running,
    Error,
}

/// Continuous-wave demo
#[derive(Clone, Debug)]
pub(crate) struct TxCw {
    config: TxCwConfig,
    state: TxCwState,
    results: TxCwResults,
    has_intermediate_results: bool,
}

impl TxCw {
    pub(crate) fn new(config: TxCwConfig) -> Self {
        Self {
            config,
            state: TxCwState::Init,
            results: TxCwResults::default(),
            has_intermediate_results: false,
        }
    }

    pub(crate) fn reset(&mut self, config: TxCwConfig) {
        *self = Self::new(config);
    }

    pub(crate) const fn results(&self) -> TxCwResults {
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
        if self.state != TxCwState::Init {
            return DemoStatus::Running;
        }
        self.state = match Self::key_carrier(&self.config, ctx) {
            Ok(()) => {
                info!(
                    "carrier on at {} Hz, {} dBm",
                    self.config.radio.rf_frequency_hz,
                    self.config.radio.tx_power_dbm
                );
                TxCwState::Running
            }
            Err(err) => {
                error!("TX CW radio error: {}", err);
                ctx.radio.standby();
                self.results.status = ResultStatus::Error;
                TxCwState::Error
            }
        };
        self.has_intermediate_results = true;
        DemoStatus::Running
    }

    pub(crate) fn stop<R: RadioLink, S: Signaling>(&mut self, radio: &mut R, signaling: &mut S) {
        radio.standby();
        if self.state == TxCwState::Running {
            signaling.on_continuous_tx_stop();
        }
        self.state = TxCwState::Init;
    }

    fn key_carrier<R: RadioLink, S: Signaling>(
        config: &TxCwConfig,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> Result<(), RadioError> {
        ctx.radio.configure(&config.radio)?;
        ctx.radio.transmit_continuous_wave()?;
        ctx.signaling.on_continuous_tx_start();
        Ok(())
    }
}
