//! Demo Engine
//!
//! Owns the radio, the per-kind configuration table and at most one active
//! demo. The scheduler loop calls [`DemoEngine::runtime`] on every tick. The
//! radio interrupt posts into an [`IrqMailbox`] the engine borrows, usually a
//! `static`, so it never needs a reference to the engine itself.

use crate::log::{debug, info};
use crate::platform::{Clock, Signaling};
use crate::radio::link::{IrqMask, RadioLink};
use crate::types::DemoKind;

use super::config::{ConfigError, DemoConfig, DemoConfigs};
use super::mailbox::{IrqEvent, IrqMailbox};
use super::per::{PerMode, RadioPer};
use super::ping_pong::PingPong;
use super::results::DemoResults;
use super::tx_cw::TxCw;
use super::{DemoContext, DemoStatus};

/// The demo currently instantiated, tagged by kind
enum ActiveDemo {
    PingPong(PingPong),
    TxCw(TxCw),
    Per(RadioPer),
}

impl ActiveDemo {
    fn new(config: DemoConfig) -> Self {
        match config {
            DemoConfig::PingPong(c) => Self::PingPong(PingPong::new(c)),
            DemoConfig::TxCw(c) => Self::TxCw(TxCw::new(c)),
            DemoConfig::PerTx(c) => Self::Per(RadioPer::new(PerMode::Tx, c)),
            DemoConfig::PerRx(c) => Self::Per(RadioPer::new(PerMode::Rx, c)),
        }
    }

    fn kind(&self) -> DemoKind {
        match self {
            Self::PingPong(_) => DemoKind::PingPong,
            Self::TxCw(_) => DemoKind::TxCw,
            Self::Per(demo) => demo.kind(),
        }
    }

    /// Re-apply `config` and rewind to the initial state
    fn reset(&mut self, config: DemoConfig) {
        match (self, config) {
            (Self::PingPong(demo), DemoConfig::PingPong(c)) => demo.reset(c),
            (Self::TxCw(demo), DemoConfig::TxCw(c)) => demo.reset(c),
            (Self::Per(demo), DemoConfig::PerTx(c) | DemoConfig::PerRx(c)) => demo.reset(c),
            (slot, config) => *slot = Self::new(config),
        }
    }

    fn runtime<R: RadioLink, S: Signaling>(
        &mut self,
        ctx: &mut DemoContext<'_, R, S>,
    ) -> DemoStatus {
        match self {
            Self::PingPong(demo) => demo.runtime(ctx),
            Self::TxCw(demo) => demo.runtime(ctx),
            Self::Per(demo) => demo.runtime(ctx),
        }
    }

    fn stop<R: RadioLink, S: Signaling>(&mut self, radio: &mut R, signaling: &mut S) {
        match self {
            Self::PingPong(demo) => demo.stop(radio),
            Self::TxCw(demo) => demo.stop(radio, signaling),
            Self::Per(demo) => demo.stop(radio),
        }
    }

    fn results(&self) -> DemoResults {
        match self {
            Self::PingPong(demo) => DemoResults::PingPong(demo.results()),
            Self::TxCw(demo) => DemoResults::TxCw(demo.results()),
            Self::Per(demo) => match demo.kind() {
                DemoKind::PerRx => DemoResults::PerRx(demo.results()),
                _ => DemoResults::PerTx(demo.results()),
            },
        }
    }

    fn has_intermediate_results(&self) -> bool {
        match self {
            Self::PingPong(demo) => demo.has_intermediate_results(),
            Self::TxCw(demo) => demo.has_intermediate_results(),
            Self::Per(demo) => demo.has_intermediate_results(),
        }
    }

    fn clear_intermediate_results(&mut self) {
        match self {
            Self::PingPong(demo) => demo.clear_intermediate_results(),
            Self::TxCw(demo) => demo.clear_intermediate_results(),
            Self::Per(demo) => demo.clear_intermediate_results(),
        }
    }
}

/// Runs one demo at a time on a single radio
///
/// # Example
///
/// ```ignore
/// static RADIO_IRQ: IrqMailbox = IrqMailbox::new();
///
/// #[interrupt]
/// fn EXTI0() {
///     RADIO_IRQ.post(IrqEvent { instant_ms: EmbassyClock.now_ms() });
/// }
///
/// let mut engine = DemoEngine::new(radio, EmbassyClock, NoSignaling, &RADIO_IRQ);
/// engine.start(DemoKind::PingPong)?;
/// loop {
///     if engine.runtime() == DemoStatus::Terminated {
///         engine.stop();
///     }
/// }
/// ```
pub struct DemoEngine<'m, R, C, S> {
    radio: R,
    clock: C,
    signaling: S,
    configs: DemoConfigs,
    active: Option<ActiveDemo>,
    running: bool,
    mailbox: &'m IrqMailbox,
}

impl<'m, R: RadioLink, C: Clock, S: Signaling> DemoEngine<'m, R, C, S> {
    /// Create an idle engine with factory default configurations
    ///
    /// `mailbox` is where the radio interrupt posts its events.
    #[must_use]
    pub fn new(radio: R, clock: C, signaling: S, mailbox: &'m IrqMailbox) -> Self {
        Self {
            radio,
            clock,
            signaling,
            configs: DemoConfigs::factory(),
            active: None,
            running: false,
            mailbox,
        }
    }

    /// Current configuration of `kind`
    #[must_use]
    pub fn config(&self, kind: DemoKind) -> DemoConfig {
        self.configs.get(kind)
    }

    /// Store settings for the kind named by the variant
    ///
    /// The new settings take effect on the next [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`ConfigError::DemoRunning`] if that kind is running, or the
    /// validation error of the settings.
    pub fn set_config(&mut self, config: DemoConfig) -> Result<(), ConfigError> {
        let kind = config.kind();
        if self.running && self.active_kind() == Some(kind) {
            return Err(ConfigError::DemoRunning(kind));
        }
        self.configs.set(config)
    }

    /// Put `kind` back to its compiled-in defaults
    ///
    /// # Errors
    ///
    /// [`ConfigError::DemoRunning`] if that kind is running.
    pub fn restore_default_config(&mut self, kind: DemoKind) -> Result<(), ConfigError> {
        if self.running && self.active_kind() == Some(kind) {
            return Err(ConfigError::DemoRunning(kind));
        }
        self.configs.restore_default(kind);
        Ok(())
    }

    /// Start `kind` from scratch with its current configuration
    ///
    /// Switching kinds drops the previous demo. Starting the running kind
    /// again restarts it.
    ///
    /// # Errors
    ///
    /// The validation error of the stored settings; nothing is touched then.
    pub fn start(&mut self, kind: DemoKind) -> Result<(), ConfigError> {
        let config = self.configs.get(kind);
        config.validate()?;

        if self.running {
            if let Some(demo) = self.active.as_mut() {
                demo.stop(&mut self.radio, &mut self.signaling);
            }
        }
        if let Some(demo) = self.active.as_mut().filter(|demo| demo.kind() == kind) {
            demo.reset(config);
        } else {
            info!("demo switched to {}", kind);
            self.active = Some(ActiveDemo::new(config));
        }
        self.mailbox.clear();
        self.radio.clear_irq(IrqMask::ALL);
        self.running = true;
        info!("demo {} started", kind);
        Ok(())
    }

    /// Idle the radio and rewind the active demo
    ///
    /// Safe to call in any state and any number of times.
    pub fn stop(&mut self) {
        if let Some(demo) = self.active.as_mut() {
            demo.stop(&mut self.radio, &mut self.signaling);
            if self.running {
                info!("demo {} stopped", demo.kind());
            }
        }
        self.running = false;
        self.mailbox.clear();
        self.radio.clear_irq(IrqMask::ALL);
    }

    /// Advance the active demo by one step
    ///
    /// Drains the mailbox first; an event posted with no demo running is
    /// discarded here.
    pub fn runtime(&mut self) -> DemoStatus {
        let irq = self.mailbox.take();
        let running = self.running;
        let Some(demo) = self.active.as_mut().filter(|_| running) else {
            if let Some(event) = irq {
                debug!("irq at {} ms with no running demo dropped", event.instant_ms);
            }
            return DemoStatus::Idle;
        };
        let mut ctx = DemoContext {
            radio: &mut self.radio,
            signaling: &mut self.signaling,
            now_ms: self.clock.now_ms(),
            irq,
        };
        demo.runtime(&mut ctx)
    }

    /// Record a radio interrupt for the next [`runtime`](Self::runtime)
    ///
    /// For callers that service the interrupt line from the scheduler loop.
    /// Dropped when no demo is running.
    pub fn interrupt_handler(&self) {
        if self.running && self.active.is_some() {
            self.mailbox.post(IrqEvent {
                instant_ms: self.clock.now_ms(),
            });
        } else {
            debug!("irq with no running demo dropped");
        }
    }

    /// Results of the active demo, leaving the intermediate flag as is
    #[must_use]
    pub fn results(&self) -> Option<DemoResults> {
        self.active.as_ref().map(ActiveDemo::results)
    }

    /// Results of the active demo, clearing the intermediate flag
    pub fn fetch_results(&mut self) -> Option<DemoResults> {
        let demo = self.active.as_mut()?;
        demo.clear_intermediate_results();
        Some(demo.results())
    }

    /// Whether the results changed since the last [`fetch_results`](Self::fetch_results)
    #[must_use]
    pub fn has_intermediate_results(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(ActiveDemo::has_intermediate_results)
    }

    /// Kind of the instantiated demo, running or not
    #[must_use]
    pub fn active_kind(&self) -> Option<DemoKind> {
        self.active.as_ref().map(ActiveDemo::kind)
    }

    /// Whether a demo is started
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether an interrupt waits for the next tick
    #[must_use]
    pub fn has_pending_interrupt(&self) -> bool {
        self.mailbox.is_pending()
    }

    /// The signaling sink
    #[must_use]
    pub const fn signaling(&self) -> &S {
        &self.signaling
    }
}
