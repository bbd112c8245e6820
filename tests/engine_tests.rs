//! Demo Engine Tests
//!
//! Lifecycle of the engine: start, stop, kind switching, configuration
//! storage and interrupt routing.
//! Run with: cargo test --test engine_tests

mod common;

use common::{Bench, RadioMode, RecordingSignaling};
use lr1110_demo::prelude::*;

fn bench() -> Bench {
    Bench::new()
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn new_engine_is_idle() {
    let mut bench = bench();
    assert!(!bench.node.engine.is_running());
    assert_eq!(bench.node.engine.active_kind(), None);
    assert_eq!(bench.node.engine.results(), None);
    assert_eq!(bench.tick(), DemoStatus::Idle);
    assert!(bench.radio(|radio| radio.configured.is_empty()));
}

#[test]
fn start_runs_the_demo() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    assert!(bench.node.engine.is_running());
    assert_eq!(bench.node.engine.active_kind(), Some(DemoKind::PingPong));
    assert_eq!(bench.tick(), DemoStatus::Running);
}

#[test]
fn start_clears_stale_interrupts() {
    let mut bench = bench();
    bench.air.raise(0, IrqMask::RX_DONE);
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    assert!(bench.radio(|radio| radio.irq.is_empty()));
    assert!(!bench.node.engine.has_pending_interrupt());
}

#[test]
fn stop_is_idempotent() {
    let mut bench = bench();
    bench.node.engine.stop();
    bench.node.engine.stop();
    assert_eq!(bench.tick(), DemoStatus::Idle);

    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.tick();
    bench.node.engine.stop();
    bench.node.engine.stop();
    assert!(!bench.node.engine.is_running());
    assert_eq!(bench.tick(), DemoStatus::Idle);
    assert_eq!(bench.radio(|radio| radio.mode), RadioMode::Standby);
}

#[test]
fn results_survive_stop() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.tick();
    bench.node.engine.stop();

    assert_eq!(bench.node.engine.active_kind(), Some(DemoKind::PingPong));
    assert!(matches!(bench.node.engine.results(), Some(DemoResults::PingPong(_))));
}

#[test]
fn restart_same_kind_starts_from_scratch() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.tick();
    bench.run_until(1002);
    assert_eq!(bench.node.ping_pong().count_tx, 1);

    bench.node.engine.start(DemoKind::PingPong).unwrap();
    assert_eq!(bench.node.ping_pong().count_tx, 0);
    bench.tick();
    assert_eq!(bench.radio(|radio| radio.configured.len()), 2);
    assert!(bench.radio(|radio| radio.standby_calls) >= 1);
}

#[test]
fn switching_kind_replaces_the_demo() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.tick();

    bench.node.engine.start(DemoKind::TxCw).unwrap();
    assert_eq!(bench.node.engine.active_kind(), Some(DemoKind::TxCw));
    bench.tick();
    assert!(matches!(bench.node.engine.results(), Some(DemoResults::TxCw(_))));
    assert_eq!(bench.radio(|radio| radio.mode), RadioMode::ContinuousWave);
}

#[test]
fn switching_away_from_carrier_keys_it_off() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::TxCw).unwrap();
    bench.tick();
    assert_eq!(bench.node.engine.signaling().continuous_tx_start, 1);

    bench.node.engine.start(DemoKind::PingPong).unwrap();
    assert_eq!(bench.node.engine.signaling().continuous_tx_stop, 1);
    assert_eq!(bench.radio(|radio| radio.mode), RadioMode::Standby);
}

#[test]
fn restarting_carrier_pairs_start_and_stop() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::TxCw).unwrap();
    bench.tick();
    bench.node.engine.start(DemoKind::TxCw).unwrap();
    bench.tick();

    let signaling = bench.node.engine.signaling();
    assert_eq!(signaling.continuous_tx_start, 2);
    assert_eq!(signaling.continuous_tx_stop, 1);
    assert_eq!(bench.radio(|radio| radio.mode), RadioMode::ContinuousWave);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn factory_configs_are_valid() {
    let bench = bench();
    for kind in DemoKind::ALL {
        let config = bench.node.engine.config(kind);
        assert_eq!(config.kind(), kind);
        assert_eq!(config.validate(), Ok(()));
    }
}

#[test]
fn set_config_applies_on_next_start() {
    let mut bench = bench();
    let mut config = PingPongConfig::default();
    config.radio.payload_length = 8;
    bench.node.engine.set_config(DemoConfig::PingPong(config)).unwrap();

    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.tick();
    bench.run_until(1001);
    assert_eq!(bench.last_transmitted(), Some(vec![0x00; 8]));
    assert_eq!(bench.radio(|radio| radio.configured[0].payload_length), 8);
}

#[test]
fn configs_are_isolated_per_kind() {
    let mut bench = bench();
    let mut config = PerConfig::default();
    config.nb_of_packets = 3;
    bench.node.engine.set_config(DemoConfig::PerTx(config)).unwrap();

    assert_eq!(bench.node.engine.config(DemoKind::PerTx), DemoConfig::PerTx(config));
    assert_eq!(
        bench.node.engine.config(DemoKind::PerRx),
        DemoConfig::PerRx(PerConfig::default())
    );
}

#[test]
fn invalid_config_is_refused() {
    let mut bench = bench();
    let mut config = TxCwConfig::default();
    config.radio.rf_frequency_hz = 2_400_000_000;
    assert_eq!(
        bench.node.engine.set_config(DemoConfig::TxCw(config)),
        Err(ConfigError::FrequencyOutOfRange(2_400_000_000))
    );
    assert_eq!(
        bench.node.engine.config(DemoKind::TxCw),
        DemoConfig::TxCw(TxCwConfig::default())
    );
}

#[test]
fn running_kind_config_is_locked() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();

    let config = DemoConfig::PingPong(PingPongConfig::default());
    assert_eq!(
        bench.node.engine.set_config(config),
        Err(ConfigError::DemoRunning(DemoKind::PingPong))
    );
    assert_eq!(
        bench.node.engine.restore_default_config(DemoKind::PingPong),
        Err(ConfigError::DemoRunning(DemoKind::PingPong))
    );

    // Other kinds stay editable
    assert!(bench
        .node
        .engine
        .set_config(DemoConfig::TxCw(TxCwConfig::default()))
        .is_ok());

    bench.node.engine.stop();
    assert!(bench.node.engine.set_config(config).is_ok());
}

#[test]
fn restore_default_config() {
    let mut bench = bench();
    let mut config = PerConfig::default();
    config.inter_packet_delay_ms = 250;
    bench.node.engine.set_config(DemoConfig::PerTx(config)).unwrap();

    bench.node.engine.restore_default_config(DemoKind::PerTx).unwrap();
    assert_eq!(
        bench.node.engine.config(DemoKind::PerTx),
        DemoConfig::PerTx(PerConfig::default())
    );
}

// =============================================================================
// Interrupts and Errors
// =============================================================================

#[test]
fn interrupt_without_running_demo_is_dropped() {
    let bench = bench();
    bench.node.engine.interrupt_handler();
    assert!(!bench.node.engine.has_pending_interrupt());
}

#[test]
fn interrupt_is_delivered_on_next_runtime() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.node.engine.interrupt_handler();
    assert!(bench.node.engine.has_pending_interrupt());

    bench.tick();
    assert!(!bench.node.engine.has_pending_interrupt());
}

#[test]
fn mailbox_posts_reach_the_running_demo() {
    let mut bench = bench();
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    bench.tick();

    bench.node.mailbox.post(IrqEvent { instant_ms: 0 });
    assert!(bench.node.engine.has_pending_interrupt());
    bench.tick();
    assert!(!bench.node.engine.has_pending_interrupt());
}

#[test]
fn mailbox_posts_without_running_demo_are_discarded() {
    let mut bench = bench();
    bench.node.mailbox.post(IrqEvent { instant_ms: 0 });
    assert_eq!(bench.tick(), DemoStatus::Idle);
    assert!(!bench.node.engine.has_pending_interrupt());

    // A stale post never leaks into the next run
    bench.node.mailbox.post(IrqEvent { instant_ms: 1 });
    bench.node.engine.start(DemoKind::PingPong).unwrap();
    assert!(!bench.node.engine.has_pending_interrupt());
}

static RADIO_IRQ: IrqMailbox = IrqMailbox::new();

#[test]
fn engine_runs_on_a_static_mailbox() {
    let bench = bench();
    let mut engine = DemoEngine::new(
        bench.air.radio(),
        bench.clock.clone(),
        RecordingSignaling::default(),
        &RADIO_IRQ,
    );
    engine.start(DemoKind::TxCw).unwrap();

    RADIO_IRQ.post(IrqEvent { instant_ms: 0 });
    assert!(engine.has_pending_interrupt());
    assert_eq!(engine.runtime(), DemoStatus::Running);
    assert!(!RADIO_IRQ.is_pending());
}

#[test]
fn rejected_configure_reports_error_status() {
    let mut bench = bench();
    bench.radio(|radio| radio.reject_configure = true);
    bench.node.engine.start(DemoKind::PingPong).unwrap();

    assert_eq!(bench.tick(), DemoStatus::Running);
    let results = bench.node.engine.fetch_results().unwrap();
    assert_eq!(results.status(), ResultStatus::Error);
    assert!(bench.node.engine.is_running());
}
