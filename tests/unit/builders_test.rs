//! Tests for the scheduler builder

use prometheus_process_sim::builders::SchedulerBuilder;
use prometheus_process_sim::config::{DelayMode, SimulationConfig};
use prometheus_process_sim::core::{CancellationToken, JitterRange, ProcessFactory, SchedulerError};

fn instant_config() -> SimulationConfig {
    SimulationConfig {
        delay: DelayMode::Instant,
        seed: Some(1),
        ..SimulationConfig::default()
    }
}

#[test]
fn test_builder_applies_first_pid_and_jitter() {
    let config = SimulationConfig {
        first_pid: 7000,
        daemon_jitter_min: 10,
        daemon_jitter_max: 20,
        ..instant_config()
    };
    let scheduler = SchedulerBuilder::new(config).build().unwrap();

    assert_eq!(scheduler.new_cpu_process("c", "t", None).id().get(), 7000);
    assert_eq!(scheduler.jitter(), JitterRange { min: 10, max: 20 });
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = SimulationConfig {
        unit_micros: 0,
        ..SimulationConfig::default()
    };
    let builder = SchedulerBuilder::new(config);
    assert_eq!(builder.config().unit_micros, 0);
    assert!(matches!(builder.build(), Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_builder_factory_overrides_first_pid() {
    let factory = ProcessFactory::starting_at(42);
    let scheduler = SchedulerBuilder::new(instant_config())
        .with_factory(factory)
        .build()
        .unwrap();
    assert_eq!(scheduler.new_io_process("i", "disk", None).id().get(), 42);
}

#[test]
fn test_builder_shares_cancellation_token() {
    let cancel = CancellationToken::new();
    let scheduler = SchedulerBuilder::new(instant_config())
        .with_cancellation(cancel.clone())
        .build()
        .unwrap();

    cancel.cancel();
    assert!(scheduler.cancellation_token().is_cancelled());
}

#[test]
fn test_seeded_builders_produce_identical_daemon_runs() {
    let run = || {
        let mut scheduler = SchedulerBuilder::new(instant_config()).with_seed(9).build().unwrap();
        scheduler.enqueue(Some(scheduler.new_daemon_process("d", "scan", Some(10))));
        scheduler
            .run_all()
            .unwrap()
            .reports
            .into_iter()
            .map(|r| r.waited_units)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
