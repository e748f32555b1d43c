//! Tests for configuration validation and loading

use prometheus_process_sim::config::{DelayMode, SimulationConfig};
use prometheus_process_sim::core::{JitterRange, SchedulerError, MAX_FIRST_PID};

#[test]
fn test_default_config_is_valid() {
    let config = SimulationConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.first_pid, 1000);
    assert_eq!(config.delay, DelayMode::Realtime);
    assert_eq!(config.unit_micros, 1000);
    assert_eq!(config.jitter(), JitterRange::DEFAULT);
    assert_eq!(config.seed, None);
}

#[test]
fn test_zero_unit_rejected_for_realtime() {
    let invalid = SimulationConfig {
        unit_micros: 0,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        invalid.validate(),
        Err(SchedulerError::InvalidConfig(_))
    ));

    let instant = SimulationConfig {
        unit_micros: 0,
        delay: DelayMode::Instant,
        ..SimulationConfig::default()
    };
    assert!(instant.validate().is_ok());
}

#[test]
fn test_inverted_jitter_rejected() {
    let invalid = SimulationConfig {
        daemon_jitter_min: 300,
        daemon_jitter_max: 100,
        ..SimulationConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_first_pid_bounded() {
    let at_limit = SimulationConfig {
        first_pid: MAX_FIRST_PID,
        ..SimulationConfig::default()
    };
    assert!(at_limit.validate().is_ok());

    let invalid = SimulationConfig {
        first_pid: u64::MAX,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        invalid.validate(),
        Err(SchedulerError::InvalidConfig(_))
    ));
    assert!(SimulationConfig::from_vars([("PROCESS_SIM_FIRST_PID", u64::MAX.to_string())]).is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "first_pid": 5000,
        "delay": "instant",
        "daemon_jitter_min": 100,
        "daemon_jitter_max": 120,
        "seed": 42
    }"#;

    let config = SimulationConfig::from_json_str(json).unwrap();
    assert_eq!(config.first_pid, 5000);
    assert_eq!(config.delay, DelayMode::Instant);
    assert_eq!(config.unit_micros, 1000);
    assert_eq!(config.jitter(), JitterRange { min: 100, max: 120 });
    assert_eq!(config.seed, Some(42));
}

#[test]
fn test_config_from_json_validates() {
    let json = r#"{ "daemon_jitter_min": 10, "daemon_jitter_max": 5 }"#;
    assert!(matches!(
        SimulationConfig::from_json_str(json),
        Err(SchedulerError::InvalidConfig(_))
    ));
    assert!(matches!(
        SimulationConfig::from_json_str("not json"),
        Err(SchedulerError::ConfigParse(_))
    ));
}

#[test]
fn test_config_from_vars() {
    let vars = [
        ("PROCESS_SIM_FIRST_PID", "2000"),
        ("PROCESS_SIM_DELAY", "Instant"),
        ("PROCESS_SIM_SEED", "7"),
        ("PROCESS_SIM_DAEMON_JITTER_MAX", "300"),
        ("HOME", "/root"),
    ];
    let config = SimulationConfig::from_vars(vars).unwrap();
    assert_eq!(config.first_pid, 2000);
    assert_eq!(config.delay, DelayMode::Instant);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.jitter(), JitterRange { min: 150, max: 300 });
}

#[test]
fn test_config_from_vars_rejects_bad_values() {
    let err = SimulationConfig::from_vars([("PROCESS_SIM_UNIT_MICROS", "fast")]).unwrap_err();
    match err {
        SchedulerError::Env { name, .. } => assert_eq!(name, "PROCESS_SIM_UNIT_MICROS"),
        other => panic!("unexpected error: {other}"),
    }

    assert!(SimulationConfig::from_vars([("PROCESS_SIM_DELAY", "sometimes")]).is_err());
}

#[test]
fn test_empty_seed_means_entropy() {
    let config = SimulationConfig::from_vars([("PROCESS_SIM_SEED", "")]).unwrap();
    assert_eq!(config.seed, None);
}
