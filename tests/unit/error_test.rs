//! Tests for error types

use prometheus_process_sim::core::SchedulerError;

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("unit_micros must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: unit_micros must be greater than 0"
    );
}

#[test]
fn test_env_error() {
    let err = SchedulerError::Env {
        name: "PROCESS_SIM_SEED".to_string(),
        reason: "invalid digit found in string".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "environment variable `PROCESS_SIM_SEED` invalid: invalid digit found in string"
    );
}

#[test]
fn test_worker_error() {
    let err = SchedulerError::Worker("run thread panicked".to_string());
    assert_eq!(format!("{}", err), "worker error: run thread panicked");
}

#[test]
fn test_config_parse_error_from_serde() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = SchedulerError::from(parse);
    assert!(format!("{}", err).starts_with("config parse error:"));
}

#[test]
fn test_errors_convert_into_anyhow() {
    fn load() -> prometheus_process_sim::core::AppResult<()> {
        Err(SchedulerError::Worker("boom".into()).into())
    }
    let err = load().unwrap_err();
    assert!(err.downcast_ref::<SchedulerError>().is_some());
}
