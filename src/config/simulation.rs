//! Simulation configuration structures.

use serde::{Deserialize, Serialize};

use crate::builders::SchedulerBuilder;
use crate::core::identity::{FIRST_PID, MAX_FIRST_PID};
use crate::core::process::JitterRange;
use crate::core::SchedulerError;

/// Prefix of every environment variable read by [`SimulationConfig::from_env`].
pub const ENV_PREFIX: &str = "PROCESS_SIM_";

/// How simulated step delays are realised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayMode {
    /// Block the running thread for the simulated duration.
    Realtime,
    /// Return immediately; useful for tests and batch simulations.
    Instant,
}

/// Root simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// First PID handed out; at most [`MAX_FIRST_PID`].
    pub first_pid: u64,
    /// Delay realisation.
    pub delay: DelayMode,
    /// Wall-clock length of one simulated unit, in microseconds.
    pub unit_micros: u64,
    /// Shortest daemon cycle, in units.
    pub daemon_jitter_min: u64,
    /// Longest daemon cycle, in units.
    pub daemon_jitter_max: u64,
    /// Seed for the daemon jitter source; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            first_pid: FIRST_PID,
            delay: DelayMode::Realtime,
            unit_micros: 1_000,
            daemon_jitter_min: JitterRange::DEFAULT.min,
            daemon_jitter_max: JitterRange::DEFAULT.max,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.first_pid > MAX_FIRST_PID {
            return Err(SchedulerError::InvalidConfig(format!(
                "first_pid ({}) exceeds {MAX_FIRST_PID}",
                self.first_pid
            )));
        }
        if self.delay == DelayMode::Realtime && self.unit_micros == 0 {
            return Err(SchedulerError::InvalidConfig(
                "unit_micros must be greater than 0 for realtime delays".into(),
            ));
        }
        if self.daemon_jitter_min > self.daemon_jitter_max {
            return Err(SchedulerError::InvalidConfig(format!(
                "daemon_jitter_min ({}) exceeds daemon_jitter_max ({})",
                self.daemon_jitter_min, self.daemon_jitter_max
            )));
        }
        Ok(())
    }

    /// Builder seeded with this configuration.
    pub fn into_builder(self) -> SchedulerBuilder {
        SchedulerBuilder::new(self)
    }

    /// Daemon cycle range described by this configuration.
    pub const fn jitter(&self) -> JitterRange {
        JitterRange::new(self.daemon_jitter_min, self.daemon_jitter_max)
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `PROCESS_SIM_*` environment variables, reading
    /// a `.env` file first when one exists. Unset variables keep defaults.
    pub fn from_env() -> Result<Self, SchedulerError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(name, value)` pairs; names without the
    /// `PROCESS_SIM_` prefix are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, SchedulerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Self::default();
        for (name, value) in vars {
            let name = name.as_ref();
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match key {
                "FIRST_PID" => cfg.first_pid = parse_var(name, value)?,
                "DELAY" => cfg.delay = parse_delay(name, value)?,
                "UNIT_MICROS" => cfg.unit_micros = parse_var(name, value)?,
                "DAEMON_JITTER_MIN" => cfg.daemon_jitter_min = parse_var(name, value)?,
                "DAEMON_JITTER_MAX" => cfg.daemon_jitter_max = parse_var(name, value)?,
                "SEED" => {
                    cfg.seed = if value.is_empty() {
                        None
                    } else {
                        Some(parse_var(name, value)?)
                    };
                }
                _ => tracing::debug!("ignoring unknown variable {name}"),
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, SchedulerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| SchedulerError::Env {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}

fn parse_delay(name: &str, value: &str) -> Result<DelayMode, SchedulerError> {
    match value.to_ascii_lowercase().as_str() {
        "realtime" => Ok(DelayMode::Realtime),
        "instant" => Ok(DelayMode::Instant),
        other => Err(SchedulerError::Env {
            name: name.to_owned(),
            reason: format!("expected `realtime` or `instant`, got `{other}`"),
        }),
    }
}
