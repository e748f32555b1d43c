//! Builder to construct a scheduler from configuration.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{DelayMode, SimulationConfig};
use crate::core::{
    AuditSink, CancellationToken, Delay, InstantDelay, ProcessFactory, Scheduler, SchedulerError,
    ThreadDelay,
};

/// Assembles a [`Scheduler`] from a [`SimulationConfig`] plus optional
/// injected collaborators (delay, factory, audit sink, cancellation token).
#[derive(Default)]
pub struct SchedulerBuilder {
    config: SimulationConfig,
    delay: Option<Arc<dyn Delay>>,
    factory: Option<ProcessFactory>,
    audit: Option<Box<dyn AuditSink>>,
    cancel: Option<CancellationToken>,
}

impl SchedulerBuilder {
    /// Start from `config`.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration the scheduler will be built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Use `delay` instead of the one selected by the configured `DelayMode`.
    pub fn with_delay<D: Delay + 'static>(self, delay: D) -> Self {
        self.with_shared_delay(Arc::new(delay))
    }

    /// Use an already shared delay, e.g. a `VirtualClock` the caller inspects.
    pub fn with_shared_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Seed the daemon jitter source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Draw identities from `factory` instead of a fresh generator.
    pub fn with_factory(mut self, factory: ProcessFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Forward execution events to `audit`.
    pub fn with_audit<A: AuditSink + 'static>(mut self, audit: A) -> Self {
        self.audit = Some(Box::new(audit));
        self
    }

    /// Share `cancel` with the scheduler.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validate the configuration and build.
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        self.config.validate()?;
        Ok(self.build_unchecked())
    }

    pub(crate) fn build_unchecked(self) -> Scheduler {
        let Self {
            config,
            delay,
            factory,
            audit,
            cancel,
        } = self;

        let delay = delay.unwrap_or_else(|| match config.delay {
            DelayMode::Realtime => Arc::new(ThreadDelay::new(config.unit_micros)),
            DelayMode::Instant => Arc::new(InstantDelay),
        });
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let factory = factory.unwrap_or_else(|| ProcessFactory::starting_at(config.first_pid));
        tracing::debug!(
            delay = ?config.delay,
            unit_micros = config.unit_micros,
            seeded = config.seed.is_some(),
            first_pid = %factory.next_pid(),
            "building scheduler"
        );

        Scheduler::from_parts(
            factory,
            delay,
            cancel.unwrap_or_default(),
            rng,
            config.jitter(),
            audit,
        )
    }
}

impl std::fmt::Debug for SchedulerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerBuilder")
            .field("config", &self.config)
            .field("custom_delay", &self.delay.is_some())
            .field("factory", &self.factory)
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}
