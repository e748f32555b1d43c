//! Configuration models for the simulation.

pub mod simulation;

pub use simulation::{DelayMode, SimulationConfig, ENV_PREFIX};
