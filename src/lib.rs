//! # Prometheus Process Sim
//!
//! A single-queue process scheduler simulation.
//!
//! Heterogeneous simulated processes are enqueued, then run to completion in
//! submission order. Each process produces a synthetic execution delay derived
//! from its own parameters, and the scheduler aggregates run counts and
//! planning estimates.
//!
//! ## Process Kinds
//!
//! The set of kinds is closed:
//!
//! - **CPU**: `intensity` steps (1..=5), each waiting `200 + 50·intensity` units
//! - **I/O**: `operations` steps (at least 1), each blocking for 400 units
//! - **Daemon**: `cycles` steps (at least 1), each waiting a random 150..=250 units
//!
//! Invalid magnitudes are clamped and blank labels defaulted; nothing in the
//! core rejects input.
//!
//! ## Timing and Cancellation
//!
//! Every step wait goes through an injectable [`core::Delay`]. Real-time runs
//! use [`core::ThreadDelay`]; tests use [`core::InstantDelay`] or
//! [`core::VirtualClock`]. A [`core::CancellationToken`] interrupts the process
//! currently executing; the pass carries on with the next one.
//!
//! ```rust,ignore
//! use prometheus_process_sim::core::{InstantDelay, Scheduler};
//!
//! let mut scheduler = Scheduler::builder()
//!     .with_delay(InstantDelay)
//!     .with_seed(7)
//!     .build()?;
//!
//! let encode = scheduler.new_cpu_process("enc", "encode", Some(10));
//! assert_eq!(encode.estimated_duration(), 2250);
//! scheduler.enqueue(Some(encode));
//!
//! let summary = scheduler.run_all().expect("queue is not empty");
//! assert_eq!(summary.run_number, 1);
//! ```
//!
//! ## Running Off-Thread
//!
//! [`runtime::SharedScheduler`] serializes scheduler access behind one lock and
//! can start a pass on a worker thread while the caller keeps a cancellation
//! handle. With the `tokio-runtime` feature, [`runtime::TokioRunner`] runs a
//! pass on tokio's blocking pool.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core simulation abstractions: processes, delays, identity and the scheduler.
pub mod core;
/// Configuration models for the simulation.
pub mod config;
/// Builders to construct a scheduler from configuration.
pub mod builders;
/// Runtime adapters for running passes off the caller's thread.
pub mod runtime;
/// Shared utilities.
pub mod util;
