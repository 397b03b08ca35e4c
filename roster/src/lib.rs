//! Core of the roster service: a high-throughput HTTP endpoint answering
//! short name-list lookups under latency, fairness, and overload-protection
//! contracts.
//!
//! The interesting parts are the cooperating subsystems behind the thin
//! payload: the sharded expiring cache (`roster-cache`), the composite
//! admission limiter (`roster-limit`), the bounded [`pool::WorkerPool`],
//! the [`metrics::MetricsCollector`], and the request pipeline in
//! [`server`] that wires them together per request.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod names;
pub mod pool;
pub mod server;
