//! `tempo-core` — shared configuration and reporting seam for the tempo
//! periodic-task runner.
//!
//! The other tempo crates depend on this one for:
//!
//! * [`TempoConfig`] — TOML + `TEMPO_*` env configuration,
//! * [`Reporter`] — the leveled sink job outcomes are routed through,
//! * [`telemetry::init`] — tracing bootstrap for host applications.

pub mod config;
pub mod error;
pub mod report;
pub mod telemetry;

pub use config::{SchedulerSettings, TempoConfig};
pub use error::{Result, TempoError};
pub use report::{Reporter, TracingReporter};
