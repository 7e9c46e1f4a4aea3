//! `tempo-jobs` — periodic units of work and the substrates that run them.
//!
//! A [`Job`] couples an [`IntervalSource`] (fixed duration or calendar
//! [`tempo_period::Period`]) with a payload and one of three execution
//! strategies:
//!
//! | Strategy          | Substrate                                          |
//! |-------------------|----------------------------------------------------|
//! | `Cooperative`     | task on a shared single-threaded event loop        |
//! | `Threaded`        | dedicated OS thread, interruptible blocking wait   |
//! | `ProcessIsolated` | child OS process per firing, killed after a grace  |
//!
//! Every strategy runs the same loop: ask the interval source how long to
//! wait, wait interruptibly, invoke the payload, and route the outcome to
//! the job's [`tempo_core::Reporter`] — results as info records, failures
//! as error records. A failing payload never terminates the loop; only a
//! stop request does.

pub mod descriptor;
pub mod error;
pub mod exec;
pub mod interval;
pub mod job;
mod manual;
pub mod payload;
#[cfg(test)]
pub(crate) mod testutil;

pub use descriptor::JobDescriptor;
pub use error::{JobError, Result};
pub use interval::IntervalSource;
pub use job::{ExecutionStrategy, Job, JobBuilder, RunState};
pub use manual::run_once;
pub use payload::{CommandSpec, Payload, TaskOutcome};
