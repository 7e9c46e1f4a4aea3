//! `tempo-scheduler` — lifecycle owner for a set of periodic jobs.
//!
//! A [`Scheduler`] collects jobs before it runs, partitioned by execution
//! strategy, then starts each group on its substrate: threaded jobs on
//! their own OS threads, process-isolated jobs under their supervisors,
//! and all cooperative jobs on one shared event loop. `run(true)` blocks
//! the caller in a coarse poll loop and turns SIGINT/SIGTERM into a clean,
//! bounded-time shutdown; `run(false)` returns immediately and leaves
//! stopping to the caller.
//!
//! A job whose payload fails stays scheduled — failures are contained in
//! the job loops and surface only as error records. Stopping is idempotent
//! and waits for every substrate to confirm termination.

pub mod error;
pub mod scheduler;
mod signal;

pub use error::{Result, SchedulerError};
pub use scheduler::Scheduler;
