//! Threaded strategy: one OS thread per job, waiting on a stop channel.
//!
//! The interruptible wait is `recv_timeout` on the channel — a message (or
//! a disconnected sender) means stop, a timeout means the interval elapsed
//! and the payload fires.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use chrono::Utc;

use crate::error::{JobError, Result};
use crate::job::{report_outcome, ExecutionStrategy, Job, RunState, StateCell};
use crate::payload::Payload;

pub struct ThreadedHandle {
    name: String,
    stop_tx: mpsc::Sender<()>,
    state: StateCell,
    thread: Option<thread::JoinHandle<()>>,
}

/// Start `job` on its own thread. The job must carry a blocking payload.
pub fn spawn(job: Job) -> Result<ThreadedHandle> {
    let Payload::Blocking(task) = job.payload.clone() else {
        return Err(JobError::StrategyMismatch {
            name: job.name().to_string(),
            expected: ExecutionStrategy::Threaded,
        });
    };
    job.mark_started()?;

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let name = job.name().to_string();
    let state = job.state.clone();

    let thread = thread::Builder::new()
        .name(format!("tempo-job-{name}"))
        .spawn(move || {
            loop {
                let Some(delay) = job.interval.delay_from(Utc::now()) else {
                    job.reporter
                        .error(job.name(), "interval source is exhausted; stopping job");
                    break;
                };
                match stop_rx.recv_timeout(delay) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        report_outcome(job.reporter.as_ref(), job.name(), &task());
                    }
                }
            }
            job.state.advance(RunState::Stopped);
        })?;

    Ok(ThreadedHandle {
        name,
        stop_tx,
        state,
        thread: Some(thread),
    })
}

impl ThreadedHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Interrupt the wait and block until the thread has terminated.
    /// Calling this on an already-stopped handle is a no-op.
    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.state.advance(RunState::StopRequested);
            let _ = self.stop_tx.send(());
            let _ = thread.join();
        }
    }
}
