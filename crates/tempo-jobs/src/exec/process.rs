//! Process-isolated strategy: a supervisor thread drives the interval loop
//! and runs the job's command in a child OS process each firing.
//!
//! The child's output is relayed back through the job's reporter. On stop,
//! an in-flight child gets a grace period to finish on its own; after that
//! it is killed with SIGKILL.

use std::process::Stdio;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{oneshot, watch};

use crate::error::{JobError, Result};
use crate::job::{ExecutionStrategy, Job, RunState, StateCell};
use crate::payload::{CommandSpec, Payload};

pub struct ProcessHandle {
    name: String,
    shutdown: watch::Sender<bool>,
    state: StateCell,
    thread: Option<thread::JoinHandle<()>>,
}

/// Start `job`'s supervisor. The job must carry a command payload.
///
/// `grace` bounds how long a child may keep running after a stop request
/// before it is forcibly terminated.
pub fn spawn(job: Job, grace: Duration) -> Result<ProcessHandle> {
    let Payload::Command(spec) = job.payload.clone() else {
        return Err(JobError::StrategyMismatch {
            name: job.name().to_string(),
            expected: ExecutionStrategy::ProcessIsolated,
        });
    };
    job.mark_started()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let name = job.name().to_string();
    let state = job.state.clone();

    // The supervisor needs timers and process reaping, so it hosts a small
    // current-thread runtime of its own.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let thread = thread::Builder::new()
        .name(format!("tempo-supervisor-{name}"))
        .spawn(move || {
            runtime.block_on(supervise(job, spec, shutdown_rx, grace));
        })?;

    Ok(ProcessHandle {
        name,
        shutdown: shutdown_tx,
        state,
        thread: Some(thread),
    })
}

async fn supervise(
    job: Job,
    spec: CommandSpec,
    mut shutdown: watch::Receiver<bool>,
    grace: Duration,
) {
    loop {
        let Some(delay) = job.interval.delay_from(Utc::now()) else {
            job.reporter
                .error(job.name(), "interval source is exhausted; stopping job");
            break;
        };
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                run_child(&job, &spec, &mut shutdown, grace).await;
                if shutdown.has_changed().is_err() || *shutdown.borrow() {
                    break;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    job.state.advance(RunState::Stopped);
}

async fn run_child(
    job: &Job,
    spec: &CommandSpec,
    shutdown: &mut watch::Receiver<bool>,
    grace: Duration,
) {
    let mut command = tokio::process::Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in &spec.envs {
        command.env(key, value);
    }

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            job.reporter
                .error(job.name(), &format!("failed to spawn {}: {e}", spec.program));
            return;
        }
    };
    let pid = child.id();

    // `wait_with_output` takes the child by value, so drive it on a task
    // and keep the pid around for the kill path.
    let (done_tx, mut done_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = done_tx.send(child.wait_with_output().await);
    });

    tokio::select! {
        result = &mut done_rx => report_child(job, result),
        _ = shutdown.changed() => {
            match tokio::time::timeout(grace, &mut done_rx).await {
                Ok(result) => report_child(job, result),
                Err(_elapsed) => {
                    if let Some(pid) = pid {
                        // SAFETY: pid belongs to our direct child, which is
                        // still running.
                        unsafe {
                            libc::kill(pid as libc::pid_t, libc::SIGKILL);
                        }
                    }
                    job.reporter.error(
                        job.name(),
                        "child did not exit within the grace period; killed",
                    );
                    // Let the waiter task reap the killed child.
                    let _ = done_rx.await;
                }
            }
        }
    }
}

fn report_child(
    job: &Job,
    result: std::result::Result<std::io::Result<std::process::Output>, oneshot::error::RecvError>,
) {
    match result {
        Ok(Ok(output)) => {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let trimmed = stdout.trim();
                job.reporter
                    .info(job.name(), if trimmed.is_empty() { "done" } else { trimmed });
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                job.reporter.error(
                    job.name(),
                    &format!("exited with {}: {}", output.status, stderr.trim()),
                );
            }
        }
        Ok(Err(e)) => job
            .reporter
            .error(job.name(), &format!("wait failed: {e}")),
        Err(_) => job
            .reporter
            .error(job.name(), "child wait task dropped before completing"),
    }
}

impl ProcessHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Interrupt the wait, give an in-flight child its grace period, and
    /// block until the supervisor thread has terminated. No-op when
    /// already stopped.
    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.state.advance(RunState::StopRequested);
            let _ = self.shutdown.send(true);
            let _ = thread.join();
        }
    }
}
