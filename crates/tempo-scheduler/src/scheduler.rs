use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use tempo_core::TempoConfig;
use tempo_jobs::exec::{cooperative, process, threaded, EventLoop, ProcessHandle, ThreadedHandle};
use tempo_jobs::{ExecutionStrategy, Job};
use tracing::info;

use crate::error::{Result, SchedulerError};
use crate::signal;

/// Owns a set of jobs across all three execution strategies and drives
/// their collective startup and shutdown.
///
/// Jobs are registered with [`add_job`](Self::add_job) before
/// [`run`](Self::run); the groups are frozen once running. Stopping —
/// whether explicit or signal-driven — stops every job and waits for its
/// substrate to confirm termination.
pub struct Scheduler {
    config: TempoConfig,
    cooperative: Vec<Job>,
    threaded: Vec<Job>,
    process: Vec<Job>,
    running: Option<RunningSet>,
}

/// Handles for everything started by `run`.
#[derive(Default)]
struct RunningSet {
    event_loop: Option<EventLoop>,
    threads: Vec<ThreadedHandle>,
    processes: Vec<ProcessHandle>,
}

impl RunningSet {
    fn stop_all(&mut self) {
        for handle in &mut self.threads {
            handle.stop();
        }
        for handle in &mut self.processes {
            handle.stop();
        }
        if let Some(event_loop) = self.event_loop.as_mut() {
            event_loop.stop();
        }
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(TempoConfig::default())
    }

    pub fn with_config(config: TempoConfig) -> Self {
        Self {
            config,
            cooperative: Vec::new(),
            threaded: Vec::new(),
            process: Vec::new(),
            running: None,
        }
    }

    /// Register a job, routing it to its strategy group.
    ///
    /// Fails with [`SchedulerError::AlreadyRunning`] once `run` has been
    /// called — the job set is read-only while running.
    pub fn add_job(&mut self, job: Job) -> Result<()> {
        if self.running.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        match job.strategy() {
            ExecutionStrategy::Cooperative => self.cooperative.push(job),
            ExecutionStrategy::Threaded => self.threaded.push(job),
            ExecutionStrategy::ProcessIsolated => self.process.push(job),
        }
        Ok(())
    }

    /// Number of jobs registered and not yet started.
    pub fn pending_jobs(&self) -> usize {
        self.cooperative.len() + self.threaded.len() + self.process.len()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start every registered job on its substrate.
    ///
    /// With `block` set, installs SIGINT/SIGTERM handlers and parks the
    /// calling thread in a poll loop until a termination signal arrives,
    /// then stops all jobs before returning. With `block` unset, returns
    /// immediately; the caller owns the eventual [`stop`](Self::stop).
    ///
    /// Running with zero registered jobs is a no-op, not an error.
    pub fn run(&mut self, block: bool) -> Result<()> {
        if self.running.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.pending_jobs() == 0 {
            info!("no jobs registered; nothing to run");
            return Ok(());
        }

        let grace = Duration::from_secs(self.config.scheduler.kill_grace_secs);
        let mut set = RunningSet::default();

        for job in self.threaded.drain(..) {
            match threaded::spawn(job) {
                Ok(handle) => set.threads.push(handle),
                Err(e) => {
                    set.stop_all();
                    return Err(e.into());
                }
            }
        }
        for job in self.process.drain(..) {
            match process::spawn(job, grace) {
                Ok(handle) => set.processes.push(handle),
                Err(e) => {
                    set.stop_all();
                    return Err(e.into());
                }
            }
        }
        if !self.cooperative.is_empty() {
            let jobs: Vec<Job> = self.cooperative.drain(..).collect();
            match cooperative::start(jobs) {
                Ok(event_loop) => set.event_loop = Some(event_loop),
                Err(e) => {
                    set.stop_all();
                    return Err(e.into());
                }
            }
        }

        info!(
            threads = set.threads.len(),
            processes = set.processes.len(),
            cooperative = set.event_loop.as_ref().map_or(0, EventLoop::job_count),
            "scheduler started"
        );
        self.running = Some(set);

        if block {
            self.block_until_terminated()?;
        }
        Ok(())
    }

    /// Park the calling thread until a termination signal flips the
    /// shutdown flag, then stop everything.
    fn block_until_terminated(&mut self) -> Result<()> {
        let flag = signal::install_termination_flag()?;
        let tick = Duration::from_secs(self.config.scheduler.poll_interval_secs.max(1));
        while !flag.load(Ordering::SeqCst) {
            thread::sleep(tick);
        }
        info!("termination signal received; stopping jobs");
        self.stop();
        Ok(())
    }

    /// Stop every running job and wait until each substrate has
    /// terminated. Idempotent: a second call (or a call on a scheduler
    /// that never ran) returns immediately.
    pub fn stop(&mut self) {
        if let Some(mut set) = self.running.take() {
            set.stop_all();
            info!("all jobs stopped");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // A dropped scheduler takes its jobs down with it rather than
        // leaking detached substrates.
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempo_jobs::CommandSpec;

    fn threaded_job() -> Job {
        Job::builder()
            .every(Duration::from_millis(50))
            .blocking_task(|| Ok(None))
            .build()
            .unwrap()
    }

    #[test]
    fn add_job_routes_by_strategy() {
        let mut scheduler = Scheduler::new();
        scheduler.add_job(threaded_job()).unwrap();
        scheduler
            .add_job(
                Job::builder()
                    .every(Duration::from_millis(50))
                    .task(|| async { Ok(None) })
                    .build()
                    .unwrap(),
            )
            .unwrap();
        scheduler
            .add_job(
                Job::builder()
                    .every(Duration::from_millis(50))
                    .command(CommandSpec::new("true"))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(scheduler.pending_jobs(), 3);
        assert_eq!(scheduler.cooperative.len(), 1);
        assert_eq!(scheduler.threaded.len(), 1);
        assert_eq!(scheduler.process.len(), 1);
    }

    #[test]
    fn run_with_zero_jobs_is_a_noop() {
        let mut scheduler = Scheduler::new();
        scheduler.run(true).unwrap();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn run_twice_fails() {
        let mut scheduler = Scheduler::new();
        scheduler.add_job(threaded_job()).unwrap();
        scheduler.run(false).unwrap();
        scheduler.add_job(threaded_job()).unwrap_err();
        assert!(matches!(
            scheduler.run(false),
            Err(SchedulerError::AlreadyRunning)
        ));
        scheduler.stop();
    }

    #[test]
    fn add_job_after_run_is_rejected() {
        let mut scheduler = Scheduler::new();
        scheduler.add_job(threaded_job()).unwrap();
        scheduler.run(false).unwrap();
        assert!(matches!(
            scheduler.add_job(threaded_job()),
            Err(SchedulerError::AlreadyRunning)
        ));
        scheduler.stop();
    }
}
