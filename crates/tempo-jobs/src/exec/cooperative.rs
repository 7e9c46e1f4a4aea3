//! Cooperative strategy: all async jobs share one current-thread tokio
//! runtime hosted on a dedicated OS thread. Jobs interleave at their await
//! points and never run concurrently with each other.
//!
//! Cancellation is cooperative: a watch channel flips, every job task
//! returns at its pending wait, and the loop thread joins once all tasks
//! have settled.

use std::thread;

use chrono::Utc;
use tokio::sync::watch;

use crate::error::{JobError, Result};
use crate::job::{report_outcome, ExecutionStrategy, Job, RunState, StateCell};
use crate::payload::{AsyncTask, Payload};

pub struct EventLoop {
    shutdown: watch::Sender<bool>,
    states: Vec<StateCell>,
    thread: Option<thread::JoinHandle<()>>,
}

/// Start the shared event loop with every cooperative job on it.
pub fn start(jobs: Vec<Job>) -> Result<EventLoop> {
    let mut prepared = Vec::with_capacity(jobs.len());
    for job in jobs {
        let Payload::Task(task) = job.payload.clone() else {
            return Err(JobError::StrategyMismatch {
                name: job.name().to_string(),
                expected: ExecutionStrategy::Cooperative,
            });
        };
        job.mark_started()?;
        prepared.push((job, task));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let states: Vec<StateCell> = prepared.iter().map(|(job, _)| job.state.clone()).collect();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let thread = thread::Builder::new()
        .name("tempo-event-loop".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let mut tasks = Vec::with_capacity(prepared.len());
                for (job, task) in prepared {
                    tasks.push(tokio::spawn(run_loop(job, task, shutdown_rx.clone())));
                }
                for task in tasks {
                    let _ = task.await;
                }
            });
        })?;

    Ok(EventLoop {
        shutdown: shutdown_tx,
        states,
        thread: Some(thread),
    })
}

async fn run_loop(job: Job, task: AsyncTask, mut shutdown: watch::Receiver<bool>) {
    loop {
        let Some(delay) = job.interval.delay_from(Utc::now()) else {
            job.reporter
                .error(job.name(), "interval source is exhausted; stopping job");
            break;
        };
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                report_outcome(job.reporter.as_ref(), job.name(), &task().await);
            }
            changed = shutdown.changed() => {
                // A closed channel means the loop owner is gone; treat it
                // like a stop request.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    job.state.advance(RunState::Stopped);
}

impl EventLoop {
    /// Cancel every pending wait and block until the loop thread has
    /// drained all job tasks. No-op when already stopped.
    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            for state in &self.states {
                state.advance(RunState::StopRequested);
            }
            let _ = self.shutdown.send(true);
            let _ = thread.join();
        }
    }

    pub fn job_count(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> Vec<RunState> {
        self.states.iter().map(StateCell::get).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingReporter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_job(
        name: &str,
        interval_ms: u64,
        counter: Arc<AtomicUsize>,
        reporter: Arc<RecordingReporter>,
    ) -> Job {
        Job::builder()
            .name(name)
            .every(Duration::from_millis(interval_ms))
            .task(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Some("tick".to_string()))
                }
            })
            .reporter(reporter)
            .build()
            .unwrap()
    }

    #[test]
    fn jobs_share_the_loop_and_stop_together() {
        let reporter = Arc::new(RecordingReporter::default());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let jobs = vec![
            counting_job("first", 20, Arc::clone(&first), reporter.clone()),
            counting_job("second", 30, Arc::clone(&second), reporter.clone()),
        ];

        let mut event_loop = start(jobs).unwrap();
        assert_eq!(event_loop.job_count(), 2);
        thread::sleep(Duration::from_millis(150));
        event_loop.stop();

        assert!(first.load(Ordering::SeqCst) >= 2);
        assert!(second.load(Ordering::SeqCst) >= 1);
        assert!(event_loop
            .states()
            .iter()
            .all(|state| *state == RunState::Stopped));

        // Nothing fires once the loop is gone.
        let before = first.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(first.load(Ordering::SeqCst), before);
    }

    #[test]
    fn failing_task_keeps_its_schedule() {
        let reporter = Arc::new(RecordingReporter::default());
        let job = Job::builder()
            .name("doomed")
            .every(Duration::from_millis(20))
            .task(|| async { Err(anyhow::anyhow!("boom")) })
            .reporter(reporter.clone())
            .build()
            .unwrap();

        let mut event_loop = start(vec![job]).unwrap();
        thread::sleep(Duration::from_millis(130));
        event_loop.stop();

        assert!(reporter.errors() >= 2);
        assert_eq!(reporter.infos(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let reporter = Arc::new(RecordingReporter::default());
        let counter = Arc::new(AtomicUsize::new(0));
        let job = counting_job("tick", 20, counter, reporter);

        let mut event_loop = start(vec![job]).unwrap();
        event_loop.stop();
        event_loop.stop();
        assert_eq!(event_loop.states(), vec![RunState::Stopped]);
    }

    #[test]
    fn start_rejects_foreign_payloads() {
        let job = Job::builder()
            .every(Duration::from_millis(20))
            .blocking_task(|| Ok(None))
            .build()
            .unwrap();
        assert!(matches!(
            start(vec![job]),
            Err(JobError::StrategyMismatch { .. })
        ));
    }
}
