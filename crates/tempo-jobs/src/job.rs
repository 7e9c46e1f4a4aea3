use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tempo_core::report::{Reporter, TracingReporter};
use tempo_period::Period;
use uuid::Uuid;

use crate::error::{JobError, Result};
use crate::interval::IntervalSource;
use crate::payload::{CommandSpec, Payload, TaskOutcome};

/// How a job's loop is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStrategy {
    /// Task on the shared single-threaded event loop.
    Cooperative,
    /// Dedicated OS thread.
    Threaded,
    /// Supervised child OS process per firing.
    ProcessIsolated,
}

/// Lifecycle of a job. Transitions are monotonic: once running, a job never
/// returns to idle; once stopped, it stays stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
    StopRequested = 2,
    Stopped = 3,
}

/// Shared, monotonic run-state cell. Cloned into whatever context hosts the
/// job loop so both sides observe the same lifecycle.
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(RunState::Idle as u8)))
    }

    pub(crate) fn get(&self) -> RunState {
        match self.0.load(Ordering::SeqCst) {
            0 => RunState::Idle,
            1 => RunState::Running,
            2 => RunState::StopRequested,
            _ => RunState::Stopped,
        }
    }

    /// Move forward to `state`; later states win, earlier ones are ignored.
    pub(crate) fn advance(&self, state: RunState) {
        self.0.fetch_max(state as u8, Ordering::SeqCst);
    }
}

/// One periodic unit of work.
///
/// Construct with [`Job::builder`]; a job without an interval source or a
/// payload does not build. The strategy is fixed by the payload shape and
/// never changes over the job's lifetime.
pub struct Job {
    id: Uuid,
    name: String,
    pub(crate) interval: IntervalSource,
    pub(crate) payload: Payload,
    pub(crate) reporter: Arc<dyn Reporter>,
    pub(crate) state: StateCell,
}

impl Job {
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.payload.strategy()
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Guard for the started-exactly-once invariant: flips Idle → Running,
    /// errors on any later state.
    pub(crate) fn mark_started(&self) -> Result<()> {
        if self.state.get() != RunState::Idle {
            return Err(JobError::AlreadyStarted {
                name: self.name.clone(),
            });
        }
        self.state.advance(RunState::Running);
        Ok(())
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("strategy", &self.strategy())
            .field("state", &self.state.get())
            .finish()
    }
}

/// Builder for [`Job`]. Exactly one of [`task`](Self::task),
/// [`blocking_task`](Self::blocking_task), or [`command`](Self::command)
/// supplies the payload; setting another replaces the previous one.
#[derive(Default)]
pub struct JobBuilder {
    name: Option<String>,
    interval: Option<IntervalSource>,
    payload: Option<Payload>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl JobBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fire at a fixed interval.
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = Some(IntervalSource::Fixed(interval));
        self
    }

    /// Fire on a calendar period.
    pub fn period(mut self, period: Period) -> Self {
        self.interval = Some(IntervalSource::Calendar(period));
        self
    }

    /// Async payload — the job becomes [`ExecutionStrategy::Cooperative`].
    pub fn task<F, Fut>(mut self, task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskOutcome> + Send + 'static,
    {
        self.payload = Some(Payload::Task(Arc::new(
            move || -> BoxFuture<'static, TaskOutcome> { Box::pin(task()) },
        )));
        self
    }

    /// Blocking payload — the job becomes [`ExecutionStrategy::Threaded`].
    pub fn blocking_task<F>(mut self, task: F) -> Self
    where
        F: Fn() -> TaskOutcome + Send + Sync + 'static,
    {
        self.payload = Some(Payload::Blocking(Arc::new(task)));
        self
    }

    /// External command payload — the job becomes
    /// [`ExecutionStrategy::ProcessIsolated`].
    pub fn command(mut self, spec: CommandSpec) -> Self {
        self.payload = Some(Payload::Command(spec));
        self
    }

    /// An already-constructed payload, as handed over by a
    /// [`crate::JobDescriptor`].
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Job> {
        let interval = self.interval.ok_or(JobError::MissingInterval)?;
        let payload = self.payload.ok_or(JobError::MissingCallable)?;
        let id = Uuid::new_v4();
        let name = self
            .name
            .unwrap_or_else(|| format!("job-{}", &id.simple().to_string()[..8]));
        let reporter = self.reporter.unwrap_or_else(|| Arc::new(TracingReporter));
        Ok(Job {
            id,
            name,
            interval,
            payload,
            reporter,
            state: StateCell::new(),
        })
    }
}

/// Route one invocation's outcome to the job's reporter.
pub(crate) fn report_outcome(reporter: &dyn Reporter, job: &str, outcome: &TaskOutcome) {
    match outcome {
        Ok(message) => reporter.info(job, message.as_deref().unwrap_or("done")),
        // `{:#}` renders the whole context chain of the failure.
        Err(error) => reporter.error(job, &format!("{error:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_interval_fails() {
        let err = Job::builder()
            .blocking_task(|| Ok(None))
            .build()
            .unwrap_err();
        assert!(matches!(err, JobError::MissingInterval));
    }

    #[test]
    fn build_without_payload_fails() {
        let err = Job::builder()
            .every(Duration::from_secs(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, JobError::MissingCallable));
    }

    #[test]
    fn strategy_follows_payload_shape() {
        let coop = Job::builder()
            .every(Duration::from_secs(1))
            .task(|| async { Ok(None) })
            .build()
            .unwrap();
        assert_eq!(coop.strategy(), ExecutionStrategy::Cooperative);

        let threaded = Job::builder()
            .every(Duration::from_secs(1))
            .blocking_task(|| Ok(None))
            .build()
            .unwrap();
        assert_eq!(threaded.strategy(), ExecutionStrategy::Threaded);

        let process = Job::builder()
            .every(Duration::from_secs(1))
            .command(CommandSpec::new("true"))
            .build()
            .unwrap();
        assert_eq!(process.strategy(), ExecutionStrategy::ProcessIsolated);
    }

    #[test]
    fn fresh_jobs_are_idle_and_named() {
        let job = Job::builder()
            .name("heartbeat")
            .every(Duration::from_secs(1))
            .blocking_task(|| Ok(None))
            .build()
            .unwrap();
        assert_eq!(job.state(), RunState::Idle);
        assert_eq!(job.name(), "heartbeat");
    }

    #[test]
    fn state_cell_never_moves_backwards() {
        let cell = StateCell::new();
        cell.advance(RunState::Running);
        cell.advance(RunState::Stopped);
        cell.advance(RunState::StopRequested);
        assert_eq!(cell.get(), RunState::Stopped);
    }

    #[test]
    fn mark_started_enforces_single_start() {
        let job = Job::builder()
            .every(Duration::from_secs(1))
            .blocking_task(|| Ok(None))
            .build()
            .unwrap();
        job.mark_started().expect("first start failed");
        assert!(matches!(
            job.mark_started(),
            Err(JobError::AlreadyStarted { .. })
        ));
    }
}
