use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A job could not be routed to any strategy group. Defensive — with
    /// the closed strategy enum every job belongs somewhere, so this arm
    /// should be unreachable.
    #[error("incorrect job type: {name}")]
    IncorrectJobType { name: String },

    /// `run` was called while the scheduler was already running, or
    /// `add_job` after `run` — the job set is frozen once started.
    #[error("scheduler is already running")]
    AlreadyRunning,

    /// A job failed to start on its substrate.
    #[error(transparent)]
    Job(#[from] tempo_jobs::JobError),

    /// Installing the termination-signal handler failed.
    #[error("failed to install termination handler: {0}")]
    Signal(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
