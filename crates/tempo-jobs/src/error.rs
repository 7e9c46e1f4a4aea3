use thiserror::Error;

use crate::job::ExecutionStrategy;

#[derive(Debug, Error)]
pub enum JobError {
    /// The builder was finalised without an interval source.
    #[error("interval is not specified")]
    MissingInterval,

    /// The builder was finalised without a payload.
    #[error("task is not specified")]
    MissingCallable,

    /// A job was handed to an execution substrate that does not match its
    /// strategy. Defensive — the scheduler routes by strategy, so this is
    /// unreachable through the public API.
    #[error("job {name} does not use the {expected:?} strategy")]
    StrategyMismatch {
        name: String,
        expected: ExecutionStrategy,
    },

    /// A job was started a second time.
    #[error("job {name} has already been started")]
    AlreadyStarted { name: String },

    /// The OS refused to start an execution context (thread or runtime).
    #[error("failed to start execution context: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JobError>;
