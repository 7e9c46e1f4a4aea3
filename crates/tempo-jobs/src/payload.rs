use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::job::ExecutionStrategy;

/// What one invocation of a job produces: an optional result message, or an
/// error with its full context chain.
pub type TaskOutcome = anyhow::Result<Option<String>>;

/// Stored async callable for cooperative jobs. Arguments are whatever the
/// closure captured at construction time.
pub type AsyncTask = Arc<dyn Fn() -> BoxFuture<'static, TaskOutcome> + Send + Sync>;

/// Stored blocking callable for threaded jobs.
pub type BlockingTask = Arc<dyn Fn() -> TaskOutcome + Send + Sync>;

/// An external command, the payload shape for process-isolated jobs.
///
/// A closure cannot cross an address-space boundary, so process jobs carry
/// the program, arguments, and environment to run in a child instead. The
/// child's stdout becomes the success record; a non-zero exit becomes the
/// error record.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

/// The work a job performs each firing. The variant fixes the execution
/// strategy: async callables run on the shared event loop, blocking
/// callables on their own thread, commands in a child process.
#[derive(Clone)]
pub enum Payload {
    Task(AsyncTask),
    Blocking(BlockingTask),
    Command(CommandSpec),
}

impl Payload {
    pub fn strategy(&self) -> ExecutionStrategy {
        match self {
            Payload::Task(_) => ExecutionStrategy::Cooperative,
            Payload::Blocking(_) => ExecutionStrategy::Threaded,
            Payload::Command(_) => ExecutionStrategy::ProcessIsolated,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Task(_) => f.write_str("Payload::Task"),
            Payload::Blocking(_) => f.write_str("Payload::Blocking"),
            Payload::Command(spec) => f.debug_tuple("Payload::Command").field(spec).finish(),
        }
    }
}
