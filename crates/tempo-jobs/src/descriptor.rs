use std::sync::Arc;

use tempo_core::Reporter;

use crate::error::Result;
use crate::interval::IntervalSource;
use crate::job::{ExecutionStrategy, Job};
use crate::payload::Payload;

/// The job-discovery boundary object.
///
/// Whatever assembles jobs for a scheduler — config loaders, code
/// registries, tests — hands over a list of these; the descriptor carries
/// everything a [`Job`] needs except the shared reporter, which the
/// assembling side injects when it materialises the job.
#[derive(Debug)]
pub struct JobDescriptor {
    pub name: String,
    pub interval: IntervalSource,
    pub payload: Payload,
}

impl JobDescriptor {
    pub fn strategy(&self) -> ExecutionStrategy {
        self.payload.strategy()
    }

    pub fn into_job(self, reporter: Arc<dyn Reporter>) -> Result<Job> {
        let builder = Job::builder()
            .name(self.name)
            .reporter(reporter)
            .payload(self.payload);
        let builder = match self.interval {
            IntervalSource::Fixed(duration) => builder.every(duration),
            IntervalSource::Calendar(period) => builder.period(period),
        };
        builder.build()
    }
}
