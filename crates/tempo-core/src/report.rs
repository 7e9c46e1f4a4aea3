//! The reporting seam between job execution and the process's log output.
//!
//! Every job owns an `Arc<dyn Reporter>` and routes each invocation's
//! outcome through it: return values become info records, failures become
//! error records. The default implementation forwards to `tracing` with the
//! job name as a structured field; tests substitute a recording sink.

/// Leveled sink for job outcomes. Must be safe to share across the threads,
/// tasks, and supervisors that run jobs concurrently.
pub trait Reporter: Send + Sync {
    fn info(&self, job: &str, message: &str);
    fn error(&self, job: &str, message: &str);
}

/// Default reporter: structured `tracing` records.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, job: &str, message: &str) {
        tracing::info!(job = %job, "{message}");
    }

    fn error(&self, job: &str, message: &str) {
        tracing::error!(job = %job, "{message}");
    }
}
