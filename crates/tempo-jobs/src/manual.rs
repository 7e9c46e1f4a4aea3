use anyhow::Context;

use crate::job::Job;
use crate::payload::{Payload, TaskOutcome};

/// Invoke a job's payload exactly once, outside the interval loop.
///
/// This is the "run it right now" entry point for tooling: the outcome is
/// recorded through the job's reporter exactly as the interval loop would
/// record it, returned to the caller, and the job's run state is left
/// untouched — a manual execution neither starts nor stops the job.
pub fn run_once(job: &Job) -> TaskOutcome {
    let outcome = invoke(job);
    match &outcome {
        Ok(message) => job
            .reporter
            .info(job.name(), message.as_deref().unwrap_or("done")),
        Err(error) => job.reporter.error(job.name(), &format!("{error:#}")),
    }
    outcome
}

fn invoke(job: &Job) -> TaskOutcome {
    match &job.payload {
        Payload::Blocking(task) => task(),
        Payload::Task(task) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to build a runtime for the one-shot execution")?;
            runtime.block_on(task())
        }
        Payload::Command(spec) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to build a runtime for the one-shot execution")?;
            runtime.block_on(async {
                let mut command = tokio::process::Command::new(&spec.program);
                command.args(&spec.args);
                for (key, value) in &spec.envs {
                    command.env(key, value);
                }
                let output = command
                    .output()
                    .await
                    .with_context(|| format!("failed to run {}", spec.program))?;
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    let trimmed = stdout.trim();
                    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
                } else {
                    anyhow::bail!(
                        "exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    )
                }
            })
        }
    }
}
