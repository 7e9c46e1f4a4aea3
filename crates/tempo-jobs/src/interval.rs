use std::time::Duration;

use chrono::{DateTime, Utc};
use tempo_period::Period;

/// Where a job's wait durations come from: a constant, or the gap until a
/// calendar period's next occurrence.
#[derive(Debug, Clone)]
pub enum IntervalSource {
    Fixed(Duration),
    Calendar(Period),
}

impl IntervalSource {
    /// Seconds to wait, evaluated against `now`.
    ///
    /// `None` means the calendar period could not produce a next
    /// occurrence; the job loop treats that as a terminal condition.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            IntervalSource::Fixed(duration) => Some(*duration),
            IntervalSource::Calendar(period) => period
                .next_occurrence(now)
                .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }
}

impl From<Duration> for IntervalSource {
    fn from(duration: Duration) -> Self {
        IntervalSource::Fixed(duration)
    }
}

impl From<Period> for IntervalSource {
    fn from(period: Period) -> Self {
        IntervalSource::Calendar(period)
    }
}
