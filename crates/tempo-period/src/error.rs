use thiserror::Error;

use crate::unit::Unit;

/// Errors raised while building or combining recurrence rules.
///
/// All of these are configuration errors: they surface synchronously from
/// the combinator call that caused them and are never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Two rules with the same unit were combined with `and`.
    #[error("can't combine two {0} rules")]
    DuplicateUnit(Unit),

    /// A time-of-day string did not have one of the accepted shapes.
    #[error("wrong time format: {0:?}")]
    InvalidTimeFormat(String),

    /// A time of day was set on a unit finer than an hour.
    #[error("can't set a time of day on a {0} rule")]
    UnsupportedUnit(Unit),
}

pub type Result<T> = std::result::Result<T, PeriodError>;
