use std::fmt;

use chrono::{DateTime, Duration, Utc, Weekday};

use crate::error::Result;
use crate::point::TimePoint;
use crate::resolve;
use crate::unit::Unit;

/// A recurrence rule: one or more alternative [`TimePoint`] trees.
///
/// Built fluently — `Period::every(2).month()` — and composed with
/// [`Period::and`] (narrowing conjunction of distinct units) and
/// [`Period::or`] (alternation across whole trees). Evaluating a period
/// evaluates every alternative and takes the earliest next occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    /// Alternative rules; the first is the active one that `and` and `at`
    /// operate on.
    points: Vec<TimePoint>,
}

/// Intermediate builder state: a multiplier waiting for its unit.
#[derive(Debug, Clone, Copy)]
pub struct Every {
    n: u32,
}

impl Every {
    fn unit(self, unit: Unit) -> Period {
        Period::from_point(TimePoint::new(self.n, unit))
    }

    fn weekday(self, day: Weekday) -> Period {
        Period::from_point(TimePoint::weekday(self.n, day))
    }

    pub fn second(self) -> Period {
        self.unit(Unit::Second)
    }
    pub fn minute(self) -> Period {
        self.unit(Unit::Minute)
    }
    pub fn hour(self) -> Period {
        self.unit(Unit::Hour)
    }
    pub fn day(self) -> Period {
        self.unit(Unit::Day)
    }
    pub fn week(self) -> Period {
        self.unit(Unit::Week)
    }
    pub fn month(self) -> Period {
        self.unit(Unit::Month)
    }
    pub fn year(self) -> Period {
        self.unit(Unit::Year)
    }

    pub fn monday(self) -> Period {
        self.weekday(Weekday::Mon)
    }
    pub fn tuesday(self) -> Period {
        self.weekday(Weekday::Tue)
    }
    pub fn wednesday(self) -> Period {
        self.weekday(Weekday::Wed)
    }
    pub fn thursday(self) -> Period {
        self.weekday(Weekday::Thu)
    }
    pub fn friday(self) -> Period {
        self.weekday(Weekday::Fri)
    }
    pub fn saturday(self) -> Period {
        self.weekday(Weekday::Sat)
    }
    pub fn sunday(self) -> Period {
        self.weekday(Weekday::Sun)
    }
}

impl Period {
    /// Start a rule: "every `n` <unit>". `n` is clamped to at least 1.
    pub fn every(n: u32) -> Every {
        Every { n: n.max(1) }
    }

    pub(crate) fn from_point(point: TimePoint) -> Self {
        Self {
            points: vec![point],
        }
    }

    /// Set the time of day on the active rule's finest unit.
    pub fn at(mut self, time: &str) -> Result<Self> {
        self.points[0].set_time(time)?;
        Ok(self)
    }

    /// Conjunction: combine this period's active rule with `other`'s.
    pub fn and(mut self, mut other: Period) -> Result<Self> {
        let active = self.points.remove(0);
        let combined = active.and(other.points.remove(0))?;
        self.points.insert(0, combined);
        Ok(self)
    }

    /// Alternation: adopt all of `other`'s rules as further alternatives.
    pub fn or(mut self, mut other: Period) -> Self {
        self.points.append(&mut other.points);
        self
    }

    pub fn alternatives(&self) -> &[TimePoint] {
        &self.points
    }

    /// The earliest moment strictly after `from` that matches any
    /// alternative.
    ///
    /// Returns `None` only when no alternative converges within the
    /// resolver's step budget (practically: pathological stride
    /// conjunctions).
    pub fn next_occurrence(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.points
            .iter()
            .filter_map(|point| resolve::next_occurrence(point, from))
            .min()
    }

    /// Time remaining from `from` until the next occurrence.
    pub fn interval_until(&self, from: DateTime<Utc>) -> Option<Duration> {
        self.next_occurrence(from).map(|next| next - from)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, " OR ")?;
            }
            write!(f, "{point}")?;
        }
        Ok(())
    }
}
