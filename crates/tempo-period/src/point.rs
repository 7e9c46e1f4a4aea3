use std::fmt;

use chrono::Weekday;

use crate::error::{PeriodError, Result};
use crate::unit::Unit;

/// A clock position within a unit's span.
///
/// For day-or-coarser rules this is a full `HH:MM[:SS]`. For hour rules the
/// hour component is absent and the position is `MM:SS` within each hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: Option<u32>,
    pub minute: u32,
    pub second: u32,
}

impl TimeOfDay {
    /// Parse a time-of-day string.
    ///
    /// Accepted shapes: `"HH:MM"`, `"HH:MM:SS"`, and — when `within_hour`
    /// is set (hour-unit rules) — `"MM:SS"`.
    pub(crate) fn parse(s: &str, within_hour: bool) -> Result<Self> {
        let bad = || PeriodError::InvalidTimeFormat(s.to_string());

        let values = s
            .split(':')
            .map(|part| part.parse::<u32>().map_err(|_| bad()))
            .collect::<Result<Vec<u32>>>()?;

        let time = match (values.as_slice(), within_hour) {
            ([minute, second], true) => TimeOfDay {
                hour: None,
                minute: *minute,
                second: *second,
            },
            ([hour, minute], false) => TimeOfDay {
                hour: Some(*hour),
                minute: *minute,
                second: 0,
            },
            ([hour, minute, second], false) => TimeOfDay {
                hour: Some(*hour),
                minute: *minute,
                second: *second,
            },
            _ => return Err(bad()),
        };

        if time.hour.is_some_and(|h| h > 23) || time.minute > 59 || time.second > 59 {
            return Err(bad());
        }
        Ok(time)
    }
}

/// One node of a recurrence rule: a calendar unit, a stride multiplier, and
/// optionally a weekday selector, a time of day, and a finer-grained child.
///
/// Trees are kept normalised: units strictly decrease in coarseness from
/// parent to child, and each unit appears at most once per chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePoint {
    multiplier: u32,
    unit: Unit,
    weekday: Option<Weekday>,
    time: Option<TimeOfDay>,
    child: Option<Box<TimePoint>>,
}

impl TimePoint {
    pub fn new(multiplier: u32, unit: Unit) -> Self {
        Self {
            multiplier: multiplier.max(1),
            unit,
            weekday: None,
            time: None,
            child: None,
        }
    }

    /// A weekday-selecting rule: "every `multiplier`-th `day`".
    pub fn weekday(multiplier: u32, day: Weekday) -> Self {
        Self {
            multiplier: multiplier.max(1),
            unit: Unit::WeekDay,
            weekday: Some(day),
            time: None,
            child: None,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn selected_weekday(&self) -> Option<Weekday> {
        self.weekday
    }

    pub fn time(&self) -> Option<TimeOfDay> {
        self.time
    }

    pub fn child(&self) -> Option<&TimePoint> {
        self.child.as_deref()
    }

    /// Set the time of day on the finest rule in this chain.
    ///
    /// Fails with [`PeriodError::UnsupportedUnit`] when the finest unit is
    /// below an hour, and with [`PeriodError::InvalidTimeFormat`] when the
    /// string has the wrong shape for that unit.
    pub fn set_time(&mut self, time: &str) -> Result<()> {
        if let Some(child) = self.child.as_mut() {
            return child.set_time(time);
        }
        if self.unit < Unit::Hour {
            return Err(PeriodError::UnsupportedUnit(self.unit));
        }
        self.time = Some(TimeOfDay::parse(time, self.unit == Unit::Hour)?);
        Ok(())
    }

    /// Conjunction: merge `other` into this rule's chain.
    ///
    /// The coarser unit becomes the root; the finer one descends until it
    /// finds its place in the chain. Combining two rules of the same unit —
    /// at any depth — fails with [`PeriodError::DuplicateUnit`].
    pub fn and(self, other: TimePoint) -> Result<TimePoint> {
        if self.unit == other.unit {
            return Err(PeriodError::DuplicateUnit(self.unit));
        }
        if self.unit > other.unit {
            self.absorb(other)
        } else {
            other.absorb(self)
        }
    }

    fn absorb(mut self, finer: TimePoint) -> Result<TimePoint> {
        self.child = Some(Box::new(match self.child.take() {
            None => finer,
            Some(child) => child.and(finer)?,
        }));
        Ok(self)
    }

    /// The chain as a parent-first slice of nodes, coarsest unit first.
    pub(crate) fn chain(&self) -> Vec<&TimePoint> {
        let mut nodes = vec![self];
        let mut cursor = self;
        while let Some(child) = cursor.child.as_deref() {
            nodes.push(child);
            cursor = child;
        }
        nodes
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Every ")?;
        if self.multiplier > 1 {
            write!(f, "{} ", self.multiplier)?;
        }
        let name = match self.weekday {
            Some(day) => weekday_name(day),
            None => self.unit.name(),
        };
        write!(f, "{name}")?;
        if self.multiplier != 1 {
            write!(f, "s")?;
        }
        if let Some(time) = self.time {
            match time.hour {
                Some(hour) => {
                    write!(f, " at {:02}:{:02}", hour, time.minute)?;
                    if time.second != 0 {
                        write!(f, ":{:02}", time.second)?;
                    }
                }
                None => {
                    write!(f, " at {} minutes and {} seconds", time.minute, time.second)?;
                }
            }
        }
        if let Some(child) = &self.child {
            write!(f, " AND {child}")?;
        }
        Ok(())
    }
}
