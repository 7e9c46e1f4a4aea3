use std::fmt;

/// Calendar units, ordered from finest to coarsest.
///
/// The derived ordering is what the combinator uses to decide which side of
/// an `and` becomes the root: the coarser unit always parents the finer one.
/// `WeekDay` sits between `Day` and `Week` — "every monday" is finer than a
/// whole week but coarser than a plain day stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    WeekDay,
    Week,
    Month,
    Year,
}

impl Unit {
    pub fn name(&self) -> &'static str {
        match self {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::WeekDay => "week day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Year => "year",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
