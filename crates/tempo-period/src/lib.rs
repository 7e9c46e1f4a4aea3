//! `tempo-period` — calendar recurrence rules and their next-occurrence
//! resolver.
//!
//! A [`Period`] is a set of alternative recurrence rules. Each rule is a
//! [`TimePoint`] tree: a calendar unit with a multiplier, optionally a
//! time of day, optionally a finer-grained child rule. Rules compose:
//!
//! * `and` narrows — "every 2 months AND every monday at 01:00" is one tree
//!   with the coarser unit at the root,
//! * `or` widens — alternatives are evaluated independently and the
//!   earliest next occurrence wins.
//!
//! ```
//! use tempo_period::Period;
//!
//! let rule = Period::every(2)
//!     .month()
//!     .and(Period::every(1).monday().at("01:00")?)?;
//! # Ok::<(), tempo_period::PeriodError>(())
//! ```
//!
//! All computation is in UTC. Multiplier strides ("every 2 months") are
//! anchored at the Unix epoch boundary of the unit, so a rule denotes a
//! fixed lattice of instants rather than one relative to its creation time.

pub mod error;
pub mod period;
pub mod point;
mod resolve;
pub mod unit;

pub use error::{PeriodError, Result};
pub use period::{Every, Period};
pub use point::{TimeOfDay, TimePoint};
pub use unit::Unit;
