//! Next-occurrence resolution for [`TimePoint`] chains.
//!
//! The resolver walks a candidate moment forward through the chain's
//! constraints, coarsest unit first. A violated constraint jumps the
//! candidate to the nearest boundary that satisfies it (with finer fields
//! reset to their minimum) and restarts the walk; when every constraint
//! holds, the candidate is the answer. Every jump strictly advances the
//! candidate, so the first fixpoint is the minimal valid moment.
//!
//! Strides are anchored at the Unix epoch boundary of their unit: "every 2
//! months" matches the months whose index since 1970-01 is even, "every 2
//! mondays" the Mondays of even-numbered Monday-started weeks, and so on
//! down to seconds. The returned moment is always strictly after the
//! reference moment.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::point::TimePoint;
use crate::unit::Unit;

/// Jump budget. Each jump skips at least one whole span of the violated
/// unit, so sane rules converge in a handful of steps; the cap only guards
/// against stride conjunctions that never align.
const MAX_STEPS: usize = 512;

pub(crate) fn next_occurrence(point: &TimePoint, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let chain = point.chain();
    let finest = *chain.last()?;
    match finest.unit() {
        Unit::Second | Unit::Minute | Unit::Hour => next_sub_daily(&chain, finest, from),
        _ => next_date_level(&chain, from),
    }
}

// ---------------------------------------------------------------------------
// Date-level resolution (finest unit is Day or coarser)
// ---------------------------------------------------------------------------

fn next_date_level(chain: &[&TimePoint], from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // The deepest node carrying an explicit time of day positions the
    // occurrence within its date; midnight otherwise.
    let time = chain
        .iter()
        .rev()
        .find_map(|node| node.time())
        .map(|t| NaiveTime::from_hms_opt(t.hour.unwrap_or(0), t.minute, t.second))
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0))?;

    let mut date = from.date_naive();
    if date.and_time(time).and_utc() <= from {
        date = date.succ_opt()?;
    }

    let last = chain.len() - 1;
    'search: for _ in 0..MAX_STEPS {
        for (i, node) in chain.iter().enumerate() {
            if let Some(violation) = date_violation(node, date, i == last) {
                date = jump(date, violation)?;
                continue 'search;
            }
        }
        return Some(date.and_time(time).and_utc());
    }
    None
}

// ---------------------------------------------------------------------------
// Sub-daily resolution (finest unit is Hour, Minute, or Second)
// ---------------------------------------------------------------------------

fn next_sub_daily(
    chain: &[&TimePoint],
    finest: &TimePoint,
    from: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let unit_secs: i64 = match finest.unit() {
        Unit::Hour => 3_600,
        Unit::Minute => 60,
        _ => 1,
    };
    // Hour rules may carry an MM:SS position within each hour.
    let offset: i64 = match finest.time() {
        Some(t) if finest.unit() == Unit::Hour => i64::from(t.minute) * 60 + i64::from(t.second),
        _ => 0,
    };
    let stride = i64::from(finest.multiplier());

    let mut index = (from.timestamp() - offset).div_euclid(unit_secs);
    if index * unit_secs + offset <= from.timestamp() {
        index += 1;
    }

    'search: for _ in 0..MAX_STEPS {
        let rem = index.rem_euclid(stride);
        if rem != 0 {
            index += stride - rem;
        }
        let ts = index * unit_secs + offset;
        let moment = DateTime::<Utc>::from_timestamp(ts, 0)?;

        for node in &chain[..chain.len() - 1] {
            match node.unit() {
                // A coarser sub-daily stride over a finer grid (e.g. every
                // 2 hours AND every 15 minutes).
                Unit::Hour | Unit::Minute => {
                    let coarse_secs = if node.unit() == Unit::Hour { 3_600 } else { 60 };
                    let coarse_stride = i64::from(node.multiplier());
                    let coarse_rem = ts.div_euclid(coarse_secs).rem_euclid(coarse_stride);
                    if coarse_rem != 0 {
                        let target =
                            (ts.div_euclid(coarse_secs) + coarse_stride - coarse_rem) * coarse_secs;
                        index = ceil_div(target - offset, unit_secs);
                        continue 'search;
                    }
                }
                _ => {
                    if let Some(violation) = date_violation(node, moment.date_naive(), false) {
                        let next_date = jump(moment.date_naive(), violation)?;
                        let target = next_date.and_time(NaiveTime::MIN).and_utc().timestamp();
                        index = ceil_div(target - offset, unit_secs);
                        continue 'search;
                    }
                }
            }
        }
        return Some(moment);
    }
    None
}

// ---------------------------------------------------------------------------
// Per-node date constraints and their jumps
// ---------------------------------------------------------------------------

enum Violation {
    YearStride(i64),
    MonthStride(i64),
    WeekStride(i64),
    DayStride(i64),
    /// The date's weekday differs from the selected one.
    WeekdayIs(Weekday),
    /// Pins for a chain's finest node: a bare year/month/week rule fires at
    /// the start of its span.
    YearStart,
    MonthStart,
    WeekStart,
}

/// Check one chain node against a candidate date. `finest` selects whether
/// the node also pins the candidate to the start of its span.
fn date_violation(node: &TimePoint, date: NaiveDate, finest: bool) -> Option<Violation> {
    let stride = i64::from(node.multiplier());
    match node.unit() {
        Unit::Year => {
            if i64::from(date.year() - 1970).rem_euclid(stride) != 0 {
                return Some(Violation::YearStride(stride));
            }
            if finest && date.ordinal() != 1 {
                return Some(Violation::YearStart);
            }
        }
        Unit::Month => {
            if months_since_epoch(date).rem_euclid(stride) != 0 {
                return Some(Violation::MonthStride(stride));
            }
            if finest && date.day() != 1 {
                return Some(Violation::MonthStart);
            }
        }
        Unit::Week => {
            if week_index(date).rem_euclid(stride) != 0 {
                return Some(Violation::WeekStride(stride));
            }
            if finest && date.weekday() != Weekday::Mon {
                return Some(Violation::WeekStart);
            }
        }
        Unit::WeekDay => {
            // Weekday rules always carry a selected day.
            let day = node.selected_weekday().unwrap_or(Weekday::Mon);
            if date.weekday() != day {
                return Some(Violation::WeekdayIs(day));
            }
            if week_index(date).rem_euclid(stride) != 0 {
                return Some(Violation::WeekStride(stride));
            }
        }
        Unit::Day => {
            if days_since_epoch(date).rem_euclid(stride) != 0 {
                return Some(Violation::DayStride(stride));
            }
        }
        // Sub-daily units are handled on the timestamp grid.
        Unit::Hour | Unit::Minute | Unit::Second => {}
    }
    None
}

/// Advance `date` to the nearest later date satisfying the violated
/// constraint, finer position reset to the span's start.
fn jump(date: NaiveDate, violation: Violation) -> Option<NaiveDate> {
    match violation {
        Violation::YearStride(n) => {
            let index = i64::from(date.year() - 1970);
            let next = index + (n - index.rem_euclid(n));
            NaiveDate::from_ymd_opt(1970 + i32::try_from(next).ok()?, 1, 1)
        }
        Violation::MonthStride(n) => {
            let index = months_since_epoch(date);
            month_start(index + (n - index.rem_euclid(n)))
        }
        Violation::WeekStride(n) => {
            let index = week_index(date);
            monday_of_week(index + (n - index.rem_euclid(n)))
        }
        Violation::DayStride(n) => {
            let index = days_since_epoch(date);
            epoch().checked_add_signed(Duration::days(index + (n - index.rem_euclid(n))))
        }
        Violation::WeekdayIs(day) => {
            let current = i64::from(date.weekday().num_days_from_monday());
            let target = i64::from(day.num_days_from_monday());
            let ahead = (target - current).rem_euclid(7);
            let ahead = if ahead == 0 { 7 } else { ahead };
            date.checked_add_signed(Duration::days(ahead))
        }
        Violation::YearStart => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1),
        Violation::MonthStart => month_start(months_since_epoch(date) + 1),
        Violation::WeekStart => monday_of_week(week_index(date) + 1),
    }
}

// ---------------------------------------------------------------------------
// Epoch arithmetic
// ---------------------------------------------------------------------------

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
}

fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(epoch()).num_days()
}

fn months_since_epoch(date: NaiveDate) -> i64 {
    i64::from(date.year() - 1970) * 12 + i64::from(date.month0())
}

/// Monday-started week number. 1970-01-01 was a Thursday, so the +3 shift
/// puts every Monday at remainder zero; week 0 starts 1969-12-29.
fn week_index(date: NaiveDate) -> i64 {
    (days_since_epoch(date) + 3).div_euclid(7)
}

fn month_start(index: i64) -> Option<NaiveDate> {
    let year = 1970 + i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn monday_of_week(index: i64) -> Option<NaiveDate> {
    epoch().checked_add_signed(Duration::days(index * 7 - 3))
}

fn ceil_div(a: i64, b: i64) -> i64 {
    a.div_euclid(b) + i64::from(a.rem_euclid(b) > 0)
}

#[cfg(test)]
mod tests {
    use crate::Period;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn daily_time_resolves_today_or_tomorrow() {
        let period = Period::every(1).day().at("10:30").unwrap();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 8, 0, 0)),
            Some(at(2024, 5, 15, 10, 30, 0))
        );
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 11, 0, 0)),
            Some(at(2024, 5, 16, 10, 30, 0))
        );
    }

    #[test]
    fn boundary_reference_advances_to_following_occurrence() {
        // Exclusive policy: a reference that is itself an occurrence yields
        // the next one.
        let period = Period::every(1).day().at("10:30").unwrap();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 10, 30, 0)),
            Some(at(2024, 5, 16, 10, 30, 0))
        );
    }

    #[test]
    fn non_boundary_reference_resolves_to_nearest_future() {
        let period = Period::every(1).day().at("10:30").unwrap();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 10, 29, 59)),
            Some(at(2024, 5, 15, 10, 30, 0))
        );
    }

    #[test]
    fn bimonthly_monday_conjunction() {
        // May 2024 is month 652 since the epoch (even, so it matches the
        // 2-month stride); 2024-05-15 is a Wednesday.
        let period = Period::every(2)
            .month()
            .and(Period::every(1).monday().at("01:00").unwrap())
            .unwrap();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 0, 0, 0)),
            Some(at(2024, 5, 20, 1, 0, 0))
        );
    }

    #[test]
    fn bimonthly_monday_skips_odd_months() {
        // June 2024 is month 653 (odd); the next matching month is July,
        // and 2024-07-01 happens to be a Monday.
        let period = Period::every(2)
            .month()
            .and(Period::every(1).monday().at("01:00").unwrap())
            .unwrap();
        assert_eq!(
            period.next_occurrence(at(2024, 6, 5, 0, 0, 0)),
            Some(at(2024, 7, 1, 1, 0, 0))
        );
    }

    #[test]
    fn bare_month_rule_fires_at_month_start() {
        let period = Period::every(2).month();
        // Mid-May: May's start already passed, June is odd, July matches.
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 0, 0, 0)),
            Some(at(2024, 7, 1, 0, 0, 0))
        );
        // Late April (month 651): May matches.
        assert_eq!(
            period.next_occurrence(at(2024, 4, 20, 0, 0, 0)),
            Some(at(2024, 5, 1, 0, 0, 0))
        );
    }

    #[test]
    fn hour_stride_with_position_within_hour() {
        // Hours since the epoch are even at 2024-01-01 00:00.
        let period = Period::every(2).hour();
        assert_eq!(
            period.next_occurrence(at(2024, 1, 1, 5, 30, 0)),
            Some(at(2024, 1, 1, 6, 0, 0))
        );

        let period = Period::every(2).hour().at("16:20").unwrap();
        assert_eq!(
            period.next_occurrence(at(2024, 1, 1, 5, 30, 0)),
            Some(at(2024, 1, 1, 6, 16, 20))
        );
    }

    #[test]
    fn weekday_rule_finds_next_matching_date() {
        // 2024-05-14 is a Tuesday; the following Monday is the 20th.
        let period = Period::every(1).monday();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 14, 9, 0, 0)),
            Some(at(2024, 5, 20, 0, 0, 0))
        );
    }

    #[test]
    fn every_second_monday_skips_odd_weeks() {
        // 2024-05-13 opens Monday-week 2837 (odd); 2024-05-20 opens week
        // 2838, which the 2-week stride accepts.
        let period = Period::every(2).monday();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 14, 0, 1, 0)),
            Some(at(2024, 5, 20, 0, 0, 0))
        );
        // From that Monday itself, the next match is two weeks out.
        assert_eq!(
            period.next_occurrence(at(2024, 5, 20, 0, 0, 0)),
            Some(at(2024, 6, 3, 0, 0, 0))
        );
    }

    #[test]
    fn week_rule_fires_on_mondays() {
        let period = Period::every(1).week();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 12, 0, 0)),
            Some(at(2024, 5, 20, 0, 0, 0))
        );
    }

    #[test]
    fn year_rule_fires_at_year_start() {
        let period = Period::every(1).year();
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 0, 0, 0)),
            Some(at(2025, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn weekday_and_hour_stride_conjunction() {
        // Every Monday, every 4 hours: next occurrence from a Wednesday is
        // Monday midnight (hour index divisible by 4), then 04:00.
        let period = Period::every(1)
            .monday()
            .and(Period::every(4).hour())
            .unwrap();
        let first = period.next_occurrence(at(2024, 5, 15, 6, 0, 0)).unwrap();
        assert_eq!(first, at(2024, 5, 20, 0, 0, 0));
        let second = period.next_occurrence(first).unwrap();
        assert_eq!(second, at(2024, 5, 20, 4, 0, 0));
    }

    #[test]
    fn alternatives_take_the_earliest_occurrence() {
        let period = Period::every(1)
            .day()
            .at("23:00")
            .unwrap()
            .or(Period::every(1).hour());
        assert_eq!(
            period.next_occurrence(at(2024, 5, 15, 8, 10, 0)),
            Some(at(2024, 5, 15, 9, 0, 0))
        );
    }

    #[test]
    fn reevaluation_from_a_result_strictly_advances() {
        let period = Period::every(2)
            .month()
            .and(Period::every(1).monday().at("01:00").unwrap())
            .unwrap();
        let mut moment = at(2024, 1, 3, 7, 21, 9);
        for _ in 0..8 {
            let next = period.next_occurrence(moment).unwrap();
            assert!(next > moment);
            moment = next;
        }
    }

    #[test]
    fn interval_until_is_positive() {
        let period = Period::every(30).second();
        let from = at(2024, 5, 15, 8, 0, 1);
        let interval = period.interval_until(from).unwrap();
        assert!(interval > chrono::Duration::zero());
        assert!(interval <= chrono::Duration::seconds(30));
    }
}
