//! Clock & Calendar port (spec §4.1): monotonic "today" feed plus pure
//! day/week arithmetic in the fixed civil time zone.

use chrono::{DateTime, NaiveDate, Utc, Weekday};

/// Abstracts "what day/instant is it" so tests can inject a fixed clock.
pub trait Clock: Send + Sync {
    /// The current civil date in the fixed zone.
    fn today(&self) -> NaiveDate;

    /// The current instant, as a UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// A UTC timestamp for `date` at the given local hour, in the fixed zone.
    fn at_hour(&self, date: NaiveDate, hour: u32) -> DateTime<Utc>;
}

/// Number of days from `a` to `b` (positive if `b` is later).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// True iff `current` and `anchor` fall on the same weekday and
/// `current` is strictly after `anchor` (spec §4.1).
pub fn is_new_week(current: NaiveDate, anchor: NaiveDate) -> bool {
    current.weekday() == anchor.weekday() && current > anchor
}

/// The 1-based execution week at `current`, anchored at `quit_date`,
/// clamped to `[1, 12]` (spec §8, §9 fixes 1-based numbering at quit_date).
pub fn execution_week_for(current: NaiveDate, quit_date: NaiveDate) -> u32 {
    let days = days_between(quit_date, current).max(0);
    let week = (days / 7) as u32 + 1;
    week.clamp(1, 12)
}

/// The 1-based intervention day counted from `start_date`: `start_date`
/// itself is day 1 (spec §4.1 `intervention_day`).
pub fn intervention_day(start_date: NaiveDate, current: NaiveDate) -> i64 {
    days_between(start_date, current) + 1
}

/// Which `Weekday` a date falls on — re-exported for callers that only
/// have `chrono::Weekday` imported indirectly.
pub fn weekday_of(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// The next date on or after `from` that falls on `weekday` (0 if `from`
/// already does). Used to align fallback scheduling to the user's
/// preferred weekday (spec §4.1 "preference-aware helper that aligns to
/// the user's weekday and hour").
pub fn next_weekday_on_or_after(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let days_ahead = (weekday.num_days_from_monday() as i64 - from.weekday().num_days_from_monday() as i64).rem_euclid(7);
    from + chrono::Duration::days(days_ahead)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_new_week_requires_same_weekday_and_strictly_later() {
        let anchor = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(); // Wednesday
        let same_day = anchor;
        let next_wed = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let next_thu = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();

        assert!(!is_new_week(same_day, anchor));
        assert!(is_new_week(next_wed, anchor));
        assert!(!is_new_week(next_thu, anchor));
    }

    #[test]
    fn intervention_day_round_trips() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for k in 0..30 {
            let day = start + chrono::Duration::days(k);
            assert_eq!(intervention_day(start, day), k + 1);
        }
    }

    #[test]
    fn execution_week_advances_on_anniversary_and_clamps() {
        let quit_date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(execution_week_for(quit_date, quit_date), 1);
        assert_eq!(
            execution_week_for(NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(), quit_date),
            1
        );
        assert_eq!(
            execution_week_for(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(), quit_date),
            2
        );
        let far_future = quit_date + chrono::Duration::weeks(30);
        assert_eq!(execution_week_for(far_future, quit_date), 12);
    }

    #[test]
    fn next_weekday_on_or_after_keeps_matching_date_and_rolls_forward_otherwise() {
        let wed = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(); // Wednesday
        assert_eq!(next_weekday_on_or_after(wed, Weekday::Wed), wed);
        assert_eq!(
            next_weekday_on_or_after(wed, Weekday::Mon),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
        assert_eq!(
            next_weekday_on_or_after(wed, Weekday::Tue),
            NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()
        );
    }
}
