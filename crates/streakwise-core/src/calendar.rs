//! Calendar-day arithmetic used by the scoring engine.
//!
//! Every boundary in this module is computed on [`NaiveDate`] values rather
//! than fixed millisecond offsets, so week and month edges do not move when a
//! DST transition falls inside the period.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Weekday,
};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A calendar day with no time-of-day component.
pub type Day = NaiveDate;

/// Which weekday opens a calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekStart::Monday => "monday",
            WeekStart::Sunday => "sunday",
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStart {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            other => Err(ValidationError::InvalidValue {
                field: "week_start".to_string(),
                message: format!("expected 'monday' or 'sunday', got '{other}'"),
            }),
        }
    }
}

/// Anything that can be pinned to a calendar day in the user's local zone.
pub trait CalendarDay {
    fn calendar_day(&self) -> Day;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> Day {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> Day {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> Day {
        self.with_timezone(&Local).date_naive()
    }
}

impl<T: CalendarDay + ?Sized> CalendarDay for &T {
    fn calendar_day(&self) -> Day {
        (**self).calendar_day()
    }
}

/// Normalize a timestamp to its local calendar day, discarding time-of-day.
pub fn to_calendar_day(timestamp: &impl CalendarDay) -> Day {
    timestamp.calendar_day()
}

/// Collapse a list of timestamps into the set of distinct days they fall on.
pub fn distinct_days<T: CalendarDay>(timestamps: &[T]) -> BTreeSet<Day> {
    timestamps.iter().map(CalendarDay::calendar_day).collect()
}

fn days_into_week(date: Day, week_start: WeekStart) -> i64 {
    let day = date.weekday().num_days_from_monday();
    let first = week_start.weekday().num_days_from_monday();
    i64::from((7 + day - first) % 7)
}

/// Inclusive start and exclusive end of the week containing `date`.
pub fn week_range(date: Day, week_start: WeekStart) -> (Day, Day) {
    let start = date - Duration::days(days_into_week(date, week_start));
    (start, start + Duration::days(7))
}

/// First day of the month containing `date` and first day of the next month.
pub fn month_range(date: Day) -> (Day, Day) {
    let start = date - Duration::days(i64::from(date.day0()));
    (start, start + Months::new(1))
}

/// Number of week boundaries crossed going from `a` to `b`.
///
/// Zero when both dates share a week; negative when `b` lies in an earlier
/// week than `a`.
pub fn weeks_between(a: Day, b: Day, week_start: WeekStart) -> i64 {
    let (a_start, _) = week_range(a, week_start);
    let (b_start, _) = week_range(b, week_start);
    (b_start - a_start).num_days() / 7
}

/// Number of month boundaries crossed going from `a` to `b`.
pub fn months_between(a: Day, b: Day) -> i64 {
    let index = |d: Day| i64::from(d.year()) * 12 + i64::from(d.month0());
    index(b) - index(a)
}

/// The current local calendar day.
pub fn today() -> Day {
    Local::now().date_naive()
}

/// Midday on `day` in the local zone.
///
/// Used when a completion is recorded for a past day: noon never falls into a
/// DST gap, so the timestamp maps back to the same calendar day.
pub fn local_noon(day: Day) -> DateTime<Local> {
    let naive = day.and_time(NaiveTime::default() + Duration::hours(12));
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_day(input: &str) -> Result<Day, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidDate {
            input: input.to_string(),
        }
    })
}

/// Parse either an RFC 3339 timestamp or a bare ISO date.
///
/// Bare dates become local noon on that day.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Local>, ValidationError> {
    let trimmed = input.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.with_timezone(&Local));
    }
    parse_day(trimmed).map(local_noon)
}

pub fn format_day(day: Day) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Day {
        parse_day(s).unwrap()
    }

    #[test]
    fn week_range_monday_start() {
        // 2024-01-18 is a Thursday.
        assert_eq!(
            week_range(d("2024-01-18"), WeekStart::Monday),
            (d("2024-01-15"), d("2024-01-22"))
        );
        // A Monday opens its own week.
        assert_eq!(
            week_range(d("2024-01-15"), WeekStart::Monday),
            (d("2024-01-15"), d("2024-01-22"))
        );
        // A Sunday closes the Monday week.
        assert_eq!(
            week_range(d("2024-01-21"), WeekStart::Monday),
            (d("2024-01-15"), d("2024-01-22"))
        );
    }

    #[test]
    fn week_range_sunday_start() {
        assert_eq!(
            week_range(d("2024-01-18"), WeekStart::Sunday),
            (d("2024-01-14"), d("2024-01-21"))
        );
        assert_eq!(
            week_range(d("2024-01-21"), WeekStart::Sunday),
            (d("2024-01-21"), d("2024-01-28"))
        );
    }

    #[test]
    fn week_range_spans_year_end() {
        // 2025-01-01 is a Wednesday.
        assert_eq!(
            week_range(d("2025-01-01"), WeekStart::Monday),
            (d("2024-12-30"), d("2025-01-06"))
        );
    }

    #[test]
    fn week_range_across_dst_change_is_seven_days() {
        // Europe and US both shift clocks in March.
        for date in ["2024-03-10", "2024-03-31", "2024-11-03"] {
            let (start, end) = week_range(d(date), WeekStart::Sunday);
            assert_eq!((end - start).num_days(), 7);
        }
    }

    #[test]
    fn month_range_handles_leap_february_and_december() {
        assert_eq!(
            month_range(d("2024-02-29")),
            (d("2024-02-01"), d("2024-03-01"))
        );
        assert_eq!(
            month_range(d("2023-12-31")),
            (d("2023-12-01"), d("2024-01-01"))
        );
    }

    #[test]
    fn weeks_between_counts_boundaries_not_days() {
        // Sunday to the following Monday: one boundary, one day.
        assert_eq!(
            weeks_between(d("2024-01-14"), d("2024-01-15"), WeekStart::Monday),
            1
        );
        // Same pair under a Sunday start sits inside one week.
        assert_eq!(
            weeks_between(d("2024-01-14"), d("2024-01-15"), WeekStart::Sunday),
            0
        );
        assert_eq!(
            weeks_between(d("2024-01-18"), d("2024-01-02"), WeekStart::Monday),
            -2
        );
    }

    #[test]
    fn months_between_crosses_years() {
        assert_eq!(months_between(d("2023-11-30"), d("2024-02-01")), 3);
        assert_eq!(months_between(d("2024-03-31"), d("2024-03-01")), 0);
        assert_eq!(months_between(d("2024-03-01"), d("2024-01-31")), -2);
    }

    #[test]
    fn timestamps_collapse_to_calendar_days() {
        let morning = parse_timestamp("2024-03-07").unwrap();
        let days = distinct_days(&[morning, morning, local_noon(d("2024-02-20"))]);
        assert_eq!(days.len(), 2);
        assert!(days.contains(&d("2024-03-07")));
        assert_eq!(to_calendar_day(&d("2024-02-20")), d("2024-02-20"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_day("07/03/2024"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(parse_timestamp("yesterday").is_err());
        assert_eq!(format_day(d("2024-03-07")), "2024-03-07");
    }

    #[test]
    fn week_start_parses_short_and_long_names() {
        assert_eq!("Sunday".parse::<WeekStart>().unwrap(), WeekStart::Sunday);
        assert_eq!("mon".parse::<WeekStart>().unwrap(), WeekStart::Monday);
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
