//! Week and month buckets over a set of completion days.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Months;

use crate::calendar::{self, CalendarDay, Day, WeekStart};

/// A calendar bucket that completions are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week(WeekStart),
    Month,
}

impl Period {
    /// Inclusive start and exclusive end of the period containing `day`.
    pub fn range(self, day: Day) -> (Day, Day) {
        match self {
            Period::Week(week_start) => calendar::week_range(day, week_start),
            Period::Month => calendar::month_range(day),
        }
    }

    pub fn start(self, day: Day) -> Day {
        self.range(day).0
    }

    /// Start of the period immediately before the one beginning at `start`.
    pub fn previous(self, start: Day) -> Day {
        match self {
            Period::Week(_) => start - chrono::Duration::days(7),
            Period::Month => start - Months::new(1),
        }
    }
}

/// Distinct days inside the period containing `day`.
pub fn count_in_period(days: &BTreeSet<Day>, period: Period, day: Day) -> u32 {
    let (start, end) = period.range(day);
    days.range(start..end).count() as u32
}

/// Start days of every period whose distinct-day count meets `target`.
pub fn achieved_periods(days: &BTreeSet<Day>, period: Period, target: u32) -> BTreeSet<Day> {
    let mut counts: BTreeMap<Day, u32> = BTreeMap::new();
    for day in days {
        *counts.entry(period.start(*day)).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count >= target.max(1))
        .map(|(start, _)| start)
        .collect()
}

/// Count distinct completion days in the month containing `reference`.
///
/// Several timestamps on one day count once; days in other months are
/// ignored.
pub fn count_completions_in_month<T: CalendarDay>(
    completions: &[T],
    reference: &impl CalendarDay,
) -> u32 {
    let days = calendar::distinct_days(completions);
    count_in_period(&days, Period::Month, reference.calendar_day())
}

/// Count distinct completion days in the week containing `reference`.
pub fn count_completions_in_week<T: CalendarDay>(
    completions: &[T],
    reference: &impl CalendarDay,
    week_start: WeekStart,
) -> u32 {
    let days = calendar::distinct_days(completions);
    count_in_period(&days, Period::Week(week_start), reference.calendar_day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_day;

    fn days(list: &[&str]) -> Vec<Day> {
        list.iter().map(|s| parse_day(s).unwrap()).collect()
    }

    #[test]
    fn month_count_dedups_and_filters() {
        let completions = days(&["2024-03-07", "2024-03-07", "2024-02-20"]);
        let reference = parse_day("2024-03-12").unwrap();
        assert_eq!(count_completions_in_month(&completions, &reference), 1);
    }

    #[test]
    fn month_count_of_empty_history_is_zero() {
        let reference = parse_day("2024-03-12").unwrap();
        let empty: Vec<Day> = Vec::new();
        assert_eq!(count_completions_in_month(&empty, &reference), 0);
    }

    #[test]
    fn week_count_depends_on_week_start() {
        // Sunday 2024-01-14 and Monday 2024-01-15.
        let completions = days(&["2024-01-14", "2024-01-15"]);
        let reference = parse_day("2024-01-16").unwrap();
        assert_eq!(
            count_completions_in_week(&completions, &reference, WeekStart::Monday),
            1
        );
        assert_eq!(
            count_completions_in_week(&completions, &reference, WeekStart::Sunday),
            2
        );
    }

    #[test]
    fn achieved_periods_respect_target() {
        let set: BTreeSet<Day> = days(&["2024-01-01", "2024-01-03", "2024-01-09"])
            .into_iter()
            .collect();
        let weeks = achieved_periods(&set, Period::Week(WeekStart::Monday), 2);
        assert_eq!(weeks.len(), 1);
        assert!(weeks.contains(&parse_day("2024-01-01").unwrap()));
    }

    #[test]
    fn previous_month_from_march_is_february() {
        let march = parse_day("2024-03-01").unwrap();
        assert_eq!(Period::Month.previous(march), parse_day("2024-02-01").unwrap());
        let jan = parse_day("2024-01-01").unwrap();
        assert_eq!(Period::Month.previous(jan), parse_day("2023-12-01").unwrap());
    }
}
