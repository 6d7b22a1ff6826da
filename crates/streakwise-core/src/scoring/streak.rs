//! Streak walking for daily, weekly and monthly habits.
//!
//! All walks start from the reference day and move backward. Completions
//! dated after the reference day are ignored, so a streak evaluated "as of"
//! some past instant is stable no matter what was recorded later.

use std::collections::BTreeSet;

use chrono::Duration;

use super::period::{achieved_periods, Period};
use crate::calendar::{CalendarDay, Day, WeekStart};
use crate::habit::{Frequency, Habit};

fn days_through(habit: &Habit, reference: Day) -> BTreeSet<Day> {
    let mut days = habit.completion_days();
    days.retain(|day| *day <= reference);
    days
}

/// Consecutive completed days ending today, or yesterday when today is not
/// marked yet.
///
/// An unmarked reference day neither counts nor breaks the streak; a gap
/// anywhere before it ends the walk. Break-mode habits walk the same way,
/// since their completions are explicit "stayed clean" records.
pub fn daily_streak(days: &BTreeSet<Day>, reference: Day) -> u32 {
    let mut cursor = if days.contains(&reference) {
        reference
    } else {
        reference - Duration::days(1)
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    streak
}

/// Consecutive achieved periods ending with the period containing
/// `reference`.
///
/// Unlike the daily walk there is no grace for the current period: if it has
/// not met its target yet the streak is 0.
pub fn period_streak(days: &BTreeSet<Day>, reference: Day, period: Period, target: u32) -> u32 {
    let achieved = achieved_periods(days, period, target);
    let mut start = period.start(reference);
    let mut streak = 0;
    while achieved.contains(&start) {
        streak += 1;
        start = period.previous(start);
    }
    streak
}

pub fn calc_daily_streak(habit: &Habit, reference: &impl CalendarDay) -> u32 {
    let reference = reference.calendar_day();
    daily_streak(&days_through(habit, reference), reference)
}

pub fn calc_weekly_streak(
    habit: &Habit,
    reference: &impl CalendarDay,
    week_start: WeekStart,
) -> u32 {
    let reference = reference.calendar_day();
    period_streak(
        &days_through(habit, reference),
        reference,
        Period::Week(week_start),
        habit.weekly_target(),
    )
}

pub fn calc_monthly_streak(habit: &Habit, reference: &impl CalendarDay) -> u32 {
    let reference = reference.calendar_day();
    period_streak(
        &days_through(habit, reference),
        reference,
        Period::Month,
        habit.monthly_target(),
    )
}

/// Streak for `habit` as of `reference`, dispatched on its frequency.
pub fn calc_streak(habit: &Habit, reference: &impl CalendarDay, week_start: WeekStart) -> u32 {
    match habit.frequency {
        Frequency::Daily => calc_daily_streak(habit, reference),
        Frequency::Weekly => calc_weekly_streak(habit, reference, week_start),
        Frequency::Monthly => calc_monthly_streak(habit, reference),
    }
}

/// Longest run of consecutive achieved days, weeks or months in the whole
/// history.
pub fn best_streak(habit: &Habit, week_start: WeekStart) -> u32 {
    let days = habit.completion_days();
    match habit.frequency {
        Frequency::Daily => longest_run(&days, |day| day - Duration::days(1)),
        Frequency::Weekly => {
            let period = Period::Week(week_start);
            let weeks = achieved_periods(&days, period, habit.weekly_target());
            longest_run(&weeks, |start| period.previous(start))
        }
        Frequency::Monthly => {
            let months = achieved_periods(&days, Period::Month, habit.monthly_target());
            longest_run(&months, |start| Period::Month.previous(start))
        }
    }
}

fn longest_run(keys: &BTreeSet<Day>, previous: impl Fn(Day) -> Day) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut last: Option<Day> = None;
    for key in keys {
        run = match last {
            Some(prev) if previous(*key) == prev => run + 1,
            _ => 1,
        };
        best = best.max(run);
        last = Some(*key);
    }
    best
}
