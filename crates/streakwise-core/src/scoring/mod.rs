//! Scoring engine.
//!
//! Turns a habit's raw completion history into a streak, a point total and
//! week/month aggregates. Everything in here is a pure function of its
//! arguments: the habit is read as a value snapshot, never mutated, and the
//! week-start preference is passed in explicitly on every call.
//!
//! ## Rules
//!
//! | Frequency | Streak unit | Current period unmet | Bonus |
//! |-----------|-------------|----------------------|-------|
//! | Daily     | day         | grace (counts from yesterday) | every full 7-day run |
//! | Weekly    | week        | streak is 0          | achieved week after an achieved week |
//! | Monthly   | month       | streak is 0          | achieved month after an achieved month |
//!
//! Same-day completions collapse to one before any rule is applied.

mod period;
mod points;
mod streak;

use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarDay, WeekStart};
use crate::habit::{Frequency, Habit};

pub use period::{
    achieved_periods, count_completions_in_month, count_completions_in_week, count_in_period,
    Period,
};
pub use points::{calc_points, PointRules};
pub use streak::{
    best_streak, calc_daily_streak, calc_monthly_streak, calc_streak, calc_weekly_streak,
    daily_streak, period_streak,
};

/// Full scoring result for one habit as of a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub streak: u32,
    pub best_streak: u32,
    pub points: u64,
    pub completions_this_week: u32,
    pub completions_this_month: u32,
    /// Whether the period containing the reference instant has met its target.
    pub period_achieved: bool,
}

/// Score `habit` as of `reference` under the default point rules.
pub fn score(habit: &Habit, reference: &impl CalendarDay, week_start: WeekStart) -> ScoreCard {
    score_with(&PointRules::default(), habit, reference, week_start)
}

pub fn score_with(
    rules: &PointRules,
    habit: &Habit,
    reference: &impl CalendarDay,
    week_start: WeekStart,
) -> ScoreCard {
    let day = reference.calendar_day();
    let days = habit.completion_days();
    let completions_this_week = count_in_period(&days, Period::Week(week_start), day);
    let completions_this_month = count_in_period(&days, Period::Month, day);
    let period_achieved = match habit.frequency {
        Frequency::Daily => days.contains(&day),
        Frequency::Weekly => completions_this_week >= habit.weekly_target(),
        Frequency::Monthly => completions_this_month >= habit.monthly_target(),
    };
    ScoreCard {
        streak: calc_streak(habit, &day, week_start),
        best_streak: best_streak(habit, week_start),
        points: rules.points_for(habit, week_start),
        completions_this_week,
        completions_this_month,
        period_achieved,
    }
}
