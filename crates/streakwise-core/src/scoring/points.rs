//! Point accounting.
//!
//! Points are always re-derived from the full completion history. Nothing
//! here keeps track of which bonuses were "already paid": a bonus exists for
//! a period exactly when the history says the period qualifies, so repeated
//! evaluation of the same habit yields the same total.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::period::{achieved_periods, Period};
use crate::calendar::{Day, WeekStart};
use crate::habit::{Frequency, Habit, HabitMode};

/// Point values awarded by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRules {
    /// Per distinct completed day of a build-mode habit
    pub build_completion: u64,
    /// Per distinct clean day of a break-mode habit
    pub break_completion: u64,
    /// Length of the consecutive-day run that earns a daily milestone
    pub daily_run_length: u32,
    /// Bonus for every full run of `daily_run_length` consecutive days
    pub daily_run_bonus: u64,
    /// Bonus for each achieved week directly following another achieved week
    pub weekly_chain_bonus: u64,
    /// Bonus for each achieved month directly following another achieved month
    pub monthly_chain_bonus: u64,
}

impl Default for PointRules {
    fn default() -> Self {
        Self {
            build_completion: 10,
            break_completion: 5,
            daily_run_length: 7,
            daily_run_bonus: 20,
            weekly_chain_bonus: 10,
            monthly_chain_bonus: 25,
        }
    }
}

impl PointRules {
    pub fn per_completion(&self, mode: HabitMode) -> u64 {
        match mode {
            HabitMode::Build => self.build_completion,
            HabitMode::Break => self.break_completion,
        }
    }

    /// Total points for `habit`: base points for every distinct day plus the
    /// milestone bonuses its history qualifies for.
    pub fn points_for(&self, habit: &Habit, week_start: WeekStart) -> u64 {
        let days = habit.completion_days();
        let base = self.per_completion(habit.mode) * days.len() as u64;
        let bonus = match habit.frequency {
            Frequency::Daily => {
                self.daily_run_bonus * u64::from(run_milestones(&days, self.daily_run_length))
            }
            Frequency::Weekly => {
                let period = Period::Week(week_start);
                let weeks = achieved_periods(&days, period, habit.weekly_target());
                self.weekly_chain_bonus * u64::from(chained_periods(&weeks, period))
            }
            Frequency::Monthly => {
                let months = achieved_periods(&days, Period::Month, habit.monthly_target());
                self.monthly_chain_bonus * u64::from(chained_periods(&months, Period::Month))
            }
        };
        base + bonus
    }
}

/// Points for `habit` under the default rules.
pub fn calc_points(habit: &Habit, week_start: WeekStart) -> u64 {
    PointRules::default().points_for(habit, week_start)
}

/// How many times a consecutive-day run reached a multiple of `run_length`.
fn run_milestones(days: &BTreeSet<Day>, run_length: u32) -> u32 {
    if run_length == 0 {
        return 0;
    }
    let mut milestones = 0;
    let mut run = 0;
    let mut last: Option<Day> = None;
    for day in days {
        run = match last {
            Some(prev) if *day - Duration::days(1) == prev => run + 1,
            _ => 1,
        };
        if run % run_length == 0 {
            milestones += 1;
        }
        last = Some(*day);
    }
    milestones
}

/// Achieved periods whose immediate predecessor was also achieved.
fn chained_periods(achieved: &BTreeSet<Day>, period: Period) -> u32 {
    achieved
        .iter()
        .filter(|start| achieved.contains(&period.previous(**start)))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{local_noon, parse_day};
    use crate::habit::NewHabit;

    fn d(s: &str) -> Day {
        parse_day(s).unwrap()
    }

    fn habit(frequency: Frequency, mode: HabitMode, dates: &[&str]) -> Habit {
        let mut habit = NewHabit::new("test", frequency)
            .with_mode(mode)
            .into_habit(d("2023-12-01"))
            .unwrap();
        habit.completions = dates.iter().map(|s| local_noon(d(s))).collect();
        habit
    }

    #[test]
    fn weekly_build_chain_scores_seventy() {
        let h = habit(
            Frequency::Weekly,
            HabitMode::Build,
            &["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22", "2024-01-22"],
        );
        assert_eq!(calc_points(&h, WeekStart::Monday), 70);
        assert_eq!(calc_points(&h, WeekStart::Monday), 70);
    }

    #[test]
    fn duplicate_completion_does_not_change_points() {
        let mut h = habit(
            Frequency::Weekly,
            HabitMode::Build,
            &["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22"],
        );
        let before = calc_points(&h, WeekStart::Monday);
        h.completions.push(local_noon(d("2024-01-22")));
        assert_eq!(calc_points(&h, WeekStart::Monday), before);
    }

    #[test]
    fn break_daily_duplicates_count_once() {
        let h = habit(
            Frequency::Daily,
            HabitMode::Break,
            &["2024-01-10", "2024-01-10", "2024-01-11"],
        );
        assert_eq!(calc_points(&h, WeekStart::Monday), 10);
    }

    #[test]
    fn daily_runs_earn_a_bonus_per_full_week() {
        let dates: Vec<String> = (1..=14).map(|n| format!("2024-01-{n:02}")).collect();
        let refs: Vec<&str> = dates.iter().map(String::as_str).collect();
        let h = habit(Frequency::Daily, HabitMode::Build, &refs);
        // 14 days * 10 + two milestones * 20
        assert_eq!(calc_points(&h, WeekStart::Monday), 180);
    }

    #[test]
    fn broken_weekly_chain_loses_the_bonus() {
        let h = habit(
            Frequency::Weekly,
            HabitMode::Build,
            &["2024-01-01", "2024-01-15", "2024-01-22"],
        );
        // 3 * 10 + one chained week
        assert_eq!(calc_points(&h, WeekStart::Monday), 40);
    }

    #[test]
    fn monthly_chain_bonus() {
        let h = habit(
            Frequency::Monthly,
            HabitMode::Build,
            &["2024-01-09", "2024-02-08", "2024-03-07"],
        );
        assert_eq!(calc_points(&h, WeekStart::Monday), 30 + 2 * 25);
    }

    #[test]
    fn unmet_weekly_target_earns_base_points_only() {
        let mut h = habit(
            Frequency::Weekly,
            HabitMode::Build,
            &["2024-01-01", "2024-01-08"],
        );
        h.weekly_target = 2;
        assert_eq!(calc_points(&h, WeekStart::Monday), 20);
    }

    #[test]
    fn empty_history_is_worth_nothing() {
        let h = habit(Frequency::Monthly, HabitMode::Break, &[]);
        assert_eq!(calc_points(&h, WeekStart::Sunday), 0);
    }

    #[test]
    fn custom_rules_apply() {
        let rules = PointRules {
            build_completion: 1,
            weekly_chain_bonus: 0,
            ..PointRules::default()
        };
        let h = habit(
            Frequency::Weekly,
            HabitMode::Build,
            &["2024-01-01", "2024-01-08"],
        );
        assert_eq!(rules.points_for(&h, WeekStart::Monday), 2);
    }
}
