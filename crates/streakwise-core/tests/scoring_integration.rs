//! Integration tests for the scoring engine.
//!
//! Drives the public API with concrete histories and checks streaks, points
//! and period counts end to end.

use streakwise_core::calendar::{local_noon, parse_day, WeekStart};
use streakwise_core::scoring::{
    best_streak, calc_daily_streak, calc_monthly_streak, calc_points, calc_streak,
    calc_weekly_streak, count_completions_in_month, count_completions_in_week, score,
};
use streakwise_core::{Day, Frequency, Habit, HabitMode, NewHabit};

fn d(s: &str) -> Day {
    parse_day(s).unwrap()
}

fn habit(frequency: Frequency, mode: HabitMode, dates: &[&str]) -> Habit {
    let mut habit = NewHabit::new("Integration", frequency)
        .with_mode(mode)
        .into_habit(d("2023-12-01"))
        .unwrap();
    habit.completions = dates.iter().map(|s| local_noon(d(s))).collect();
    habit
}

#[test]
fn weekly_streak_counts_consecutive_achieved_weeks() {
    let h = habit(
        Frequency::Weekly,
        HabitMode::Build,
        &["2024-01-02", "2024-01-10", "2024-01-16"],
    );
    assert_eq!(calc_weekly_streak(&h, &d("2024-01-18"), WeekStart::Monday), 3);
}

#[test]
fn weekly_streak_is_zero_when_current_week_unmet() {
    let h = habit(Frequency::Weekly, HabitMode::Build, &["2024-01-02", "2024-01-10"]);
    assert_eq!(calc_weekly_streak(&h, &d("2024-01-18"), WeekStart::Monday), 0);
}

#[test]
fn monthly_streak_counts_consecutive_months() {
    let h = habit(
        Frequency::Monthly,
        HabitMode::Build,
        &["2024-01-09", "2024-02-08", "2024-03-07"],
    );
    assert_eq!(calc_monthly_streak(&h, &d("2024-03-15")), 3);
}

#[test]
fn month_count_ignores_duplicates_and_other_months() {
    let completions = vec![
        local_noon(d("2024-03-07")),
        local_noon(d("2024-03-07")),
        local_noon(d("2024-02-20")),
    ];
    assert_eq!(count_completions_in_month(&completions, &d("2024-03-12")), 1);
}

#[test]
fn weekly_build_points_are_stable() {
    let h = habit(
        Frequency::Weekly,
        HabitMode::Build,
        &["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22", "2024-01-22"],
    );
    let first = calc_points(&h, WeekStart::Monday);
    let second = calc_points(&h, WeekStart::Monday);
    assert_eq!(first, 70);
    assert_eq!(first, second);
}

#[test]
fn break_daily_points_count_each_day_once() {
    let h = habit(
        Frequency::Daily,
        HabitMode::Break,
        &["2024-01-10", "2024-01-10", "2024-01-11"],
    );
    assert_eq!(calc_points(&h, WeekStart::Monday), 10);
}

#[test]
fn daily_streak_survives_an_unmarked_today() {
    let h = habit(
        Frequency::Daily,
        HabitMode::Build,
        &["2024-01-07", "2024-01-08", "2024-01-09"],
    );
    assert_eq!(calc_daily_streak(&h, &d("2024-01-09")), 3);
    assert_eq!(calc_daily_streak(&h, &d("2024-01-10")), 3);
    assert_eq!(calc_daily_streak(&h, &d("2024-01-11")), 0);
}

#[test]
fn week_start_moves_sunday_between_weeks() {
    let completions = vec![local_noon(d("2024-01-07"))];
    let wednesday = d("2024-01-10");
    assert_eq!(
        count_completions_in_week(&completions, &wednesday, WeekStart::Monday),
        0
    );
    assert_eq!(
        count_completions_in_week(&completions, &wednesday, WeekStart::Sunday),
        1
    );
}

#[test]
fn week_start_changes_weekly_streak() {
    let h = habit(Frequency::Weekly, HabitMode::Build, &["2024-01-08", "2024-01-14"]);
    let sunday = d("2024-01-14");
    assert_eq!(calc_streak(&h, &sunday, WeekStart::Monday), 1);
    assert_eq!(calc_streak(&h, &sunday, WeekStart::Sunday), 2);
    assert_eq!(calc_points(&h, WeekStart::Monday), 20);
    assert_eq!(calc_points(&h, WeekStart::Sunday), 30);
}

#[test]
fn completions_after_reference_do_not_count() {
    let h = habit(
        Frequency::Daily,
        HabitMode::Build,
        &["2024-01-01", "2024-01-02", "2024-01-05"],
    );
    assert_eq!(calc_streak(&h, &d("2024-01-02"), WeekStart::Monday), 2);
}

#[test]
fn best_streak_spans_whole_history() {
    let h = habit(
        Frequency::Daily,
        HabitMode::Build,
        &["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10"],
    );
    assert_eq!(best_streak(&h, WeekStart::Monday), 3);
    assert_eq!(calc_streak(&h, &d("2024-01-10"), WeekStart::Monday), 1);
}

#[test]
fn scoring_is_idempotent_and_leaves_input_untouched() {
    let h = habit(
        Frequency::Weekly,
        HabitMode::Build,
        &["2024-01-02", "2024-01-10", "2024-01-16"],
    );
    let before = h.clone();
    let reference = d("2024-01-18");
    let first = score(&h, &reference, WeekStart::Monday);
    let second = score(&h, &reference, WeekStart::Monday);
    assert_eq!(first, second);
    assert_eq!(h, before);
    assert_eq!(first.streak, 3);
    assert_eq!(first.completions_this_week, 1);
    assert!(first.period_achieved);
}

#[test]
fn empty_history_scores_zero() {
    let h = habit(Frequency::Monthly, HabitMode::Build, &[]);
    let card = score(&h, &d("2024-03-15"), WeekStart::Sunday);
    assert_eq!(card.streak, 0);
    assert_eq!(card.best_streak, 0);
    assert_eq!(card.points, 0);
    assert_eq!(card.completions_this_month, 0);
}
