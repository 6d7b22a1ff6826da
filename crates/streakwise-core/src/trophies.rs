//! Trophy catalogue and unlock evaluation.
//!
//! Trophy ids are stable snake_case strings; the unlocked map persisted by
//! the store is keyed by them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::Day;

/// What a trophy requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    /// Distinct completion days across all habits
    CompletionDays(u64),
    /// Streak reached on any single habit, now or at any point in its history
    Streak(u32),
    /// Lifetime points
    TotalPoints(u64),
    Level(u32),
    /// Number of habits being tracked
    Habits(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trophy {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
}

/// Aggregate figures a trophy requirement is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrophySnapshot {
    pub completion_days: u64,
    pub longest_current_streak: u32,
    /// Longest run any habit has ever had, backfilled history included
    pub best_streak: u32,
    pub total_points: u64,
    pub level: u32,
    pub habits: usize,
}

impl Requirement {
    pub fn is_met(&self, snapshot: &TrophySnapshot) -> bool {
        match *self {
            Requirement::CompletionDays(n) => snapshot.completion_days >= n,
            Requirement::Streak(n) => {
                snapshot.best_streak.max(snapshot.longest_current_streak) >= n
            }
            Requirement::TotalPoints(n) => snapshot.total_points >= n,
            Requirement::Level(n) => snapshot.level >= n,
            Requirement::Habits(n) => snapshot.habits >= n,
        }
    }
}

pub static TROPHIES: &[Trophy] = &[
    Trophy {
        id: "first_step",
        title: "First Step",
        description: "Record your first completion.",
        requirement: Requirement::CompletionDays(1),
    },
    Trophy {
        id: "habit_collector",
        title: "Habit Collector",
        description: "Track five habits at once.",
        requirement: Requirement::Habits(5),
    },
    Trophy {
        id: "on_a_roll",
        title: "On a Roll",
        description: "Reach a streak of 3 on any habit.",
        requirement: Requirement::Streak(3),
    },
    Trophy {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Reach a streak of 7 on any habit.",
        requirement: Requirement::Streak(7),
    },
    Trophy {
        id: "unbreakable",
        title: "Unbreakable",
        description: "Reach a streak of 30 on any habit.",
        requirement: Requirement::Streak(30),
    },
    Trophy {
        id: "century",
        title: "Century",
        description: "Earn 100 lifetime points.",
        requirement: Requirement::TotalPoints(100),
    },
    Trophy {
        id: "thousandaire",
        title: "Thousandaire",
        description: "Earn 1,000 lifetime points.",
        requirement: Requirement::TotalPoints(1_000),
    },
    Trophy {
        id: "level_5",
        title: "Rising",
        description: "Reach level 5.",
        requirement: Requirement::Level(5),
    },
    Trophy {
        id: "level_10",
        title: "Seasoned",
        description: "Reach level 10.",
        requirement: Requirement::Level(10),
    },
    Trophy {
        id: "hundred_days",
        title: "Hundred Days",
        description: "Complete habits on 100 different days.",
        requirement: Requirement::CompletionDays(100),
    },
];

pub fn find(id: &str) -> Option<&'static Trophy> {
    TROPHIES.iter().find(|trophy| trophy.id == id)
}

/// Trophies satisfied by `snapshot` that are not yet in `unlocked`.
pub fn newly_unlocked(
    snapshot: &TrophySnapshot,
    unlocked: &BTreeMap<String, Day>,
) -> Vec<&'static Trophy> {
    TROPHIES
        .iter()
        .filter(|trophy| !unlocked.contains_key(trophy.id))
        .filter(|trophy| trophy.requirement.is_met(snapshot))
        .collect()
}
