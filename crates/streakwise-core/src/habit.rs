//! The habit entity and its ingestion-time validation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{self, CalendarDay, Day};
use crate::error::ValidationError;

/// How often a habit is expected to be done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Whether completions record doing something or staying clean of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitMode {
    #[default]
    Build,
    Break,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl HabitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitMode::Build => "build",
            HabitMode::Break => "break",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HabitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(ValidationError::InvalidValue {
                field: "frequency".to_string(),
                message: format!("expected daily, weekly or monthly, got '{other}'"),
            }),
        }
    }
}

impl FromStr for HabitMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(HabitMode::Build),
            "break" => Ok(HabitMode::Break),
            other => Err(ValidationError::InvalidValue {
                field: "mode".to_string(),
                message: format!("expected build or break, got '{other}'"),
            }),
        }
    }
}

fn default_target() -> u32 {
    1
}

/// A tracked habit.
///
/// `streak` and `points` are a cache of the scoring engine's output. Only
/// the store writes them, and only right after recomputing from
/// `completions`. `credited_points` is the most this habit has ever paid
/// into lifetime progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub mode: HabitMode,
    pub created_at: Day,
    #[serde(default)]
    pub completions: Vec<DateTime<Local>>,
    #[serde(default = "default_target")]
    pub weekly_target: u32,
    #[serde(default = "default_target")]
    pub monthly_target: u32,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub credited_points: u64,
}

impl Habit {
    /// Distinct local days with at least one completion.
    pub fn completion_days(&self) -> BTreeSet<Day> {
        calendar::distinct_days(&self.completions)
    }

    pub fn is_completed_on(&self, day: Day) -> bool {
        self.completions.iter().any(|c| c.calendar_day() == day)
    }

    /// Weekly target, never below one.
    pub fn weekly_target(&self) -> u32 {
        self.weekly_target.max(1)
    }

    /// Monthly target, never below one.
    pub fn monthly_target(&self) -> u32 {
        self.monthly_target.max(1)
    }
}

/// Fields a caller supplies when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub mode: HabitMode,
    #[serde(default)]
    pub weekly_target: Option<u32>,
    #[serde(default)]
    pub monthly_target: Option<u32>,
}

impl NewHabit {
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            frequency,
            mode: HabitMode::Build,
            weekly_target: None,
            monthly_target: None,
        }
    }

    pub fn with_mode(mut self, mode: HabitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_weekly_target(mut self, target: u32) -> Self {
        self.weekly_target = Some(target);
        self
    }

    pub fn with_monthly_target(mut self, target: u32) -> Self {
        self.monthly_target = Some(target);
        self
    }

    /// Validate and turn into a fresh habit with no completions.
    pub fn into_habit(self, created_at: Day) -> Result<Habit, ValidationError> {
        let name = validate_name(&self.name)?;
        let weekly_target = validate_weekly_target(self.weekly_target.unwrap_or(1))?;
        let monthly_target = validate_monthly_target(self.monthly_target.unwrap_or(1))?;
        Ok(Habit {
            id: Uuid::new_v4().to_string(),
            name,
            frequency: self.frequency,
            mode: self.mode,
            created_at,
            completions: Vec::new(),
            weekly_target,
            monthly_target,
            archived: false,
            streak: 0,
            points: 0,
            credited_points: 0,
        })
    }
}

pub(crate) fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_weekly_target(value: u32) -> Result<u32, ValidationError> {
    validate_target("weekly", value, 7)
}

pub(crate) fn validate_monthly_target(value: u32) -> Result<u32, ValidationError> {
    validate_target("monthly", value, 31)
}

fn validate_target(field: &'static str, value: u32, max: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        return Err(ValidationError::InvalidTarget { field, value });
    }
    if value > max {
        return Err(ValidationError::TargetTooLarge { field, value, max });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_day;

    #[test]
    fn new_habit_defaults_targets_to_one() {
        let habit = NewHabit::new("  Read  ", Frequency::Weekly)
            .into_habit(parse_day("2024-01-01").unwrap())
            .unwrap();
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.weekly_target, 1);
        assert_eq!(habit.monthly_target, 1);
        assert!(habit.completions.is_empty());
        assert!(!habit.archived);
        assert!(Uuid::parse_str(&habit.id).is_ok());
    }

    #[test]
    fn rejects_blank_names_and_bad_targets() {
        let day = parse_day("2024-01-01").unwrap();
        assert_eq!(
            NewHabit::new("   ", Frequency::Daily).into_habit(day),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            NewHabit::new("Run", Frequency::Weekly)
                .with_weekly_target(0)
                .into_habit(day),
            Err(ValidationError::InvalidTarget {
                field: "weekly",
                value: 0
            })
        );
        assert!(matches!(
            NewHabit::new("Run", Frequency::Monthly)
                .with_monthly_target(40)
                .into_habit(day),
            Err(ValidationError::TargetTooLarge { max: 31, .. })
        ));
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "h1",
            "name": "Stretch",
            "frequency": "weekly",
            "created_at": "2024-01-01"
        }"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.mode, HabitMode::Build);
        assert_eq!(habit.weekly_target(), 1);
        assert_eq!(habit.monthly_target(), 1);
        assert_eq!(habit.points, 0);
    }

    #[test]
    fn zero_stored_target_reads_as_one() {
        let mut habit = NewHabit::new("Run", Frequency::Weekly)
            .into_habit(parse_day("2024-01-01").unwrap())
            .unwrap();
        habit.weekly_target = 0;
        assert_eq!(habit.weekly_target(), 1);
    }

    #[test]
    fn frequency_and_mode_parse_case_insensitively() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("BREAK".parse::<HabitMode>().unwrap(), HabitMode::Break);
        assert!("hourly".parse::<Frequency>().is_err());
    }
}
