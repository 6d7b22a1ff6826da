use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{Day, WeekStart};

/// Every state change in the store produces an Event.
/// Front ends poll for them with `HabitStore::drain_events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitCreated {
        habit_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    HabitUpdated {
        habit_id: String,
        at: DateTime<Utc>,
    },
    HabitArchived {
        habit_id: String,
        archived: bool,
        at: DateTime<Utc>,
    },
    HabitDeleted {
        habit_id: String,
        at: DateTime<Utc>,
    },
    /// A completion day was added (`completed`) or removed.
    CompletionToggled {
        habit_id: String,
        day: Day,
        completed: bool,
        streak: u32,
        points: u64,
        at: DateTime<Utc>,
    },
    /// Lifetime points rose; the balance rose by the same amount.
    PointsEarned {
        amount: u64,
        total_points: u64,
        at: DateTime<Utc>,
    },
    PointsSpent {
        amount: u64,
        balance: u64,
        at: DateTime<Utc>,
    },
    LevelUp {
        from: u32,
        to: u32,
        at: DateTime<Utc>,
    },
    TrophyUnlocked {
        trophy_id: String,
        on: Day,
        at: DateTime<Utc>,
    },
    CollectibleApplied {
        name: String,
        at: DateTime<Utc>,
    },
    WeekStartChanged {
        week_start: WeekStart,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Wire name of the variant, as written in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::HabitCreated { .. } => "HabitCreated",
            Event::HabitUpdated { .. } => "HabitUpdated",
            Event::HabitArchived { .. } => "HabitArchived",
            Event::HabitDeleted { .. } => "HabitDeleted",
            Event::CompletionToggled { .. } => "CompletionToggled",
            Event::PointsEarned { .. } => "PointsEarned",
            Event::PointsSpent { .. } => "PointsSpent",
            Event::LevelUp { .. } => "LevelUp",
            Event::TrophyUnlocked { .. } => "TrophyUnlocked",
            Event::CollectibleApplied { .. } => "CollectibleApplied",
            Event::WeekStartChanged { .. } => "WeekStartChanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::LevelUp {
            from: 1,
            to: 2,
            at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["to"], 2);
    }
}
