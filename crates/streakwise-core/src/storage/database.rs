//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habits and their completion timestamps
//! - Global progress (balance, lifetime points, applied collectibles)
//! - Unlocked trophies
//! - Key-value store for application state

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};

use super::{data_dir, migrations};
use crate::calendar::{self, Day};
use crate::error::{Result, StorageError};
use crate::habit::{Frequency, Habit, HabitMode};
use crate::store::{GlobalProgress, HabitRepository};

const KEY_POINTS: &str = "points";
const KEY_TOTAL_POINTS: &str = "total_points";
const KEY_COLLECTIBLES: &str = "applied_collectibles";

/// SQLite database for habit storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/streakwise/streakwise.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("streakwise.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn kv_get_u64(&self, key: &str) -> Result<u64> {
        match self.kv_get(key)? {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                StorageError::CorruptRow {
                    table: "kv".into(),
                    message: format!("{key}: {e}"),
                }
                .into()
            }),
            None => Ok(0),
        }
    }

    fn load_completions(&self, habit_id: &str) -> Result<Vec<DateTime<Local>>> {
        let mut stmt = self.conn.prepare(
            "SELECT completed_at FROM completions WHERE habit_id = ?1 ORDER BY completed_at",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| row.get::<_, String>(0))?;

        let mut completions = Vec::new();
        for row in rows {
            let raw = row?;
            let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|e| StorageError::CorruptRow {
                table: "completions".into(),
                message: format!("{raw}: {e}"),
            })?;
            completions.push(parsed.with_timezone(&Local));
        }
        completions.sort();
        Ok(completions)
    }
}

/// Habit columns straight off a row, before any parsing.
struct RawHabit {
    id: String,
    name: String,
    frequency: String,
    mode: String,
    created_at: String,
    weekly_target: u32,
    monthly_target: u32,
    archived: bool,
    streak: u32,
    points: u64,
    credited_points: u64,
}

impl RawHabit {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            frequency: row.get(2)?,
            mode: row.get(3)?,
            created_at: row.get(4)?,
            weekly_target: row.get(5)?,
            monthly_target: row.get(6)?,
            archived: row.get(7)?,
            streak: row.get(8)?,
            points: row.get(9)?,
            credited_points: row.get(10)?,
        })
    }

    fn into_habit(self, completions: Vec<DateTime<Local>>) -> Result<Habit> {
        let corrupt = |message: String| StorageError::CorruptRow {
            table: "habits".into(),
            message: format!("{}: {message}", self.id),
        };
        let frequency = self.frequency.parse::<Frequency>().map_err(|e| corrupt(format!("{e}")))?;
        let mode = self.mode.parse::<HabitMode>().map_err(|e| corrupt(format!("{e}")))?;
        let created_at =
            calendar::parse_day(&self.created_at).map_err(|e| corrupt(format!("{e}")))?;
        Ok(Habit {
            id: self.id,
            name: self.name,
            frequency,
            mode,
            created_at,
            completions,
            weekly_target: self.weekly_target,
            monthly_target: self.monthly_target,
            archived: self.archived,
            streak: self.streak,
            points: self.points,
            credited_points: self.credited_points,
        })
    }
}

impl HabitRepository for Database {
    fn load_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, frequency, mode, created_at, weekly_target, monthly_target,
                    archived, streak, points, credited_points
             FROM habits
             ORDER BY created_at, name",
        )?;
        let raws = stmt
            .query_map([], RawHabit::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut habits = Vec::with_capacity(raws.len());
        for raw in raws {
            let completions = self.load_completions(&raw.id)?;
            habits.push(raw.into_habit(completions)?);
        }
        Ok(habits)
    }

    fn save_habit(&mut self, habit: &Habit) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO habits
                (id, name, frequency, mode, created_at, weekly_target, monthly_target,
                 archived, streak, points, credited_points)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                habit.id,
                habit.name,
                habit.frequency.as_str(),
                habit.mode.as_str(),
                calendar::format_day(habit.created_at),
                habit.weekly_target,
                habit.monthly_target,
                habit.archived,
                habit.streak,
                habit.points,
                habit.credited_points,
            ],
        )?;
        tx.execute("DELETE FROM completions WHERE habit_id = ?1", params![habit.id])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO completions (habit_id, completed_at) VALUES (?1, ?2)",
            )?;
            for completed_at in &habit.completions {
                insert.execute(params![habit.id, completed_at.to_rfc3339()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_habit(&mut self, id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM completions WHERE habit_id = ?1", params![id])?;
        tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn load_progress(&self) -> Result<GlobalProgress> {
        let applied_collectibles = match self.kv_get(KEY_COLLECTIBLES)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable collectibles list");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut stmt = self.conn.prepare("SELECT id, unlocked_on FROM trophies")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut unlocked: BTreeMap<String, Day> = BTreeMap::new();
        for row in rows {
            let (id, on) = row?;
            match calendar::parse_day(&on) {
                Ok(day) => {
                    unlocked.insert(id, day);
                }
                Err(e) => tracing::warn!(trophy = %id, error = %e, "skipping trophy with bad date"),
            }
        }

        Ok(GlobalProgress {
            points: self.kv_get_u64(KEY_POINTS)?,
            total_points: self.kv_get_u64(KEY_TOTAL_POINTS)?,
            unlocked,
            applied_collectibles,
        })
    }

    fn save_progress(&mut self, progress: &GlobalProgress) -> Result<()> {
        let collectibles = serde_json::to_string(&progress.applied_collectibles)?;
        let tx = self.conn.transaction()?;
        for (key, value) in [
            (KEY_POINTS, progress.points.to_string()),
            (KEY_TOTAL_POINTS, progress.total_points.to_string()),
            (KEY_COLLECTIBLES, collectibles),
        ] {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        for (id, on) in &progress.unlocked {
            tx.execute(
                "INSERT OR IGNORE INTO trophies (id, unlocked_on) VALUES (?1, ?2)",
                params![id, calendar::format_day(*on)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{local_noon, parse_day};
    use crate::habit::NewHabit;

    fn sample_habit() -> Habit {
        let mut habit = NewHabit::new("Meditate", Frequency::Weekly)
            .with_mode(HabitMode::Break)
            .with_weekly_target(2)
            .into_habit(parse_day("2024-01-01").unwrap())
            .unwrap();
        habit.completions = vec![
            local_noon(parse_day("2024-01-02").unwrap()),
            local_noon(parse_day("2024-01-04").unwrap()),
        ];
        habit.streak = 1;
        habit.points = 10;
        habit.credited_points = 15;
        habit
    }

    #[test]
    fn habit_roundtrip() {
        let mut db = Database::open_memory().unwrap();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();
        let loaded = db.load_habits().unwrap();
        assert_eq!(loaded, vec![habit]);
    }

    #[test]
    fn save_replaces_completion_rows() {
        let mut db = Database::open_memory().unwrap();
        let mut habit = sample_habit();
        db.save_habit(&habit).unwrap();
        habit.completions.truncate(1);
        db.save_habit(&habit).unwrap();

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn delete_removes_completions() {
        let mut db = Database::open_memory().unwrap();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();
        db.delete_habit(&habit.id).unwrap();
        assert!(db.load_habits().unwrap().is_empty());
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn fresh_progress_is_zero() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.load_progress().unwrap(), GlobalProgress::default());
    }

    #[test]
    fn progress_roundtrip() {
        let mut db = Database::open_memory().unwrap();
        let mut progress = GlobalProgress {
            points: 35,
            total_points: 80,
            applied_collectibles: vec!["aurora".into()],
            ..Default::default()
        };
        progress
            .unlocked
            .insert("first_step".into(), parse_day("2024-01-02").unwrap());
        db.save_progress(&progress).unwrap();
        assert_eq!(db.load_progress().unwrap(), progress);
    }

    #[test]
    fn corrupt_frequency_is_reported() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO habits (id, name, frequency, created_at)
                 VALUES ('bad', 'Bad', 'hourly', '2024-01-01')",
                [],
            )
            .unwrap();
        let err = db.load_habits().unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Storage(StorageError::CorruptRow { .. })
        ));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
