use std::collections::BTreeMap;

use super::GlobalProgress;
use crate::error::Result;
use crate::habit::Habit;

/// Persistence backend for [`HabitStore`](super::HabitStore).
///
/// The store only ever talks to storage through this trait, one typed
/// record at a time.
pub trait HabitRepository {
    /// All stored habits, archived ones included.
    fn load_habits(&self) -> Result<Vec<Habit>>;

    /// Insert or replace a habit together with its completion list.
    fn save_habit(&mut self, habit: &Habit) -> Result<()>;

    /// Remove a habit and its completions. Unknown ids are a no-op.
    fn delete_habit(&mut self, id: &str) -> Result<()>;

    /// Global progress, or the zero value on a fresh backend.
    fn load_progress(&self) -> Result<GlobalProgress>;

    fn save_progress(&mut self, progress: &GlobalProgress) -> Result<()>;
}

/// In-memory repository for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    habits: BTreeMap<String, Habit>,
    progress: GlobalProgress,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing habits.
    pub fn with_habits(habits: impl IntoIterator<Item = Habit>) -> Self {
        Self {
            habits: habits.into_iter().map(|h| (h.id.clone(), h)).collect(),
            progress: GlobalProgress::default(),
        }
    }

    pub fn with_progress(mut self, progress: GlobalProgress) -> Self {
        self.progress = progress;
        self
    }
}

impl HabitRepository for MemoryRepository {
    fn load_habits(&self) -> Result<Vec<Habit>> {
        Ok(self.habits.values().cloned().collect())
    }

    fn save_habit(&mut self, habit: &Habit) -> Result<()> {
        self.habits.insert(habit.id.clone(), habit.clone());
        Ok(())
    }

    fn delete_habit(&mut self, id: &str) -> Result<()> {
        self.habits.remove(id);
        Ok(())
    }

    fn load_progress(&self) -> Result<GlobalProgress> {
        Ok(self.progress.clone())
    }

    fn save_progress(&mut self, progress: &GlobalProgress) -> Result<()> {
        self.progress = progress.clone();
        Ok(())
    }
}
