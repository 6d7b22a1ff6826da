//! Habit store.
//!
//! [`HabitStore`] owns the habits, the global progress and the preference
//! context. Every mutation that can move a score re-runs the scoring engine
//! for the affected habits, settles lifetime points, levels and trophies,
//! and writes the results through the [`HabitRepository`].
//!
//! Lifetime points are paid per habit: each habit remembers the most it has
//! ever credited, and only points above that mark are paid out. Removing a
//! completion, raising a target or deleting the habit never takes points
//! back, and re-adding them never pays twice.

mod progress;
mod repository;

use std::collections::BTreeSet;

use chrono::{DateTime, Local, Utc};
use tracing::{debug, info};

use crate::calendar::{local_noon, CalendarDay, Day, WeekStart};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::habit::{self, Habit, NewHabit};
use crate::preferences::{PreferenceChange, PreferenceContext, SubscriptionId, Theme};
use crate::progression::LevelWindow;
use crate::scoring::{self, best_streak, calc_points, calc_streak, ScoreCard};
use crate::trophies::{self, TrophySnapshot};

pub use progress::GlobalProgress;
pub use repository::{HabitRepository, MemoryRepository};

/// Habits plus global progress, kept consistent with the scoring engine.
pub struct HabitStore<R: HabitRepository> {
    repo: R,
    prefs: PreferenceContext,
    habits: Vec<Habit>,
    progress: GlobalProgress,
    events: Vec<Event>,
}

impl<R: HabitRepository> HabitStore<R> {
    /// Load habits and progress from `repo`.
    ///
    /// Cached streaks are taken as stored; call [`refresh`](Self::refresh)
    /// to bring them up to date with the current day.
    pub fn open(repo: R, prefs: PreferenceContext) -> Result<Self> {
        let mut habits = repo.load_habits()?;
        habits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        let progress = repo.load_progress()?;
        debug!(habits = habits.len(), total_points = progress.total_points, "store opened");
        Ok(Self {
            repo,
            prefs,
            habits,
            progress,
            events: Vec::new(),
        })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn preferences(&self) -> &PreferenceContext {
        &self.prefs
    }

    pub fn week_start(&self) -> WeekStart {
        self.prefs.week_start()
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.prefs.set_theme(theme)
    }

    pub fn set_accent(&mut self, accent: &str) -> Result<bool> {
        Ok(self.prefs.set_accent(accent)?)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PreferenceChange) + 'static) -> SubscriptionId {
        self.prefs.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.prefs.unsubscribe(id)
    }

    /// Habits in creation order, optionally including archived ones.
    pub fn habits(&self, include_archived: bool) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|h| include_archived || !h.archived)
            .collect()
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn progress(&self) -> &GlobalProgress {
        &self.progress
    }

    pub fn level_window(&self) -> LevelWindow {
        self.progress.level_window()
    }

    /// Full score card for one habit as of `now`.
    pub fn score(&self, id: &str, now: &impl CalendarDay) -> Result<ScoreCard> {
        let habit = self
            .habit(id)
            .ok_or_else(|| ValidationError::HabitNotFound(id.to_string()))?;
        Ok(scoring::score(habit, now, self.week_start()))
    }

    /// Validate and add a habit, created on the local day of `now`.
    pub fn create_habit(&mut self, new: NewHabit, now: DateTime<Local>) -> Result<&Habit> {
        let habit = new.into_habit(now.calendar_day())?;
        self.repo.save_habit(&habit)?;
        info!(habit_id = %habit.id, name = %habit.name, frequency = %habit.frequency, "habit created");
        self.events.push(Event::HabitCreated {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            at: now.with_timezone(&Utc),
        });
        self.habits.push(habit);
        let index = self.habits.len() - 1;
        Ok(&self.habits[index])
    }

    pub fn rename_habit(&mut self, id: &str, name: &str, now: DateTime<Local>) -> Result<()> {
        let name = habit::validate_name(name)?;
        let index = self.index_of(id)?;
        self.habits[index].name = name;
        self.repo.save_habit(&self.habits[index])?;
        self.events.push(Event::HabitUpdated {
            habit_id: id.to_string(),
            at: now.with_timezone(&Utc),
        });
        Ok(())
    }

    /// Change weekly and/or monthly targets, then rescore the habit.
    pub fn set_targets(
        &mut self,
        id: &str,
        weekly: Option<u32>,
        monthly: Option<u32>,
        now: DateTime<Local>,
    ) -> Result<()> {
        let weekly = weekly.map(habit::validate_weekly_target).transpose()?;
        let monthly = monthly.map(habit::validate_monthly_target).transpose()?;
        let index = self.index_of(id)?;
        let week_start = self.week_start();
        let habit = &mut self.habits[index];
        if let Some(target) = weekly {
            habit.weekly_target = target;
        }
        if let Some(target) = monthly {
            habit.monthly_target = target;
        }
        rescore(habit, &now, week_start);
        self.repo.save_habit(&self.habits[index])?;
        self.events.push(Event::HabitUpdated {
            habit_id: id.to_string(),
            at: now.with_timezone(&Utc),
        });
        self.settle(now)
    }

    pub fn set_archived(&mut self, id: &str, archived: bool, now: DateTime<Local>) -> Result<()> {
        let index = self.index_of(id)?;
        if self.habits[index].archived == archived {
            return Ok(());
        }
        self.habits[index].archived = archived;
        self.repo.save_habit(&self.habits[index])?;
        self.events.push(Event::HabitArchived {
            habit_id: id.to_string(),
            archived,
            at: now.with_timezone(&Utc),
        });
        Ok(())
    }

    /// Remove a habit. Lifetime points it contributed are kept.
    pub fn delete_habit(&mut self, id: &str, now: DateTime<Local>) -> Result<()> {
        let index = self.index_of(id)?;
        let removed = self.habits.remove(index);
        self.repo.delete_habit(&removed.id)?;
        info!(habit_id = %removed.id, "habit deleted");
        self.events.push(Event::HabitDeleted {
            habit_id: removed.id,
            at: now.with_timezone(&Utc),
        });
        Ok(())
    }

    /// Flip the completion state of `day` for a habit.
    ///
    /// A day that already has completions loses all of them; otherwise one
    /// completion is recorded (at `now` when `day` is today, at local noon
    /// for earlier days). Returns the events this toggle produced.
    ///
    /// # Errors
    /// Unknown habit ids and days after `now` are rejected.
    pub fn toggle_completion(
        &mut self,
        id: &str,
        day: Day,
        now: DateTime<Local>,
    ) -> Result<Vec<Event>> {
        let today = now.calendar_day();
        if day > today {
            return Err(ValidationError::FutureDate { day, today }.into());
        }
        let index = self.index_of(id)?;
        let mark = self.events.len();
        let week_start = self.week_start();

        let habit = &mut self.habits[index];
        let completed = if habit.is_completed_on(day) {
            habit.completions.retain(|c| c.calendar_day() != day);
            false
        } else {
            let stamp = if day == today { now } else { local_noon(day) };
            habit.completions.push(stamp);
            habit.completions.sort();
            true
        };
        rescore(habit, &now, week_start);
        debug!(
            habit_id = %habit.id,
            %day,
            completed,
            streak = habit.streak,
            points = habit.points,
            "completion toggled"
        );
        self.events.push(Event::CompletionToggled {
            habit_id: habit.id.clone(),
            day,
            completed,
            streak: habit.streak,
            points: habit.points,
            at: now.with_timezone(&Utc),
        });
        self.repo.save_habit(&self.habits[index])?;
        self.settle(now)?;

        Ok(self.events[mark..].to_vec())
    }

    /// Switch the first day of the week and rescore every habit under it.
    pub fn set_week_start(&mut self, week_start: WeekStart, now: DateTime<Local>) -> Result<()> {
        if !self.prefs.set_week_start(week_start) {
            return Ok(());
        }
        self.events.push(Event::WeekStartChanged {
            week_start,
            at: now.with_timezone(&Utc),
        });
        self.refresh(now)
    }

    /// Rescore every habit as of `now`, persisting the ones that moved.
    pub fn refresh(&mut self, now: DateTime<Local>) -> Result<()> {
        let week_start = self.week_start();
        let mut changed = 0usize;
        for habit in &mut self.habits {
            if rescore(habit, &now, week_start) {
                self.repo.save_habit(habit)?;
                changed += 1;
            }
        }
        debug!(habits = self.habits.len(), changed, %week_start, "habits rescored");
        self.settle(now)
    }

    /// Deduct `amount` from the spendable balance.
    pub fn spend_points(&mut self, amount: u64, now: DateTime<Local>) -> Result<u64> {
        if amount > self.progress.points {
            return Err(ValidationError::InsufficientPoints {
                needed: amount,
                available: self.progress.points,
            }
            .into());
        }
        self.progress.points -= amount;
        self.repo.save_progress(&self.progress)?;
        self.events.push(Event::PointsSpent {
            amount,
            balance: self.progress.points,
            at: now.with_timezone(&Utc),
        });
        Ok(self.progress.points)
    }

    /// Record a cosmetic selection. Applying the same one twice is a no-op.
    pub fn apply_collectible(&mut self, name: &str, now: DateTime<Local>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "collectible".to_string(),
                message: "name must not be empty".to_string(),
            }
            .into());
        }
        if self.progress.applied_collectibles.iter().any(|c| c == name) {
            return Ok(());
        }
        self.progress.applied_collectibles.push(name.to_string());
        self.repo.save_progress(&self.progress)?;
        self.events.push(Event::CollectibleApplied {
            name: name.to_string(),
            at: now.with_timezone(&Utc),
        });
        Ok(())
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| ValidationError::HabitNotFound(id.to_string()).into())
    }

    fn trophy_snapshot(&self) -> TrophySnapshot {
        let week_start = self.week_start();
        let days: BTreeSet<Day> = self
            .habits
            .iter()
            .flat_map(|h| h.completion_days())
            .collect();
        TrophySnapshot {
            completion_days: days.len() as u64,
            longest_current_streak: self.habits.iter().map(|h| h.streak).max().unwrap_or(0),
            best_streak: self
                .habits
                .iter()
                .map(|h| best_streak(h, week_start))
                .max()
                .unwrap_or(0),
            total_points: self.progress.total_points,
            level: self.progress.level(),
            habits: self.habits.iter().filter(|h| !h.archived).count(),
        }
    }

    /// Pay out points each habit earned above its credited mark, then bring
    /// level and trophies in line and persist progress.
    fn settle(&mut self, now: DateTime<Local>) -> Result<()> {
        let at = now.with_timezone(&Utc);
        let level_before = self.progress.level();

        let mut gained = 0u64;
        for habit in &mut self.habits {
            if habit.points > habit.credited_points {
                gained += habit.points - habit.credited_points;
                habit.credited_points = habit.points;
                self.repo.save_habit(habit)?;
            }
        }
        self.progress.credit(gained);
        if gained > 0 {
            debug!(gained, total_points = self.progress.total_points, "points earned");
            self.events.push(Event::PointsEarned {
                amount: gained,
                total_points: self.progress.total_points,
                at,
            });
        }

        let level_after = self.progress.level();
        if level_after > level_before {
            info!(from = level_before, to = level_after, "level up");
            self.events.push(Event::LevelUp {
                from: level_before,
                to: level_after,
                at,
            });
        }

        let today = now.calendar_day();
        let snapshot = self.trophy_snapshot();
        for trophy in trophies::newly_unlocked(&snapshot, &self.progress.unlocked) {
            info!(trophy = trophy.id, "trophy unlocked");
            self.progress.unlocked.insert(trophy.id.to_string(), today);
            self.events.push(Event::TrophyUnlocked {
                trophy_id: trophy.id.to_string(),
                on: today,
                at,
            });
        }

        self.repo.save_progress(&self.progress)
    }
}

/// Recompute a habit's cached streak and points. Returns whether either moved.
fn rescore(habit: &mut Habit, now: &DateTime<Local>, week_start: WeekStart) -> bool {
    let streak = calc_streak(habit, now, week_start);
    let points = calc_points(habit, week_start);
    let changed = habit.streak != streak || habit.points != points;
    habit.streak = streak;
    habit.points = points;
    changed
}
