//! # Streakwise Core Library
//!
//! Core logic for the Streakwise habit tracker. Every front end (currently
//! the `streakwise` CLI) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Calendar**: local-day normalization plus week and month boundaries
//!   under a configurable first day of the week
//! - **Scoring**: pure functions turning a habit's completions into a streak,
//!   points and period counts
//! - **Progression**: lifetime points to level and in-level progress
//! - **Store**: owns habits and global progress, rescoring on every change
//!   and persisting through a [`HabitRepository`]
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`HabitStore`]: habit and progress state machine
//! - [`Database`]: SQLite-backed [`HabitRepository`]
//! - [`Config`]: Application configuration management
//! - [`PreferenceContext`]: week start, theme and accent with change observers

pub mod calendar;
pub mod error;
pub mod events;
pub mod habit;
pub mod preferences;
pub mod progression;
pub mod scoring;
pub mod storage;
pub mod store;
pub mod trophies;

pub use calendar::{CalendarDay, Day, WeekStart};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use habit::{Frequency, Habit, HabitMode, NewHabit};
pub use preferences::{PreferenceChange, PreferenceContext, Preferences, Theme};
pub use progression::{compute_level, level_window, LevelWindow};
pub use scoring::{calc_points, calc_streak, ScoreCard};
pub use storage::{Config, Database};
pub use store::{GlobalProgress, HabitRepository, HabitStore, MemoryRepository};
pub use trophies::Trophy;
