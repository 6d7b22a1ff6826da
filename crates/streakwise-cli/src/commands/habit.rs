//! Habit management commands for CLI.

use chrono::Local;
use clap::Subcommand;
use streakwise_core::{Frequency, HabitMode, NewHabit};

use super::{day_arg, include_archived, open_store, report};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// daily, weekly or monthly (default: daily)
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// build or break (default: build)
        #[arg(long, default_value = "build")]
        mode: String,
        /// Distinct days per week for an achieved week
        #[arg(long)]
        weekly_target: Option<u32>,
        /// Distinct days per month for an achieved month
        #[arg(long)]
        monthly_target: Option<u32>,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Show a habit with its current score
    Show {
        /// Habit ID
        id: String,
    },
    /// Toggle a completion for a day
    Done {
        /// Habit ID
        id: String,
        /// Day to toggle, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Rename a habit
    Rename {
        /// Habit ID
        id: String,
        /// New name
        name: String,
    },
    /// Change weekly and/or monthly targets
    Target {
        /// Habit ID
        id: String,
        #[arg(long)]
        weekly: Option<u32>,
        #[arg(long)]
        monthly: Option<u32>,
    },
    /// Hide a habit from the default listing
    Archive {
        /// Habit ID
        id: String,
    },
    /// Bring an archived habit back
    Unarchive {
        /// Habit ID
        id: String,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let now = Local::now();
    let mut store = open_store(now)?;

    match action {
        HabitAction::Add {
            name,
            frequency,
            mode,
            weekly_target,
            monthly_target,
        } => {
            let mut new = NewHabit::new(name, frequency.parse::<Frequency>()?)
                .with_mode(mode.parse::<HabitMode>()?);
            new.weekly_target = weekly_target;
            new.monthly_target = monthly_target;
            let habit = store.create_habit(new, now)?;
            println!("{}", serde_json::to_string_pretty(habit)?);
        }
        HabitAction::List { all } => {
            let habits = store.habits(include_archived(all)?);
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Show { id } => {
            let habit = store
                .habit(&id)
                .ok_or_else(|| format!("Habit not found: {id}"))?;
            let score = store.score(&id, &now)?;
            let out = serde_json::json!({ "habit": habit, "score": score });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        HabitAction::Done { id, date } => {
            let day = day_arg(date.as_deref())?;
            let events = store.toggle_completion(&id, day, now)?;
            report(&events);
            let habit = store
                .habit(&id)
                .ok_or_else(|| format!("Habit not found: {id}"))?;
            let out = serde_json::json!({
                "habit_id": habit.id,
                "day": day,
                "completed": habit.is_completed_on(day),
                "streak": habit.streak,
                "points": habit.points,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        HabitAction::Rename { id, name } => {
            store.rename_habit(&id, &name, now)?;
            println!("Habit renamed: {id}");
        }
        HabitAction::Target { id, weekly, monthly } => {
            if weekly.is_none() && monthly.is_none() {
                return Err("pass --weekly and/or --monthly".into());
            }
            store.set_targets(&id, weekly, monthly, now)?;
            report(&store.drain_events());
            println!("Habit targets updated: {id}");
        }
        HabitAction::Archive { id } => {
            store.set_archived(&id, true, now)?;
            println!("Habit archived: {id}");
        }
        HabitAction::Unarchive { id } => {
            store.set_archived(&id, false, now)?;
            println!("Habit unarchived: {id}");
        }
        HabitAction::Delete { id } => {
            store.delete_habit(&id, now)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
