use chrono::Local;
use clap::Subcommand;
use serde::Serialize;
use streakwise_core::calendar::{month_range, week_range};
use streakwise_core::scoring::{count_completions_in_month, count_completions_in_week};
use streakwise_core::Day;

use super::{day_arg, include_archived, open_store};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Distinct completion days per habit in a month
    Month {
        /// Any day inside the month, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Distinct completion days per habit in a week
    Week {
        /// Any day inside the week, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Serialize)]
struct PeriodStats {
    start: Day,
    /// Exclusive
    end: Day,
    habits: Vec<HabitCount>,
}

#[derive(Debug, Serialize)]
struct HabitCount {
    id: String,
    name: String,
    completions: u32,
    target: u32,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(Local::now())?;

    let stats = match action {
        StatsAction::Month { date, all } => {
            let day = day_arg(date.as_deref())?;
            let (start, end) = month_range(day);
            let habits = store
                .habits(include_archived(all)?)
                .into_iter()
                .map(|h| HabitCount {
                    id: h.id.clone(),
                    name: h.name.clone(),
                    completions: count_completions_in_month(&h.completions, &day),
                    target: h.monthly_target(),
                })
                .collect();
            PeriodStats { start, end, habits }
        }
        StatsAction::Week { date, all } => {
            let day = day_arg(date.as_deref())?;
            let week_start = store.week_start();
            let (start, end) = week_range(day, week_start);
            let habits = store
                .habits(include_archived(all)?)
                .into_iter()
                .map(|h| HabitCount {
                    id: h.id.clone(),
                    name: h.name.clone(),
                    completions: count_completions_in_week(&h.completions, &day, week_start),
                    target: h.weekly_target(),
                })
                .collect();
            PeriodStats { start, end, habits }
        }
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
