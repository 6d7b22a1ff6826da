use chrono::Local;
use clap::Subcommand;
use streakwise_core::{Config, Theme, WeekStart};

use super::open_store;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "calendar.week_start", "ui.theme")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let now = Local::now();
            match key.as_str() {
                "calendar.week_start" => {
                    let mut store = open_store(now)?;
                    store.set_week_start(value.parse::<WeekStart>()?, now)?;
                }
                "ui.theme" => {
                    open_store(now)?.set_theme(value.parse::<Theme>()?);
                }
                "ui.accent" => {
                    open_store(now)?.set_accent(&value)?;
                }
                _ => Config::load()?.set(&key, &value)?,
            }
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let previous = Config::load_or_default().calendar.week_start;
            let config = Config::default();
            config.save()?;
            rescore_if_week_start_changed(previous, config.calendar.week_start)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Cached streaks depend on the first day of the week. Opening the store
/// after the config is saved rescores every habit under the new setting.
fn rescore_if_week_start_changed(
    previous: WeekStart,
    current: WeekStart,
) -> Result<(), Box<dyn std::error::Error>> {
    if previous == current {
        return Ok(());
    }
    open_store(Local::now())?;
    tracing::info!(from = %previous, to = %current, "week start changed, habits rescored");
    Ok(())
}
