pub mod config;
pub mod habit;
pub mod progress;
pub mod stats;

use chrono::{DateTime, Local};
use streakwise_core::calendar::{parse_day, today};
use streakwise_core::{Config, Database, Day, Event, HabitStore, PreferenceContext};

/// Open the on-disk store with preferences from the config file, rescored
/// as of `now`. Preference changes made through the store are written back
/// to the config file.
pub fn open_store(now: DateTime<Local>) -> Result<HabitStore<Database>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let prefs = PreferenceContext::new(config.preferences());
    let mut store = HabitStore::open(Database::open()?, prefs)?;
    store.subscribe(Config::change_writer(Config::path()?));
    store.refresh(now)?;
    store.drain_events();
    Ok(store)
}

/// Whether listings include archived habits: `--all`, or `ui.show_archived`.
pub fn include_archived(all: bool) -> Result<bool, Box<dyn std::error::Error>> {
    Ok(all || Config::load()?.ui.show_archived)
}

/// `--date` argument, defaulting to today.
pub fn day_arg(date: Option<&str>) -> Result<Day, Box<dyn std::error::Error>> {
    match date {
        Some(raw) => Ok(parse_day(raw)?),
        None => Ok(today()),
    }
}

/// Human-readable notices for the noteworthy events, written to stderr so
/// stdout stays machine-readable.
pub fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::LevelUp { to, .. } => eprintln!("Level up! You reached level {to}."),
            Event::TrophyUnlocked { trophy_id, .. } => {
                let title = streakwise_core::trophies::find(trophy_id)
                    .map_or(trophy_id.as_str(), |t| t.title);
                eprintln!("Trophy unlocked: {title}");
            }
            _ => {}
        }
    }
}
