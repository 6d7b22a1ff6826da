use chrono::Local;
use clap::Subcommand;
use streakwise_core::trophies::TROPHIES;

use super::open_store;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Balance, lifetime points and level
    Show,
    /// Every trophy with its unlock date, if any
    Trophies,
    /// Spend points from the balance
    Spend {
        /// Points to spend
        amount: u64,
    },
    /// Apply a cosmetic collectible
    Apply {
        /// Collectible name
        name: String,
    },
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let now = Local::now();
    let mut store = open_store(now)?;

    match action {
        ProgressAction::Show => {
            let progress = store.progress();
            let out = serde_json::json!({
                "points": progress.points,
                "total_points": progress.total_points,
                "level": store.level_window(),
                "trophies_unlocked": progress.unlocked.len(),
                "applied_collectibles": progress.applied_collectibles,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ProgressAction::Trophies => {
            let unlocked = &store.progress().unlocked;
            let rows: Vec<_> = TROPHIES
                .iter()
                .map(|trophy| {
                    serde_json::json!({
                        "id": trophy.id,
                        "title": trophy.title,
                        "description": trophy.description,
                        "unlocked_on": unlocked.get(trophy.id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        ProgressAction::Spend { amount } => {
            let balance = store.spend_points(amount, now)?;
            println!("Spent {amount} points, {balance} left");
        }
        ProgressAction::Apply { name } => {
            store.apply_collectible(&name, now)?;
            println!("Collectible applied: {}", name.trim());
        }
    }
    Ok(())
}
