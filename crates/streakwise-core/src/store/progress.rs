use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::Day;
use crate::progression::{compute_level, level_window, LevelWindow};

/// Account-wide progress shared by every habit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalProgress {
    /// Spendable balance.
    pub points: u64,
    /// Lifetime points. Never decreases.
    pub total_points: u64,
    /// Trophy id to the day it was unlocked.
    #[serde(default)]
    pub unlocked: BTreeMap<String, Day>,
    #[serde(default)]
    pub applied_collectibles: Vec<String>,
}

impl GlobalProgress {
    pub fn level(&self) -> u32 {
        compute_level(self.total_points)
    }

    pub fn level_window(&self) -> LevelWindow {
        level_window(self.total_points)
    }

    /// Pay newly earned points into both lifetime points and the balance.
    pub(crate) fn credit(&mut self, amount: u64) {
        self.total_points = self.total_points.saturating_add(amount);
        self.points = self.points.saturating_add(amount);
    }
}
