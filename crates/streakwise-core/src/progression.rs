//! Level progression.
//!
//! Maps lifetime points ("essence") onto a level and the progress made
//! inside that level.

use serde::{Deserialize, Serialize};

/// Points needed to enter each level, starting with level 1 at 0.
///
/// Must be strictly increasing.
pub static LEVEL_THRESHOLDS: &[u64] = &[
    0, 50, 150, 300, 500, 750, 1050, 1400, 1800, 2250, 2750, 3300, 3900, 4550, 5250, 6000, 6800,
    7650, 8550, 9500,
];

/// Where a point total sits within its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelWindow {
    pub level: u32,
    /// Threshold of the current level
    pub current_min: u64,
    /// Threshold of the next level; equals `current_min` at the final level
    pub next_min: u64,
    /// Points earned since entering the current level
    pub within: u64,
    /// Points spanned by the current level, at least 1
    pub needed: u64,
    /// Progress through the current level, 0 to 100
    pub percent: u8,
}

impl LevelWindow {
    pub fn is_max_level(&self) -> bool {
        self.level as usize >= LEVEL_THRESHOLDS.len()
    }
}

/// Highest level whose threshold is at or below `points`.
pub fn compute_level(points: u64) -> u32 {
    LEVEL_THRESHOLDS
        .partition_point(|threshold| *threshold <= points)
        .max(1) as u32
}

pub fn level_window(points: u64) -> LevelWindow {
    let level = compute_level(points);
    let index = level as usize - 1;
    let current_min = LEVEL_THRESHOLDS.get(index).copied().unwrap_or(0);
    let next_min = LEVEL_THRESHOLDS
        .get(index + 1)
        .copied()
        .unwrap_or(current_min);
    let within = points.saturating_sub(current_min);
    let needed = next_min.saturating_sub(current_min).max(1);
    let percent = (within.saturating_mul(100) / needed).min(100) as u8;
    LevelWindow {
        level,
        current_min,
        next_min,
        within,
        needed,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_strictly_increase_from_zero() {
        assert_eq!(LEVEL_THRESHOLDS[0], 0);
        assert!(LEVEL_THRESHOLDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(compute_level(0), 1);
        assert_eq!(compute_level(49), 1);
        assert_eq!(compute_level(50), 2);
        assert_eq!(compute_level(149), 2);
        assert_eq!(compute_level(150), 3);
        assert_eq!(compute_level(u64::MAX), LEVEL_THRESHOLDS.len() as u32);
    }

    #[test]
    fn window_inside_a_level() {
        let window = level_window(75);
        assert_eq!(window.level, 2);
        assert_eq!(window.current_min, 50);
        assert_eq!(window.next_min, 150);
        assert_eq!(window.within, 25);
        assert_eq!(window.needed, 100);
        assert_eq!(window.percent, 25);
        assert!(!window.is_max_level());
    }

    #[test]
    fn final_level_saturates() {
        let top = *LEVEL_THRESHOLDS.last().unwrap();
        let window = level_window(top + 1234);
        assert_eq!(window.next_min, window.current_min);
        assert_eq!(window.needed, 1);
        assert_eq!(window.percent, 100);
        assert!(window.is_max_level());
    }

    #[test]
    fn percent_never_exceeds_bounds() {
        for points in (0..12_000).step_by(7) {
            let window = level_window(points);
            assert!(window.percent <= 100);
        }
    }
}
