//! User preferences with change notification.
//!
//! Preferences live in an explicit [`PreferenceContext`] that callers own and
//! pass around, instead of a process-wide static. Interested parties register
//! a callback and are told about every effective change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::WeekStart;
use crate::error::ValidationError;

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system setting
    #[default]
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(ValidationError::InvalidValue {
                field: "theme".to_string(),
                message: format!("expected light, dark or system, got '{other}'"),
            }),
        }
    }
}

pub(crate) fn default_accent() -> String {
    "#3b82f6".into()
}

/// Check that `accent` is a `#rrggbb` colour.
pub fn validate_accent(accent: &str) -> Result<String, ValidationError> {
    let hex = accent.trim();
    let valid = hex.len() == 7
        && hex.starts_with('#')
        && hex[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ValidationError::InvalidValue {
            field: "accent".to_string(),
            message: format!("expected a #rrggbb colour, got '{accent}'"),
        });
    }
    Ok(hex.to_ascii_lowercase())
}

/// Snapshot of all user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            theme: Theme::default(),
            accent: default_accent(),
        }
    }
}

/// A single effective preference change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PreferenceChange {
    WeekStart(WeekStart),
    Theme(Theme),
    Accent(String),
}

/// Handle returned by [`PreferenceContext::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&PreferenceChange)>;

/// Owner of the live preferences and their subscribers.
pub struct PreferenceContext {
    prefs: Preferences,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl PreferenceContext {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn week_start(&self) -> WeekStart {
        self.prefs.week_start
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme
    }

    pub fn accent(&self) -> &str {
        &self.prefs.accent
    }

    /// Register `callback` for every subsequent change.
    pub fn subscribe(&mut self, callback: impl FnMut(&PreferenceChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Drop every subscriber, e.g. when the owning view is torn down.
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns true if the value changed.
    pub fn set_week_start(&mut self, week_start: WeekStart) -> bool {
        if self.prefs.week_start == week_start {
            return false;
        }
        self.prefs.week_start = week_start;
        self.notify(PreferenceChange::WeekStart(week_start));
        true
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        if self.prefs.theme == theme {
            return false;
        }
        self.prefs.theme = theme;
        self.notify(PreferenceChange::Theme(theme));
        true
    }

    pub fn set_accent(&mut self, accent: &str) -> Result<bool, ValidationError> {
        let accent = validate_accent(accent)?;
        if self.prefs.accent == accent {
            return Ok(false);
        }
        self.prefs.accent = accent.clone();
        self.notify(PreferenceChange::Accent(accent));
        Ok(true)
    }

    fn notify(&mut self, change: PreferenceChange) {
        tracing::debug!(?change, subscribers = self.subscribers.len(), "preference changed");
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&change);
        }
    }
}

impl Default for PreferenceContext {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl fmt::Debug for PreferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceContext")
            .field("prefs", &self.prefs)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
