//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Calendar settings (which weekday opens a week)
//! - Theme and accent colour
//!
//! Configuration is stored at `~/.config/streakwise/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::calendar::WeekStart;
use crate::error::{ConfigError, Result};
use crate::preferences::{default_accent, validate_accent, PreferenceChange, Preferences, Theme};

/// Calendar configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub week_start: WeekStart,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default)]
    pub show_archived: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/streakwise/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            accent: default_accent(),
            show_archived: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.trim().to_ascii_lowercase()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `config.toml` inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Self::canonical_value(key, value)?;
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, &value)?;
        let mut updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.ui.accent = validate_accent(&updated.ui.accent).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        *self = updated;
        Ok(())
    }

    /// Enum-valued keys accept every spelling their parser does and are
    /// stored under the canonical name.
    fn canonical_value(key: &str, value: &str) -> std::result::Result<String, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let canonical = match key {
            "calendar.week_start" => value
                .parse::<WeekStart>()
                .map_err(|e| invalid(e.to_string()))?
                .as_str(),
            "ui.theme" => value
                .parse::<Theme>()
                .map_err(|e| invalid(e.to_string()))?
                .as_str(),
            _ => return Ok(value.to_string()),
        };
        Ok(canonical.to_string())
    }

    /// Set a config value by key and save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            week_start: self.calendar.week_start,
            theme: self.ui.theme,
            accent: self.ui.accent.clone(),
        }
    }

    pub fn apply_change(&mut self, change: &PreferenceChange) {
        match change {
            PreferenceChange::WeekStart(week_start) => self.calendar.week_start = *week_start,
            PreferenceChange::Theme(theme) => self.ui.theme = *theme,
            PreferenceChange::Accent(accent) => self.ui.accent = accent.clone(),
        }
    }

    /// Subscriber that writes every preference change back to the file at
    /// `path`. Failures are logged, not propagated.
    pub fn change_writer(path: PathBuf) -> impl FnMut(&PreferenceChange) + 'static {
        move |change| {
            let saved = Self::load_from(&path).and_then(|mut cfg| {
                cfg.apply_change(change);
                cfg.save_to(&path)
            });
            match saved {
                Ok(()) => tracing::debug!(?change, path = %path.display(), "preference saved"),
                Err(e) => tracing::warn!(error = %e, path = %path.display(), "failed to save preference"),
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
