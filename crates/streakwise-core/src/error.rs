//! Core error types for streakwise-core.
//!
//! The scoring engine itself never fails; these errors cover the layers
//! around it: ingestion, persistence and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for streakwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded back into a domain value
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: String, message: String },

    /// Could not determine where application data lives
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors raised at ingestion boundaries.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// No habit with the given id
    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    /// Habit names must contain something other than whitespace
    #[error("Habit name must not be empty")]
    EmptyName,

    /// Weekly and monthly targets start at one
    #[error("Invalid {field} target {value}: must be at least 1")]
    InvalidTarget { field: &'static str, value: u32 },

    /// Weekly target cannot exceed the days in a week, monthly the days in a month
    #[error("Invalid {field} target {value}: must be at most {max}")]
    TargetTooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// Unparseable date or timestamp
    #[error("Invalid date '{input}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate { input: String },

    /// Completions cannot be recorded ahead of the current day
    #[error("Cannot record a completion for {day}: it is after today ({today})")]
    FutureDate {
        day: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    /// Not enough spendable points
    #[error("Insufficient points: need {needed}, have {available}")]
    InsufficientPoints { needed: u64, available: u64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
