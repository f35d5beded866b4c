//! Core error types for subtrack-core.
//!
//! This module defines the error hierarchy using thiserror. Storage and
//! configuration failures carry their own enums so callers can tell a
//! corrupt slot apart from an invalid user input.

use std::path::PathBuf;
use thiserror::Error;

use crate::tracker::TrackerState;

/// Core error type for subtrack-core.
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

    /// A mutation was attempted before the tracker finished loading
    #[error("Tracker is not ready (state: {0})")]
    NotReady(TrackerState),

    /// No id above the highest stored one is left to issue
    #[error("No subscription ids left above {0}")]
    IdsExhausted(i64),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised by the key-value byte store and the subscription slot codec.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store is not available at all (e.g. disabled or unreachable)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Slot content is not a valid stored collection
    #[error("Failed to decode slot '{slot}': {source}")]
    Decode {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    /// Slot was written by a newer schema than this build understands
    #[error("Unsupported schema version {found} (latest known: {latest})")]
    UnsupportedVersion { found: u32, latest: u32 },

    /// Migration from an older schema failed
    #[error("Migration from schema version {from} failed: {message}")]
    MigrationFailed { from: u32, message: String },

    /// Failed to resolve the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Subscription name is empty or whitespace
    #[error("Subscription name must not be empty")]
    EmptyName,

    /// Monthly value is negative, NaN or infinite
    #[error("Invalid value {0}: must be a finite, non-negative amount")]
    InvalidAmount(f64),

    /// Next charge date is not a `YYYY-MM-DD` calendar date
    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
