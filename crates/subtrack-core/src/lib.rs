//! # subtrack Core Library
//!
//! Core logic for subtrack, a personal subscription tracker. The `subtrack`
//! CLI is a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Domain model**: [`Subscription`] and the pure functions in [`query`]
//!   (totals, category grouping, status and upcoming-charge selection)
//! - **Storage**: a key-value byte store holding the whole collection in one
//!   versioned JSON slot, plus TOML-based configuration
//! - **Alerts**: best-effort notifications for charges due within a lookahead
//!   window
//! - **Tracker**: the controller that owns the collection and sequences
//!   persistence and alerting after each mutation
//!
//! ## Key Components
//!
//! - [`Tracker`]: State controller
//! - [`SubscriptionStore`]: Collection persistence
//! - [`Alerter`]: Upcoming-charge notifications
//! - [`Config`]: Application configuration management

pub mod alerts;
pub mod error;
pub mod events;
pub mod export;
pub mod query;
pub mod storage;
pub mod subscription;
pub mod tracker;

pub use alerts::{Alerter, MemoryHost, Notification, NotificationHost, Permission};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use query::{CategoryTotal, StatusFilter, Summary, DEFAULT_HORIZON_DAYS};
pub use storage::{Config, FileStore, KeyValueStore, MemoryStore, SubscriptionStore};
pub use subscription::{
    format_amount, parse_next_date, Amount, Status, Subscription, SubscriptionDraft,
    DEFAULT_CATEGORY,
};
pub use tracker::{Tracker, TrackerState};
