use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change of the tracker produces an Event.
/// Observers registered on the tracker receive it with the new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Loaded {
        count: usize,
        at: DateTime<Utc>,
    },
    Added {
        id: i64,
        at: DateTime<Utc>,
    },
    /// `found` is false when no entry had the id; the collection is unchanged.
    Updated {
        id: i64,
        found: bool,
        at: DateTime<Utc>,
    },
    Removed {
        id: i64,
        found: bool,
        at: DateTime<Utc>,
    },
}
