//! Subscription collection persistence.
//!
//! The full collection is written as one value into one slot of a
//! [`KeyValueStore`]. There are no partial writes.

use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use super::migrations::{self, CURRENT_VERSION};
use crate::error::{Result, StorageError};
use crate::subscription::Subscription;

/// Default slot name.
pub const DEFAULT_SLOT: &str = "subscriptions";

#[derive(Serialize)]
struct StoredRef<'a> {
    version: u32,
    subscriptions: &'a [Subscription],
}

#[derive(Deserialize)]
struct Stored {
    #[allow(dead_code)]
    version: u32,
    subscriptions: Vec<Subscription>,
}

/// Load/save adapter for the subscription slot.
#[derive(Debug, Clone)]
pub struct SubscriptionStore<S> {
    store: S,
    slot: String,
}

impl<S: KeyValueStore> SubscriptionStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_slot(store, DEFAULT_SLOT)
    }

    pub fn with_slot(store: S, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    /// Read the collection, surfacing every failure.
    ///
    /// A missing slot is an empty collection, not an error.
    pub fn try_load(&self) -> Result<Vec<Subscription>> {
        let Some(bytes) = self.store.get(&self.slot)? else {
            return Ok(Vec::new());
        };

        let decode = |source| StorageError::Decode {
            slot: self.slot.clone(),
            source,
        };
        let tree: serde_json::Value = serde_json::from_slice(&bytes).map_err(decode)?;
        let tree = migrations::migrate(tree)?;
        let stored: Stored = serde_json::from_value(tree).map_err(decode)?;
        Ok(stored.subscriptions)
    }

    /// Read the collection. Never fails: any problem yields an empty list
    /// and a warning.
    pub fn load(&self) -> Vec<Subscription> {
        match self.try_load() {
            Ok(subs) => {
                log::debug!("loaded {} subscriptions from slot '{}'", subs.len(), self.slot);
                subs
            }
            Err(e) => {
                log::warn!("could not read subscriptions, starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Replace the slot with `subs`.
    pub fn save(&self, subs: &[Subscription]) -> Result<()> {
        let stored = StoredRef {
            version: CURRENT_VERSION,
            subscriptions: subs,
        };
        let bytes = serde_json::to_vec(&stored)?;
        self.store.set(&self.slot, &bytes)?;
        Ok(())
    }
}
