//! Schema migrations for the stored subscription slot.
//!
//! The slot holds `{"version": N, "subscriptions": [...]}`. A bare JSON array
//! is the unversioned legacy layout and is read as version 0. Each migration
//! takes the JSON tree of version `N` to version `N + 1`.

use serde_json::{json, Value};

use crate::error::StorageError;

/// Current schema version.
///
/// Increment this when adding a new migration to [`MIGRATIONS`].
pub const CURRENT_VERSION: u32 = 1;

type Migration = fn(Value) -> Result<Value, String>;

/// Migrations keyed by the version they upgrade from.
const MIGRATIONS: &[(u32, Migration)] = &[(0, migrate_v0_to_v1)];

/// Version of a decoded slot tree.
pub fn detect_version(tree: &Value) -> Result<u32, String> {
    match tree {
        Value::Array(_) => Ok(0),
        Value::Object(obj) => obj
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| "missing or invalid 'version' field".to_string()),
        _ => Err("expected an array or a versioned object".to_string()),
    }
}

/// Bring a slot tree up to [`CURRENT_VERSION`].
///
/// # Errors
/// Returns [`StorageError::UnsupportedVersion`] for trees written by a newer
/// build and [`StorageError::MigrationFailed`] when a step rejects the tree.
pub fn migrate(mut tree: Value) -> Result<Value, StorageError> {
    let mut version =
        detect_version(&tree).map_err(|message| StorageError::MigrationFailed { from: 0, message })?;

    if version > CURRENT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: version,
            latest: CURRENT_VERSION,
        });
    }

    while version < CURRENT_VERSION {
        let step = MIGRATIONS
            .iter()
            .find(|(from, _)| *from == version)
            .map(|(_, step)| *step)
            .ok_or_else(|| StorageError::MigrationFailed {
                from: version,
                message: "no migration registered".into(),
            })?;
        tree = step(tree).map_err(|message| StorageError::MigrationFailed { from: version, message })?;
        log::debug!("migrated subscription slot from v{version} to v{}", version + 1);
        version += 1;
    }

    Ok(tree)
}

/// v0 -> v1: wrap the bare array in a versioned envelope.
fn migrate_v0_to_v1(tree: Value) -> Result<Value, String> {
    match tree {
        Value::Array(items) => Ok(json!({ "version": 1, "subscriptions": items })),
        other => Err(format!("expected a JSON array, found {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_is_version_zero() {
        assert_eq!(detect_version(&json!([])), Ok(0));
        assert_eq!(detect_version(&json!({"version": 1, "subscriptions": []})), Ok(1));
        assert!(detect_version(&json!("nope")).is_err());
        assert!(detect_version(&json!({"subscriptions": []})).is_err());
    }

    #[test]
    fn legacy_array_is_wrapped() {
        let legacy = json!([{"id": 1, "name": "Netflix", "value": 39.9, "nextDate": "2024-01-10"}]);
        let migrated = migrate(legacy).unwrap();
        assert_eq!(migrated["version"], 1);
        assert_eq!(migrated["subscriptions"][0]["name"], "Netflix");
    }

    #[test]
    fn current_version_is_untouched() {
        let tree = json!({"version": CURRENT_VERSION, "subscriptions": []});
        assert_eq!(migrate(tree.clone()).unwrap(), tree);
    }

    #[test]
    fn newer_version_is_rejected() {
        let tree = json!({"version": CURRENT_VERSION + 1, "subscriptions": []});
        assert!(matches!(
            migrate(tree),
            Err(StorageError::UnsupportedVersion { .. })
        ));
    }
}
