//! Versioned migrations applied to persisted payloads during rehydration.

use app_host::StateStorage;

use crate::model::SliceKey;
use crate::persistence::{PersistConfig, PersistError, PersistedPayload};

/// Flat legacy keys mirrored by the version-2 migration, one per persisted
/// slice. External consumers read these directly from storage.
pub const LEGACY_SLICE_KEYS: [(SliceKey, &str); 3] = [
    (SliceKey::User, "pcs:user"),
    (SliceKey::Transactions, "pcs:transactions"),
    (SliceKey::Notifications, "pcs:notifications"),
];

#[derive(Debug, Clone, Copy)]
/// One migration step, applied when rehydrating a payload recorded before
/// `to_version`.
pub struct MigrationStep {
    /// Version this step migrates the payload up to.
    pub to_version: u32,
    /// Transform applied to the payload. Gets storage access for side-channel
    /// writes; a returned error aborts store construction.
    pub run: fn(&mut PersistedPayload, &dyn StateStorage) -> Result<(), String>,
}

/// Every known migration step. Applied in ascending `to_version` order.
pub const MIGRATIONS: [MigrationStep; 1] = [MigrationStep {
    to_version: 2,
    run: export_legacy_slice_keys,
}];

/// Run the steps with `recorded < to_version <= config.version`, ascending.
pub(crate) fn run_migrations(
    payload: &mut PersistedPayload,
    recorded: u32,
    config: &PersistConfig,
    storage: &dyn StateStorage,
) -> Result<(), PersistError> {
    let mut steps: Vec<&MigrationStep> = config
        .migrations
        .iter()
        .filter(|step| step.to_version > recorded && step.to_version <= config.version)
        .collect();
    steps.sort_by_key(|step| step.to_version);

    for step in steps {
        (step.run)(payload, storage).map_err(|message| PersistError::MigrationFailed {
            to_version: step.to_version,
            message,
        })?;
    }
    Ok(())
}

/// Version-2 step: mirror each persisted slice present in the payload to its
/// flat legacy key, leaving the payload itself untouched.
fn export_legacy_slice_keys(
    payload: &mut PersistedPayload,
    storage: &dyn StateStorage,
) -> Result<(), String> {
    for (slice, legacy_key) in LEGACY_SLICE_KEYS {
        let Some(value) = payload.slices.get(slice.as_str()) else {
            continue;
        };
        let raw = serde_json::to_string(value)
            .map_err(|err| format!("failed to encode legacy {legacy_key}: {err}"))?;
        storage
            .save_entry(legacy_key, &raw)
            .map_err(|err| format!("failed to write legacy {legacy_key}: {err}"))?;
    }
    Ok(())
}

/// Storage double whose writes always fail, for migration-error tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SaveFailingStorage {
    pub inner: app_host::MemoryStateStorage,
}

#[cfg(test)]
impl StateStorage for SaveFailingStorage {
    fn load_entry(&self, key: &str) -> Result<Option<String>, String> {
        self.inner.load_entry(key)
    }

    fn save_entry(&self, _key: &str, _value: &str) -> Result<(), String> {
        Err("disk full".to_owned())
    }

    fn delete_entry(&self, key: &str) -> Result<(), String> {
        self.inner.delete_entry(key)
    }
}

#[cfg(test)]
mod tests {
    use app_host::MemoryStateStorage;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::persistence::{PersistMeta, PERSIST_VERSION};

    fn payload_v1(slices: &[(SliceKey, serde_json::Value)]) -> PersistedPayload {
        PersistedPayload {
            meta: PersistMeta {
                version: 1,
                rehydrated: true,
            },
            slices: slices
                .iter()
                .map(|(slice, value)| (slice.as_str().to_owned(), value.clone()))
                .collect(),
        }
    }

    #[test]
    fn migration_table_is_ascending_and_within_the_current_version() {
        let mut previous = 0;
        for step in MIGRATIONS {
            assert!(step.to_version > previous);
            assert!(step.to_version <= PERSIST_VERSION);
            previous = step.to_version;
        }
    }

    #[test]
    fn legacy_export_writes_only_slices_present_in_the_payload() {
        let storage = MemoryStateStorage::default();
        let user = json!({ "slippage_bps": 75 });
        let mut payload = payload_v1(&[(SliceKey::User, user.clone())]);
        let before = payload.clone();

        run_migrations(&mut payload, 1, &PersistConfig::primary(), &storage)
            .expect("migrations run");

        assert_eq!(
            storage.load_entry("pcs:user"),
            Ok(Some(serde_json::to_string(&user).unwrap()))
        );
        assert_eq!(storage.load_entry("pcs:transactions"), Ok(None));
        assert_eq!(storage.load_entry("pcs:notifications"), Ok(None));
        assert_eq!(payload, before);
    }

    #[test]
    fn payload_already_at_the_current_version_runs_no_steps() {
        let storage = MemoryStateStorage::default();
        let mut payload = payload_v1(&[(SliceKey::User, json!({}))]);

        run_migrations(
            &mut payload,
            PERSIST_VERSION,
            &PersistConfig::primary(),
            &storage,
        )
        .expect("migrations run");

        assert!(storage.is_empty());
    }

    #[test]
    fn failed_legacy_write_surfaces_as_a_migration_error() {
        let storage = SaveFailingStorage::default();
        let mut payload = payload_v1(&[(SliceKey::User, json!({}))]);

        let err = run_migrations(&mut payload, 1, &PersistConfig::primary(), &storage)
            .expect_err("write failure propagates");

        assert_eq!(
            err,
            PersistError::MigrationFailed {
                to_version: 2,
                message: "failed to write legacy pcs:user: disk full".to_owned(),
            }
        );
    }
}
