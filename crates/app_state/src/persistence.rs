//! Selective persistence gate: payload format, allowlist/blocklist filtering,
//! rehydration, and the persistor controller.
//!
//! Persistence is advisory. Write failures are logged and swallowed so a full
//! or unavailable storage degrades the app to in-memory state rather than
//! breaking dispatch.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use app_host::StateStorage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::migrations::{run_migrations, MigrationStep, MIGRATIONS};
use crate::model::{AppState, SliceKey};

/// Storage key holding the persisted payload.
pub const PERSIST_STORAGE_KEY: &str = "primary";

/// Current persistence schema version.
pub const PERSIST_VERSION: u32 = 2;

/// Slices written to storage. Everything else is ephemeral.
pub const PERSISTED_SLICES: [SliceKey; 3] =
    [SliceKey::User, SliceKey::Transactions, SliceKey::Notifications];

/// Fields stripped from every persisted slice object, on write and on
/// rehydration. The profile is server-derived and must not survive locally.
pub const BLOCKED_SLICE_FIELDS: [&str; 1] = ["profile"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// `_persist` metadata carried alongside the persisted slices.
pub struct PersistMeta {
    /// Schema version the payload was written at.
    pub version: u32,
    /// Whether the writing store had completed rehydration.
    pub rehydrated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// On-disk payload: `_persist` metadata plus one field per persisted slice.
///
/// Slices are kept as raw JSON so payloads written by older schema versions
/// (or carrying retired slices) still parse and can be migrated.
pub struct PersistedPayload {
    /// Payload metadata.
    #[serde(rename = "_persist")]
    pub meta: PersistMeta,
    /// Persisted slice values keyed by slice name.
    #[serde(flatten)]
    pub slices: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
/// Persistence configuration: where the payload lives and how it is filtered
/// and migrated.
pub struct PersistConfig {
    /// Storage key for the payload.
    pub storage_key: &'static str,
    /// Schema version written with every payload.
    pub version: u32,
    /// Slices included in the payload.
    pub allowlist: &'static [SliceKey],
    /// Slice fields excluded from the payload.
    pub blocklist: &'static [&'static str],
    /// Migration steps applied to older payloads.
    pub migrations: &'static [MigrationStep],
}

impl PersistConfig {
    /// The production configuration: key [`PERSIST_STORAGE_KEY`], version
    /// [`PERSIST_VERSION`], allowlist [`PERSISTED_SLICES`], blocklist
    /// [`BLOCKED_SLICE_FIELDS`], migrations [`MIGRATIONS`].
    pub fn primary() -> Self {
        Self {
            storage_key: PERSIST_STORAGE_KEY,
            version: PERSIST_VERSION,
            allowlist: &PERSISTED_SLICES,
            blocklist: &BLOCKED_SLICE_FIELDS,
            migrations: &MIGRATIONS,
        }
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self::primary()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Fatal persistence errors. Everything else is advisory and only logged.
pub enum PersistError {
    /// A migration step failed; the store cannot be constructed.
    #[error("migration to version {to_version} failed: {message}")]
    MigrationFailed {
        /// Version the failing step migrates to.
        to_version: u32,
        /// Underlying failure.
        message: String,
    },
}

#[derive(Clone)]
/// Controller over a store's persistence gate: pause/resume/flush/purge plus
/// status accessors.
///
/// Cheap to clone; clones control the same gate.
pub struct PersistController {
    inner: Rc<ControllerInner>,
}

struct ControllerInner {
    storage: Rc<dyn StateStorage>,
    config: PersistConfig,
    state: Rc<RefCell<AppState>>,
    paused: Cell<bool>,
    rehydrated: Cell<bool>,
}

impl PersistController {
    pub(crate) fn new(
        storage: Rc<dyn StateStorage>,
        config: PersistConfig,
        state: Rc<RefCell<AppState>>,
    ) -> Self {
        Self {
            inner: Rc::new(ControllerInner {
                storage,
                config,
                state,
                paused: Cell::new(false),
                rehydrated: Cell::new(false),
            }),
        }
    }

    /// Stop writing on state changes until [`resume`](Self::resume) is called.
    pub fn pause(&self) {
        self.inner.paused.set(true);
    }

    /// Re-enable writes and immediately persist the current state.
    pub fn resume(&self) {
        self.inner.paused.set(false);
        if self.inner.rehydrated.get() {
            self.write_now();
        }
    }

    /// Persist the current state immediately, paused or not.
    pub fn flush(&self) {
        self.write_now();
    }

    /// Delete the stored payload. Does not touch in-memory state.
    pub fn purge(&self) {
        if let Err(err) = self.inner.storage.delete_entry(self.inner.config.storage_key) {
            leptos::logging::warn!("failed to purge persisted app state: {err}");
        }
    }

    /// Whether rehydration has completed for the owning store.
    pub fn rehydrated(&self) -> bool {
        self.inner.rehydrated.get()
    }

    /// Schema version written with every payload.
    pub fn version(&self) -> u32 {
        self.inner.config.version
    }

    /// Called by store construction once the state reflects storage. Writes
    /// never happen before this: a store that skipped rehydration (server
    /// context) must not clobber the client's payload with defaults.
    pub(crate) fn mark_rehydrated(&self) {
        self.inner.rehydrated.set(true);
    }

    /// Write-on-change hook for store dispatch.
    pub(crate) fn persist_if_active(&self) {
        if self.inner.rehydrated.get() && !self.inner.paused.get() {
            self.write_now();
        }
    }

    fn write_now(&self) {
        let payload = {
            let state = self.inner.state.borrow();
            build_payload(&state, &self.inner.config, self.inner.rehydrated.get())
        };
        let raw = match serde_json::to_string(&payload) {
            Ok(raw) => raw,
            Err(err) => {
                leptos::logging::warn!("failed to encode persisted app state: {err}");
                return;
            }
        };
        if let Err(err) = self
            .inner
            .storage
            .save_entry(self.inner.config.storage_key, &raw)
        {
            leptos::logging::warn!("failed to persist app state: {err}");
        }
    }
}

/// Build the payload for `state` under `config`: allowlisted slices only,
/// blocklisted fields stripped.
fn build_payload(state: &AppState, config: &PersistConfig, rehydrated: bool) -> PersistedPayload {
    let mut slices = BTreeMap::new();
    for slice in config.allowlist {
        let mut value = match state.slice_json(*slice) {
            Ok(value) => value,
            Err(err) => {
                leptos::logging::warn!("failed to encode slice {slice}: {err}");
                continue;
            }
        };
        strip_blocked_fields(&mut value, config.blocklist);
        slices.insert(slice.as_str().to_owned(), value);
    }
    PersistedPayload {
        meta: PersistMeta {
            version: config.version,
            rehydrated,
        },
        slices,
    }
}

fn strip_blocked_fields(value: &mut Value, blocklist: &[&str]) {
    if let Value::Object(map) = value {
        for field in blocklist {
            map.remove(*field);
        }
    }
}

/// Merge the stored payload into `state`, migrating older payloads first.
///
/// Absent, unreadable, or corrupt payloads leave `state` untouched. A slice
/// that fails typed decoding is skipped with a warning; a failed migration
/// step is fatal and aborts store construction.
pub(crate) fn rehydrate_into(
    state: &mut AppState,
    storage: &dyn StateStorage,
    config: &PersistConfig,
) -> Result<(), PersistError> {
    let raw = match storage.load_entry(config.storage_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(()),
        Err(err) => {
            leptos::logging::warn!("failed to read persisted app state: {err}");
            return Ok(());
        }
    };

    let mut payload: PersistedPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(err) => {
            leptos::logging::warn!("discarding corrupt persisted app state: {err}");
            return Ok(());
        }
    };

    let recorded = payload.meta.version;
    if recorded < config.version {
        run_migrations(&mut payload, recorded, config, storage)?;
    }

    for slice in config.allowlist {
        let Some(mut value) = payload.slices.get(slice.as_str()).cloned() else {
            continue;
        };
        strip_blocked_fields(&mut value, config.blocklist);
        if let Err(err) = state.set_slice_from_json(*slice, value) {
            leptos::logging::warn!("skipping persisted slice {slice}: {err}");
        }
    }
    Ok(())
}
