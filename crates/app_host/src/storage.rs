//! Durable key-value storage contracts backing state persistence.
//!
//! Entries are JSON documents stored as text under string keys. The browser
//! adapter sits on `window.localStorage`, which is synchronous at the API
//! boundary, so the contract is synchronous as well.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Host service for durable string entries.
///
/// Errors are surfaced as plain strings: the runtime treats storage failures
/// as advisory (log and carry on), so rich error types buy nothing at this
/// boundary.
pub trait StateStorage {
    /// Load the raw text stored under `key`, `Ok(None)` when absent.
    fn load_entry(&self, key: &str) -> Result<Option<String>, String>;

    /// Save `value` under `key`, replacing any previous entry.
    fn save_entry(&self, key: &str, value: &str) -> Result<(), String>;

    /// Remove the entry under `key`. Removing a missing key is not an error.
    fn delete_entry(&self, key: &str) -> Result<(), String>;
}

/// Storage that persists nothing and loads nothing.
///
/// Used where persistence must stay inert, e.g. server-rendered stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStateStorage;

impl StateStorage for NoopStateStorage {
    fn load_entry(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn save_entry(&self, _key: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    fn delete_entry(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral embeddings.
///
/// Clones share the same backing map, mirroring how two handles to
/// `localStorage` observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStateStorage {
    /// Number of stored entries, for test assertions.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StateStorage for MemoryStateStorage {
    fn load_entry(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save_entry(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete_entry(&self, key: &str) -> Result<(), String> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Load and decode a JSON entry through any [`StateStorage`].
///
/// Decode failures are reported as errors; an absent entry is `Ok(None)`.
pub fn load_typed_with<S, T>(storage: &S, key: &str) -> Result<Option<T>, String>
where
    S: StateStorage + ?Sized,
    T: DeserializeOwned,
{
    match storage.load_entry(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| format!("failed to decode entry {key:?}: {err}")),
        None => Ok(None),
    }
}

/// Encode a value as JSON and save it through any [`StateStorage`].
pub fn save_typed_with<S, T>(storage: &S, key: &str, value: &T) -> Result<(), String>
where
    S: StateStorage + ?Sized,
    T: Serialize,
{
    let raw = serde_json::to_string(value)
        .map_err(|err| format!("failed to encode entry {key:?}: {err}"))?;
    storage.save_entry(key, &raw)
}
