//! `localStorage`-backed storage adapter.
//!
//! Intentionally small and synchronous: `localStorage` is synchronous at the
//! browser API boundary, and [`app_host::StateStorage`] mirrors that.

use app_host::StateStorage;

/// Browser storage backed by `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStateStorage;

impl WebStateStorage {
    /// Loads the raw string stored under `key`, `None` when absent or when
    /// `localStorage` cannot be reached.
    pub fn load_raw(self, key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()?.local_storage().ok().flatten()?;
            storage.get_item(key).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    /// Saves a raw string under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when `localStorage` is unavailable or the write fails
    /// (quota, private-mode restrictions).
    pub fn save_raw(self, key: &str, value: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(key, value)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    /// Removes the entry under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when `localStorage` is unavailable or the delete fails.
    pub fn delete_raw(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

impl StateStorage for WebStateStorage {
    fn load_entry(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.load_raw(key))
    }

    fn save_entry(&self, key: &str, value: &str) -> Result<(), String> {
        self.save_raw(key, value)
    }

    fn delete_entry(&self, key: &str) -> Result<(), String> {
        self.delete_raw(key)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn off_browser_storage_is_inert() {
        let storage = WebStateStorage;
        assert_eq!(storage.load_entry("k"), Ok(None));
        assert_eq!(storage.save_entry("k", "v"), Ok(()));
        assert_eq!(storage.delete_entry("k"), Ok(()));
    }
}
