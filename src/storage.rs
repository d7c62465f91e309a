//! `localStorage`-backed implementation of the core [`KeyValueStore`] seam.

use log::warn;
use split_second::KeyValueStore;
use web_sys::Storage;

/// Key-value store over `window.localStorage`.
///
/// Storage can be unavailable (private browsing, disabled cookies); in that
/// case reads act as absent and writes are dropped with a warning, so the
/// stopwatch keeps working without persistence.
pub struct BrowserStorage {
    storage: Option<Storage>,
}

impl BrowserStorage {
    pub fn new() -> Self {
        let storage = match gloo_utils::window().local_storage() {
            Ok(Some(storage)) => Some(storage),
            Ok(None) => {
                warn!("localStorage unavailable, laps and theme will not persist");
                None
            }
            Err(err) => {
                warn!("localStorage access denied ({:?}), running without persistence", err);
                None
            }
        };
        Self { storage }
    }
}

impl Default for BrowserStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|storage| storage.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.set_item(key, value) {
                warn!("failed to persist {:?}: {:?}", key, err);
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.remove_item(key) {
                warn!("failed to remove {:?}: {:?}", key, err);
            }
        }
    }
}
