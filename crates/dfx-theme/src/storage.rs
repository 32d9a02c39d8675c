//! Theme persistence on top of a [`PreferenceStore`].

use crate::store::PreferenceStore;
use crate::theme::Theme;

/// Default key the preference is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "theme";

const TEST_KEY: &str = "__theme_test__";

/// Loads and saves the theme preference.
///
/// Implementations never fail: an unusable backend disables persistence.
pub trait ThemeStorageManager {
    /// Check that the backend is usable. Called once before any load or save.
    fn setup(&mut self);

    /// Stored preference, if present and valid.
    fn load_theme(&mut self, storage_key: &str) -> Option<Theme>;

    /// Persist `theme`.
    fn save_theme(&mut self, storage_key: &str, theme: Theme);
}

/// [`ThemeStorageManager`] backed by any [`PreferenceStore`].
///
/// `setup` writes and removes a test key; if that fails the store is
/// dropped and loads return `None` while saves do nothing. Invalid stored
/// values are removed when loaded.
#[derive(Debug)]
pub struct StoreThemeStorageManager<S> {
    store: Option<S>,
    ready: bool,
}

impl<S: PreferenceStore> StoreThemeStorageManager<S> {
    /// Wrap `store`. Persistence is inactive until [`setup`](ThemeStorageManager::setup).
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store: Some(store),
            ready: false,
        }
    }

    /// Whether setup succeeded and persistence is active.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.ready && self.store.is_some()
    }

    fn active_store(&self) -> Option<&S> {
        if self.ready { self.store.as_ref() } else { None }
    }
}

impl<S: PreferenceStore> ThemeStorageManager for StoreThemeStorageManager<S> {
    fn setup(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let check = store
            .set(TEST_KEY, "test")
            .and_then(|()| store.remove(TEST_KEY));
        match check {
            Ok(()) => self.ready = true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Preference store is not available, theme preferences will not be persisted"
                );
                self.store = None;
            }
        }
    }

    fn load_theme(&mut self, storage_key: &str) -> Option<Theme> {
        let store = self.active_store()?;
        let stored = match store.get(storage_key) {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load theme from storage");
                return None;
            }
        };

        if let Ok(theme) = stored.parse::<Theme>() {
            return Some(theme);
        }
        tracing::warn!(value = %stored, "Removing invalid stored theme");
        if let Err(e) = store.remove(storage_key) {
            tracing::warn!(error = %e, "Failed to remove invalid stored theme");
        }
        None
    }

    fn save_theme(&mut self, storage_key: &str, theme: Theme) {
        let Some(store) = self.active_store() else {
            return;
        };
        if let Err(e) = store.set(storage_key, theme.as_str()) {
            tracing::warn!(error = %e, "Failed to save theme to storage");
        }
    }
}
