//! Editor preferences, persisted next to the canvas.

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::persist::KeyValueStorage;

/// Storage key holding the serialized settings.
pub const SETTINGS_KEY: &str = "canvasSettings";

/// User preferences.
///
/// Stored documents may hold any subset of fields; missing ones keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// UI theme name.
    pub theme: String,
    /// Editor font size in pixels.
    pub font_size: u32,
    /// Spaces per tab in the code editor.
    pub tab_size: u32,
    /// Whether the canvas saves itself after idle periods.
    pub auto_save: bool,
    /// Whether the terminal panel is shown.
    pub terminal_visible: bool,
    /// Whether the sidebar is expanded.
    pub sidebar_expanded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            font_size: 14,
            tab_size: 2,
            auto_save: true,
            terminal_visible: true,
            sidebar_expanded: true,
        }
    }
}

impl Settings {
    /// Load settings from `storage`, falling back to defaults.
    ///
    /// A malformed document is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] only if the storage cannot be read.
    pub fn load(storage: &impl KeyValueStorage) -> Result<Self, PersistError> {
        let Some(json) = storage.get(SETTINGS_KEY)? else {
            return Ok(Self::default());
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                tracing::info!("Settings loaded from storage");
                Ok(settings)
            }
            Err(e) => {
                tracing::error!("Failed to load settings: {e}");
                Ok(Self::default())
            }
        }
    }

    /// Write settings to `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if serialization or the write fails.
    pub fn save(&self, storage: &impl KeyValueStorage) -> Result<(), PersistError> {
        let json = serde_json::to_string(self)?;
        storage.set(SETTINGS_KEY, &json)?;
        tracing::info!("Settings saved to storage");
        Ok(())
    }

    /// Flip the sidebar state, returning the new value.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_expanded = !self.sidebar_expanded;
        self.sidebar_expanded
    }
}
