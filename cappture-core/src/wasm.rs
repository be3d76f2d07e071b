//! WebAssembly bindings for cappture-core.
//!
//! Exposes the canvas store to the browser editor, persisted through
//! `window.localStorage`. The page drives saving; there is no auto-save timer
//! on this target.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::element::{ElementId, ElementKind, Point};
use crate::error::PersistError;
use crate::persist::{KeyValueStorage, MemoryStorage, Persistence};
use crate::settings::Settings;
use crate::store::CanvasStore;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// [`KeyValueStorage`] over the browser's `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// The current window's local storage.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] outside a browser window or when
    /// storage access is blocked.
    pub fn from_window() -> Result<Self, PersistError> {
        let window =
            web_sys::window().ok_or_else(|| PersistError::Storage("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistError::Storage(describe(&e)))?
            .ok_or_else(|| PersistError::Storage("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistError::Storage(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        // Quota errors land here.
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistError::Storage(describe(&e)))
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistError::Storage(describe(&e)))
    }
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Canvas instance for WASM.
#[wasm_bindgen]
pub struct WasmCanvas {
    store: CanvasStore,
    persistence: Persistence<Arc<dyn KeyValueStorage>>,
}

#[wasm_bindgen]
impl WasmCanvas {
    /// Create a canvas backed by local storage, restoring any saved elements.
    ///
    /// Falls back to in-memory storage when local storage is unavailable.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        let storage: Arc<dyn KeyValueStorage> = match LocalStorage::from_window() {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                tracing::warn!("Using in-memory storage: {e}");
                Arc::new(MemoryStorage::new())
            }
        };
        let mut canvas = Self::with_storage(storage);
        if let Err(e) = canvas.load() {
            tracing::warn!("Failed to restore canvas: {e}");
        }
        canvas
    }

    /// Add an element of `kind` at (`x`, `y`). Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error string if either coordinate is NaN or infinite.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(&mut self, kind: &str, x: f64, y: f64) -> Result<String, String> {
        self.store
            .add_element(ElementKind::parse(kind), Point::new(x, y))
            .map(|id| id.to_string())
            .map_err(|e| e.to_string())
    }

    /// Move an element by a drag delta.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element does not exist or the move
    /// would leave it at a non-finite position.
    #[wasm_bindgen(js_name = moveElement)]
    pub fn move_element(&mut self, id: &str, dx: f64, dy: f64) -> Result<(), String> {
        self.store
            .move_element(&ElementId::from(id), dx, dy)
            .map_err(|e| e.to_string())
    }

    /// Resize an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element does not exist or the size is
    /// not positive.
    #[wasm_bindgen(js_name = resizeElement)]
    pub fn resize_element(&mut self, id: &str, width: f64, height: f64) -> Result<(), String> {
        self.store
            .resize_element(&ElementId::from(id), width, height)
            .map_err(|e| e.to_string())
    }

    /// Set one style property.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element does not exist.
    #[wasm_bindgen(js_name = restyleElement)]
    pub fn restyle_element(&mut self, id: &str, key: &str, value: &str) -> Result<(), String> {
        self.store
            .restyle_element(&ElementId::from(id), key, value)
            .map_err(|e| e.to_string())
    }

    /// Replace an element's text content.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element does not exist.
    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&mut self, id: &str, content: &str) -> Result<(), String> {
        self.store
            .set_content(&ElementId::from(id), content)
            .map_err(|e| e.to_string())
    }

    /// Delete an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element does not exist.
    #[wasm_bindgen(js_name = deleteElement)]
    pub fn delete_element(&mut self, id: &str) -> Result<(), String> {
        self.store
            .delete_element(&ElementId::from(id))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element does not exist.
    pub fn select(&mut self, id: Option<String>) -> Result<(), String> {
        let id = id.map(ElementId::from);
        self.store.select(id.as_ref()).map_err(|e| e.to_string())
    }

    /// Id of the selected element.
    #[wasm_bindgen(js_name = selectedId)]
    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.store.selected_id().map(ToString::to_string)
    }

    /// Zoom in one step. Returns the new zoom percentage.
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> u16 {
        self.store.zoom_in()
    }

    /// Zoom out one step. Returns the new zoom percentage.
    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> u16 {
        self.store.zoom_out()
    }

    /// Pan the viewport.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.store.pan(dx, dy);
    }

    /// Id of the topmost element under a screen point.
    #[wasm_bindgen(js_name = elementAt)]
    #[must_use]
    pub fn element_at(&self, x: f64, y: f64) -> Option<String> {
        self.store.element_at(x, y).map(ToString::to_string)
    }

    /// Write the elements to storage.
    ///
    /// # Errors
    ///
    /// Returns an error string if the write fails; the canvas stays dirty.
    pub fn save(&mut self) -> Result<(), String> {
        self.persistence
            .save(&mut self.store)
            .map_err(|e| e.to_string())
    }

    /// Replace the elements with the saved ones. Returns how many were
    /// restored.
    ///
    /// # Errors
    ///
    /// Returns an error string if storage cannot be read.
    pub fn load(&mut self) -> Result<usize, String> {
        self.persistence
            .restore(&mut self.store)
            .map_err(|e| e.to_string())
    }

    /// Whether there are unsaved changes.
    #[wasm_bindgen(js_name = isDirty)]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Change counter for re-rendering.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Get the elements as a JSON array.
    #[wasm_bindgen(js_name = getElementsJson)]
    #[must_use]
    pub fn get_elements_json(&self) -> String {
        serde_json::to_string(self.store.elements()).unwrap_or_default()
    }

    /// Get the view transform as JSON.
    #[wasm_bindgen(js_name = getTransformJson)]
    #[must_use]
    pub fn get_transform_json(&self) -> String {
        serde_json::to_string(&self.store.transform()).unwrap_or_default()
    }

    /// Get the stored settings as JSON, defaults filled in.
    #[wasm_bindgen(js_name = getSettingsJson)]
    #[must_use]
    pub fn get_settings_json(&self) -> String {
        let settings = Settings::load(self.persistence.storage()).unwrap_or_default();
        serde_json::to_string(&settings).unwrap_or_default()
    }
}

impl WasmCanvas {
    /// Canvas over an arbitrary storage, without restoring.
    #[must_use]
    pub fn with_storage(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            store: CanvasStore::new(),
            persistence: Persistence::new(storage),
        }
    }
}

impl Default for WasmCanvas {
    fn default() -> Self {
        Self::new()
    }
}
