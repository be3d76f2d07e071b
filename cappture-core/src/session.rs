//! A canvas wired to its storage and auto-save task.

use std::sync::{Arc, PoisonError};

use crate::autosave::{AutoSavePolicy, AutoSaver, SharedCanvas};
use crate::error::PersistError;
use crate::persist::{KeyValueStorage, Persistence};
use crate::store::CanvasStore;

/// One editing session over a canvas.
///
/// Mutations go through [`CanvasSession::mutate`] so the auto-save countdown
/// restarts whenever the store changes.
#[derive(Debug)]
pub struct CanvasSession<S> {
    canvas: SharedCanvas,
    persistence: Arc<Persistence<S>>,
    autosave: AutoSaver,
}

impl<S> CanvasSession<S>
where
    S: KeyValueStorage + Send + Sync + 'static,
{
    /// Restore the saved canvas from `storage` and start auto-saving.
    ///
    /// Must be called from within a Tokio runtime when `policy` is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn open(storage: S, policy: AutoSavePolicy) -> Result<Self, PersistError> {
        let persistence = Arc::new(Persistence::new(storage));
        let mut store = CanvasStore::new();
        let restored = persistence.restore(&mut store)?;
        tracing::info!(elements = restored, "Canvas session opened");

        let canvas: SharedCanvas = Arc::new(std::sync::Mutex::new(store));
        let autosave = AutoSaver::spawn(Arc::clone(&canvas), Arc::clone(&persistence), policy);
        Ok(Self {
            canvas,
            persistence,
            autosave,
        })
    }

    /// Run `f` against a read-only view of the store. The auto-save countdown
    /// is left alone.
    pub fn read<R>(&self, f: impl FnOnce(&CanvasStore) -> R) -> R {
        let store = self.canvas.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Run `f` against the store, restarting the auto-save countdown if it
    /// changed anything.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut CanvasStore) -> R) -> R {
        let (result, changed) = {
            let mut store = self.canvas.lock().unwrap_or_else(PoisonError::into_inner);
            let before = store.revision();
            let result = f(&mut store);
            (result, store.revision() != before)
        };
        if changed {
            self.autosave.touch();
        }
        result
    }

    /// Save now, regardless of the timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the store stays dirty.
    pub fn save(&self) -> Result<(), PersistError> {
        let mut store = self.canvas.lock().unwrap_or_else(PoisonError::into_inner);
        self.persistence.save(&mut store)
    }

    /// Persistence adapter backing this session.
    #[must_use]
    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Whether the auto-save task is running.
    #[must_use]
    pub fn is_autosaving(&self) -> bool {
        self.autosave.is_running()
    }

    /// End the session. A pending auto-save is dropped; call
    /// [`CanvasSession::save`] first to keep unsaved changes.
    pub fn close(self) {
        self.autosave.cancel();
        tracing::info!("Canvas session closed");
    }
}
