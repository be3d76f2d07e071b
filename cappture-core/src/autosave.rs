//! Debounced background saving.
//!
//! Every call to [`AutoSaver::touch`] restarts the countdown, so a save only
//! happens once the canvas has been idle for the whole interval. Scheduling
//! is advisory: if the session ends before the timer fires, the save is
//! skipped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::persist::{KeyValueStorage, Persistence};
use crate::settings::Settings;
use crate::store::CanvasStore;

/// Idle time before a dirty canvas is written out.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// A canvas store shared between the UI and the auto-save task.
pub type SharedCanvas = Arc<Mutex<CanvasStore>>;

/// When to save automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSavePolicy {
    /// Whether automatic saving happens at all.
    pub enabled: bool,
    /// Idle interval after the last mutation.
    pub interval: Duration,
}

impl Default for AutoSavePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

impl From<&Settings> for AutoSavePolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            enabled: settings.auto_save,
            ..Self::default()
        }
    }
}

/// Handle to a running auto-save task. Dropping it stops the task.
#[derive(Debug)]
pub struct AutoSaver {
    notify: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl AutoSaver {
    /// Start saving `store` through `persistence` according to `policy`.
    ///
    /// A disabled policy yields an idle handle. Must be called from within a
    /// Tokio runtime when the policy is enabled.
    pub fn spawn<S>(
        store: SharedCanvas,
        persistence: Arc<Persistence<S>>,
        policy: AutoSavePolicy,
    ) -> Self
    where
        S: KeyValueStorage + Send + Sync + 'static,
    {
        let notify = Arc::new(Notify::new());
        if !policy.enabled {
            tracing::debug!("Auto-save disabled");
            return Self { notify, task: None };
        }

        let wake = Arc::clone(&notify);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = wake.notified() => {}
                    () = tokio::time::sleep(policy.interval) => save_now(&store, &persistence),
                }
            }
        });

        Self {
            notify,
            task: Some(task),
        }
    }

    /// Restart the countdown after a mutation.
    pub fn touch(&self) {
        self.notify.notify_one();
    }

    /// Whether a task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the task without a final save.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn save_now<S: KeyValueStorage>(store: &SharedCanvas, persistence: &Persistence<S>) {
    let mut store = store
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    match persistence.save_if_dirty(&mut store) {
        Ok(true) => tracing::info!("Auto-saved {} elements", store.len()),
        Ok(false) => {}
        // Stays dirty; the next fire retries.
        Err(e) => tracing::warn!("Auto-save failed: {e}"),
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.stop();
    }
}
