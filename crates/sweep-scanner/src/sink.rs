//! Delivery of finished results to the host.
//!
//! The engine never keeps results itself; it hands each one to a
//! [`ResultSink`] according to the run's [`RunMode`].

use camino::Utf8PathBuf;
use parking_lot::RwLock;
use sweep_core::RunMode;
use tracing::debug;

use crate::result::DiscoveryResult;

/// Receives finished discovery results.
///
/// Calls may arrive from any thread.
pub trait ResultSink: Send + Sync {
    /// Publishes `result` as the selected app and its selected paths.
    fn select(&self, result: &DiscoveryResult);

    /// Appends `result` to the bulk store.
    fn append(&self, result: &DiscoveryResult);
}

/// Routes `result` to `sink` for the given mode.
///
/// Background runs deliver nothing.
pub fn deliver(sink: &dyn ResultSink, mode: RunMode, result: &DiscoveryResult) {
    debug!(mode = mode.label(), paths = result.len(), "Delivering result");
    match mode {
        RunMode::Interactive => sink.select(result),
        RunMode::BulkAppend => sink.append(result),
        RunMode::Background => {}
    }
}

/// In-memory [`ResultSink`] holding the selection and the bulk store.
///
/// # Examples
///
/// ```
/// use sweep_core::{AppDescriptor, RunMode};
/// use sweep_scanner::{AppStore, DiscoveryResult, deliver};
///
/// let store = AppStore::new();
/// let result = DiscoveryResult::empty(AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar"));
///
/// deliver(&store, RunMode::BulkAppend, &result);
/// assert_eq!(store.bulk().len(), 1);
/// assert!(store.selected().is_none());
/// ```
#[derive(Debug, Default)]
pub struct AppStore {
    selected: RwLock<Option<DiscoveryResult>>,
    selected_paths: RwLock<Vec<Utf8PathBuf>>,
    bulk: RwLock<Vec<DiscoveryResult>>,
}

impl AppStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently selected result.
    #[must_use]
    pub fn selected(&self) -> Option<DiscoveryResult> {
        self.selected.read().clone()
    }

    /// Returns the paths selected for removal.
    #[must_use]
    pub fn selected_paths(&self) -> Vec<Utf8PathBuf> {
        self.selected_paths.read().clone()
    }

    /// Returns the results appended in bulk mode, oldest first.
    #[must_use]
    pub fn bulk(&self) -> Vec<DiscoveryResult> {
        self.bulk.read().clone()
    }

    /// Removes and returns the bulk results.
    pub fn take_bulk(&self) -> Vec<DiscoveryResult> {
        std::mem::take(&mut *self.bulk.write())
    }
}

impl ResultSink for AppStore {
    fn select(&self, result: &DiscoveryResult) {
        *self.selected_paths.write() = result.path_list().map(ToOwned::to_owned).collect();
        *self.selected.write() = Some(result.clone());
    }

    fn append(&self, result: &DiscoveryResult) {
        self.bulk.write().push(result.clone());
    }
}
