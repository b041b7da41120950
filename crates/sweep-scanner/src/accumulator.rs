//! Shared result accumulator for the scan phases.
//!
//! [`Accumulator`] is the only mutable state shared between scan workers.
//! Every check-then-insert happens under a single lock, so two workers can
//! never both decide to add the same path.
//!
//! # Examples
//!
//! ```
//! use sweep_scanner::{Accumulator, InsertOutcome};
//! use camino::Utf8PathBuf;
//!
//! let collected = Accumulator::new();
//! collected.insert(Utf8PathBuf::from("/Applications/Bar.app"));
//!
//! // Descendants of a collected directory are covered
//! let outcome = collected.insert_uncovered(
//!     Utf8PathBuf::from("/Applications/Bar.app/Contents"),
//!     || true,
//! );
//! assert_eq!(outcome, InsertOutcome::Covered);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Result of an insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The path was added.
    Inserted,
    /// The exact path was already present.
    AlreadyPresent,
    /// A collected path is an ancestor of (or equal to) this one.
    Covered,
    /// The caller's predicate declined the path.
    Rejected,
}

/// Paths in insertion order plus a membership set.
#[derive(Debug, Default)]
struct Inner {
    paths: Vec<Utf8PathBuf>,
    members: FxHashSet<Utf8PathBuf>,
}

impl Inner {
    fn push(&mut self, path: Utf8PathBuf) -> InsertOutcome {
        if self.members.contains(&path) {
            return InsertOutcome::AlreadyPresent;
        }
        self.members.insert(path.clone());
        self.paths.push(path);
        InsertOutcome::Inserted
    }

    fn covers(&self, path: &Utf8Path) -> bool {
        self.paths.iter().any(|collected| path.starts_with(collected))
    }
}

/// Thread-safe, insertion-ordered set of collected paths.
#[derive(Debug, Default)]
pub struct Accumulator {
    inner: Mutex<Inner>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path unless it is already present.
    pub fn insert(&self, path: Utf8PathBuf) -> InsertOutcome {
        self.inner.lock().push(path)
    }

    /// Adds a path unless a collected path covers it or `accept` declines it.
    ///
    /// Coverage is component-wise: `/a/bc` is not covered by `/a/b`. The
    /// predicate runs while the lock is held, after the coverage check.
    pub fn insert_uncovered(
        &self,
        path: Utf8PathBuf,
        accept: impl FnOnce() -> bool,
    ) -> InsertOutcome {
        let mut inner = self.inner.lock();
        if inner.covers(&path) {
            return InsertOutcome::Covered;
        }
        if !accept() {
            return InsertOutcome::Rejected;
        }
        inner.push(path)
    }

    /// Returns `true` if the exact path has been collected.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.inner.lock().members.contains(path)
    }

    /// Returns `true` if a collected path is an ancestor of (or equal to) `path`.
    #[must_use]
    pub fn is_covered(&self, path: &Utf8Path) -> bool {
        self.inner.lock().covers(path)
    }

    /// Returns the number of collected paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().paths.len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().paths.is_empty()
    }

    /// Returns a copy of the collected paths in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Utf8PathBuf> {
        self.inner.lock().paths.clone()
    }

    /// Consumes the accumulator, returning paths in insertion order.
    #[must_use]
    pub fn into_paths(self) -> Vec<Utf8PathBuf> {
        self.inner.into_inner().paths
    }
}
