//! Discovery statistics with atomic counters.
//!
//! This module provides [`DiscoveryStats`] for counting what one discovery
//! run examined and [`StatsSnapshot`] for the point-in-time view attached to
//! its result.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. Statistics are informational and don't require strict ordering
//! guarantees.
//!
//! # Examples
//!
//! ```
//! use sweep_scanner::DiscoveryStats;
//!
//! let stats = DiscoveryStats::new();
//! stats.increment_examined();
//! stats.increment_directories();
//!
//! let snapshot = stats.snapshot();
//! println!("Examined {} entries, matched {}", snapshot.examined, snapshot.matched());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for one discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryStats {
    /// Candidate entries looked at across both phases.
    examined: AtomicU64,
    /// Directories added by the directory phase.
    directories: AtomicU64,
    /// Files added by the file phase.
    files: AtomicU64,
    /// Candidates rejected by the skip filter.
    skipped: AtomicU64,
    /// Directories already covered by a collected ancestor.
    covered: AtomicU64,
    /// Sandbox and group containers found.
    containers: AtomicU64,
    /// Force-included override paths found.
    overrides: AtomicU64,
    /// Locations or entries that could not be read.
    errors: AtomicU64,
}

impl DiscoveryStats {
    /// Creates a new [`DiscoveryStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the examined entries counter.
    #[inline]
    pub fn increment_examined(&self) {
        self.examined.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the matched directories counter.
    #[inline]
    pub fn increment_directories(&self) {
        self.directories.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the matched files counter.
    #[inline]
    pub fn increment_files(&self) {
        self.files.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the skipped candidates counter.
    #[inline]
    pub fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the covered directories counter.
    #[inline]
    pub fn increment_covered(&self) {
        self.covered.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the containers counter.
    #[inline]
    pub fn add_containers(&self, count: u64) {
        self.containers.fetch_add(count, Ordering::Relaxed);
    }

    /// Adds to the overrides counter.
    #[inline]
    pub fn add_overrides(&self, count: u64) {
        self.overrides.fetch_add(count, Ordering::Relaxed);
    }

    /// Increments the error counter.
    #[inline]
    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all statistics.
    ///
    /// # Examples
    ///
    /// ```
    /// use sweep_scanner::DiscoveryStats;
    ///
    /// let stats = DiscoveryStats::new();
    /// stats.increment_examined();
    /// stats.increment_files();
    ///
    /// let snap = stats.snapshot();
    /// assert_eq!(snap.examined, 1);
    /// assert_eq!(snap.files, 1);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            examined: self.examined.load(Ordering::Relaxed),
            directories: self.directories.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            covered: self.covered.load(Ordering::Relaxed),
            containers: self.containers.load(Ordering::Relaxed),
            overrides: self.overrides.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of discovery statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Candidate entries looked at across both phases.
    pub examined: u64,
    /// Directories added by the directory phase.
    pub directories: u64,
    /// Files added by the file phase.
    pub files: u64,
    /// Candidates rejected by the skip filter.
    pub skipped: u64,
    /// Directories already covered by a collected ancestor.
    pub covered: u64,
    /// Sandbox and group containers found.
    pub containers: u64,
    /// Force-included override paths found.
    pub overrides: u64,
    /// Locations or entries that could not be read.
    pub errors: u64,
}

impl StatsSnapshot {
    /// Returns the number of candidates added by the two scan phases.
    ///
    /// # Examples
    ///
    /// ```
    /// use sweep_scanner::StatsSnapshot;
    ///
    /// let snap = StatsSnapshot {
    ///     directories: 3,
    ///     files: 2,
    ///     ..Default::default()
    /// };
    /// assert_eq!(snap.matched(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub const fn matched(&self) -> u64 {
        self.directories + self.files
    }
}
