//! The two scan phases over one search root.
//!
//! The directory phase collects matching directories that are not already
//! covered by a collected ancestor. The file phase, run only after every
//! directory phase has finished, collects matching non-directory entries.

use camino::Utf8Path;
use sweep_core::normalize_name;
use tracing::{debug, trace, warn};

use crate::accumulator::{Accumulator, InsertOutcome};
use crate::error::ScanError;
use crate::matcher::AppMatcher;
use crate::skip::SkipFilter;
use crate::stats::DiscoveryStats;
use crate::walker::{LocationEntry, LocationLister};

/// Scans search roots into a shared [`Accumulator`].
///
/// All fields are shared references, so one scanner can be used by every
/// worker of a phase.
#[derive(Debug, Clone, Copy)]
pub struct LocationScanner<'a> {
    matcher: &'a AppMatcher,
    skip: SkipFilter<'a>,
    collected: &'a Accumulator,
    stats: &'a DiscoveryStats,
}

impl<'a> LocationScanner<'a> {
    /// Creates a scanner over the run's shared state.
    #[must_use]
    pub const fn new(
        matcher: &'a AppMatcher,
        skip: SkipFilter<'a>,
        collected: &'a Accumulator,
        stats: &'a DiscoveryStats,
    ) -> Self {
        Self {
            matcher,
            skip,
            collected,
            stats,
        }
    }

    /// Directory phase: collects matching, uncovered child directories of `root`.
    pub fn scan_directories(&self, root: &Utf8Path) {
        for entry in self.list(root) {
            if !entry.kind.is_dir() {
                continue;
            }
            let Some(name) = self.admit(&entry) else {
                continue;
            };

            match self
                .collected
                .insert_uncovered(entry.path.clone(), || self.matcher.matches(&name))
            {
                InsertOutcome::Inserted => {
                    self.stats.increment_directories();
                    debug!(path = %entry.path, "Collected directory");
                }
                InsertOutcome::Covered => self.stats.increment_covered(),
                InsertOutcome::AlreadyPresent | InsertOutcome::Rejected => {}
            }
        }
    }

    /// File phase: collects matching non-directory children of `root`.
    pub fn scan_files(&self, root: &Utf8Path) {
        for entry in self.list(root) {
            if entry.kind.is_dir() {
                continue;
            }
            // The entry may have vanished since the listing
            if entry.path.symlink_metadata().is_err() {
                trace!(path = %entry.path, "Entry vanished");
                continue;
            }
            let Some(name) = self.admit(&entry) else {
                continue;
            };
            if !self.matcher.matches(&name) {
                continue;
            }

            if self.collected.insert(entry.path.clone()) == InsertOutcome::Inserted {
                self.stats.increment_files();
                debug!(path = %entry.path, "Collected file");
            }
        }
    }

    /// Lists `root`, logging failures. An unreadable root yields no entries.
    fn list(&self, root: &Utf8Path) -> Vec<LocationEntry> {
        match LocationLister::new(root).list() {
            Ok(listing) => {
                for err in &listing.errors {
                    self.record_error(err);
                }
                listing.entries
            }
            Err(err) => {
                self.record_error(&err);
                Vec::new()
            }
        }
    }

    /// Counts the entry and runs the skip filter, returning its normalized name.
    fn admit(&self, entry: &LocationEntry) -> Option<String> {
        self.stats.increment_examined();
        let name = normalize_name(&entry.name);
        if let Some(reason) = self.skip.check(entry, &name, self.collected) {
            self.stats.increment_skipped();
            trace!(path = %entry.path, ?reason, "Skipped");
            return None;
        }
        Some(name)
    }

    fn record_error(&self, err: &ScanError) {
        if err.is_not_found() {
            trace!(path = ?err.path(), "Location not present");
            return;
        }
        self.stats.increment_errors();
        warn!(path = ?err.path(), error = %err, "Failed to list location");
    }
}
