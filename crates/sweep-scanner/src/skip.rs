//! Skip filter applied before the match predicate.
//!
//! A candidate is skipped when it was already collected, when its type is not
//! supported, or when its name falls under a reserved prefix. File type
//! support is pluggable through [`FileTypeFilter`].

use rustc_hash::FxHashSet;
use sweep_core::RuleSet;

use crate::accumulator::Accumulator;
use crate::walker::{EntryKind, LocationEntry};

/// Decides which filesystem object types may be collected.
///
/// # Thread Safety
///
/// Filters are shared by every worker of a scan phase, so they must be
/// [`Send`] and [`Sync`].
///
/// # Examples
///
/// ```
/// use sweep_scanner::{EntryKind, FileTypeFilter, LocationEntry};
///
/// struct DirectoriesOnly;
///
/// impl FileTypeFilter for DirectoriesOnly {
///     fn is_supported(&self, entry: &LocationEntry) -> bool {
///         entry.kind == EntryKind::Directory
///     }
/// }
/// ```
pub trait FileTypeFilter: Send + Sync {
    /// Returns `true` if the entry's type may be collected.
    fn is_supported(&self, entry: &LocationEntry) -> bool;
}

/// Default [`FileTypeFilter`].
///
/// Directories are always supported and sockets, FIFOs and devices never are.
/// Files and symbolic links are checked against an extension allow-list; an
/// empty list accepts every extension.
///
/// # Examples
///
/// ```
/// use sweep_scanner::{EntryKind, FileTypeFilter, LocationEntry, SupportedTypes};
///
/// let filter = SupportedTypes::new(["plist", "log"]);
/// assert!(filter.is_supported(&LocationEntry::new("/x/com.foo.plist", EntryKind::File)));
/// assert!(!filter.is_supported(&LocationEntry::new("/x/com.foo.db", EntryKind::File)));
/// assert!(filter.is_supported(&LocationEntry::new("/x/com.foo", EntryKind::Directory)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SupportedTypes {
    /// Lowercased extensions without the dot.
    extensions: FxHashSet<String>,
}

impl SupportedTypes {
    /// Creates a filter accepting the given extensions (case-insensitive).
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Creates a filter accepting any extension.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }
}

impl FileTypeFilter for SupportedTypes {
    fn is_supported(&self, entry: &LocationEntry) -> bool {
        match entry.kind {
            EntryKind::Directory => true,
            EntryKind::Other => false,
            EntryKind::File | EntryKind::Symlink => {
                self.extensions.is_empty()
                    || entry
                        .extension()
                        .is_some_and(|ext| self.extensions.contains(&ext))
            }
        }
    }
}

/// Why a candidate was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path is already in the accumulator.
    AlreadyCollected,
    /// The entry's type is not supported.
    UnsupportedType,
    /// The name starts with a reserved prefix not on its allow-list.
    Reserved,
}

/// Skip filter for one run.
#[derive(Clone, Copy)]
pub struct SkipFilter<'a> {
    rules: &'a RuleSet,
    file_types: &'a dyn FileTypeFilter,
}

impl<'a> SkipFilter<'a> {
    /// Creates a filter over the given rule tables and type filter.
    #[must_use]
    pub const fn new(rules: &'a RuleSet, file_types: &'a dyn FileTypeFilter) -> Self {
        Self { rules, file_types }
    }

    /// Returns why the candidate must be skipped, or `None` to let it through.
    ///
    /// `name` is the candidate's normalized name.
    #[must_use]
    pub fn check(
        &self,
        entry: &LocationEntry,
        name: &str,
        collected: &Accumulator,
    ) -> Option<SkipReason> {
        if collected.contains(&entry.path) {
            return Some(SkipReason::AlreadyCollected);
        }
        if !self.file_types.is_supported(entry) {
            return Some(SkipReason::UnsupportedType);
        }
        if self.rules.is_reserved(name) {
            return Some(SkipReason::Reserved);
        }
        None
    }
}

impl std::fmt::Debug for SkipFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkipFilter")
            .field("skip_rules", &self.rules.skip_rules.len())
            .finish_non_exhaustive()
    }
}
