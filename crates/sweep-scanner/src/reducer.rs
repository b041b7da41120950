//! Collection reduction: seeding, standardization, de-duplication.
//!
//! After the scan phases, container and override paths are merged into the
//! collected set and reduced to a minimal list in which no path is a
//! descendant of another.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Directory names marking the user or volume trash.
const TRASH_DIRECTORIES: &[&str] = &[".Trash", ".Trashes"];

/// Directory name under which wrapped iOS bundles sit.
const WRAPPER_DIRECTORY: &str = "Wrapper";

/// Returns `true` if any component of `path` is a trash directory.
#[must_use]
pub fn is_in_trash(path: &Utf8Path) -> bool {
    path.components()
        .any(|component| TRASH_DIRECTORIES.contains(&component.as_str()))
}

/// Returns the path to seed the collection with, or `None` for trashed bundles.
///
/// A bundle inside a `Wrapper` directory is represented by the wrapping
/// bundle two levels up.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use sweep_scanner::seed_path;
///
/// assert_eq!(
///     seed_path(Utf8Path::new("/Applications/Game.app/Wrapper/Game.app")).as_deref(),
///     Some(Utf8Path::new("/Applications/Game.app"))
/// );
/// assert_eq!(seed_path(Utf8Path::new("/Users/me/.Trash/Bar.app")), None);
/// ```
#[must_use]
pub fn seed_path(bundle: &Utf8Path) -> Option<Utf8PathBuf> {
    if is_in_trash(bundle) {
        return None;
    }

    let parent = bundle.parent();
    if parent.and_then(Utf8Path::file_name) == Some(WRAPPER_DIRECTORY) {
        if let Some(wrapper_owner) = parent.and_then(Utf8Path::parent) {
            return Some(wrapper_owner.to_owned());
        }
    }
    Some(bundle.to_owned())
}

/// Removes `.` and `..` components and any trailing separator.
fn lexical_normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component.as_str());
                }
            }
            other => normalized.push(other.as_str()),
        }
    }
    normalized
}

/// Standardizes a path for comparison.
///
/// The path is normalized lexically, then its parent directory is resolved
/// through symbolic links when it exists. The final component is kept as-is,
/// so a collected symlink is never replaced by its target.
#[must_use]
pub fn standardize(path: &Utf8Path) -> Utf8PathBuf {
    let normalized = lexical_normalize(path);
    let (Some(parent), Some(name)) = (normalized.parent(), normalized.file_name()) else {
        return normalized;
    };
    if parent.as_str().is_empty() {
        return normalized;
    }
    match parent.canonicalize_utf8() {
        Ok(resolved) => resolved.join(name),
        Err(_) => normalized,
    }
}

/// Standardizes, sorts, de-duplicates and drops descendants of kept paths.
///
/// Paths are ordered component-wise, so every descendant sorts directly after
/// its ancestor and before any sibling that merely shares a name prefix.
pub fn reduce(paths: impl IntoIterator<Item = Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    let mut standardized: Vec<Utf8PathBuf> =
        paths.into_iter().map(|path| standardize(&path)).collect();
    standardized.sort();
    standardized.dedup();

    let mut reduced: Vec<Utf8PathBuf> = Vec::with_capacity(standardized.len());
    for path in standardized {
        if reduced.last().is_some_and(|kept| path.starts_with(kept)) {
            continue;
        }
        reduced.push(path);
    }
    reduced
}

/// Clears a result consisting of a single trashed path.
///
/// The only thing found for a trashed app is the bundle itself, and removing
/// it again would be pointless.
#[must_use]
pub fn suppress_lone_trash(paths: Vec<Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    match paths.as_slice() {
        [only] if is_in_trash(only) => {
            debug!(path = %only, "Only a trashed path remains, reporting nothing");
            Vec::new()
        }
        _ => paths,
    }
}
