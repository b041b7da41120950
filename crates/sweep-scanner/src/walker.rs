//! One-level directory listing.
//!
//! This module provides [`LocationLister`], which uses the `ignore` crate to
//! list the immediate children of a location without descending, applying
//! no ignore files, and without following symbolic links.
//!
//! # Examples
//!
//! ```ignore
//! use sweep_scanner::LocationLister;
//! use camino::Utf8Path;
//!
//! let listing = LocationLister::new(Utf8Path::new("/Library/Caches")).list()?;
//! for entry in &listing.entries {
//!     println!("{} ({:?})", entry.name, entry.kind);
//! }
//! ```

use std::fs::FileType;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::ScanError;

/// What kind of filesystem object an entry is, without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
    /// A symbolic link; its target is not inspected.
    Symlink,
    /// A socket, FIFO, or device node.
    Other,
}

impl EntryKind {
    /// Classifies a file type obtained without following links.
    #[must_use]
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else if file_type.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }

    /// Returns `true` for directories.
    #[inline]
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// One child of a listed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    /// Full path of the entry.
    pub path: Utf8PathBuf,
    /// The entry's own name, as stored on disk.
    pub name: String,
    /// Entry kind, links not followed.
    pub kind: EntryKind,
}

impl LocationEntry {
    /// Builds an entry from a path and kind, taking the name from the path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, kind: EntryKind) -> Self {
        let path = path.into();
        let name = path.file_name().unwrap_or_default().to_owned();
        Self { path, name, kind }
    }

    /// Returns the lowercased extension of the entry name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Utf8Path::new(&self.name)
            .extension()
            .map(str::to_ascii_lowercase)
    }
}

/// The children of one location plus the errors met while listing them.
#[derive(Debug, Default)]
pub struct Listing {
    /// Entries in name order.
    pub entries: Vec<LocationEntry>,
    /// Per-entry failures; the rest of the listing is still usable.
    pub errors: Vec<ScanError>,
}

/// Lists the immediate children of one location.
#[derive(Debug, Clone)]
pub struct LocationLister {
    /// The location to list.
    root: Utf8PathBuf,
    /// Whether dot-prefixed entries are left out.
    skip_hidden: bool,
}

impl LocationLister {
    /// Creates a lister that includes hidden entries.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            skip_hidden: false,
        }
    }

    /// Configures whether dot-prefixed entries are left out.
    #[must_use]
    pub const fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Lists the location's children.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ListDir`] if the location is missing, unreadable,
    /// or not a directory. Failures on individual children are collected in
    /// [`Listing::errors`] instead.
    pub fn list(&self) -> Result<Listing, ScanError> {
        let metadata = self
            .root
            .metadata()
            .map_err(|source| ScanError::list_dir(&self.root, source))?;
        if !metadata.is_dir() {
            return Err(ScanError::list_dir(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        let mut listing = Listing::default();
        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    listing.errors.push(ScanError::Walk(err));
                    continue;
                }
            };

            // The root itself is yielded at depth 0
            if entry.depth() == 0 {
                continue;
            }

            let Some(file_type) = entry.file_type() else {
                continue;
            };

            let path = entry.path();
            let Some(utf8_path) = Utf8Path::from_path(path) else {
                listing.errors.push(ScanError::NonUtf8Path(path.to_owned()));
                continue;
            };

            listing.entries.push(LocationEntry::new(
                utf8_path,
                EntryKind::from_file_type(file_type),
            ));
        }

        Ok(listing)
    }

    /// Builds the ignore walker for a single level.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            // Every child is a candidate; no ignore files apply
            .standard_filters(false)
            .hidden(self.skip_hidden)
            .max_depth(Some(1))
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 temp path")
    }

    #[test]
    fn test_list_immediate_children_only() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        fs::create_dir_all(root.join("com.foo.bar/nested")).expect("create dirs");
        fs::write(root.join("com.foo.bar.plist"), "x").expect("write file");
        fs::write(root.join(".hidden"), "x").expect("write hidden");

        let listing = LocationLister::new(&root).list().expect("list");
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, [".hidden", "com.foo.bar", "com.foo.bar.plist"]);
        assert!(listing.errors.is_empty());

        let dir = &listing.entries[1];
        assert_eq!(dir.kind, EntryKind::Directory);
        assert_eq!(dir.path, root.join("com.foo.bar"));
        assert_eq!(listing.entries[2].kind, EntryKind::File);
    }

    #[test]
    fn test_list_skip_hidden() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        fs::write(root.join(".DS_Store"), "x").expect("write hidden");
        fs::create_dir(root.join("AAAA")).expect("create dir");

        let listing = LocationLister::new(&root)
            .with_skip_hidden(true)
            .list()
            .expect("list");
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name, "AAAA");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        fs::create_dir(root.join("target")).expect("create dir");
        std::os::unix::fs::symlink(root.join("target"), root.join("link")).expect("symlink");

        let listing = LocationLister::new(&root).list().expect("list");
        let link = listing
            .entries
            .iter()
            .find(|e| e.name == "link")
            .expect("link listed");
        assert_eq!(link.kind, EntryKind::Symlink);
    }

    #[test]
    fn test_list_missing_root() {
        let temp = TempDir::new().expect("temp dir");
        let err = LocationLister::new(&utf8_root(&temp).join("absent"))
            .list()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_file_root() {
        let temp = TempDir::new().expect("temp dir");
        let file = utf8_root(&temp).join("file");
        fs::write(&file, "x").expect("write file");
        assert!(matches!(
            LocationLister::new(&file).list(),
            Err(ScanError::ListDir { .. })
        ));
    }

    #[test]
    fn test_entry_extension() {
        let entry = LocationEntry::new("/Library/Preferences/com.Foo.PLIST", EntryKind::File);
        assert_eq!(entry.name, "com.Foo.PLIST");
        assert_eq!(entry.extension().as_deref(), Some("plist"));
        assert_eq!(LocationEntry::new("/tmp/README", EntryKind::File).extension(), None);
    }
}
