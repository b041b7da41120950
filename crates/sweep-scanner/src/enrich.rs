//! Size and icon annotation of reduced paths.
//!
//! Both collaborators are traits so hosts can supply their own; the defaults
//! here measure disk usage by walking the tree and pick a symbolic icon from
//! the path's type.

use std::fs::Metadata;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use rayon::prelude::*;
use sweep_core::{DiskUsage, Icon, IconKind};
use tracing::trace;

use crate::result::DiscoveredPath;

/// Measures how much space a path occupies.
pub trait SizeProbe: Send + Sync {
    /// Returns the real and logical size of `path`, recursively for directories.
    ///
    /// Unreadable paths measure as zero.
    fn size_of(&self, path: &Utf8Path) -> DiskUsage;
}

/// Chooses a display icon for a path.
pub trait IconProvider: Send + Sync {
    /// Returns the icon for `path`, or `None` if it no longer exists.
    fn icon_for(&self, path: &Utf8Path) -> Option<Icon>;
}

/// Default [`SizeProbe`] summing every entry under a path.
///
/// Logical size is the byte length; real size is allocated blocks on Unix and
/// falls back to the byte length elsewhere. Symbolic links are measured
/// themselves, not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskUsageProbe;

impl DiskUsageProbe {
    fn usage(metadata: &Metadata) -> DiskUsage {
        DiskUsage {
            real: allocated_bytes(metadata),
            logical: metadata.len(),
        }
    }
}

#[cfg(unix)]
fn allocated_bytes(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.blocks().saturating_mul(512)
}

#[cfg(not(unix))]
fn allocated_bytes(metadata: &Metadata) -> u64 {
    metadata.len()
}

impl SizeProbe for DiskUsageProbe {
    fn size_of(&self, path: &Utf8Path) -> DiskUsage {
        let metadata = match path.symlink_metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                trace!(%path, error = %err, "Cannot measure");
                return DiskUsage::default();
            }
        };
        if !metadata.is_dir() {
            return Self::usage(&metadata);
        }

        WalkBuilder::new(path)
            .standard_filters(false)
            .follow_links(false)
            .build()
            .filter_map(Result::ok)
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| Self::usage(&metadata))
            .fold(DiskUsage::default(), |total, usage| total + usage)
    }
}

/// Default [`IconProvider`] returning a symbolic icon per path type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicIconProvider;

impl IconProvider for SymbolicIconProvider {
    fn icon_for(&self, path: &Utf8Path) -> Option<Icon> {
        let metadata = path.symlink_metadata().ok()?;
        let extension = path.extension().map(str::to_ascii_lowercase);
        let kind = match extension.as_deref() {
            Some("app") => IconKind::Application,
            Some("plist") => IconKind::Preferences,
            _ if metadata.is_dir() => IconKind::Folder,
            _ if metadata.is_file() => IconKind::Document,
            _ => IconKind::Generic,
        };
        Some(Icon::new(kind))
    }
}

/// Annotates each path with its size and icon, preserving order.
pub fn annotate(
    paths: &[Utf8PathBuf],
    sizes: &dyn SizeProbe,
    icons: &dyn IconProvider,
) -> Vec<DiscoveredPath> {
    paths
        .par_iter()
        .map(|path| DiscoveredPath {
            size: sizes.size_of(path),
            icon: icons.icon_for(path),
            path: path.clone(),
        })
        .collect()
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
    fn test_disk_usage_of_file_and_directory() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let dir = root.join("com.foo.bar");
        fs::create_dir_all(dir.join("nested")).expect("mkdir");
        fs::write(dir.join("a.bin"), vec![0u8; 1000]).expect("write");
        fs::write(dir.join("nested/b.bin"), vec![0u8; 24]).expect("write");

        let probe = DiskUsageProbe;
        assert_eq!(probe.size_of(&dir.join("a.bin")).logical, 1000);

        let dir_metadata = fs::symlink_metadata(&dir).expect("stat");
        let nested_metadata = fs::symlink_metadata(dir.join("nested")).expect("stat");
        let expected_logical = 1024 + dir_metadata.len() + nested_metadata.len();
        assert_eq!(probe.size_of(&dir).logical, expected_logical);
    }

    #[test]
    fn test_disk_usage_of_missing_path_is_zero() {
        let temp = TempDir::new().expect("temp dir");
        let usage = DiskUsageProbe.size_of(&utf8_root(&temp).join("absent"));
        assert_eq!(usage, DiskUsage::default());
    }

    #[test]
    fn test_symbolic_icons() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        fs::create_dir(root.join("Bar.app")).expect("mkdir");
        fs::create_dir(root.join("com.foo.bar")).expect("mkdir");
        fs::write(root.join("com.foo.bar.plist"), "x").expect("write");
        fs::write(root.join("com.foo.bar.log"), "x").expect("write");

        let icons = SymbolicIconProvider;
        let kind = |name: &str| icons.icon_for(&root.join(name)).map(|icon| icon.kind);
        assert_eq!(kind("Bar.app"), Some(IconKind::Application));
        assert_eq!(kind("com.foo.bar"), Some(IconKind::Folder));
        assert_eq!(kind("com.foo.bar.plist"), Some(IconKind::Preferences));
        assert_eq!(kind("com.foo.bar.log"), Some(IconKind::Document));
        assert_eq!(kind("absent"), None);
    }

    #[test]
    fn test_annotate_preserves_order() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let paths: Vec<Utf8PathBuf> = (0..20).map(|i| root.join(format!("f{i:02}"))).collect();
        for path in &paths {
            fs::write(path, "abc").expect("write");
        }

        let annotated = annotate(&paths, &DiskUsageProbe, &SymbolicIconProvider);
        let order: Vec<_> = annotated.iter().map(|entry| entry.path.clone()).collect();
        assert_eq!(order, paths);
        assert!(annotated.iter().all(|entry| entry.size.logical == 3));
    }
}
