//! Discovery results.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use sweep_core::{AppDescriptor, DiskUsage, Icon};

use crate::stats::StatsSnapshot;

/// One reduced path with its annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPath {
    /// Standardized absolute path.
    pub path: Utf8PathBuf,
    /// Space the path occupies.
    pub size: DiskUsage,
    /// Display icon, absent if the path vanished before annotation.
    pub icon: Option<Icon>,
}

/// Everything one discovery run found for an app.
///
/// Paths are sorted and no path is a descendant of another.
///
/// # Examples
///
/// ```
/// use sweep_core::AppDescriptor;
/// use sweep_scanner::DiscoveryResult;
///
/// let app = AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar");
/// let result = DiscoveryResult::empty(app);
/// assert!(result.is_empty());
/// assert_eq!(result.total_size().logical, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// The app the paths belong to.
    pub app: AppDescriptor,
    /// Reduced, annotated paths.
    pub paths: Vec<DiscoveredPath>,
    /// Counters from the run.
    pub stats: StatsSnapshot,
}

impl DiscoveryResult {
    /// Creates a result with no paths.
    #[must_use]
    pub fn empty(app: AppDescriptor) -> Self {
        Self {
            app,
            paths: Vec::new(),
            stats: StatsSnapshot::default(),
        }
    }

    /// Returns the number of paths.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if nothing was found.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterates the bare paths in order.
    pub fn path_list(&self) -> impl Iterator<Item = &Utf8Path> {
        self.paths.iter().map(|entry| entry.path.as_path())
    }

    /// Returns `true` if `path` is one of the reported paths.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.path_list().any(|reported| reported == path)
    }

    /// Sums the size of every reported path.
    #[must_use]
    pub fn total_size(&self) -> DiskUsage {
        self.paths
            .iter()
            .fold(DiskUsage::default(), |total, entry| total + entry.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_core::IconKind;

    fn result() -> DiscoveryResult {
        let mut result = DiscoveryResult::empty(AppDescriptor::new(
            "/Applications/Bar.app",
            "com.foo.bar",
            "Bar",
        ));
        result.paths = vec![
            DiscoveredPath {
                path: Utf8PathBuf::from("/Applications/Bar.app"),
                size: DiskUsage::new(4096, 3000),
                icon: Some(Icon::new(IconKind::Application)),
            },
            DiscoveredPath {
                path: Utf8PathBuf::from("/L/Preferences/com.foo.bar.plist"),
                size: DiskUsage::new(4096, 120),
                icon: None,
            },
        ];
        result
    }

    #[test]
    fn test_totals_and_lookup() {
        let result = result();
        assert_eq!(result.len(), 2);
        assert_eq!(result.total_size(), DiskUsage::new(8192, 3120));
        assert!(result.contains(Utf8Path::new("/Applications/Bar.app")));
        assert!(!result.contains(Utf8Path::new("/Applications")));
    }

    #[test]
    fn test_serialization() {
        let result = result();
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains("com.foo.bar.plist"));
        let parsed: DiscoveryResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, result);
    }
}
