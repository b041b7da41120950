//! Sandbox and app-group container resolution.
//!
//! Sandboxed apps keep their data in `~/Library/Containers/<name>`, where
//! `<name>` is either the bundle identifier (already reached by the scan
//! phases) or an opaque UUID. UUID-named containers are attributed through
//! the identifier recorded in their hidden metadata file.

use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::{Regex, RegexBuilder};
use sweep_core::{AppDescriptor, info_plist_path, plist};
use tracing::{debug, trace, warn};

use crate::error::ScanError;
use crate::stats::DiscoveryStats;
use crate::walker::LocationLister;

/// Hidden file inside each container naming its owner.
pub const CONTAINER_METADATA_FILE: &str = ".com.apple.containermanagerd.metadata.plist";

/// Key of the owning identifier in [`CONTAINER_METADATA_FILE`].
pub const CONTAINER_METADATA_KEY: &str = "MCMMetadataIdentifier";

const UUID_PATTERN: &str =
    r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

static UUID_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    RegexBuilder::new(UUID_PATTERN)
        .case_insensitive(true)
        .build()
        .ok()
});

/// Returns `true` if `name` has the 8-4-4-4-12 hexadecimal UUID shape.
///
/// # Examples
///
/// ```
/// use sweep_scanner::is_uuid_name;
///
/// assert!(is_uuid_name("2792352D-95FE-43AE-947D-FF4BF31DE4E6"));
/// assert!(!is_uuid_name("com.foo.bar"));
/// ```
#[must_use]
pub fn is_uuid_name(name: &str) -> bool {
    UUID_NAME.as_ref().is_some_and(|regex| regex.is_match(name))
}

/// Locates the app-group container for an identifier.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use sweep_scanner::GroupContainerLookup;
///
/// struct NoGroups;
///
/// impl GroupContainerLookup for NoGroups {
///     fn group_container(&self, _identifier: &str) -> Option<Utf8PathBuf> {
///         None
///     }
/// }
/// ```
pub trait GroupContainerLookup: Send + Sync {
    /// Returns the group container directory for `identifier`, if one exists.
    fn group_container(&self, identifier: &str) -> Option<Utf8PathBuf>;
}

/// Default [`GroupContainerLookup`]: a directory named after the identifier
/// under the group containers root.
#[derive(Debug, Clone)]
pub struct LibraryGroupContainers {
    root: Utf8PathBuf,
}

impl LibraryGroupContainers {
    /// Creates a lookup under `root`, normally `~/Library/Group Containers`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GroupContainerLookup for LibraryGroupContainers {
    fn group_container(&self, identifier: &str) -> Option<Utf8PathBuf> {
        if identifier.is_empty() {
            return None;
        }
        let candidate = self.root.join(identifier);
        candidate.is_dir().then_some(candidate)
    }
}

/// Resolves the containers owned by one app.
#[derive(Clone, Copy)]
pub struct ContainerResolver<'a> {
    containers_dir: &'a Utf8Path,
    groups: &'a dyn GroupContainerLookup,
}

impl<'a> ContainerResolver<'a> {
    /// Creates a resolver over a containers directory and group lookup.
    #[must_use]
    pub const fn new(containers_dir: &'a Utf8Path, groups: &'a dyn GroupContainerLookup) -> Self {
        Self {
            containers_dir,
            groups,
        }
    }

    /// Returns the app's group container and UUID-named sandbox containers.
    ///
    /// The group container is looked up under the identifier re-read from the
    /// bundle's `Info.plist`; when it cannot be read the app is treated as
    /// having no containers. Sandbox container metadata is compared against
    /// the descriptor's `bundle_id`. Failures are logged, never returned.
    pub fn resolve(&self, app: &AppDescriptor, stats: &DiscoveryStats) -> Vec<Utf8PathBuf> {
        let info = info_plist_path(&app.path);
        let identifier = match plist::read_string(&info, "CFBundleIdentifier") {
            Ok(Some(identifier)) => identifier,
            Ok(None) => {
                debug!(path = %info, "No bundle identifier, skipping containers");
                return Vec::new();
            }
            Err(err) => {
                debug!(error = %err, "Bundle identifier unreadable, skipping containers");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        if let Some(group) = self.groups.group_container(&identifier) {
            debug!(path = %group, "Found group container");
            found.push(group);
        }
        found.extend(self.sandbox_containers(&app.bundle_id, stats));

        stats.add_containers(found.len() as u64);
        found
    }

    /// Lists UUID-named containers whose metadata names `bundle_id`.
    fn sandbox_containers(&self, bundle_id: &str, stats: &DiscoveryStats) -> Vec<Utf8PathBuf> {
        let listing = match LocationLister::new(self.containers_dir)
            .with_skip_hidden(true)
            .list()
        {
            Ok(listing) => listing,
            Err(err) => {
                record_error(&err, stats);
                return Vec::new();
            }
        };
        for err in &listing.errors {
            record_error(err, stats);
        }

        listing
            .entries
            .into_iter()
            .filter(|entry| entry.kind.is_dir() && is_uuid_name(&entry.name))
            .filter(|entry| {
                let metadata = entry.path.join(CONTAINER_METADATA_FILE);
                match plist::read_string(&metadata, CONTAINER_METADATA_KEY) {
                    Ok(owner) => owner.as_deref() == Some(bundle_id),
                    Err(err) => {
                        record_error(&ScanError::from(err), stats);
                        false
                    }
                }
            })
            .map(|entry| {
                debug!(path = %entry.path, "Found sandbox container");
                entry.path
            })
            .collect()
    }
}

fn record_error(err: &ScanError, stats: &DiscoveryStats) {
    if err.is_not_found() {
        trace!(path = ?err.path(), "Container path not present");
        return;
    }
    stats.increment_errors();
    warn!(path = ?err.path(), error = %err, "Failed to inspect containers");
}

impl std::fmt::Debug for ContainerResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerResolver")
            .field("containers_dir", &self.containers_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const UUID_A: &str = "2792352D-95FE-43AE-947D-FF4BF31DE4E6";
    const UUID_B: &str = "0b1c2d3e-4f50-6172-8394-a5b6c7d8e9f0";

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 temp path")
    }

    fn plist_xml(key: &str, value: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\">\n<dict>\n\
             <key>{key}</key>\n<string>{value}</string>\n</dict>\n</plist>\n"
        )
    }

    fn make_bundle(root: &Utf8Path, bundle_id: &str) -> Utf8PathBuf {
        let bundle = root.join("Apps/Bar.app");
        fs::create_dir_all(bundle.join("Contents")).expect("mkdir bundle");
        fs::write(
            bundle.join("Contents/Info.plist"),
            plist_xml("CFBundleIdentifier", bundle_id),
        )
        .expect("write Info.plist");
        bundle
    }

    fn make_container(containers: &Utf8Path, name: &str, owner: Option<&str>) -> Utf8PathBuf {
        let dir = containers.join(name);
        fs::create_dir_all(&dir).expect("mkdir container");
        if let Some(owner) = owner {
            fs::write(
                dir.join(CONTAINER_METADATA_FILE),
                plist_xml(CONTAINER_METADATA_KEY, owner),
            )
            .expect("write metadata");
        }
        dir
    }

    #[test]
    fn test_is_uuid_name() {
        assert!(is_uuid_name(UUID_A));
        assert!(is_uuid_name(UUID_B));
        assert!(!is_uuid_name("2792352D95FE43AE947DFF4BF31DE4E6"));
        assert!(!is_uuid_name("2792352D-95FE-43AE-947D-FF4BF31DE4E6x"));
    }

    #[test]
    fn test_resolve_uuid_containers_by_metadata() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let bundle = make_bundle(&root, "com.foo.bar");
        let containers = root.join("Containers");
        let owned = make_container(&containers, UUID_A, Some("com.foo.bar"));
        make_container(&containers, UUID_B, Some("com.other.app"));
        make_container(&containers, "com.foo.bar", Some("com.foo.bar"));
        make_container(&containers, "11111111-2222-3333-4444-555555555555", None);

        let groups = LibraryGroupContainers::new(root.join("Group Containers"));
        let resolver = ContainerResolver::new(&containers, &groups);
        let stats = DiscoveryStats::new();
        let app = AppDescriptor::new(bundle, "com.foo.bar", "Bar");

        assert_eq!(resolver.resolve(&app, &stats), [owned]);
        assert_eq!(stats.snapshot().containers, 1);
        assert_eq!(stats.snapshot().errors, 0);
    }

    #[test]
    fn test_resolve_group_container_first() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let bundle = make_bundle(&root, "group.com.foo.bar");
        let group = root.join("Group Containers/group.com.foo.bar");
        fs::create_dir_all(&group).expect("mkdir group");

        let groups = LibraryGroupContainers::new(root.join("Group Containers"));
        let containers = root.join("Containers");
        let resolver = ContainerResolver::new(&containers, &groups);
        let app = AppDescriptor::new(bundle, "group.com.foo.bar", "Bar");

        assert_eq!(resolver.resolve(&app, &DiscoveryStats::new()), [group]);
    }

    #[test]
    fn test_group_uses_info_plist_id_and_sandbox_uses_descriptor_id() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let bundle = make_bundle(&root, "com.foo.plistid");
        let group = root.join("Group Containers/com.foo.plistid");
        fs::create_dir_all(&group).expect("mkdir group");
        fs::create_dir_all(root.join("Group Containers/com.foo.descriptor")).expect("mkdir group");
        let containers = root.join("Containers");
        let owned = make_container(&containers, UUID_A, Some("com.foo.descriptor"));
        make_container(&containers, UUID_B, Some("com.foo.plistid"));

        let groups = LibraryGroupContainers::new(root.join("Group Containers"));
        let resolver = ContainerResolver::new(&containers, &groups);
        let stats = DiscoveryStats::new();
        let app = AppDescriptor::new(bundle, "com.foo.descriptor", "Bar");

        assert_eq!(resolver.resolve(&app, &stats), [group, owned]);
        assert_eq!(stats.snapshot().containers, 2);
    }

    #[test]
    fn test_resolve_without_info_plist_finds_nothing() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        let containers = root.join("Containers");
        make_container(&containers, UUID_A, Some("com.foo.bar"));

        let groups = LibraryGroupContainers::new(root.join("Group Containers"));
        let resolver = ContainerResolver::new(&containers, &groups);
        let app = AppDescriptor::new(root.join("Missing.app"), "com.foo.bar", "Bar");

        assert!(resolver.resolve(&app, &DiscoveryStats::new()).is_empty());
    }

    #[test]
    fn test_group_lookup_requires_directory() {
        let temp = TempDir::new().expect("temp dir");
        let root = utf8_root(&temp);
        fs::write(root.join("group.file"), "x").expect("write");
        let groups = LibraryGroupContainers::new(&root);
        assert_eq!(groups.group_container("group.file"), None);
        assert_eq!(groups.group_container(""), None);
    }
}
