//! The application being swept.
//!
//! [`AppDescriptor`] is the read-only view of the target application for one
//! discovery run. [`normalize_name`] is the single normalization used for
//! candidate names, app signals, and rule strings alike.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::PlistError;
use crate::plist;

/// Bundle identifier prefixes used by browser-generated web app wrappers.
const WEB_APP_PREFIXES: &[&str] = &["com.apple.Safari.WebApp.", "com.google.Chrome.app."];

/// Lowercases `value` and drops every non-alphanumeric character.
///
/// # Examples
///
/// ```
/// use sweep_core::normalize_name;
///
/// assert_eq!(normalize_name("com.foo.Bar Helper"), "comfoobarhelper");
/// assert_eq!(normalize_name("zoom.us-2"), "zoomus2");
/// ```
#[must_use]
pub fn normalize_name(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Immutable description of the application whose files are being located.
///
/// # Examples
///
/// ```
/// use sweep_core::AppDescriptor;
///
/// let app = AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar");
/// assert_eq!(app.path_name(), "Bar");
/// assert!(!app.web_app);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppDescriptor {
    /// Canonical bundle root, e.g. `/Applications/Bar.app`.
    pub path: Utf8PathBuf,

    /// Reverse-DNS bundle identifier.
    pub bundle_id: String,

    /// Display name shown to the user.
    pub name: String,

    /// Whether the bundle is a browser-generated web app wrapper.
    ///
    /// Web apps are matched on bundle identifier signals only.
    #[serde(default)]
    pub web_app: bool,
}

impl AppDescriptor {
    /// Creates a descriptor for a regular (non web app) bundle.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        bundle_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            bundle_id: bundle_id.into(),
            name: name.into(),
            web_app: false,
        }
    }

    /// Marks the descriptor as a web app wrapper.
    #[must_use]
    pub const fn with_web_app(mut self, web_app: bool) -> Self {
        self.web_app = web_app;
        self
    }

    /// Builds a descriptor from the bundle's `Info.plist`.
    ///
    /// Reads `CFBundleIdentifier`, then `CFBundleDisplayName` falling back to
    /// `CFBundleName` and finally the bundle's file stem. The web app flag is
    /// set when the identifier carries a known browser wrapper prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PlistError`] if no `Info.plist` can be read or it carries no
    /// bundle identifier.
    pub fn from_bundle(path: &Utf8Path) -> Result<Self, PlistError> {
        let info = info_plist_path(path);
        let bundle_id =
            plist::read_string(&info, "CFBundleIdentifier")?.ok_or_else(|| {
                PlistError::Malformed {
                    path: info.clone(),
                    reason: "missing CFBundleIdentifier",
                }
            })?;

        let name = match plist::read_string(&info, "CFBundleDisplayName")? {
            Some(name) => name,
            None => plist::read_string(&info, "CFBundleName")?
                .unwrap_or_else(|| path_stem(path)),
        };

        let web_app = WEB_APP_PREFIXES
            .iter()
            .any(|prefix| bundle_id.starts_with(prefix));

        Ok(Self {
            path: path.to_owned(),
            bundle_id,
            name,
            web_app,
        })
    }

    /// Returns the bundle's last path component with any `.app` suffix removed.
    #[must_use]
    pub fn path_name(&self) -> String {
        path_stem(&self.path)
    }
}

/// Locates the `Info.plist` of a bundle.
///
/// macOS bundles keep it under `Contents/`; wrapped iOS bundles keep it at the
/// bundle root. When neither exists the `Contents/` location is returned so the
/// caller's read reports a not-found error against the conventional path.
#[must_use]
pub fn info_plist_path(bundle: &Utf8Path) -> Utf8PathBuf {
    let contents = bundle.join("Contents").join("Info.plist");
    if contents.is_file() {
        return contents;
    }
    let flat = bundle.join("Info.plist");
    if flat.is_file() {
        return flat;
    }
    contents
}

fn path_stem(path: &Utf8Path) -> String {
    let name = path.file_name().unwrap_or_default();
    name.strip_suffix(".app").unwrap_or(name).to_owned()
}
