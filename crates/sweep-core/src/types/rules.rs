//! Per-app override rules and reserved-prefix skip rules.
//!
//! Both tables are read-only configuration shared by every discovery run.
//! All rule strings are passed through [`normalize_name`] on construction
//! (including deserialization), so they compare directly against normalized
//! candidate names and may be written in their natural dotted form.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::app::normalize_name;

/// Keyword list; most rules carry only a handful of entries.
pub type Keywords = SmallVec<[String; 4]>;

fn normalize_all<'a>(values: impl IntoIterator<Item = &'a str>) -> Keywords {
    values
        .into_iter()
        .map(normalize_name)
        .filter(|value| !value.is_empty())
        .collect()
}

/// App-specific matching override.
///
/// A rule applies to every app whose normalized bundle identifier contains
/// [`key`](Self::key). Exclude keywords always win over include keywords.
///
/// # Examples
///
/// ```
/// use sweep_core::MatchRule;
///
/// let rule = MatchRule::new("com.microsoft.VSCode", &["vscode"], &["insiders"]);
/// assert!(rule.applies_to("commicrosoftvscode"));
/// assert!(rule.includes("comvscodehelper"));
/// assert!(rule.excludes("vscodeinsiders"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMatchRule")]
pub struct MatchRule {
    /// Normalized bundle identifier fragment selecting the apps this rule covers.
    pub key: String,

    /// Normalized keywords that force a match.
    pub include: Keywords,

    /// Normalized keywords that veto a match.
    pub exclude: Keywords,

    /// Absolute paths included whenever they exist. `~/` is expanded at use.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub force_include: Vec<Utf8PathBuf>,
}

#[derive(Deserialize)]
struct RawMatchRule {
    key: String,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    force_include: Vec<Utf8PathBuf>,
}

impl From<RawMatchRule> for MatchRule {
    fn from(raw: RawMatchRule) -> Self {
        Self {
            key: normalize_name(&raw.key),
            include: normalize_all(raw.include.iter().map(String::as_str)),
            exclude: normalize_all(raw.exclude.iter().map(String::as_str)),
            force_include: raw.force_include,
        }
    }
}

impl MatchRule {
    /// Creates a rule, normalizing the key and keywords.
    #[must_use]
    pub fn new(key: &str, include: &[&str], exclude: &[&str]) -> Self {
        Self {
            key: normalize_name(key),
            include: normalize_all(include.iter().copied()),
            exclude: normalize_all(exclude.iter().copied()),
            force_include: Vec::new(),
        }
    }

    /// Adds paths that are included whenever they exist on disk.
    #[must_use]
    pub fn with_force_include(mut self, paths: &[&str]) -> Self {
        self.force_include
            .extend(paths.iter().map(|path| Utf8PathBuf::from(*path)));
        self
    }

    /// Returns `true` if this rule covers the app with the given normalized identifier.
    #[inline]
    #[must_use]
    pub fn applies_to(&self, normalized_bundle_id: &str) -> bool {
        !self.key.is_empty() && normalized_bundle_id.contains(self.key.as_str())
    }

    /// Returns `true` if any include keyword occurs in `name`.
    #[inline]
    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        self.include.iter().any(|keyword| name.contains(keyword.as_str()))
    }

    /// Returns `true` if any exclude keyword occurs in `name`.
    #[inline]
    #[must_use]
    pub fn excludes(&self, name: &str) -> bool {
        self.exclude.iter().any(|keyword| name.contains(keyword.as_str()))
    }
}

/// Reserved name prefix with an allow-list of legitimate longer prefixes.
///
/// # Examples
///
/// ```
/// use sweep_core::SkipRule;
///
/// let rule = SkipRule::new("com.apple", &["com.apple.mycompany"]);
/// assert!(rule.skips("comapplesafari"));
/// assert!(!rule.skips("comapplemycompanyhelper"));
/// assert!(!rule.skips("comfoobar"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSkipRule")]
pub struct SkipRule {
    /// Normalized reserved prefix.
    pub prefix: String,

    /// Normalized prefixes that are let through despite the reserved prefix.
    pub allow: Keywords,
}

#[derive(Deserialize)]
struct RawSkipRule {
    prefix: String,
    #[serde(default)]
    allow: Vec<String>,
}

impl From<RawSkipRule> for SkipRule {
    fn from(raw: RawSkipRule) -> Self {
        Self {
            prefix: normalize_name(&raw.prefix),
            allow: normalize_all(raw.allow.iter().map(String::as_str)),
        }
    }
}

impl SkipRule {
    /// Creates a rule, normalizing the prefix and allow-list.
    #[must_use]
    pub fn new(prefix: &str, allow: &[&str]) -> Self {
        Self {
            prefix: normalize_name(prefix),
            allow: normalize_all(allow.iter().copied()),
        }
    }

    /// Returns `true` if a candidate with this normalized name must be skipped.
    #[must_use]
    pub fn skips(&self, name: &str) -> bool {
        !self.prefix.is_empty()
            && name.starts_with(self.prefix.as_str())
            && !self
                .allow
                .iter()
                .any(|allowed| name.starts_with(allowed.as_str()))
    }
}

/// The rule tables consulted by every discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Per-app override rules.
    pub match_rules: Vec<MatchRule>,
    /// Reserved-prefix skip rules.
    pub skip_rules: Vec<SkipRule>,
}

impl RuleSet {
    /// Creates a rule set from explicit tables.
    #[must_use]
    pub const fn new(match_rules: Vec<MatchRule>, skip_rules: Vec<SkipRule>) -> Self {
        Self {
            match_rules,
            skip_rules,
        }
    }

    /// The rules shipped with the crate.
    ///
    /// Apple's own identifiers are reserved except for the Apple apps users
    /// install and remove themselves and Safari web apps; a few apps with
    /// well-known stray locations get overrides. Override keys are matched as
    /// substrings of the bundle identifier, so none may be a prefix of a
    /// browser web app identifier.
    #[must_use]
    pub fn builtin() -> Self {
        let skip_rules = vec![
            SkipRule::new(
                "com.apple",
                &[
                    "com.apple.dt",
                    "com.apple.configurator",
                    "com.apple.garageband",
                    "com.apple.iMovieApp",
                    "com.apple.iWork",
                    "com.apple.Keynote",
                    "com.apple.logic",
                    "com.apple.mainstage",
                    "com.apple.motionapp",
                    "com.apple.Numbers",
                    "com.apple.Pages",
                    "com.apple.FinalCut",
                    "com.apple.Safari.WebApp",
                ],
            ),
            SkipRule::new("group.com.apple", &[]),
            SkipRule::new("apple", &["appleworks"]),
        ];

        let match_rules = vec![
            MatchRule::new(
                "com.microsoft.VSCode",
                &["vscode", "visualstudiocode"],
                &["insiders", "vscodium"],
            )
            .with_force_include(&["~/.vscode"]),
            MatchRule::new("us.zoom.xos", &["zoomus", "zoomvideo"], &["zoomit"])
                .with_force_include(&["~/.zoomus", "/Library/Internet Plug-Ins/ZoomUsPlugIn.plugin"]),
            MatchRule::new("com.docker.docker", &["docker"], &["dockerode"])
                .with_force_include(&["~/.docker"]),
        ];

        Self::new(match_rules, skip_rules)
    }

    /// Appends another rule set's tables to this one.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.match_rules.extend(other.match_rules);
        self.skip_rules.extend(other.skip_rules);
        self
    }

    /// Iterates the match rules that apply to a normalized bundle identifier.
    pub fn rules_for<'a>(
        &'a self,
        normalized_bundle_id: &'a str,
    ) -> impl Iterator<Item = &'a MatchRule> + 'a {
        self.match_rules
            .iter()
            .filter(move |rule| rule.applies_to(normalized_bundle_id))
    }

    /// Returns `true` if any skip rule reserves this normalized name.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.skip_rules.iter().any(|rule| rule.skips(name))
    }
}
