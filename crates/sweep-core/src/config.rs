//! Configuration structures for appsweep.
//!
//! - [`DiscoveryConfig`] - Search roots, container locations, file types, parallelism
//! - [`RuleConfig`] - Override and skip rules layered on the built-in tables
//! - [`Config`] - Root configuration combining both
//!
//! Paths may start with `~/`; they are expanded against the user's home
//! directory when resolved, not when loaded.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{MatchRule, RuleSet, SkipRule};

/// Library locations scanned when no search roots are configured.
const DEFAULT_SEARCH_ROOTS: &[&str] = &[
    "~/Library",
    "~/Library/Application Scripts",
    "~/Library/Application Support",
    "~/Library/Application Support/CrashReporter",
    "~/Library/Caches",
    "~/Library/Containers",
    "~/Library/Cookies",
    "~/Library/Group Containers",
    "~/Library/HTTPStorages",
    "~/Library/Internet Plug-Ins",
    "~/Library/LaunchAgents",
    "~/Library/Logs",
    "~/Library/Preferences",
    "~/Library/Preferences/ByHost",
    "~/Library/Saved Application State",
    "~/Library/WebKit",
    "/Library",
    "/Library/Application Support",
    "/Library/Caches",
    "/Library/Extensions",
    "/Library/Internet Plug-Ins",
    "/Library/LaunchAgents",
    "/Library/LaunchDaemons",
    "/Library/Logs",
    "/Library/Preferences",
    "/Library/PrivilegedHelperTools",
    "/Users/Shared",
    "/private/var/db/receipts",
    "/private/tmp",
];

/// Expands a leading `~` component against the home directory.
///
/// Paths without one, or any path when the home directory is unknown or not
/// UTF-8, are returned unchanged.
///
/// # Examples
///
/// ```
/// use sweep_core::expand_home;
/// use camino::Utf8Path;
///
/// assert_eq!(expand_home(Utf8Path::new("/Library")), Utf8Path::new("/Library"));
/// ```
#[must_use]
pub fn expand_home(path: &Utf8Path) -> Utf8PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_owned();
    };
    match dirs::home_dir().and_then(|home| Utf8PathBuf::from_path_buf(home).ok()) {
        Some(home) if rest.as_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_owned(),
    }
}

/// Configuration for one discovery engine.
///
/// # Examples
///
/// ```
/// use sweep_core::DiscoveryConfig;
///
/// let config = DiscoveryConfig::default();
/// assert!(config.search_roots.iter().any(|root| root == "~/Library/Caches"));
/// assert!(config.supported_extensions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directories whose immediate children are candidates.
    pub search_roots: Vec<Utf8PathBuf>,

    /// Per-user sandbox containers directory.
    pub containers_dir: Utf8PathBuf,

    /// Per-user app-group containers directory.
    pub group_containers_dir: Utf8PathBuf,

    /// File extensions (without the dot) a non-directory candidate may have.
    /// Empty means any extension is accepted.
    pub supported_extensions: Vec<String>,

    /// Maximum number of parallel scan jobs.
    /// `None` means use all available CPU cores.
    pub max_parallel_jobs: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_roots: DEFAULT_SEARCH_ROOTS
                .iter()
                .map(|root| Utf8PathBuf::from(*root))
                .collect(),
            containers_dir: Utf8PathBuf::from("~/Library/Containers"),
            group_containers_dir: Utf8PathBuf::from("~/Library/Group Containers"),
            supported_extensions: Vec::new(),
            max_parallel_jobs: None,
        }
    }
}

impl DiscoveryConfig {
    /// Returns the search roots with `~` expanded and duplicates removed,
    /// preserving the configured order.
    #[must_use]
    pub fn resolved_search_roots(&self) -> Vec<Utf8PathBuf> {
        let mut roots: Vec<Utf8PathBuf> = Vec::with_capacity(self.search_roots.len());
        for root in &self.search_roots {
            let root = expand_home(root);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Returns the expanded containers directory.
    #[must_use]
    pub fn resolved_containers_dir(&self) -> Utf8PathBuf {
        expand_home(&self.containers_dir)
    }

    /// Returns the expanded group containers directory.
    #[must_use]
    pub fn resolved_group_containers_dir(&self) -> Utf8PathBuf {
        expand_home(&self.group_containers_dir)
    }
}

/// Rule tables layered on top of the built-in ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Whether [`RuleSet::builtin`] is included.
    pub use_builtin_rules: bool,

    /// Additional per-app override rules.
    pub match_rules: Vec<MatchRule>,

    /// Additional reserved-prefix rules.
    pub skip_rules: Vec<SkipRule>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            use_builtin_rules: true,
            match_rules: Vec::new(),
            skip_rules: Vec::new(),
        }
    }
}

impl RuleConfig {
    /// Builds the effective rule set.
    #[must_use]
    pub fn rule_set(&self) -> RuleSet {
        let configured = RuleSet::new(self.match_rules.clone(), self.skip_rules.clone());
        if self.use_builtin_rules {
            RuleSet::builtin().merged(configured)
        } else {
            configured
        }
    }
}

/// Root configuration for appsweep.
///
/// # Examples
///
/// ```
/// use sweep_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("search_roots"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discovery engine configuration.
    pub discovery: DiscoveryConfig,

    /// Rule tables.
    pub rules: RuleConfig,
}

impl Config {
    /// Loads and validates a JSON configuration file.
    ///
    /// Missing fields take their defaults.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that deserialization cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.max_parallel_jobs == Some(0) {
            return Err(ConfigError::invalid_option(
                "discovery.max_parallel_jobs",
                "must be at least 1",
            ));
        }

        for root in &self.discovery.search_roots {
            if !root.is_absolute() && !root.starts_with("~") {
                return Err(ConfigError::InvalidPath {
                    path: root.clone(),
                    reason: "search roots must be absolute or start with ~".to_owned(),
                });
            }
        }

        if let Some(rule) = self.rules.match_rules.iter().find(|rule| rule.key.is_empty()) {
            return Err(ConfigError::invalid_option(
                "rules.match_rules",
                format!("rule with include {:?} has an empty key", rule.include),
            ));
        }

        if self.rules.skip_rules.iter().any(|rule| rule.prefix.is_empty()) {
            return Err(ConfigError::invalid_option(
                "rules.skip_rules",
                "skip rule prefix is empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discovery_config_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.search_roots.len(), DEFAULT_SEARCH_ROOTS.len());
        assert_eq!(config.containers_dir, "~/Library/Containers");
        assert_eq!(config.group_containers_dir, "~/Library/Group Containers");
        assert!(config.max_parallel_jobs.is_none());
    }

    #[test]
    fn test_resolved_roots_dedupe_in_order() {
        let config = DiscoveryConfig {
            search_roots: vec![
                Utf8PathBuf::from("/Library/Caches"),
                Utf8PathBuf::from("/Users/Shared"),
                Utf8PathBuf::from("/Library/Caches"),
            ],
            ..DiscoveryConfig::default()
        };
        assert_eq!(
            config.resolved_search_roots(),
            vec![
                Utf8PathBuf::from("/Library/Caches"),
                Utf8PathBuf::from("/Users/Shared")
            ]
        );
    }

    #[test]
    fn test_expand_home() {
        let expanded = expand_home(Utf8Path::new("~/Library/Caches"));
        if let Some(home) = dirs::home_dir().and_then(|h| Utf8PathBuf::from_path_buf(h).ok()) {
            assert_eq!(expanded, home.join("Library/Caches"));
        }
        assert_eq!(expand_home(Utf8Path::new("/tmp/x")), Utf8Path::new("/tmp/x"));
        assert_eq!(expand_home(Utf8Path::new("~user/x")), Utf8Path::new("~user/x"));
    }

    #[test]
    fn test_rule_config_builtin_toggle() {
        let mut rules = RuleConfig {
            match_rules: vec![MatchRule::new("com.foo", &["foo"], &[])],
            ..RuleConfig::default()
        };
        let with_builtin = rules.rule_set();
        assert!(with_builtin.match_rules.len() > 1);

        rules.use_builtin_rules = false;
        let only_configured = rules.rule_set();
        assert_eq!(only_configured.match_rules.len(), 1);
        assert!(only_configured.skip_rules.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"discovery": {"search_roots": ["/Library/Caches"], "max_parallel_jobs": 2}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.discovery.search_roots, vec![Utf8PathBuf::from("/Library/Caches")]);
        assert_eq!(config.discovery.max_parallel_jobs, Some(2));
        assert_eq!(config.discovery.containers_dir, "~/Library/Containers");
        assert!(config.rules.use_builtin_rules);
    }

    #[test]
    fn test_validate_rejects_zero_jobs() {
        let mut config = Config::default();
        config.discovery.max_parallel_jobs = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_parallel_jobs"));
    }

    #[test]
    fn test_validate_rejects_relative_roots() {
        let mut config = Config::default();
        config.discovery.search_roots = vec![Utf8PathBuf::from("Library/Caches")];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_rule_strings() {
        let mut config = Config::default();
        config.rules.skip_rules = vec![SkipRule::new("..", &[])];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rules.match_rules = vec![MatchRule::new("", &["foo"], &[])];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().join("appsweep.json");
        fs::write(
            &path,
            r#"{"rules": {"skip_rules": [{"prefix": "com.corp", "allow": ["com.corp.tools"]}]}}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.rules.skip_rules[0].prefix, "comcorp");
        assert!(config.rule_set_contains_builtin());
    }

    #[test]
    fn test_from_file_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse(_))));
    }

    impl Config {
        fn rule_set_contains_builtin(&self) -> bool {
            let rules = self.rules.rule_set();
            RuleSet::builtin()
                .skip_rules
                .iter()
                .all(|rule| rules.skip_rules.contains(rule))
        }
    }
}
