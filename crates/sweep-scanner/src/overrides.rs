//! Force-included paths from override rules.

use camino::Utf8PathBuf;
use sweep_core::{RuleSet, expand_home};
use tracing::debug;

use crate::stats::DiscoveryStats;

/// Returns the force-include paths of every rule covering the app that exist.
///
/// `normalized_bundle_id` must already be normalized. A leading `~` is
/// expanded against the home directory. Paths are returned in rule order.
pub fn resolve_overrides(
    normalized_bundle_id: &str,
    rules: &RuleSet,
    stats: &DiscoveryStats,
) -> Vec<Utf8PathBuf> {
    let found: Vec<Utf8PathBuf> = rules
        .rules_for(normalized_bundle_id)
        .flat_map(|rule| rule.force_include.iter())
        .map(|path| expand_home(path))
        .filter(|path| {
            let exists = path.exists();
            if exists {
                debug!(%path, "Force-included");
            }
            exists
        })
        .collect();

    stats.add_overrides(found.len() as u64);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use sweep_core::MatchRule;
    use tempfile::TempDir;

    #[test]
    fn test_existing_force_includes_only() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 temp path");
        let present = root.join(".foo");
        fs::create_dir(&present).expect("mkdir");
        let absent = root.join(".absent");

        let rules = RuleSet::new(
            vec![
                MatchRule::new("com.foo", &[], &[])
                    .with_force_include(&[present.as_str(), absent.as_str()]),
                MatchRule::new("com.other", &[], &[]).with_force_include(&[root.as_str()]),
            ],
            Vec::new(),
        );
        let stats = DiscoveryStats::new();

        assert_eq!(resolve_overrides("comfoobar", &rules, &stats), [present]);
        assert_eq!(stats.snapshot().overrides, 1);
    }

    #[test]
    fn test_no_rules_no_overrides() {
        let stats = DiscoveryStats::new();
        assert!(resolve_overrides("comfoobar", &RuleSet::default(), &stats).is_empty());
    }
}
