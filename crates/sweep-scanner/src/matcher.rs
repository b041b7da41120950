//! Match predicate deciding whether a candidate name belongs to the app.
//!
//! An [`AppMatcher`] is built once per run from the [`AppDescriptor`] and the
//! rule tables. All signals are normalized up front, so [`AppMatcher::matches`]
//! only performs substring tests on an already normalized candidate name.

use sweep_core::{AppDescriptor, MatchRule, RuleSet, normalize_name};

/// Name and path-derived signals shorter than this are too generic to match on.
const MIN_NAME_SIGNAL_LEN: usize = 4;

/// Per-run match predicate.
///
/// # Examples
///
/// ```
/// use sweep_core::{AppDescriptor, RuleSet, normalize_name};
/// use sweep_scanner::AppMatcher;
///
/// let app = AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar");
/// let matcher = AppMatcher::new(&app, &RuleSet::default());
///
/// assert!(matcher.matches(&normalize_name("com.foo.bar.plist")));
/// assert!(matcher.matches(&normalize_name("foo.bar")));
/// assert!(!matcher.matches(&normalize_name("com.other.app")));
/// ```
#[derive(Debug, Clone)]
pub struct AppMatcher {
    /// Normalized bundle identifier.
    bundle_id: String,
    /// Normalized concatenation of the identifier's last two components.
    bundle_suffix: String,
    /// Normalized display name.
    name: String,
    /// Normalized bundle file name without `.app`.
    path_name: String,
    /// Web apps match on identifier signals only.
    web_app: bool,
    /// Override rules covering this app, in table order.
    rules: Vec<MatchRule>,
}

impl AppMatcher {
    /// Precomputes the app's signals and selects the rules that apply to it.
    #[must_use]
    pub fn new(app: &AppDescriptor, rules: &RuleSet) -> Self {
        let bundle_id = normalize_name(&app.bundle_id);
        let rules = rules.rules_for(&bundle_id).cloned().collect();
        Self {
            bundle_suffix: bundle_suffix(&app.bundle_id),
            name: normalize_name(&app.name),
            path_name: normalize_name(&app.path_name()),
            web_app: app.web_app,
            rules,
            bundle_id,
        }
    }

    /// Returns the normalized bundle identifier.
    #[inline]
    #[must_use]
    pub fn normalized_bundle_id(&self) -> &str {
        &self.bundle_id
    }

    /// Returns the normalized bundle suffix signal.
    #[inline]
    #[must_use]
    pub fn bundle_suffix(&self) -> &str {
        &self.bundle_suffix
    }

    /// Returns `true` if an override rule applies to this app.
    #[inline]
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Decides whether a normalized candidate name belongs to the app.
    ///
    /// Override rules are consulted first, in order; within a rule an exclude
    /// keyword wins over an include keyword. When no rule decides, the name
    /// must contain one of the app's signals.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        for rule in &self.rules {
            if rule.excludes(name) {
                return false;
            }
            if rule.includes(name) {
                return true;
            }
        }

        let contains = |signal: &str| !signal.is_empty() && name.contains(signal);

        if self.web_app {
            return contains(&self.bundle_id) || contains(&self.bundle_suffix);
        }

        contains(&self.bundle_id)
            || contains(&self.bundle_suffix)
            || (long_enough(&self.name) && contains(&self.name))
            || (long_enough(&self.path_name) && contains(&self.path_name))
    }
}

fn long_enough(signal: &str) -> bool {
    signal.chars().count() >= MIN_NAME_SIGNAL_LEN
}

/// Normalized concatenation of the last two non-empty identifier components.
///
/// `com.example.site` becomes `examplesite`. Components that are a lone `-`
/// are ignored.
fn bundle_suffix(bundle_id: &str) -> String {
    let components: Vec<String> = bundle_id
        .split('.')
        .filter(|component| *component != "-")
        .map(normalize_name)
        .filter(|component| !component.is_empty())
        .collect();
    let start = components.len().saturating_sub(2);
    components[start..].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(bundle_id: &str, name: &str, path: &str) -> AppMatcher {
        AppMatcher::new(&AppDescriptor::new(path, bundle_id, name), &RuleSet::default())
    }

    #[test]
    fn test_bundle_suffix() {
        assert_eq!(bundle_suffix("com.example.site"), "examplesite");
        assert_eq!(bundle_suffix("com.Foo.Bar-Helper"), "foobarhelper");
        assert_eq!(bundle_suffix("single"), "single");
        assert_eq!(bundle_suffix("com.foo.-"), "comfoo");
        assert_eq!(bundle_suffix(""), "");
    }

    #[test]
    fn test_matches_bundle_id_and_suffix() {
        let m = matcher("com.foo.bar", "Bar", "/Applications/Bar.app");
        assert!(m.matches("comfoobar"));
        assert!(m.matches("comfoobarplist"));
        assert!(m.matches("foobar"));
        assert!(!m.matches("comfoo"));
    }

    #[test]
    fn test_short_names_do_not_match() {
        let m = matcher("com.foo.bar", "Bar", "/Applications/Bar.app");
        assert!(!m.matches("barista"));

        let m = matcher("com.foo.bar", "Barber", "/Applications/Bar.app");
        assert!(m.matches("barbershop"));
    }

    #[test]
    fn test_matches_path_name() {
        let m = matcher("com.vendor.x", "X", "/Applications/Visual Studio Code.app");
        assert!(m.matches("visualstudiocode"));
    }

    #[test]
    fn test_empty_signals_never_match() {
        let m = matcher("", "", "/");
        assert!(!m.matches("anything"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_web_app_narrowing() {
        let app = AppDescriptor::new("/Applications/Site.app", "com.example.site", "Site App")
            .with_web_app(true);
        let m = AppMatcher::new(&app, &RuleSet::default());
        assert!(m.matches(&normalize_name("com.example.site")));
        assert!(m.matches(&normalize_name("example.site.cache")));
        assert!(!m.matches("examplecache"));
        assert!(!m.matches(&normalize_name("Site App Data")));
    }

    #[test]
    fn test_exclude_dominates_include() {
        let rules = RuleSet::new(
            vec![MatchRule::new("com.foo.bar", &["foo"], &["foohelper"])],
            Vec::new(),
        );
        let app = AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar");
        let m = AppMatcher::new(&app, &rules);
        assert!(m.has_rules());
        assert!(m.matches("foo"));
        assert!(!m.matches("foohelper"));
        assert!(!m.matches("comfoobarfoohelper"));
    }

    #[test]
    fn test_rule_that_does_not_decide_falls_through() {
        let rules = RuleSet::new(
            vec![MatchRule::new("com.foo.bar", &["unrelated"], &["nothing"])],
            Vec::new(),
        );
        let app = AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar");
        let m = AppMatcher::new(&app, &rules);
        assert!(m.matches("comfoobar"));
        assert!(!m.matches("comother"));
    }

    #[test]
    fn test_rules_for_other_apps_are_ignored() {
        let rules = RuleSet::new(
            vec![MatchRule::new("com.other", &["comfoo"], &[])],
            Vec::new(),
        );
        let app = AppDescriptor::new("/Applications/Bar.app", "com.foo.bar", "Bar");
        let m = AppMatcher::new(&app, &rules);
        assert!(!m.has_rules());
        assert!(!m.matches("comfoo"));
    }
}
