use regex::RegexSet;

/// Patterns applied when the configuration does not list any
///
/// Dotfiles and dot-directories anywhere in the path, the `node_modules`
/// dependency cache, and the `.git` metadata directory.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    r"(^|[/\\])\..",
    r"(^|[/\\])node_modules([/\\]|$)",
    r"(^|[/\\])\.git([/\\]|$)",
];

/// Decides which relative paths the watcher drops
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    patterns: RegexSet,
}

impl IgnorePolicy {
    /// Compile a policy from regular expressions matched against relative paths
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// Whether `relative_path` matches any pattern
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.patterns.is_match(relative_path)
    }

    /// The source patterns
    pub fn patterns(&self) -> &[String] {
        self.patterns.patterns()
    }
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self {
            patterns: RegexSet::new(DEFAULT_IGNORE_PATTERNS)
                .expect("default ignore patterns are valid regular expressions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_ignores_dotfiles() {
        let policy = IgnorePolicy::default();
        assert!(policy.is_ignored(".env"));
        assert!(policy.is_ignored("config/.secret"));
        assert!(policy.is_ignored(".github/workflows/ci.yml"));
        assert!(policy.is_ignored(r"src\.cache\x"));
    }

    #[test]
    fn test_default_policy_ignores_vcs_and_dependencies() {
        let policy = IgnorePolicy::default();
        assert!(policy.is_ignored(".git/HEAD"));
        assert!(policy.is_ignored(".git"));
        assert!(policy.is_ignored("node_modules/left-pad/index.js"));
        assert!(policy.is_ignored("web/node_modules/react/index.js"));
    }

    #[test]
    fn test_default_policy_keeps_regular_files() {
        let policy = IgnorePolicy::default();
        assert!(!policy.is_ignored("a.txt"));
        assert!(!policy.is_ignored("src/main.rs"));
        assert!(!policy.is_ignored("docs/guide.v2.md"));
        assert!(!policy.is_ignored("my_node_modules_notes.txt"));
    }

    #[test]
    fn test_custom_patterns() {
        let policy = IgnorePolicy::new([r"^target/", r"\.log$"]).unwrap();
        assert!(policy.is_ignored("target/debug/app"));
        assert!(policy.is_ignored("logs/server.log"));
        assert!(!policy.is_ignored(".env"));
        assert_eq!(policy.patterns().len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(IgnorePolicy::new(["(unclosed"]).is_err());
    }
}
