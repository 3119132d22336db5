use regex::Regex;
use std::sync::OnceLock;

/// Length of the abbreviated hash shown in changelogs and release notes
pub const SHORT_HASH_LEN: usize = 7;

fn subject_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\w+)(?:\(([^)]+)\))?(!)?\s*:\s*(.+)$").ok())
        .as_ref()
}

/// A single commit from the analyzed range, with its conventional-commit
/// fields and the files it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub short_hash: String,
    /// Lowercased conventional type, empty for non-conventional subjects
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking: bool,
    /// Repository-relative paths changed by this commit
    pub files: Vec<String>,
}

impl Commit {
    /// Parse a commit subject line according to the conventional commits format.
    ///
    /// Supports:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    ///
    /// Anything else still yields a record: empty type, no scope, not
    /// breaking, and the whole subject as description.
    pub fn parse(hash: &str, subject: &str) -> Self {
        let short_hash: String = hash.chars().take(SHORT_HASH_LEN).collect();

        if let Some(captures) = subject_pattern().and_then(|re| re.captures(subject)) {
            let r#type = captures
                .get(1)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let scope = captures.get(2).map(|m| m.as_str().to_string());
            let is_breaking = captures.get(3).is_some();
            let description = captures
                .get(4)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            return Commit {
                hash: hash.to_string(),
                short_hash,
                r#type,
                scope,
                description,
                is_breaking,
                files: Vec::new(),
            };
        }

        Commit {
            hash: hash.to_string(),
            short_hash,
            r#type: String::new(),
            scope: None,
            description: subject.to_string(),
            is_breaking: false,
            files: Vec::new(),
        }
    }

    /// Attach the changed-file list
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    pub fn is_conventional(&self) -> bool {
        !self.r#type.is_empty()
    }

    /// Rebuild a normalized subject line from the parsed parts
    pub fn message(&self) -> String {
        if self.r#type.is_empty() {
            return self.description.clone();
        }

        let mut prefix = self.r#type.clone();
        if let Some(scope) = &self.scope {
            prefix.push('(');
            prefix.push_str(scope);
            prefix.push(')');
        }
        if self.is_breaking {
            prefix.push('!');
        }
        format!("{}: {}", prefix, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "abcdef0123456789abcdef0123456789abcdef01";

    #[test]
    fn test_parse_with_scope() {
        let commit = Commit::parse(HASH, "feat(auth): add login");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, Some("auth".to_string()));
        assert_eq!(commit.description, "add login");
        assert!(!commit.is_breaking);
        assert_eq!(commit.short_hash, "abcdef0");
        assert_eq!(commit.hash, HASH);
    }

    #[test]
    fn test_parse_with_breaking_marker() {
        let commit = Commit::parse(HASH, "feat(api)!: redesign endpoints");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, Some("api".to_string()));
        assert!(commit.is_breaking);
    }

    #[test]
    fn test_parse_breaking_without_scope() {
        let commit = Commit::parse(HASH, "feat!: redesign");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, None);
        assert!(commit.is_breaking);
        assert_eq!(commit.description, "redesign");
    }

    #[test]
    fn test_parse_type_is_lowercased() {
        let commit = Commit::parse(HASH, "FIX(Core): handle null");
        assert_eq!(commit.r#type, "fix");
        assert_eq!(commit.scope, Some("Core".to_string()));
    }

    #[test]
    fn test_parse_space_before_colon() {
        let commit = Commit::parse(HASH, "fix : tolerate spacing");
        assert_eq!(commit.r#type, "fix");
        assert_eq!(commit.description, "tolerate spacing");
    }

    #[test]
    fn test_parse_non_conventional() {
        let commit = Commit::parse(HASH, "Merge branch 'feature/x' into main");
        assert_eq!(commit.r#type, "");
        assert_eq!(commit.scope, None);
        assert!(!commit.is_breaking);
        assert_eq!(commit.description, "Merge branch 'feature/x' into main");
        assert!(!commit.is_conventional());
    }

    #[test]
    fn test_parse_empty_description_is_non_conventional() {
        let commit = Commit::parse(HASH, "feat:");
        assert_eq!(commit.r#type, "");
        assert_eq!(commit.description, "feat:");
    }

    #[test]
    fn test_parse_short_hash_of_short_input() {
        let commit = Commit::parse("abc", "fix: x");
        assert_eq!(commit.short_hash, "abc");
    }

    #[test]
    fn test_message_round_trip() {
        for subject in [
            "feat(api)!: new format",
            "fix: typo",
            "perf!: rewrite",
            "Random commit message",
        ] {
            assert_eq!(Commit::parse(HASH, subject).message(), subject);
        }
    }

    #[test]
    fn test_with_files() {
        let commit = Commit::parse(HASH, "fix: x").with_files(vec!["a/b.rs".to_string()]);
        assert_eq!(commit.files, vec!["a/b.rs".to_string()]);
    }
}
