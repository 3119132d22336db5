use crate::error::{ReleaseError, Result};
use crate::git::{LogEntry, Repository};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Mock repository for testing without actual git operations.
///
/// Every answer is canned: revisions, merge bases, ranges and per-commit
/// file lists are registered up front. Queries are recorded so tests can
/// assert which range was requested.
#[derive(Default)]
pub struct MockRepository {
    refs: HashMap<String, String>,
    merge_bases: HashMap<(String, String), String>,
    ranges: HashMap<(String, String), Vec<LogEntry>>,
    files: HashMap<String, Vec<String>>,
    failing: HashSet<&'static str>,
    queries: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a revision expression resolve to `hash`
    pub fn set_ref(&mut self, rev: impl Into<String>, hash: impl Into<String>) {
        self.refs.insert(rev.into(), hash.into());
    }

    pub fn set_merge_base(
        &mut self,
        a: impl Into<String>,
        b: impl Into<String>,
        base: impl Into<String>,
    ) {
        self.merge_bases.insert((a.into(), b.into()), base.into());
    }

    /// Register the commits (oldest first) returned for `base..head`
    pub fn set_range(
        &mut self,
        base: impl Into<String>,
        head: impl Into<String>,
        entries: Vec<LogEntry>,
    ) {
        self.ranges.insert((base.into(), head.into()), entries);
    }

    pub fn set_files(&mut self, hash: impl Into<String>, files: &[&str]) {
        self.files
            .insert(hash.into(), files.iter().map(|f| f.to_string()).collect());
    }

    /// Make every call of the named query ("rev-parse", "merge-base", "log",
    /// "diff-tree") fail
    pub fn fail_query(&mut self, query: &'static str) {
        self.failing.insert(query);
    }

    /// Queries issued so far, formatted as `name args...`
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    fn record(&self, query: &'static str, args: &[&str]) -> Result<()> {
        self.queries
            .borrow_mut()
            .push(format!("{} {}", query, args.join(" ")));
        if self.failing.contains(query) {
            return Err(ReleaseError::oracle(query, args, "simulated failure"));
        }
        Ok(())
    }
}

impl Repository for MockRepository {
    fn try_resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        self.record("rev-parse", &[rev])?;
        Ok(self.refs.get(rev).cloned())
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        self.record("merge-base", &[a, b])?;
        self.merge_bases
            .get(&(a.to_string(), b.to_string()))
            .cloned()
            .ok_or_else(|| ReleaseError::oracle("merge-base", &[a, b], "no merge base"))
    }

    fn log_range(&self, base: &str, head: &str) -> Result<Vec<LogEntry>> {
        self.record("log", &[base, head])?;
        Ok(self
            .ranges
            .get(&(base.to_string(), head.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        self.record("diff-tree", &[hash])?;
        Ok(self.files.get(hash).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_refs() {
        let mut repo = MockRepository::new();
        repo.set_ref("HEAD", "abc123");

        assert_eq!(repo.resolve_ref("HEAD").unwrap(), "abc123");
        assert_eq!(repo.try_resolve_ref("HEAD^2").unwrap(), None);
        assert!(repo.resolve_ref("HEAD^2").is_err());
    }

    #[test]
    fn test_mock_repository_ranges_and_files() {
        let mut repo = MockRepository::new();
        repo.set_range("a", "b", vec![LogEntry::new("c1", "feat: one")]);
        repo.set_files("c1", &["pkg/x.rs"]);

        let entries = repo.log_range("a", "b").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(repo.changed_files("c1").unwrap(), vec!["pkg/x.rs".to_string()]);
        assert!(repo.log_range("x", "y").unwrap().is_empty());
    }

    #[test]
    fn test_mock_repository_records_queries() {
        let repo = MockRepository::new();
        let _ = repo.try_resolve_ref("HEAD");
        let _ = repo.log_range("base", "tip");
        assert_eq!(repo.queries(), vec!["rev-parse HEAD", "log base tip"]);
    }

    #[test]
    fn test_mock_repository_failing_query() {
        let mut repo = MockRepository::new();
        repo.fail_query("diff-tree");
        assert!(repo.changed_files("c1").is_err());
    }
}
