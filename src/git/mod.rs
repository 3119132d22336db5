//! Git operations abstraction layer
//!
//! This module provides a narrow, trait-based view of the version-control
//! oracle: resolve a revision, compute a merge base, list a commit range and
//! list the files a commit changed. Everything above this layer (history
//! traversal, release calculation) depends only on the [Repository] trait.
//!
//! # Overview
//!
//! The implementations are:
//!
//! - [command::GitCommand]: runs the installed `git` client as a subprocess
//! - [repository::Git2Repository]: answers the same queries through libgit2
//! - [mock::MockRepository]: canned responses for unit tests
//!
//! The merge-aware traversal built on top of these lives in [history].
//!
//! ```rust
//! # use merge_release::git::{history, Repository};
//! # fn example<R: Repository>(repo: &R) -> merge_release::Result<()> {
//! let info = history::analyze_head(repo)?;
//! let commits = history::commits_for_head(repo, &info)?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod history;
pub mod mock;
pub mod remote;
pub mod repository;

pub use command::GitCommand;
pub use history::MergeInfo;
pub use mock::MockRepository;
pub use remote::remote_web_url;
pub use repository::Git2Repository;

use crate::config::Backend;
use crate::error::Result;
use std::path::Path;

/// One line of a range listing: full hash and subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub subject: String,
}

impl LogEntry {
    pub fn new(hash: impl Into<String>, subject: impl Into<String>) -> Self {
        LogEntry {
            hash: hash.into(),
            subject: subject.into(),
        }
    }
}

/// Read-only queries against a repository.
///
/// All calls are blocking. Implementations report the failing query and its
/// arguments in the error so a caller can diagnose it.
pub trait Repository {
    /// Resolve a revision expression (e.g., "HEAD", "HEAD^1") to a full commit hash
    ///
    /// # Returns
    /// * `Ok(String)` - 40-character hex hash
    /// * `Err` - If the revision does not exist or the query fails
    fn resolve_ref(&self, rev: &str) -> Result<String> {
        self.try_resolve_ref(rev)?.ok_or_else(|| {
            crate::error::ReleaseError::oracle("rev-parse", &[rev], "revision does not exist")
        })
    }

    /// Resolve a revision that may legitimately be absent
    ///
    /// # Returns
    /// * `Ok(Some(hash))` - The revision exists
    /// * `Ok(None)` - The revision does not exist (e.g., `HEAD^2` of an
    ///   ordinary commit, `HEAD~1` of a root commit)
    /// * `Err` - Any other failure (not a repository, client missing, ...)
    fn try_resolve_ref(&self, rev: &str) -> Result<Option<String>>;

    /// Best common ancestor of two commits
    fn merge_base(&self, a: &str, b: &str) -> Result<String>;

    /// Commits reachable from `head` but not from `base`, oldest first
    fn log_range(&self, base: &str, head: &str) -> Result<Vec<LogEntry>>;

    /// Files changed by a commit relative to its single parent
    ///
    /// Root commits are compared against the empty tree. Merge commits
    /// report no files.
    fn changed_files(&self, hash: &str) -> Result<Vec<String>>;
}

impl<R: Repository + ?Sized> Repository for &R {
    fn resolve_ref(&self, rev: &str) -> Result<String> {
        (**self).resolve_ref(rev)
    }

    fn try_resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        (**self).try_resolve_ref(rev)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        (**self).merge_base(a, b)
    }

    fn log_range(&self, base: &str, head: &str) -> Result<Vec<LogEntry>> {
        (**self).log_range(base, head)
    }

    fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        (**self).changed_files(hash)
    }
}

impl<R: Repository + ?Sized> Repository for Box<R> {
    fn resolve_ref(&self, rev: &str) -> Result<String> {
        (**self).resolve_ref(rev)
    }

    fn try_resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        (**self).try_resolve_ref(rev)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        (**self).merge_base(a, b)
    }

    fn log_range(&self, base: &str, head: &str) -> Result<Vec<LogEntry>> {
        (**self).log_range(base, head)
    }

    fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        (**self).changed_files(hash)
    }
}

/// Open the repository at `path` with the configured backend
pub fn open(path: &Path, backend: Backend) -> Result<Box<dyn Repository>> {
    Ok(match backend {
        Backend::Git => Box::new(GitCommand::new(path)),
        Backend::Libgit2 => Box::new(Git2Repository::open(path)?),
    })
}
