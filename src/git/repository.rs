use crate::error::{ReleaseError, Result};
use crate::git::{LogEntry, Repository};
use git2::{ErrorCode, Oid, Repository as Git2Repo, Sort};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    fn commit_oid(&self, query: &str, rev: &str) -> Result<Oid> {
        self.repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| ReleaseError::oracle(query, &[rev], e.message()))
    }
}

impl Repository for Git2Repository {
    fn try_resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        debug!(rev, "resolving revision via libgit2");
        match self
            .repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
        {
            Ok(commit) => Ok(Some(commit.id().to_string())),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {
                debug!(rev, "revision does not exist");
                Ok(None)
            }
            Err(e) => Err(ReleaseError::oracle("rev-parse", &[rev], e.message())),
        }
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        debug!(a, b, "computing merge base via libgit2");
        let a_oid = self.commit_oid("merge-base", a)?;
        let b_oid = self.commit_oid("merge-base", b)?;

        self.repo
            .merge_base(a_oid, b_oid)
            .map(|oid| oid.to_string())
            .map_err(|e| ReleaseError::oracle("merge-base", &[a, b], e.message()))
    }

    fn log_range(&self, base: &str, head: &str) -> Result<Vec<LogEntry>> {
        debug!(base, head, "walking commit range via libgit2");
        let base_oid = self.commit_oid("log", base)?;
        let head_oid = self.commit_oid("log", head)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        revwalk.push(head_oid)?;
        revwalk.hide(base_oid)?;

        let mut entries = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let subject = commit.summary().unwrap_or_default().to_string();
            entries.push(LogEntry::new(oid.to_string(), subject));
        }

        Ok(entries)
    }

    fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        let oid = self.commit_oid("diff-tree", hash)?;
        let commit = self.repo.find_commit(oid)?;

        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }

        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                files.push(path.to_string_lossy().replace('\\', "/"));
            }
        }

        Ok(files)
    }
}

