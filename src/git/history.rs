//! Merge-aware history traversal.
//!
//! A chronological log of the trunk loses commits that arrived through a
//! non-fast-forward merge. For a merge head the range is instead taken from
//! the merge base of both parents up to the tip of the merged-in branch, so
//! every commit introduced by the merge is seen exactly once.

use crate::domain::Commit;
use crate::error::Result;
use crate::git::Repository;
use tracing::debug;

/// Classification of HEAD, computed once per analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInfo {
    pub is_merge: bool,
    pub head_sha: String,
    /// Common ancestor of the two parents (merge heads only)
    pub merge_base: Option<String>,
    /// Tip of the merged-in branch, i.e. the second parent (merge heads only)
    pub merge_head: Option<String>,
}

impl MergeInfo {
    pub fn non_merge(head_sha: impl Into<String>) -> Self {
        MergeInfo {
            is_merge: false,
            head_sha: head_sha.into(),
            merge_base: None,
            merge_head: None,
        }
    }

    pub fn merge(
        head_sha: impl Into<String>,
        merge_base: impl Into<String>,
        merge_head: impl Into<String>,
    ) -> Self {
        MergeInfo {
            is_merge: true,
            head_sha: head_sha.into(),
            merge_base: Some(merge_base.into()),
            merge_head: Some(merge_head.into()),
        }
    }

    /// The `(base, head)` pair to traverse for a merge head
    pub fn merge_range(&self) -> Option<(&str, &str)> {
        match (&self.merge_base, &self.merge_head) {
            (Some(base), Some(head)) if self.is_merge => Some((base.as_str(), head.as_str())),
            _ => None,
        }
    }
}

/// Determine whether HEAD is a merge commit.
///
/// A missing second parent is the ordinary non-merge case, not an error.
/// For a merge, the merge base of the first and second parent is the lower
/// bound for traversal.
pub fn analyze_head<R: Repository + ?Sized>(repo: &R) -> Result<MergeInfo> {
    let head_sha = repo.resolve_ref("HEAD")?;

    let Some(merge_head) = repo.try_resolve_ref("HEAD^2")? else {
        debug!(head = %head_sha, "HEAD is not a merge commit");
        return Ok(MergeInfo::non_merge(head_sha));
    };

    let first_parent = repo.resolve_ref("HEAD^1")?;
    let merge_base = repo.merge_base(&first_parent, &merge_head)?;

    debug!(
        head = %head_sha,
        merge_base = %merge_base,
        merge_head = %merge_head,
        "HEAD is a merge commit"
    );
    Ok(MergeInfo::merge(head_sha, merge_base, merge_head))
}

/// All commits in `base..head`, oldest first, each with its changed files.
pub fn commits_in_range<R: Repository + ?Sized>(
    repo: &R,
    base: &str,
    head: &str,
) -> Result<Vec<Commit>> {
    let entries = repo.log_range(base, head)?;
    debug!(base, head, count = entries.len(), "listing commits in range");

    entries
        .into_iter()
        .map(|entry| {
            let files = repo.changed_files(&entry.hash)?;
            Ok(Commit::parse(&entry.hash, &entry.subject).with_files(files))
        })
        .collect()
}

/// Commits introduced by HEAD.
///
/// A merge head yields the commits of the merged-in branch
/// (`merge_base..merge_head`); the merge commit itself is not included.
/// Any other head yields `HEAD~1..HEAD`, or nothing when HEAD is the root
/// commit.
pub fn commits_for_head<R: Repository + ?Sized>(repo: &R, info: &MergeInfo) -> Result<Vec<Commit>> {
    if let Some((base, merge_head)) = info.merge_range() {
        return commits_in_range(repo, base, merge_head);
    }

    match repo.try_resolve_ref("HEAD~1")? {
        Some(previous) => commits_in_range(repo, &previous, &info.head_sha),
        None => {
            debug!(head = %info.head_sha, "HEAD has no parent; nothing to analyze");
            Ok(Vec::new())
        }
    }
}
