// Shared helpers for building throwaway repositories
#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        let repo = Repository::init(dir.path()).expect("Could not init git repo");
        {
            let mut config = repo.config().expect("Could not get config");
            config
                .set_str("user.name", "Test User")
                .expect("Could not set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Could not set user.email");
        }
        TestRepo { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit `files` on top of `parents[0]`'s tree without moving any ref.
    /// Each file's content is derived from the message, so it always changes.
    pub fn commit(&self, parents: &[Oid], message: &str, files: &[&str]) -> Oid {
        self.commit_with_ref(None, parents, message, files)
    }

    /// Commit `files` on the current HEAD and advance it
    pub fn commit_on_head(&self, message: &str, files: &[&str]) -> Oid {
        let parents: Vec<Oid> = self.head().into_iter().collect();
        self.commit_with_ref(Some("HEAD"), &parents, message, files)
    }

    /// Merge `theirs` into HEAD with a merge commit and advance HEAD
    pub fn merge_into_head(&self, theirs: Oid, message: &str) -> Oid {
        let ours = self.head().expect("HEAD must exist before merging");
        let ours_commit = self.repo.find_commit(ours).unwrap();
        let theirs_commit = self.repo.find_commit(theirs).unwrap();

        let mut index = self
            .repo
            .merge_commits(&ours_commit, &theirs_commit, None)
            .expect("Could not merge");
        assert!(!index.has_conflicts(), "test merge must be conflict free");
        let tree_id = index.write_tree_to(&self.repo).unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = signature();
        self.repo
            .commit(
                Some("HEAD"),
                &sig,
                &sig,
                message,
                &tree,
                &[&ours_commit, &theirs_commit],
            )
            .expect("Could not create merge commit")
    }

    pub fn head(&self) -> Option<Oid> {
        self.repo.head().ok().and_then(|h| h.target())
    }

    /// Write a file into the working tree without committing it
    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.path().join(path)).unwrap()
    }

    /// Write the release configuration and manifest into the working tree
    pub fn write_release_config(&self, config: &str, manifest: &str) {
        self.write("release-please-config.json", config);
        self.write("release-please-manifest.json", manifest);
    }

    fn commit_with_ref(
        &self,
        update_ref: Option<&str>,
        parents: &[Oid],
        message: &str,
        files: &[&str],
    ) -> Oid {
        let parent_commits: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect();

        let mut index = self.repo.index().expect("Could not get index");
        match parent_commits.first() {
            Some(parent) => index.read_tree(&parent.tree().unwrap()).unwrap(),
            None => index.clear().unwrap(),
        }
        for file in files {
            self.write(file, &format!("{}\n{}\n", file, message));
            index
                .add_path(Path::new(file))
                .expect("Could not add file to index");
        }
        let tree_id = index.write_tree().expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = signature();
        let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();
        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
            .expect("Could not create commit")
    }
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Repository with a feature branch merged into main:
///
/// ```text
/// base ── main-1 ───────────── merge (HEAD)
///    \                        /
///     feat-1 ── feat-2 ── feat-3
/// ```
///
/// Returns the repository and the branch commits, oldest first.
pub fn merged_feature_branch() -> (TestRepo, Vec<Oid>) {
    let repo = TestRepo::new();
    let base = repo.commit_on_head("chore: initial layout", &["README.md"]);
    repo.commit_on_head("fix(api): main-line fix", &["services/api/server.go"]);

    let feat_1 = repo.commit(&[base], "chore(jarvis): tidy", &["workloads/jarvis/Makefile"]);
    let feat_2 = repo.commit(
        &[feat_1],
        "fix(jarvis-web): layout",
        &["workloads/jarvis/clients/web/app.tsx"],
    );
    let feat_3 = repo.commit(
        &[feat_2],
        "feat(jarvis): voice",
        &["workloads/jarvis/clients/android/Main.kt"],
    );
    repo.merge_into_head(feat_3, "Merge pull request #7 from acme/voice");

    (repo, vec![feat_1, feat_2, feat_3])
}

pub const NESTED_CONFIG: &str = r#"{
  "packages": {
    "workloads/jarvis": { "component": "jarvis" },
    "workloads/jarvis/clients/web": { "component": "jarvis-web" },
    "services/api": { "component": "api", "changelog-path": "docs/CHANGELOG.md" }
  }
}"#;

pub const NESTED_MANIFEST: &str = r#"{
  "workloads/jarvis": "0.1.0",
  "services/api": "2.3.1",
  "workloads/jarvis/clients/web": "1.4.0"
}"#;
