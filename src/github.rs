//! Hosted release creation through the `gh` CLI.

use crate::analyzer::{AnalysisResult, PackageRelease};
use crate::changelog;
use crate::domain::Commit;
use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A release to publish on the hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedRelease {
    pub tag_name: String,
    pub title: String,
    pub notes: String,
    /// Commit the tag is created on
    pub target: Option<String>,
}

/// Build the hosted release for one planned package release
pub fn build_release(release: &PackageRelease, repo_url: Option<&str>) -> HostedRelease {
    HostedRelease {
        tag_name: release.tag_name(),
        title: format!("{} v{}", release.package.component, release.new_version),
        notes: build_release_notes(release, repo_url),
        target: None,
    }
}

/// Markdown notes: a title, one section per change kind and a link to the
/// full comparison when a repository URL is known.
pub fn build_release_notes(release: &PackageRelease, repo_url: Option<&str>) -> String {
    let mut notes = String::new();
    let component = &release.package.component;
    notes.push_str(&format!("## {} v{}\n\n", component, release.new_version));

    for (commit_type, title) in [
        ("feat", "Features"),
        ("fix", "Bug Fixes"),
        ("perf", "Performance Improvements"),
    ] {
        let commits: Vec<&Commit> = release
            .commits
            .iter()
            .filter(|c| c.r#type == commit_type)
            .collect();
        if commits.is_empty() {
            continue;
        }
        notes.push_str(&format!("### {}\n\n", title));
        for commit in commits {
            let link = commit_link(commit, repo_url);
            notes.push_str(&format!("* {} ({})\n", commit.description, link));
        }
        notes.push('\n');
    }

    if let Some(url) = changelog::compare_url(
        repo_url,
        component,
        &release.old_version.to_string(),
        &release.new_version.to_string(),
    ) {
        notes.push_str(&format!("**Full Changelog**: {}\n", url));
    }

    notes
}

fn commit_link(commit: &Commit, repo_url: Option<&str>) -> String {
    match repo_url {
        Some(url) => format!(
            "[{}]({}/commit/{})",
            commit.short_hash,
            url.trim_end_matches('/'),
            commit.hash
        ),
        None => commit.short_hash.clone(),
    }
}

/// Publishes releases by running `gh release create` in the repository.
#[derive(Debug, Clone)]
pub struct GhCli {
    root: PathBuf,
    program: String,
}

impl GhCli {
    pub fn new(root: impl AsRef<Path>) -> Self {
        GhCli {
            root: root.as_ref().to_path_buf(),
            program: "gh".to_string(),
        }
    }

    /// Use a specific client binary instead of `gh`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to the client for `release`
    pub fn create_args(release: &HostedRelease) -> Vec<String> {
        let mut args = vec![
            "release".to_string(),
            "create".to_string(),
            release.tag_name.clone(),
            "--title".to_string(),
            release.title.clone(),
            "--notes".to_string(),
            release.notes.clone(),
        ];
        if let Some(target) = &release.target {
            args.push("--target".to_string());
            args.push(target.clone());
        }
        args
    }

    pub fn create(&self, release: &HostedRelease) -> Result<()> {
        debug!(tag = %release.tag_name, program = %self.program, "creating hosted release");
        let output = Command::new(&self.program)
            .args(Self::create_args(release))
            .current_dir(&self.root)
            .output()
            .map_err(|e| {
                ReleaseError::release(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::release(format!(
                "{} release create {} failed with exit code {}: {}",
                self.program,
                release.tag_name,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Hosted releases created by one run, and the failure that stopped it
#[derive(Debug)]
pub struct PublishOutcome {
    pub created: Vec<HostedRelease>,
    pub failure: Option<ReleaseError>,
}

/// Create a hosted release per planned release, targeting HEAD.
///
/// Stops at the first failure. Releases created before it stay created and
/// are returned alongside the error.
pub fn create_releases(
    result: &AnalysisResult,
    publisher: &GhCli,
    repo_url: Option<&str>,
) -> PublishOutcome {
    let mut created = Vec::with_capacity(result.releases.len());
    for release in &result.releases {
        let mut hosted = build_release(release, repo_url);
        hosted.target = Some(result.merge_info.head_sha.clone());

        if let Err(e) = publisher.create(&hosted) {
            return PublishOutcome {
                created,
                failure: Some(ReleaseError::release(format!(
                    "failed to create release for {}: {}",
                    release.package.component, e
                ))),
            };
        }
        info!(tag = %hosted.tag_name, "created hosted release");
        created.push(hosted);
    }

    PublishOutcome {
        created,
        failure: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisStats;
    use crate::config::Package;
    use crate::domain::{BumpType, Version};
    use crate::git::MergeInfo;

    const REPO: &str = "https://github.com/acme/mono";

    fn release() -> PackageRelease {
        PackageRelease {
            package: Package::new("services/api", "api"),
            bump_type: BumpType::Minor,
            old_version: Version::new(1, 2, 0),
            new_version: Version::new(1, 3, 0),
            commits: vec![
                Commit::parse("1111111aaaa", "feat(api): add search"),
                Commit::parse("2222222bbbb", "fix: null body"),
                Commit::parse("3333333cccc", "docs: examples"),
            ],
        }
    }

    #[test]
    fn test_build_release() {
        let hosted = build_release(&release(), Some(REPO));
        assert_eq!(hosted.tag_name, "api-v1.3.0");
        assert_eq!(hosted.title, "api v1.3.0");
        assert_eq!(hosted.target, None);
    }

    #[test]
    fn test_release_notes_with_repo_url() {
        let notes = build_release_notes(&release(), Some(REPO));
        assert_eq!(
            notes,
            "## api v1.3.0\n\n\
             ### Features\n\n\
             * add search ([1111111](https://github.com/acme/mono/commit/1111111aaaa))\n\n\
             ### Bug Fixes\n\n\
             * null body ([2222222](https://github.com/acme/mono/commit/2222222bbbb))\n\n\
             **Full Changelog**: https://github.com/acme/mono/compare/api-v1.2.0...api-v1.3.0\n"
        );
    }

    #[test]
    fn test_release_notes_without_repo_url() {
        let notes = build_release_notes(&release(), None);
        assert!(notes.contains("* add search (1111111)\n"));
        assert!(!notes.contains("Full Changelog"));
        assert!(!notes.contains("examples"));
    }

    #[test]
    fn test_create_args_include_target() {
        let mut hosted = build_release(&release(), None);
        hosted.target = Some("abc".to_string());
        let args = GhCli::create_args(&hosted);
        assert_eq!(&args[..3], &["release", "create", "api-v1.3.0"]);
        assert_eq!(&args[args.len() - 2..], &["--target", "abc"]);
    }

    fn analysis(releases: Vec<PackageRelease>) -> AnalysisResult {
        AnalysisResult {
            merge_info: MergeInfo::non_merge("0123456789abcdef"),
            commits: vec![],
            releases,
            stats: AnalysisStats::default(),
            warnings: vec![],
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_create_releases_keeps_partial_progress() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-gh");
        std::fs::write(
            &script,
            "#!/bin/sh\ncase \"$3\" in\n  web-*) echo 'HTTP 403' >&2; exit 1 ;;\nesac\nexit 0\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut web = release();
        web.package = Package::new("apps/web", "web");
        let mut worker = release();
        worker.package = Package::new("apps/worker", "worker");
        let result = analysis(vec![release(), web, worker]);

        let publisher = GhCli::new(dir.path()).with_program(script.to_string_lossy());
        let outcome = create_releases(&result, &publisher, None);

        let tags: Vec<&str> = outcome.created.iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["api-v1.3.0"]);
        assert_eq!(outcome.created[0].target.as_deref(), Some("0123456789abcdef"));
        let failure = outcome.failure.unwrap().to_string();
        assert!(failure.contains("web"));
        assert!(failure.contains("HTTP 403"));
    }

    #[test]
    fn test_create_releases_with_nothing_planned() {
        let publisher = GhCli::new(".").with_program("definitely-not-gh-5c1e");
        let outcome = create_releases(&analysis(vec![]), &publisher, None);
        assert!(outcome.created.is_empty());
        assert!(outcome.failure.is_none());
    }

    #[test]
    fn test_create_with_missing_client_fails() {
        let publisher = GhCli::new(".").with_program("definitely-not-gh-5c1e");
        let err = publisher.create(&build_release(&release(), None)).unwrap_err();
        assert!(err.to_string().contains("definitely-not-gh-5c1e"));
    }
}
