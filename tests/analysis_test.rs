// tests/analysis_test.rs
mod common;

use chrono::NaiveDate;
use common::{merged_feature_branch, TestRepo, NESTED_CONFIG, NESTED_MANIFEST};
use merge_release::analyzer::{self, ReleaseCalculator};
use merge_release::apply::{self, apply_on};
use merge_release::boundary::BoundaryWarning;
use merge_release::config::{Backend, Config};
use merge_release::domain::{BumpRules, BumpType};
use merge_release::git;

fn calculator() -> ReleaseCalculator {
    ReleaseCalculator::new(BumpRules::default(), true)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn test_merge_releases_nested_packages() {
    let (repo, _) = merged_feature_branch();
    repo.write_release_config(NESTED_CONFIG, NESTED_MANIFEST);
    let config = Config::load(repo.path()).unwrap();

    for backend in [Backend::Git, Backend::Libgit2] {
        let oracle = git::open(repo.path(), backend).unwrap();
        let result = analyzer::analyze(&oracle, &config, &calculator()).unwrap();

        assert!(result.merge_info.is_merge);
        assert_eq!(result.commits.len(), 3);

        let releases: Vec<(&str, BumpType, String)> = result
            .releases
            .iter()
            .map(|r| {
                (
                    r.package.component.as_str(),
                    r.bump_type,
                    r.new_version.to_string(),
                )
            })
            .collect();

        // The main-line api fix is not part of the merge
        assert_eq!(
            releases,
            vec![
                ("jarvis", BumpType::Minor, "0.1.1".to_string()),
                ("jarvis-web", BumpType::Patch, "1.4.1".to_string()),
            ]
        );
        assert_eq!(result.stats.matched_commits, 3);
    }
}

#[test]
fn test_linked_group_released_together() {
    let repo = TestRepo::new();
    repo.commit_on_head("chore: init", &["README.md"]);
    repo.commit_on_head("feat(web): dark mode", &["apps/web/theme.css"]);
    repo.write_release_config(
        r#"{
  "packages": {
    "apps/web": { "component": "web" },
    "apps/mobile": { "component": "mobile" }
  },
  "plugins": [
    { "type": "linked-versions", "groupName": "apps", "components": ["web", "mobile"] }
  ]
}"#,
        r#"{ "apps/web": "1.0.0", "apps/mobile": "1.0.0" }"#,
    );
    let config = Config::load(repo.path()).unwrap();

    let oracle = git::open(repo.path(), Backend::Libgit2).unwrap();
    let result = analyzer::analyze(&oracle, &config, &calculator()).unwrap();

    assert_eq!(result.releases.len(), 2);
    assert!(result
        .releases
        .iter()
        .all(|r| r.new_version.to_string() == "1.1.0"));
    let mobile = &result.releases[0];
    assert_eq!(mobile.package.component, "mobile");
    assert!(mobile.linked_bump());
}

#[test]
fn test_single_commit_repository_produces_no_releases() {
    let repo = TestRepo::new();
    repo.commit_on_head("feat(api): first", &["services/api/main.go"]);
    repo.write_release_config(NESTED_CONFIG, NESTED_MANIFEST);
    let config = Config::load(repo.path()).unwrap();

    let oracle = git::open(repo.path(), Backend::Git).unwrap();
    let result = analyzer::analyze(&oracle, &config, &calculator()).unwrap();

    assert!(result.releases.is_empty());
    assert!(matches!(
        result.warnings.as_slice(),
        [BoundaryWarning::NoCommits { .. }]
    ));
}

#[test]
fn test_apply_writes_versions_changelogs_and_manifest() {
    let (repo, _) = merged_feature_branch();
    repo.write_release_config(NESTED_CONFIG, NESTED_MANIFEST);
    repo.write("workloads/jarvis/VERSION", "0.1.0 # x-release-please-version\n");
    repo.write(
        "workloads/jarvis/CHANGELOG.md",
        "# Changelog\n\n## [0.1.0](old) (2024-01-01)\n\n* first\n",
    );
    let config = Config::load(repo.path()).unwrap();

    let oracle = git::open(repo.path(), Backend::Libgit2).unwrap();
    let result = analyzer::analyze(&oracle, &config, &calculator()).unwrap();
    let summary = apply_on(
        &result,
        &config,
        Some("https://github.com/acme/mono"),
        false,
        date(),
    )
    .unwrap();
    assert_eq!(summary.version_files.len(), 2);
    assert_eq!(summary.changelogs.len(), 2);

    assert_eq!(
        repo.read("workloads/jarvis/VERSION"),
        "0.1.1 # x-release-please-version\n"
    );
    assert_eq!(repo.read("workloads/jarvis/clients/web/VERSION"), "1.4.1\n");

    let changelog = repo.read("workloads/jarvis/CHANGELOG.md");
    assert!(changelog.starts_with(
        "# Changelog\n\n## [0.1.1](https://github.com/acme/mono/compare/jarvis-v0.1.0...jarvis-v0.1.1) (2024-06-01)\n\n### Features\n\n* **jarvis:** voice"
    ));
    assert!(changelog.ends_with("## [0.1.0](old) (2024-01-01)\n\n* first\n"));

    let web_changelog = repo.read("workloads/jarvis/clients/web/CHANGELOG.md");
    assert!(web_changelog.starts_with(apply_initial_header()));
    assert!(web_changelog.contains("### Bug Fixes\n\n* **jarvis-web:** layout"));

    // Key order of the manifest is kept
    let manifest = repo.read("release-please-manifest.json");
    let jarvis = manifest.find("\"workloads/jarvis\"").unwrap();
    let api = manifest.find("\"services/api\"").unwrap();
    let web = manifest.find("\"workloads/jarvis/clients/web\"").unwrap();
    assert!(jarvis < api && api < web);
    let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(parsed["workloads/jarvis"], "0.1.1");
    assert_eq!(parsed["workloads/jarvis/clients/web"], "1.4.1");
    assert_eq!(parsed["services/api"], "2.3.1");
}

fn apply_initial_header() -> &'static str {
    merge_release::changelog::INITIAL_CHANGELOG
}

#[test]
fn test_linked_bump_gets_version_but_no_changelog() {
    let repo = TestRepo::new();
    repo.commit_on_head("chore: init", &["README.md"]);
    repo.commit_on_head("fix(web): focus ring", &["apps/web/a.css"]);
    repo.write_release_config(
        r#"{
  "packages": { "apps/web": { "component": "web" }, "apps/mobile": { "component": "mobile" } },
  "plugins": [{ "type": "linked-versions", "groupName": "apps", "components": ["web", "mobile"] }]
}"#,
        r#"{ "apps/web": "2.0.0", "apps/mobile": "2.0.0" }"#,
    );
    let config = Config::load(repo.path()).unwrap();

    let oracle = git::open(repo.path(), Backend::Git).unwrap();
    let result = analyzer::analyze(&oracle, &config, &calculator()).unwrap();
    apply_on(&result, &config, None, false, date()).unwrap();

    assert_eq!(repo.read("apps/mobile/VERSION"), "2.0.1\n");
    assert!(!repo.path().join("apps/mobile/CHANGELOG.md").exists());
    assert!(repo.path().join("apps/web/CHANGELOG.md").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let (repo, _) = merged_feature_branch();
    repo.write_release_config(NESTED_CONFIG, NESTED_MANIFEST);
    let config = Config::load(repo.path()).unwrap();

    let oracle = git::open(repo.path(), Backend::Libgit2).unwrap();
    let result = analyzer::analyze(&oracle, &config, &calculator()).unwrap();
    let summary = apply::apply(&result, &config, None, true).unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.version_files.len(), 2);
    assert!(!repo.path().join("workloads/jarvis/VERSION").exists());
    assert_eq!(repo.read("release-please-manifest.json"), NESTED_MANIFEST);
}
