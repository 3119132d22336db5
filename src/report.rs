//! Machine-readable summaries of an analysis run for CI consumers.
//!
//! [`ReleaseReport`] describes what is being released; [`AnalysisInput`]
//! records what the decision was based on, for auditing.

use crate::analyzer::{AnalysisResult, PackageRelease};
use crate::config::Config;
use crate::domain::{BumpType, Commit};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReleaseReport {
    pub releases: Vec<ComponentRelease>,
    /// Released component names, in release order
    pub components: Vec<String>,
    pub summary: ReleaseSummary,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComponentRelease {
    pub component: String,
    pub path: String,
    pub old_version: String,
    pub new_version: String,
    pub bump_type: BumpType,
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_url: Option<String>,
    /// Released only because a linked sibling was
    pub linked_bump: bool,
    pub commits: Vec<CommitInfo>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub description: String,
    pub breaking: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReleaseSummary {
    pub total_releases: usize,
    pub total_commits: usize,
    pub by_bump_type: BumpTypeCounts,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BumpTypeCounts {
    pub major: usize,
    pub minor: usize,
    pub patch: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisInput {
    pub git: GitInfo,
    pub commits_analyzed: Vec<AnalyzedCommit>,
    pub config: ConfigSummary,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GitInfo {
    pub head_sha: String,
    pub is_merge_commit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_head: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyzedCommit {
    pub sha: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub breaking: bool,
    pub files_changed: Vec<String>,
    /// Components owning at least one changed file, first match first
    pub packages_matched: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigSummary {
    /// Package path -> component
    pub packages: BTreeMap<String, String>,
    /// Group name -> components
    pub linked_groups: BTreeMap<String, Vec<String>>,
}

impl ReleaseReport {
    /// Summarize the planned releases. With `repo_url`, each entry links to
    /// the hosted release page of its tag.
    pub fn build(result: &AnalysisResult, repo_url: Option<&str>) -> Self {
        let mut summary = ReleaseSummary {
            total_releases: result.releases.len(),
            total_commits: result.commits.len(),
            ..Default::default()
        };

        for release in &result.releases {
            match release.bump_type {
                BumpType::Major => summary.by_bump_type.major += 1,
                BumpType::Minor => summary.by_bump_type.minor += 1,
                BumpType::Patch => summary.by_bump_type.patch += 1,
                BumpType::None => {}
            }
        }

        ReleaseReport {
            releases: result
                .releases
                .iter()
                .map(|r| ComponentRelease::build(r, repo_url))
                .collect(),
            components: result
                .releases
                .iter()
                .map(|r| r.package.component.clone())
                .collect(),
            summary,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ComponentRelease {
    fn build(release: &PackageRelease, repo_url: Option<&str>) -> Self {
        let tag_name = release.tag_name();
        ComponentRelease {
            component: release.package.component.clone(),
            path: release.package.path.clone(),
            old_version: release.old_version.to_string(),
            new_version: release.new_version.to_string(),
            bump_type: release.bump_type,
            release_url: repo_url.map(|url| release_url(url, &tag_name)),
            tag_name,
            linked_bump: release.linked_bump(),
            commits: release.commits.iter().map(CommitInfo::from).collect(),
        }
    }
}

impl From<&Commit> for CommitInfo {
    fn from(commit: &Commit) -> Self {
        CommitInfo {
            sha: commit.hash.clone(),
            r#type: commit.r#type.clone(),
            scope: commit.scope.clone(),
            description: commit.description.clone(),
            breaking: commit.is_breaking,
        }
    }
}

impl AnalysisInput {
    pub fn build(result: &AnalysisResult, config: &Config) -> Self {
        let info = &result.merge_info;
        AnalysisInput {
            git: GitInfo {
                head_sha: info.head_sha.clone(),
                is_merge_commit: info.is_merge,
                merge_base: info.merge_base.clone(),
                merge_head: info.merge_head.clone(),
            },
            commits_analyzed: result
                .commits
                .iter()
                .map(|c| AnalyzedCommit {
                    sha: c.hash.clone(),
                    message: c.message(),
                    r#type: c.is_conventional().then(|| c.r#type.clone()),
                    scope: c.scope.clone(),
                    breaking: c.is_breaking,
                    files_changed: c.files.clone(),
                    packages_matched: matching_components(config, &c.files),
                })
                .collect(),
            config: ConfigSummary {
                packages: config
                    .packages
                    .iter()
                    .map(|(path, p)| (path.clone(), p.component.clone()))
                    .collect(),
                linked_groups: config.linked_groups.clone(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Hosted release page for a tag
pub fn release_url(repo_url: &str, tag_name: &str) -> String {
    format!("{}/releases/tag/{}", repo_url.trim_end_matches('/'), tag_name)
}

fn matching_components(config: &Config, files: &[String]) -> Vec<String> {
    let mut components: Vec<String> = Vec::new();
    for file in files {
        if let Some(package) = config.find_package_for_path(file) {
            if !components.contains(&package.component) {
                components.push(package.component.clone());
            }
        }
    }
    components
}
