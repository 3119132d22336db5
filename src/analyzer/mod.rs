//! Analysis engine: classify HEAD, collect the commits it introduced and
//! turn them into per-package releases.

pub mod release_calculator;

pub use release_calculator::{attribute_commits, PackageRelease, ReleaseCalculator, ReleasePlan};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::Commit;
use crate::error::Result;
use crate::git::{history, MergeInfo, Repository};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Commit and file attribution counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub total_commits: usize,
    /// Commits with at least one file owned by a package
    pub matched_commits: usize,
    pub unmatched_commits: usize,
    /// Changed files owned by no package
    pub unmatched_files: usize,
    /// Parent directories of unmatched files, sorted and deduplicated.
    /// Files at the repository root are not listed.
    pub orphaned_dirs: Vec<String>,
}

impl AnalysisStats {
    pub fn collect(config: &Config, commits: &[Commit]) -> Self {
        let mut stats = AnalysisStats {
            total_commits: commits.len(),
            ..Default::default()
        };
        let mut orphaned = BTreeSet::new();

        for commit in commits {
            let mut matched = false;
            for file in &commit.files {
                if config.find_package_for_path(file).is_some() {
                    matched = true;
                    continue;
                }
                stats.unmatched_files += 1;
                if let Some((dir, _)) = file.rsplit_once('/') {
                    orphaned.insert(dir.to_string());
                }
            }
            if matched {
                stats.matched_commits += 1;
            } else {
                stats.unmatched_commits += 1;
            }
        }

        stats.orphaned_dirs = orphaned.into_iter().collect();
        stats
    }
}

/// Everything computed for one HEAD
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub merge_info: MergeInfo,
    /// Commits introduced by HEAD, oldest first
    pub commits: Vec<Commit>,
    /// Sorted by package path
    pub releases: Vec<PackageRelease>,
    pub stats: AnalysisStats,
    pub warnings: Vec<BoundaryWarning>,
}

impl AnalysisResult {
    pub fn has_releases(&self) -> bool {
        !self.releases.is_empty()
    }
}

/// Analyze HEAD of `repo` against `config`.
///
/// Oracle failures abort the run. Conditions that only degrade the result
/// (no parent commit, invalid stored versions, files outside every package)
/// are returned as warnings.
pub fn analyze<R: Repository + ?Sized>(
    repo: &R,
    config: &Config,
    calculator: &ReleaseCalculator,
) -> Result<AnalysisResult> {
    let merge_info = history::analyze_head(repo)?;
    let commits = history::commits_for_head(repo, &merge_info)?;
    info!(
        merge = merge_info.is_merge,
        commits = commits.len(),
        "collected commits for HEAD"
    );

    let mut warnings = Vec::new();
    if commits.is_empty() {
        warnings.push(BoundaryWarning::NoCommits {
            head_sha: merge_info.head_sha.clone(),
        });
    }

    let stats = AnalysisStats::collect(config, &commits);
    debug!(?stats, "attribution stats");
    if stats.unmatched_files > 0 {
        warnings.push(BoundaryWarning::UnmatchedFiles {
            count: stats.unmatched_files,
            dirs: stats.orphaned_dirs.clone(),
        });
    }

    let plan = calculator.calculate(config, &commits);
    warnings.extend(plan.warnings);
    info!(releases = plan.releases.len(), "release calculation complete");

    Ok(AnalysisResult {
        merge_info,
        commits,
        releases: plan.releases,
        stats,
        warnings,
    })
}
