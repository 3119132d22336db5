//! Pure formatting functions for UI output.
//!
//! Styling goes through `console`, which drops colors when the stream is
//! not a terminal.

use crate::analyzer::{AnalysisStats, PackageRelease};
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::Commit;
use crate::git::MergeInfo;
use console::style;

/// Commits listed before the rest is summarized
const MAX_LISTED_COMMITS: usize = 10;
/// Subject width in the commit listing
const MAX_SUBJECT_LEN: usize = 60;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Describe HEAD: either a plain commit or a merge with its range.
pub fn format_merge_info(info: &MergeInfo) -> String {
    match info.merge_range() {
        Some((base, head)) => format!(
            "HEAD {} is a merge; analyzing {}..{}",
            short(&info.head_sha),
            short(base),
            short(head)
        ),
        None => format!(
            "HEAD {} is not a merge; analyzing HEAD~1..HEAD",
            short(&info.head_sha)
        ),
    }
}

pub fn display_merge_info(info: &MergeInfo) {
    println!("\n{}", style("Analyzing HEAD").bold());
    println!("  {}", format_merge_info(info));
}

/// Display the commits under analysis, up to ten of them.
pub fn display_commit_analysis(commits: &[Commit]) {
    println!(
        "\n{}",
        style(format!("{} commit(s) analyzed:", commits.len())).underlined()
    );

    for (i, commit) in commits.iter().take(MAX_LISTED_COMMITS).enumerate() {
        let message = commit.message();
        let short_msg: String = message.chars().take(MAX_SUBJECT_LEN).collect();
        println!("  {}. {} {}", i + 1, style(&commit.short_hash).dim(), short_msg);
    }

    if commits.len() > MAX_LISTED_COMMITS {
        println!("  ... and {} more commits", commits.len() - MAX_LISTED_COMMITS);
    }
}

/// One release as `component: old -> new (bump)`, flagged when the bump
/// only came from a linked sibling.
pub fn format_release_line(release: &PackageRelease) -> String {
    let mut line = format!(
        "{}: {} -> {} ({})",
        release.package.component, release.old_version, release.new_version, release.bump_type
    );
    if release.linked_bump() {
        line.push_str(" [linked]");
    }
    line
}

pub fn display_releases(releases: &[PackageRelease]) {
    if releases.is_empty() {
        println!("\n{}", style("No releases needed").bold());
        return;
    }

    println!("\n{}", style("Planned releases:").bold());
    for release in releases {
        println!("  {}", style(format_release_line(release)).green());
    }
}

pub fn format_stats(stats: &AnalysisStats) -> String {
    format!(
        "{} commit(s): {} matched a package, {} did not",
        stats.total_commits, stats.matched_commits, stats.unmatched_commits
    )
}

pub fn display_stats(stats: &AnalysisStats) {
    println!("\n  {}", style(format_stats(stats)).dim());
}

/// Per-commit attribution: a header line per commit followed by one line
/// per changed file naming the owning component.
pub fn format_commit_breakdown(commits: &[Commit], config: &Config) -> Vec<String> {
    let mut lines = Vec::new();
    for commit in commits {
        let kind = match (commit.is_conventional(), &commit.scope) {
            (false, _) => "non-conventional".to_string(),
            (true, Some(scope)) => format!("{}({})", commit.r#type, scope),
            (true, None) => commit.r#type.clone(),
        };
        lines.push(format!("{} {}: {}", commit.short_hash, kind, commit.description));

        for file in &commit.files {
            let owner = config
                .find_package_for_path(file)
                .map_or("(no package)", |p| p.component.as_str());
            lines.push(format!("       {} → {}", file, owner));
        }
    }
    lines
}

/// Verbose attribution details: directories no package owns, then the
/// per-commit breakdown.
pub fn display_attribution_details(commits: &[Commit], stats: &AnalysisStats, config: &Config) {
    if !stats.orphaned_dirs.is_empty() {
        println!(
            "\n{}",
            style("Unmatched directories (consider adding to config):").bold()
        );
        for dir in &stats.orphaned_dirs {
            println!("  {}/", dir);
        }
    }

    if !commits.is_empty() {
        println!("\n{}", style("Commit details:").bold());
        for line in format_commit_breakdown(commits, config) {
            println!("  {}", line);
        }
    }
}

fn short(hash: &str) -> &str {
    hash.get(..crate::domain::commit::SHORT_HASH_LEN).unwrap_or(hash)
}
