//! CHANGELOG.md entries in the conventional-changelog layout.

use crate::domain::{Commit, Tag};
use chrono::NaiveDate;

/// Content of a freshly created changelog
pub const INITIAL_CHANGELOG: &str =
    "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n";

/// One version's worth of changes
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub version: String,
    pub date: NaiveDate,
    pub compare_url: Option<String>,
    pub commits: &'a [Commit],
    /// Base URL used to link each commit
    pub repo_url: Option<String>,
}

/// Render an entry: a version header followed by one section per change
/// kind. Breaking commits are listed both under breaking changes and under
/// their own type.
pub fn generate(entry: &Entry<'_>) -> String {
    let mut out = String::new();
    let date = entry.date.format("%Y-%m-%d");

    let header = match &entry.compare_url {
        Some(url) => format!("## [{}]({}) ({})\n\n", entry.version, url, date),
        None => format!("## [{}] ({})\n\n", entry.version, date),
    };
    out.push_str(&header);

    let breaking: Vec<&Commit> = entry.commits.iter().filter(|c| c.is_breaking).collect();
    write_section(&mut out, "⚠ BREAKING CHANGES", &breaking, entry);

    for (commit_type, title) in [
        ("feat", "Features"),
        ("fix", "Bug Fixes"),
        ("perf", "Performance Improvements"),
    ] {
        let commits: Vec<&Commit> = entry
            .commits
            .iter()
            .filter(|c| c.r#type == commit_type)
            .collect();
        write_section(&mut out, title, &commits, entry);
    }

    out
}

fn write_section(out: &mut String, title: &str, commits: &[&Commit], entry: &Entry<'_>) {
    if commits.is_empty() {
        return;
    }
    out.push_str(&format!("### {}\n\n", title));
    for commit in commits {
        out.push_str(&commit_line(commit, entry.repo_url.as_deref()));
    }
    out.push('\n');
}

/// A single bullet, e.g. `* **api:** add endpoint ([abc1234](url))`
pub fn commit_line(commit: &Commit, repo_url: Option<&str>) -> String {
    let description = match &commit.scope {
        Some(scope) => format!("**{}:** {}", scope, commit.description),
        None => commit.description.clone(),
    };

    match repo_url {
        Some(url) => format!(
            "* {} ([{}]({}/commit/{}))\n",
            description,
            commit.short_hash,
            url.trim_end_matches('/'),
            commit.hash
        ),
        None => format!("* {} ({})\n", description, commit.short_hash),
    }
}

/// Insert `entry` above the newest version in `existing`.
///
/// A version header is a `## ` line containing `[` or `(`. Everything above
/// it is kept as the preamble. Without any version header the entry is
/// appended.
pub fn prepend(existing: &str, entry: &str) -> String {
    let lines: Vec<&str> = existing.split('\n').collect();
    let Some(first_version) = lines.iter().position(|line| is_version_header(line)) else {
        return format!("{}\n{}", existing, entry);
    };

    let mut result = lines[..first_version].join("\n");
    if !result.ends_with("\n\n") {
        result.push_str(if result.ends_with('\n') { "\n" } else { "\n\n" });
    }
    result.push_str(entry);
    result.push_str(&lines[first_version..].join("\n"));
    result
}

fn is_version_header(line: &str) -> bool {
    line.starts_with("## ") && (line.contains('[') || line.contains('('))
}

/// Hosted comparison between two component tags, if there is a base URL
/// and a previous version to compare against.
pub fn compare_url(
    repo_url: Option<&str>,
    component: &str,
    previous: &str,
    new: &str,
) -> Option<String> {
    let repo_url = repo_url?.trim_end_matches('/');
    if repo_url.is_empty() || previous.is_empty() {
        return None;
    }
    Some(format!(
        "{}/compare/{}...{}",
        repo_url,
        Tag::for_release(component, previous),
        Tag::for_release(component, new)
    ))
}
