//! Persist planned releases: VERSION files, changelogs and the manifest.

use crate::analyzer::{AnalysisResult, PackageRelease};
use crate::changelog::{self, Entry, INITIAL_CHANGELOG};
use crate::config::release::MANIFEST_FILE;
use crate::config::{normalize_path, Config};
use crate::error::{ReleaseError, Result};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the per-package version file
pub const VERSION_FILE: &str = "VERSION";
/// Marker kept on the version line so other release tooling can find it
const VERSION_MARKER: &str = "x-release-please-version";

/// Files touched (or, in a dry run, that would be touched)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub version_files: Vec<PathBuf>,
    pub changelogs: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub dry_run: bool,
}

/// Write every planned release to disk, dated today.
pub fn apply(
    result: &AnalysisResult,
    config: &Config,
    repo_url: Option<&str>,
    dry_run: bool,
) -> Result<ApplySummary> {
    apply_on(result, config, repo_url, dry_run, Local::now().date_naive())
}

/// Write every planned release to disk with changelog entries dated `date`.
///
/// Releases without commits of their own (linked bumps) get a new version
/// but no changelog entry. The manifest is rewritten last, keeping its key
/// order.
pub fn apply_on(
    result: &AnalysisResult,
    config: &Config,
    repo_url: Option<&str>,
    dry_run: bool,
    date: NaiveDate,
) -> Result<ApplySummary> {
    let mut summary = ApplySummary {
        dry_run,
        ..Default::default()
    };
    if result.releases.is_empty() {
        return Ok(summary);
    }

    for release in &result.releases {
        let package_dir = config.repo_root.join(&release.package.path);

        let version_path = package_dir.join(VERSION_FILE);
        if !dry_run {
            write_version_file(&version_path, &release.new_version.to_string()).map_err(|e| {
                ReleaseError::release(format!(
                    "failed to update VERSION for {}: {}",
                    release.package.component, e
                ))
            })?;
        }
        summary.version_files.push(version_path);

        if release.commits.is_empty() {
            debug!(component = %release.package.component, "no commits, changelog untouched");
            continue;
        }
        let changelog_path = package_dir.join(&release.package.changelog_path);
        if !dry_run {
            write_changelog(&changelog_path, release, repo_url, date).map_err(|e| {
                ReleaseError::release(format!(
                    "failed to update CHANGELOG for {}: {}",
                    release.package.component, e
                ))
            })?;
        }
        summary.changelogs.push(changelog_path);
    }

    let manifest_path = config.repo_root.join(MANIFEST_FILE);
    if !dry_run {
        update_manifest(&manifest_path, &result.releases)?;
        info!(
            releases = result.releases.len(),
            manifest = %manifest_path.display(),
            "applied releases"
        );
    }
    summary.manifest = Some(manifest_path);

    Ok(summary)
}

/// Content of a VERSION file, keeping the marker if the old content had it
pub fn format_version_file(version: &str, existing: &str) -> String {
    if existing.contains(VERSION_MARKER) {
        format!("{} # {}\n", version, VERSION_MARKER)
    } else {
        format!("{}\n", version)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

fn write_version_file(path: &Path, version: &str) -> Result<()> {
    let existing = read_optional(path)?.unwrap_or_default();
    write_file(path, &format_version_file(version, &existing))
}

fn write_changelog(
    path: &Path,
    release: &PackageRelease,
    repo_url: Option<&str>,
    date: NaiveDate,
) -> Result<()> {
    let existing = read_optional(path)?.unwrap_or_else(|| INITIAL_CHANGELOG.to_string());
    let new_version = release.new_version.to_string();
    let entry = Entry {
        compare_url: changelog::compare_url(
            repo_url,
            &release.package.component,
            &release.old_version.to_string(),
            &new_version,
        ),
        version: new_version,
        date,
        commits: &release.commits,
        repo_url: repo_url.map(str::to_string),
    };
    write_file(path, &changelog::prepend(&existing, &changelog::generate(&entry)))
}

/// Set each released package's version in the manifest.
///
/// Keys are matched by normalized path, so `./pkg` and `pkg` are the same
/// entry. Packages absent from the manifest are added under their path.
fn update_manifest(path: &Path, releases: &[PackageRelease]) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|e| {
        ReleaseError::release(format!("failed to read {}: {}", path.display(), e))
    })?;
    let mut manifest: Value = serde_json::from_str(&text)?;
    let Value::Object(entries) = &mut manifest else {
        return Err(ReleaseError::release(format!(
            "{} is not a JSON object",
            MANIFEST_FILE
        )));
    };

    for release in releases {
        let version = Value::String(release.new_version.to_string());
        let existing_key = entries
            .keys()
            .find(|key| normalize_path(key) == release.package.path)
            .cloned();
        let key = existing_key.unwrap_or_else(|| release.package.path.clone());
        entries.insert(key, version);
    }

    let mut content = serde_json::to_string_pretty(&manifest)?;
    content.push('\n');
    write_file(path, &content)
}
