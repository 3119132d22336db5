//! Step outputs for GitHub Actions.
//!
//! When `GITHUB_OUTPUT` names a file, `key=value` lines are appended to it
//! so later workflow steps can read the release decision.

use crate::error::Result;
use crate::report::{AnalysisInput, ReleaseReport};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// The output lines for one run, in emission order
pub fn output_lines(report: &ReleaseReport, input: &AnalysisInput) -> Result<Vec<String>> {
    let mut lines = vec![
        format!("releases_created={}", !report.releases.is_empty()),
        format!("release_report={}", report.to_json()?),
        format!("analysis_input={}", input.to_json()?),
    ];

    for release in &report.releases {
        let component = &release.component;
        lines.push(format!("{}--release_created=true", component));
        lines.push(format!("{}--version={}", component, release.new_version));
        lines.push(format!("{}--tag_name={}", component, release.tag_name));
    }

    Ok(lines)
}

/// Append the output lines to `path`, creating it if needed.
pub fn write_outputs(path: &Path, report: &ReleaseReport, input: &AnalysisInput) -> Result<()> {
    let lines = output_lines(report, input)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for line in &lines {
        writeln!(file, "{}", line)?;
    }
    debug!(path = %path.display(), lines = lines.len(), "wrote step outputs");
    Ok(())
}

/// Write outputs to the file named by `GITHUB_OUTPUT`, if set.
///
/// Returns the path written to, or `None` outside of Actions.
pub fn emit_github_outputs(
    report: &ReleaseReport,
    input: &AnalysisInput,
) -> Result<Option<PathBuf>> {
    let Some(path) = std::env::var_os(GITHUB_OUTPUT_ENV).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let path = PathBuf::from(path);
    write_outputs(&path, report, input)?;
    Ok(Some(path))
}
