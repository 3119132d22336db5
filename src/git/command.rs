use crate::error::{ReleaseError, Result};
use crate::git::{LogEntry, Repository};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Field separator for `git log --format`; cannot appear in a subject line
const FIELD_SEPARATOR: char = '\u{1f}';

/// Version-control oracle backed by the installed `git` client.
///
/// Each query spawns `git` in the repository root and blocks until it
/// exits. No timeout is applied.
#[derive(Debug, Clone)]
pub struct GitCommand {
    root: PathBuf,
    program: String,
}

impl GitCommand {
    /// Query the repository rooted at `root` with the `git` found on `PATH`
    pub fn new(root: impl AsRef<Path>) -> Self {
        GitCommand {
            root: root.as_ref().to_path_buf(),
            program: "git".to_string(),
        }
    }

    /// Use a specific client binary instead of `git`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(program = %self.program, ?args, "running git query");
        Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| ReleaseError::OracleUnavailable {
                program: self.program.clone(),
                source,
            })
    }

    /// Run a query that must succeed and return its trimmed stdout
    fn run_checked(&self, query: &str, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(failure(query, args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn failure(query: &str, args: &[&str], output: &Output) -> ReleaseError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    ReleaseError::oracle(
        query,
        args,
        format!(
            "exit code {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ),
    )
}

impl Repository for GitCommand {
    fn try_resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        let peeled = format!("{}^{{commit}}", rev);
        let args = ["rev-parse", "--verify", "--quiet", peeled.as_str()];
        let output = self.run(&args)?;

        if output.status.success() {
            let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(Some(hash));
        }

        // --verify --quiet exits 1 without output when the revision is absent;
        // anything else (e.g. 128, "not a git repository") is a real failure
        if output.status.code() == Some(1) && output.stderr.is_empty() {
            debug!(rev, "revision does not exist");
            return Ok(None);
        }

        Err(failure("rev-parse", &args, &output))
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        self.run_checked("merge-base", &["merge-base", a, b])
    }

    fn log_range(&self, base: &str, head: &str) -> Result<Vec<LogEntry>> {
        let range = format!("{}..{}", base, head);
        let format = format!("--format=%H{}%s", FIELD_SEPARATOR);
        let stdout = self.run_checked(
            "log",
            &["log", "--reverse", format.as_str(), range.as_str()],
        )?;

        Ok(stdout
            .lines()
            .filter_map(|line| line.split_once(FIELD_SEPARATOR))
            .map(|(hash, subject)| LogEntry::new(hash, subject))
            .collect())
    }

    fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        let args = [
            "diff-tree",
            "--no-commit-id",
            "--name-only",
            "-r",
            "--root",
            "-z",
            hash,
        ];
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(failure("diff-tree", &args, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect())
    }
}
