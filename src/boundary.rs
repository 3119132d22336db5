use crate::domain::commit::SHORT_HASH_LEN;
use std::fmt;

/// Non-fatal conditions met while analyzing or releasing.
/// These are reported to the user but never abort a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// HEAD has no parent, so there is nothing to attribute
    NoCommits { head_sha: String },
    /// The manifest holds a version that is not valid semver
    InvalidStoredVersion {
        component: String,
        version: String,
        reason: String,
    },
    /// Files changed in the analyzed range that belong to no package
    UnmatchedFiles { count: usize, dirs: Vec<String> },
    /// Creating hosted releases failed after versions were computed
    ReleaseCreationFailed { reason: String },
    /// The CI step output file could not be written
    OutputWriteFailed { reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoCommits { head_sha } => {
                let short_hash = if head_sha.len() > SHORT_HASH_LEN {
                    &head_sha[..SHORT_HASH_LEN]
                } else {
                    head_sha.as_str()
                };
                write!(f, "No commits to analyze before HEAD ({})", short_hash)
            }
            BoundaryWarning::InvalidStoredVersion {
                component,
                version,
                reason,
            } => {
                write!(
                    f,
                    "Stored version '{}' of '{}' is invalid ({}); starting from 0.1.0",
                    version, component, reason
                )
            }
            BoundaryWarning::UnmatchedFiles { count, dirs } => {
                write!(f, "{} changed file(s) belong to no package", count)?;
                if !dirs.is_empty() {
                    write!(f, " (in: {})", dirs.join(", "))?;
                }
                Ok(())
            }
            BoundaryWarning::ReleaseCreationFailed { reason } => {
                write!(f, "Release creation failed, versions are unaffected: {}", reason)
            }
            BoundaryWarning::OutputWriteFailed { reason } => {
                write!(f, "Could not write step outputs: {}", reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_commits_shortens_hash() {
        let warning = BoundaryWarning::NoCommits {
            head_sha: "abc1234def5678".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "No commits to analyze before HEAD (abc1234)"
        );
    }

    #[test]
    fn test_unmatched_files_without_dirs() {
        let warning = BoundaryWarning::UnmatchedFiles {
            count: 2,
            dirs: vec![],
        };
        assert_eq!(warning.to_string(), "2 changed file(s) belong to no package");
    }
}
