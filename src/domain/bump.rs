use crate::domain::Commit;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Magnitude of a version increment, ordered `None < Patch < Minor < Major`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::None => "none",
            BumpType::Patch => "patch",
            BumpType::Minor => "minor",
            BumpType::Major => "major",
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BumpType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(BumpType::None),
            "patch" => Ok(BumpType::Patch),
            "minor" => Ok(BumpType::Minor),
            "major" => Ok(BumpType::Major),
            other => Err(ReleaseError::config(format!("Unknown bump type: {}", other))),
        }
    }
}

/// Immutable mapping from conventional commit type to bump.
///
/// Types missing from the table map to [`BumpType::None`].
#[derive(Debug, Clone, PartialEq)]
pub struct BumpRules {
    table: HashMap<String, BumpType>,
}

impl BumpRules {
    /// Build a table from explicit `(type, bump)` pairs. Keys are lowercased.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, BumpType)>,
        S: AsRef<str>,
    {
        BumpRules {
            table: pairs
                .into_iter()
                .map(|(t, b)| (t.as_ref().to_ascii_lowercase(), b))
                .collect(),
        }
    }

    /// Return a copy of these rules with `overrides` layered on top
    pub fn with_overrides(&self, overrides: &HashMap<String, BumpType>) -> Self {
        let mut table = self.table.clone();
        for (commit_type, bump) in overrides {
            table.insert(commit_type.to_ascii_lowercase(), *bump);
        }
        BumpRules { table }
    }

    /// Bump for a bare commit type, case-insensitive
    pub fn bump_for_type(&self, commit_type: &str) -> BumpType {
        self.table
            .get(&commit_type.to_ascii_lowercase())
            .copied()
            .unwrap_or(BumpType::None)
    }

    /// Bump contributed by a single commit. Breaking commits are always major.
    pub fn bump_for_commit(&self, commit: &Commit) -> BumpType {
        if commit.is_breaking {
            BumpType::Major
        } else {
            self.bump_for_type(&commit.r#type)
        }
    }

    /// Fold a set of commits into a single bump, stopping at the first
    /// major one.
    pub fn max_bump<'a, I>(&self, commits: I) -> BumpType
    where
        I: IntoIterator<Item = &'a Commit>,
    {
        let mut max = BumpType::None;
        for commit in commits {
            let bump = self.bump_for_commit(commit);
            if bump == BumpType::Major {
                return bump;
            }
            max = max.max(bump);
        }
        max
    }
}

impl Default for BumpRules {
    fn default() -> Self {
        BumpRules::from_pairs([
            ("feat", BumpType::Minor),
            ("fix", BumpType::Patch),
            ("perf", BumpType::Patch),
            ("chore", BumpType::None),
            ("docs", BumpType::None),
            ("style", BumpType::None),
            ("refactor", BumpType::None),
            ("test", BumpType::None),
            ("build", BumpType::None),
            ("ci", BumpType::None),
        ])
    }
}
