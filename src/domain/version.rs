use crate::domain::BumpType;
use crate::error::{ReleaseError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Semantic version representation
///
/// Prerelease and build metadata are kept as their raw dotted strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: String,
    pub build: String,
}

impl Version {
    /// Create a new release version without prerelease or build metadata
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: String::new(),
            build: String::new(),
        }
    }

    /// Parse a version string, accepting an optional `v`/`V` prefix
    /// (e.g., "v1.2.3", "1.2.3-alpha.1+build.7").
    pub fn parse(input: &str) -> Result<Self> {
        let clean = input.trim();
        let clean = clean
            .strip_prefix('v')
            .or_else(|| clean.strip_prefix('V'))
            .unwrap_or(clean);

        let parsed = semver::Version::parse(clean)
            .map_err(|e| ReleaseError::version(format!("Invalid semver '{}': {}", input, e)))?;

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            prerelease: parsed.pre.as_str().to_string(),
            build: parsed.build.as_str().to_string(),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// True for 0.x versions
    pub fn is_pre_major(&self) -> bool {
        self.major == 0
    }

    /// Bump version according to bump type.
    ///
    /// The result never carries prerelease or build metadata, including for
    /// [`BumpType::None`]. With `treat_pre_major_as_minor` set, a minor bump
    /// of a 0.x version is applied as a patch bump. A field already at
    /// `u64::MAX` saturates.
    pub fn bump(&self, bump_type: BumpType, treat_pre_major_as_minor: bool) -> Self {
        let effective = if bump_type == BumpType::Minor
            && self.is_pre_major()
            && treat_pre_major_as_minor
        {
            BumpType::Patch
        } else {
            bump_type
        };

        match effective {
            BumpType::None => Version::new(self.major, self.minor, self.patch),
            BumpType::Patch => Version::new(self.major, self.minor, self.patch.saturating_add(1)),
            BumpType::Minor => Version::new(self.major, self.minor.saturating_add(1), 0),
            BumpType::Major => Version::new(self.major.saturating_add(1), 0, 0),
        }
    }

    /// Compare by semver precedence.
    ///
    /// Numeric fields first; at equal numbers a release outranks a
    /// prerelease, and two prereleases compare lexically. Build metadata is
    /// ignored.
    pub fn compare(&self, other: &Version) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(
                || match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => self.prerelease.cmp(&other.prerelease),
                },
            )
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}
