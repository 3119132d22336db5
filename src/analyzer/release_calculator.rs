use crate::boundary::BoundaryWarning;
use crate::config::{Config, Package};
use crate::domain::{BumpRules, BumpType, Commit, Tag, Version};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Version assumed for a package whose manifest entry is missing
const INITIAL_VERSION: Version = Version::new(0, 0, 0);
/// Version a package restarts from when its manifest entry is not semver
const RESET_VERSION: Version = Version::new(0, 1, 0);

/// A planned release of one package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRelease {
    pub package: Package,
    pub bump_type: BumpType,
    pub old_version: Version,
    pub new_version: Version,
    /// Commits attributed to this package, deduplicated, oldest first
    pub commits: Vec<Commit>,
}

impl PackageRelease {
    /// True when this package is released only because a linked sibling was
    pub fn linked_bump(&self) -> bool {
        self.commits.is_empty() && self.package.linked_group.is_some()
    }

    pub fn tag(&self) -> Tag {
        Tag::for_release(&self.package.component, &self.new_version.to_string())
    }

    pub fn tag_name(&self) -> String {
        self.tag().name
    }
}

/// Releases computed for one run, plus any non-fatal findings
#[derive(Debug, Clone, Default)]
pub struct ReleasePlan {
    /// Sorted by package path
    pub releases: Vec<PackageRelease>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Turns file-annotated commits into per-package releases.
///
/// Holds no state besides the bump table and the pre-1.0 policy, so one
/// calculator can be reused across configurations.
#[derive(Debug, Clone)]
pub struct ReleaseCalculator {
    rules: BumpRules,
    treat_pre_major_as_minor: bool,
}

impl ReleaseCalculator {
    pub fn new(rules: BumpRules, treat_pre_major_as_minor: bool) -> Self {
        ReleaseCalculator {
            rules,
            treat_pre_major_as_minor,
        }
    }

    /// Compute the releases for `commits` against the package table.
    ///
    /// Packages are visited in path order. A package without a qualifying
    /// commit gets no release, unless a member of its linked group has one,
    /// in which case every member of the group is released with the group's
    /// highest bump.
    pub fn calculate(&self, config: &Config, commits: &[Commit]) -> ReleasePlan {
        let by_package = attribute_commits(config, commits);
        let mut processed_groups: HashSet<&str> = HashSet::new();
        let mut plan = ReleasePlan::default();

        for package in config.packages_sorted_by_path() {
            let Some(own_commits) = by_package.get(package.path.as_str()) else {
                continue;
            };

            let bump = self.rules.max_bump(own_commits.iter().copied());
            if bump == BumpType::None {
                debug!(component = %package.component, "no releasable commits");
                continue;
            }

            match package.linked_group.as_deref() {
                Some(group) => {
                    if !processed_groups.insert(group) {
                        continue;
                    }

                    let members = config.linked_packages(package);
                    let group_bump = self.rules.max_bump(
                        members
                            .iter()
                            .filter_map(|m| by_package.get(m.path.as_str()))
                            .flatten()
                            .copied(),
                    );
                    debug!(
                        group,
                        bump = %group_bump,
                        members = members.len(),
                        "linked group bump"
                    );

                    for member in members {
                        let member_commits = by_package
                            .get(member.path.as_str())
                            .map(Vec::as_slice)
                            .unwrap_or_default();
                        let release = self.create_release(
                            member,
                            member_commits,
                            group_bump,
                            &mut plan.warnings,
                        );
                        plan.releases.push(release);
                    }
                }
                None => {
                    let release =
                        self.create_release(package, own_commits, bump, &mut plan.warnings);
                    plan.releases.push(release);
                }
            }
        }

        plan.releases.sort_by(|a, b| a.package.path.cmp(&b.package.path));
        plan
    }

    fn create_release(
        &self,
        package: &Package,
        commits: &[&Commit],
        bump_type: BumpType,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> PackageRelease {
        let old_version = match package.current_version.as_deref().map(str::trim) {
            None | Some("") => INITIAL_VERSION,
            Some(stored) => match Version::parse(stored) {
                Ok(version) => version,
                Err(e) => {
                    warn!(
                        component = %package.component,
                        version = stored,
                        "stored version is invalid, starting from {}",
                        RESET_VERSION
                    );
                    warnings.push(BoundaryWarning::InvalidStoredVersion {
                        component: package.component.clone(),
                        version: stored.to_string(),
                        reason: e.to_string(),
                    });
                    RESET_VERSION
                }
            },
        };
        let new_version = old_version.bump(bump_type, self.treat_pre_major_as_minor);

        let mut seen = HashSet::new();
        let commits: Vec<Commit> = commits
            .iter()
            .filter(|c| seen.insert(c.hash.as_str()))
            .map(|c| (*c).clone())
            .collect();

        debug!(
            component = %package.component,
            old = %old_version,
            new = %new_version,
            bump = %bump_type,
            commits = commits.len(),
            "planned release"
        );

        PackageRelease {
            package: package.clone(),
            bump_type,
            old_version,
            new_version,
            commits,
        }
    }
}

/// Map package path to the commits touching at least one of its files.
///
/// A commit appears once per matching file, so lists may hold duplicates.
pub fn attribute_commits<'a>(
    config: &Config,
    commits: &'a [Commit],
) -> BTreeMap<String, Vec<&'a Commit>> {
    let mut by_package: BTreeMap<String, Vec<&'a Commit>> = BTreeMap::new();
    for commit in commits {
        for file in &commit.files {
            if let Some(package) = config.find_package_for_path(file) {
                by_package
                    .entry(package.path.clone())
                    .or_default()
                    .push(commit);
            }
        }
    }
    by_package
}
