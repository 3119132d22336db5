//! Release configuration: packages, their current versions and linked
//! version groups, read from `release-please-config.json` and
//! `release-please-manifest.json`.

use crate::error::{ReleaseError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "release-please-config.json";
pub const MANIFEST_FILE: &str = "release-please-manifest.json";
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";
const LINKED_VERSIONS_PLUGIN: &str = "linked-versions";

/// A releasable unit rooted at a repository-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Normalized repository-relative path, unique across the configuration
    pub path: String,
    /// Release identifier used in tags and reports
    pub component: String,
    /// Changelog location relative to the package path
    pub changelog_path: String,
    /// Version recorded in the manifest, if any
    pub current_version: Option<String>,
    /// Name of the linked-versions group this package belongs to
    pub linked_group: Option<String>,
}

impl Package {
    pub fn new(path: &str, component: impl Into<String>) -> Self {
        Package {
            path: normalize_path(path),
            component: component.into(),
            changelog_path: DEFAULT_CHANGELOG_PATH.to_string(),
            current_version: None,
            linked_group: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = Some(version.into());
        self
    }
}

/// Validated package table plus linked groups.
///
/// Packages are keyed by normalized path in a sorted map, so iteration is
/// always path-ordered.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub packages: BTreeMap<String, Package>,
    /// Group name -> component names
    pub linked_groups: BTreeMap<String, Vec<String>>,
    pub repo_root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    packages: HashMap<String, RawPackage>,
    #[serde(default)]
    plugins: Vec<RawPlugin>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(default)]
    component: String,
    #[serde(rename = "changelog-path", default)]
    changelog_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlugin {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "groupName", default)]
    group_name: String,
    #[serde(default)]
    components: Vec<String>,
}

impl Config {
    /// Build a validated configuration from packages and linked groups.
    ///
    /// Each package's `linked_group` is derived from `linked_groups`.
    ///
    /// # Errors
    /// * a package has an empty component name
    /// * two packages normalize to the same path
    /// * a linked group names a component that no package declares
    /// * a component appears in more than one linked group
    pub fn new(
        packages: Vec<Package>,
        linked_groups: BTreeMap<String, Vec<String>>,
        repo_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let mut component_to_group: HashMap<&str, &str> = HashMap::new();
        for (group, components) in &linked_groups {
            for component in components {
                if let Some(previous) = component_to_group.insert(component, group) {
                    if previous != group.as_str() {
                        return Err(ReleaseError::config(format!(
                            "component '{}' is linked in both '{}' and '{}'",
                            component, previous, group
                        )));
                    }
                }
            }
        }

        let mut table = BTreeMap::new();
        for mut package in packages {
            package.path = normalize_path(&package.path);
            if package.component.trim().is_empty() {
                return Err(ReleaseError::config(format!(
                    "package '{}' missing component name",
                    package.path
                )));
            }
            if package.changelog_path.is_empty() {
                package.changelog_path = DEFAULT_CHANGELOG_PATH.to_string();
            }
            package.linked_group = component_to_group
                .get(package.component.as_str())
                .map(|group| group.to_string());

            if table.contains_key(&package.path) {
                return Err(ReleaseError::config(format!(
                    "package path '{}' is configured more than once",
                    package.path
                )));
            }
            table.insert(package.path.clone(), package);
        }

        for (group, components) in &linked_groups {
            for component in components {
                if !table.values().any(|p| &p.component == component) {
                    return Err(ReleaseError::config(format!(
                        "linked group '{}' references unknown component '{}'",
                        group, component
                    )));
                }
            }
        }

        Ok(Config {
            packages: table,
            linked_groups,
            repo_root: repo_root.into(),
        })
    }

    /// Load configuration and manifest from the repository root.
    pub fn load(repo_root: impl AsRef<Path>) -> Result<Self> {
        let root = repo_root.as_ref().canonicalize().map_err(|e| {
            ReleaseError::config(format!(
                "cannot resolve repository root '{}': {}",
                repo_root.as_ref().display(),
                e
            ))
        })?;

        let config_text = read_named(&root, CONFIG_FILE)?;
        let raw: RawConfig = serde_json::from_str(&config_text)
            .map_err(|e| ReleaseError::config(format!("failed to parse {}: {}", CONFIG_FILE, e)))?;

        let manifest_text = read_named(&root, MANIFEST_FILE)?;
        let manifest: HashMap<String, String> = serde_json::from_str(&manifest_text).map_err(
            |e| ReleaseError::config(format!("failed to parse {}: {}", MANIFEST_FILE, e)),
        )?;
        let manifest: HashMap<String, String> = manifest
            .into_iter()
            .map(|(path, version)| (normalize_path(&path), version))
            .collect();

        let linked_groups: BTreeMap<String, Vec<String>> = raw
            .plugins
            .into_iter()
            .filter(|plugin| plugin.kind == LINKED_VERSIONS_PLUGIN)
            .map(|plugin| (plugin.group_name, plugin.components))
            .collect();

        let packages = raw
            .packages
            .into_iter()
            .map(|(path, pkg)| {
                let path = normalize_path(&path);
                Package {
                    current_version: manifest.get(&path).cloned(),
                    changelog_path: pkg
                        .changelog_path
                        .unwrap_or_else(|| DEFAULT_CHANGELOG_PATH.to_string()),
                    component: pkg.component,
                    linked_group: None,
                    path,
                }
            })
            .collect();

        let config = Config::new(packages, linked_groups, root)?;
        debug!(
            packages = config.packages.len(),
            linked_groups = config.linked_groups.len(),
            "loaded release configuration"
        );
        Ok(config)
    }

    /// Return the package owning `file_path`, deepest match wins.
    ///
    /// A package matches when the normalized file path equals its path or
    /// starts with its path followed by `/`. A package configured at `.`
    /// owns no file.
    pub fn find_package_for_path(&self, file_path: &str) -> Option<&Package> {
        let file_path = normalize_path(file_path);
        let mut best: Option<&Package> = None;

        for (path, package) in &self.packages {
            if !path_contains(path, &file_path) {
                continue;
            }
            if best.map_or(true, |b| path.len() > b.path.len()) {
                best = Some(package);
            }
        }

        best
    }

    /// All packages in the same linked group as `package`, sorted by path.
    /// A package outside any group yields just itself.
    pub fn linked_packages<'a>(&'a self, package: &'a Package) -> Vec<&'a Package> {
        let Some(group) = &package.linked_group else {
            return vec![package];
        };
        let Some(components) = self.linked_groups.get(group) else {
            return vec![package];
        };

        self.packages
            .values()
            .filter(|p| components.contains(&p.component))
            .collect()
    }

    /// All packages in path order
    pub fn packages_sorted_by_path(&self) -> Vec<&Package> {
        self.packages.values().collect()
    }}

fn read_named(root: &Path, name: &str) -> Result<String> {
    let path = root.join(name);
    fs::read_to_string(&path)
        .map_err(|e| ReleaseError::config(format!("failed to read {}: {}", path.display(), e)))
}

/// True when `file_path` equals `package_path` or lies below it. An empty
/// package path owns nothing.
fn path_contains(package_path: &str, file_path: &str) -> bool {
    if package_path.is_empty() {
        return false;
    }
    file_path == package_path
        || file_path
            .strip_prefix(package_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Strip a leading `./`, leading `/` and trailing `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path.trim_end_matches('/');
    path.trim_start_matches('/').to_string()
}
