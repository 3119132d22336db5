use crate::domain::{BumpRules, BumpType};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File name looked up in the working directory and the user config directory
pub const SETTINGS_FILE: &str = "merge-release.toml";

/// Which version-control oracle implementation to query.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Run the installed `git` client as a subprocess
    #[default]
    Git,
    /// Query the repository in-process through libgit2
    Libgit2,
}

/// Tool settings for merge-release.
///
/// Controls analysis policy and the git backend; the package table itself
/// lives in the release configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Apply minor bumps of 0.x packages as patch bumps
    #[serde(default = "default_treat_pre_major_as_minor")]
    pub treat_pre_major_as_minor: bool,

    /// Repository URL used for links in changelogs and reports
    #[serde(default)]
    pub repo_url: Option<String>,

    #[serde(default)]
    pub backend: Backend,

    /// Overrides for the commit type -> bump table
    #[serde(default)]
    pub bump_rules: HashMap<String, BumpType>,
}

/// Pre-1.0 packages avoid minor-version churn unless told otherwise.
fn default_treat_pre_major_as_minor() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            treat_pre_major_as_minor: default_treat_pre_major_as_minor(),
            repo_url: None,
            backend: Backend::default(),
            bump_rules: HashMap::new(),
        }
    }
}

impl Settings {
    /// The default commit type table with this file's overrides applied
    pub fn bump_rules(&self) -> BumpRules {
        BumpRules::default().with_overrides(&self.bump_rules)
    }
}

/// Loads settings from file or returns defaults.
///
/// Attempts to load settings in the following order:
/// 1. Custom path provided as parameter
/// 2. `merge-release.toml` in current directory
/// 3. `merge-release.toml` in user config directory
/// 4. Default settings if no file found
///
/// # Returns
/// * `Ok(Settings)` - Loaded or default settings
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_settings(settings_path: Option<&Path>) -> Result<Settings> {
    let local = Path::new(".").join(SETTINGS_FILE);

    let settings_str = if let Some(path) = settings_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(SETTINGS_FILE);
        if user_path.exists() {
            fs::read_to_string(user_path)?
        } else {
            return Ok(Settings::default());
        }
    } else {
        return Ok(Settings::default());
    };

    parse_settings(&settings_str)
}

/// Parse settings from TOML text
pub fn parse_settings(text: &str) -> Result<Settings> {
    Ok(toml::from_str(text)?)
}
