use std::fmt;

/// Separator between component name and version in a release tag
const TAG_SEPARATOR: &str = "-v";

/// A per-component release tag, formatted as `{component}-v{version}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Build the tag for a component release
    /// Example: component="jarvis", version="0.1.120" -> "jarvis-v0.1.120"
    pub fn for_release(component: &str, version: &str) -> Self {
        Tag {
            name: format!("{}{}{}", component, TAG_SEPARATOR, version),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
