//! Configuration: the release package table and the tool's own settings.

pub mod release;
pub mod settings;

pub use release::{normalize_path, Config, Package};
pub use settings::{load_settings, Backend, Settings};
