//! Merge-aware release analysis for monorepos.
//!
//! Classifies HEAD, collects the commits a merge introduced, attributes
//! their files to configured packages and computes each package's next
//! semantic version.

pub mod analyzer;
pub mod apply;
pub mod boundary;
pub mod changelog;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod output;
pub mod report;
pub mod ui;

pub use error::{ReleaseError, Result};
