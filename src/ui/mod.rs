//! User interface module - terminal output for an analysis run.
//!
//! - `formatter` - Pure formatting and printing functions
//! - This module - The composed report printed by the CLI

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_attribution_details, display_boundary_warning, display_commit_analysis, display_error,
    display_merge_info, display_releases, display_stats, display_status, display_success,
};

use crate::analyzer::AnalysisResult;
use crate::config::Config;

/// Print HEAD classification, commits, releases and any warnings. With
/// `verbose`, also show how each changed file was attributed.
pub fn display_analysis(result: &AnalysisResult, config: &Config, verbose: bool) {
    display_merge_info(&result.merge_info);
    display_commit_analysis(&result.commits);
    display_stats(&result.stats);
    if verbose {
        display_attribution_details(&result.commits, &result.stats, config);
    }
    display_releases(&result.releases);

    for warning in &result.warnings {
        display_boundary_warning(warning);
    }
}
