use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merge_release::analyzer::{self, ReleaseCalculator};
use merge_release::boundary::BoundaryWarning;
use merge_release::config::{load_settings, Backend, Config};
use merge_release::report::{AnalysisInput, ReleaseReport};
use merge_release::{apply, git, github, output, ui};

#[derive(Clone, Copy, clap::ValueEnum)]
enum BackendArg {
    Git,
    Libgit2,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Git => Backend::Git,
            BackendArg::Libgit2 => Backend::Libgit2,
        }
    }
}

#[derive(clap::Parser)]
#[command(
    name = "merge-release",
    version,
    about = "Compute per-package releases from the commits a merge introduced"
)]
struct Args {
    #[arg(long, default_value = ".", help = "Repository root")]
    repo: PathBuf,

    #[arg(long, help = "Preview what would happen without writing files")]
    dry_run: bool,

    #[arg(long, help = "Create hosted releases with the gh CLI")]
    create_releases: bool,

    #[arg(long, help = "Repository URL for links (default: origin remote)")]
    repo_url: Option<String>,

    #[arg(long, help = "Custom settings file path")]
    settings: Option<PathBuf>,

    #[arg(long, value_enum, help = "Git backend to query")]
    backend: Option<BackendArg>,

    #[arg(
        short,
        long,
        help = "Show how each changed file was attributed and enable debug logging"
    )]
    verbose: bool,

    #[arg(long, help = "Print the release report as JSON")]
    json: bool,
}

/// Log to stderr so stdout stays usable for `--json`
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "merge_release=debug"
    } else {
        "merge_release=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = match load_settings(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            ui::display_error(&format!("Error loading settings: {}", e));
            std::process::exit(1);
        }
    };

    // Configuration problems abort before any history is read
    let config = match Config::load(&args.repo) {
        Ok(config) => config,
        Err(e) => {
            ui::display_error(&format!("Failed to load release configuration: {}", e));
            std::process::exit(1);
        }
    };

    let backend = args.backend.map(Backend::from).unwrap_or(settings.backend);
    let repo = git::open(&config.repo_root, backend)
        .with_context(|| format!("Cannot open repository at {}", config.repo_root.display()))?;

    let calculator =
        ReleaseCalculator::new(settings.bump_rules(), settings.treat_pre_major_as_minor);
    let result = match analyzer::analyze(&repo, &config, &calculator) {
        Ok(result) => result,
        Err(e) => {
            ui::display_error(&format!("Analysis failed: {}", e));
            std::process::exit(1);
        }
    };

    let repo_url = args
        .repo_url
        .or(settings.repo_url)
        .or_else(|| git::remote_web_url(&config.repo_root, "origin"));

    let report = ReleaseReport::build(&result, repo_url.as_deref());
    let input = AnalysisInput::build(&result, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        for warning in &result.warnings {
            ui::display_boundary_warning(warning);
        }
    } else {
        ui::display_analysis(&result, &config, args.verbose);
    }

    // With --json, stdout carries only the report
    let chatty = !args.json;

    match output::emit_github_outputs(&report, &input) {
        Ok(Some(path)) if chatty => {
            ui::display_status(&format!("Wrote step outputs to {}", path.display()));
        }
        Ok(_) => {}
        Err(e) => ui::display_boundary_warning(&BoundaryWarning::OutputWriteFailed {
            reason: e.to_string(),
        }),
    }

    if !result.has_releases() {
        return Ok(());
    }

    let summary = apply::apply(&result, &config, repo_url.as_deref(), args.dry_run)
        .context("Failed to write release files")?;
    if chatty && args.dry_run {
        ui::display_status(&format!(
            "Dry run: would update {} VERSION file(s) and {} changelog(s)",
            summary.version_files.len(),
            summary.changelogs.len()
        ));
    } else if chatty {
        ui::display_success(&format!(
            "Updated {} VERSION file(s), {} changelog(s) and the manifest",
            summary.version_files.len(),
            summary.changelogs.len()
        ));
    }

    if !args.create_releases {
        return Ok(());
    }
    if args.dry_run {
        if chatty {
            for release in &result.releases {
                ui::display_status(&format!("Would create release {}", release.tag_name()));
            }
        }
        return Ok(());
    }

    let publisher = github::GhCli::new(&config.repo_root);
    let outcome = github::create_releases(&result, &publisher, repo_url.as_deref());
    if chatty {
        for hosted in &outcome.created {
            ui::display_success(&format!("Created release {}", hosted.tag_name));
        }
    }
    if let Some(e) = outcome.failure {
        // Versions are already written at this point
        ui::display_boundary_warning(&BoundaryWarning::ReleaseCreationFailed {
            reason: e.to_string(),
        });
    }

    Ok(())
}
