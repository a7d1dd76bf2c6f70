//! Command-line interface module for phototidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and validation
//! - Building the run configuration
//! - Driving relocation and cleanup
//! - Rendering per-file outcomes and the final summary

use crate::arranger::{Arranger, RunReport};
use crate::config::{ArrangeConfig, validate_workers};
use crate::error::InvocationError;
use crate::folder_filter::{DEFAULT_EXCLUSION_PATTERN, ExclusionRule};
use crate::metadata::ExifReader;
use crate::output::OutputFormatter;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Move JPEG photos into `<year>/<year-month-day>` folders by EXIF capture
/// date, then remove the directories left empty.
#[derive(Debug, Clone, Parser)]
#[command(name = "phototidy", version, about)]
pub struct Cli {
    /// Root of the photo tree.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Show what would happen without touching anything.
    #[arg(short = 't', long = "test", visible_alias = "dry-run")]
    pub dry_run: bool,

    /// Print every file decision and every removed directory.
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of relocation workers (default: one per CPU).
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Directories whose name matches this regex are left untouched,
    /// along with everything beneath them.
    #[arg(long, default_value = DEFAULT_EXCLUSION_PATTERN)]
    pub exclude_pattern: String,

    /// Fall back to DateTimeDigitized and DateTime when DateTimeOriginal
    /// is missing.
    #[arg(long)]
    pub any_date_tag: bool,

    /// Skip removing empty directories.
    #[arg(long)]
    pub no_reclaim: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Validates the arguments into a run configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationError`] for a bad root, a zero worker count or
    /// an invalid exclusion pattern.
    pub fn to_config(&self) -> Result<ArrangeConfig, InvocationError> {
        let exclusion = ExclusionRule::new(&self.exclude_pattern)?;
        let workers = validate_workers(self.workers)?;

        Ok(ArrangeConfig::new(&self.root)?
            .with_dry_run(self.dry_run)
            .with_verbose(self.verbose)
            .with_workers(workers)
            .with_reclaim(!self.no_reclaim)
            .with_any_date_tag(self.any_date_tag)
            .with_exclusion(exclusion))
    }
}

/// Runs the CLI application with the given arguments.
///
/// Relocation over the whole tree happens first, then empty directory
/// cleanup, then the summary is printed. Per-file failures are printed but
/// do not make this function fail.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use phototidy::cli::{Cli, run_cli};
/// use std::sync::Arc;
/// use std::sync::atomic::AtomicBool;
///
/// let cli = Cli::parse_from(["phototidy", "/media/photos", "--test"]);
/// match run_cli(&cli, Arc::new(AtomicBool::new(false))) {
///     Ok(report) => println!("{} files would move", report.files_moved),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli, shutdown: Arc<AtomicBool>) -> Result<RunReport, InvocationError> {
    let config = cli.to_config()?;
    let root = config.root().to_path_buf();
    let dry_run = config.dry_run();
    let verbose = config.verbose();
    let quiet = cli.json;

    if !quiet {
        if dry_run {
            OutputFormatter::dry_run_notice(&format!("Analyzing {}", root.display()));
        } else {
            OutputFormatter::info(&format!("Arranging photos in {}", root.display()));
        }
    }

    let reader = if config.any_date_tag() {
        ExifReader::any_date_tag()
    } else {
        ExifReader::new()
    };

    let spinner = OutputFormatter::create_spinner(quiet || verbose);
    let report = Arranger::new(config, reader)
        .with_shutdown(shutdown)
        .run(
            |outcome| {
                spinner.inc(1);
                if !quiet {
                    spinner.suspend(|| OutputFormatter::outcome(outcome, &root, dry_run, verbose));
                }
            },
            |dir| {
                if verbose && !quiet {
                    let rel = dir.strip_prefix(&root).unwrap_or(dir.as_path());
                    let verb = if dry_run { "would remove" } else { "removed" };
                    OutputFormatter::plain(&format!("{} empty {}", verb, rel.display()));
                }
            },
        );
    spinner.finish_and_clear();
    let report = report?;

    if quiet {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => OutputFormatter::plain(&json),
            Err(e) => OutputFormatter::error(&format!("Could not serialize report: {}", e)),
        }
        return Ok(report);
    }

    OutputFormatter::summary_table(&report);
    if report.interrupted {
        OutputFormatter::warning("Run interrupted; completed moves were kept.");
    }
    if report.files_failed > 0 || report.dirs_failed > 0 {
        OutputFormatter::warning("Some entries could not be processed. Please review errors above.");
    }
    if dry_run {
        OutputFormatter::dry_run_notice("No files were modified.");
    } else {
        OutputFormatter::success("Done.");
    }

    Ok(report)
}
