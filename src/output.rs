//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: per-file outcome
//! lines, the relocation spinner, and the end-of-run summary. Logging goes
//! through `log`; this module only deals with what the user reads.

use crate::arranger::RunReport;
use crate::relocator::{Outcome, SkipReason};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a spinner for the relocation phase, whose length is unknown
    /// until the walk finishes.
    pub fn create_spinner(hidden: bool) -> ProgressBar {
        if hidden {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {pos} files {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// One line describing a per-file outcome.
    pub fn outcome_line(outcome: &Outcome, root: &Path, dry_run: bool) -> String {
        let rel = |path: &Path| path.strip_prefix(root).unwrap_or(path).display().to_string();
        match outcome {
            Outcome::Moved {
                source,
                destination,
                ..
            } => format!(
                "{} {} → {}",
                if dry_run { "would move" } else { "moved" },
                rel(source),
                rel(destination)
            ),
            Outcome::Skipped { source, reason } => {
                let why = match reason {
                    SkipReason::NoTimestamp(e) => format!("no timestamp ({})", e),
                    SkipReason::AlreadyInPlace => "already in place".to_string(),
                    SkipReason::Collision { destination } => {
                        format!("{} already exists", rel(destination))
                    }
                };
                format!("skipped {}: {}", rel(source), why)
            }
            Outcome::Failed { source, error } => format!("failed {}: {}", rel(source), error),
        }
    }

    /// Prints a per-file outcome. Failures always print; moves and skips
    /// only when `verbose` is set.
    pub fn outcome(outcome: &Outcome, root: &Path, dry_run: bool, verbose: bool) {
        let line = Self::outcome_line(outcome, root, dry_run);
        match outcome {
            Outcome::Failed { .. } => Self::error(&line),
            Outcome::Moved { .. } if verbose => Self::success(&line),
            Outcome::Skipped { .. } if verbose => Self::plain(&line.dimmed().to_string()),
            _ => {}
        }
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints the end-of-run summary table.
    pub fn summary_table(report: &RunReport) {
        Self::header("--------");
        let elapsed = report.elapsed();
        let rows = [
            ("start at", report.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ("finish at", report.finished_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            (
                "overall time",
                format!(
                    "{}.{:03}s",
                    elapsed.num_seconds(),
                    elapsed.subsec_nanos().max(0) / 1_000_000
                ),
            ),
        ];
        for (label, value) in rows {
            println!("{:<14} {}", label, value);
        }

        let moved_label = if report.dry_run { "files to move" } else { "files moved" };
        let removed_label = if report.dry_run {
            "dirs to remove"
        } else {
            "dirs removed"
        };
        println!("{:<14} {}", "files scanned", report.files_scanned);
        println!(
            "{:<14} {}",
            moved_label,
            report.files_moved.to_string().green().bold()
        );
        println!("{:<14} {}", "files skipped", report.files_skipped);
        if report.files_failed > 0 {
            println!(
                "{:<14} {}",
                "files failed",
                report.files_failed.to_string().red().bold()
            );
        }
        println!("{:<14} {}", "dirs scanned", report.dirs_scanned);
        println!(
            "{:<14} {}",
            removed_label,
            report.dirs_removed.to_string().green()
        );
        if report.dirs_failed > 0 {
            println!(
                "{:<14} {}",
                "dirs failed",
                report.dirs_failed.to_string().red()
            );
        }
    }
}
