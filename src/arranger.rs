//! Run orchestration: walk, relocate, then reclaim.
//!
//! Relocation may fan out over a worker pool; reclamation starts only once
//! every relocation has finished, so vacated directories are seen empty.

use crate::config::ArrangeConfig;
use crate::error::InvocationError;
use crate::metadata::MetadataReader;
use crate::reclaimer::{ReclaimReport, Reclaimer};
use crate::relocator::{Outcome, OutcomeKind, Relocator};
use crate::walker::{TreeWalker, WalkStats};
use chrono::{DateTime, Local, TimeDelta};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Totals for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Regular files in traversed directories.
    pub files_scanned: usize,
    /// Files among them with a JPEG extension.
    pub candidates: usize,
    pub files_moved: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    /// Directories examined for emptiness, the root excluded.
    pub dirs_scanned: usize,
    pub dirs_removed: usize,
    pub dirs_failed: usize,
    /// A shutdown request cut the run short.
    pub interrupted: bool,
}

impl RunReport {
    pub fn elapsed(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

/// Thread-safe outcome counters.
#[derive(Debug, Default)]
struct Tally {
    moved: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    /// `(source, destination)` of every move a dry run decided on; empty in
    /// a real run.
    simulated: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl Tally {
    fn record(&self, outcome: &Outcome, dry_run: bool) {
        if dry_run
            && let Outcome::Moved {
                source,
                destination,
                ..
            } = outcome
        {
            self.simulated
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((source.clone(), destination.clone()));
        }

        let counter = match outcome.kind() {
            OutcomeKind::Moved => &self.moved,
            OutcomeKind::Failed => &self.failed,
            OutcomeKind::SkippedNoTimestamp
            | OutcomeKind::SkippedInPlace
            | OutcomeKind::SkippedCollision => &self.skipped,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sequences the walker, the relocator and the reclaimer over one root.
pub struct Arranger<R> {
    config: ArrangeConfig,
    reader: R,
    shutdown: Arc<AtomicBool>,
}

impl<R: MetadataReader> Arranger<R> {
    pub fn new(config: ArrangeConfig, reader: R) -> Self {
        Self {
            config,
            reader,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares a cancellation flag, usually the one set by Ctrl-C.
    pub fn with_shutdown(mut self, signal: Arc<AtomicBool>) -> Self {
        self.shutdown = signal;
        self
    }

    pub fn config(&self) -> &ArrangeConfig {
        &self.config
    }

    /// Runs a full pass. `on_outcome` sees every per-file outcome and
    /// `on_removed` every reclaimed directory, as they happen.
    ///
    /// # Errors
    ///
    /// Only fails if the worker pool cannot be built. Per-file and
    /// per-directory problems are counted, never returned.
    pub fn run<F, G>(self, on_outcome: F, on_removed: G) -> Result<RunReport, InvocationError>
    where
        F: Fn(&Outcome) + Sync,
        G: Fn(&PathBuf),
    {
        let started_at = Local::now();
        let Arranger {
            config,
            reader,
            shutdown,
        } = self;
        let root = config.root().to_path_buf();

        info!(
            "Arranging photos under {}{}",
            root.display(),
            if config.dry_run() { " (dry run)" } else { "" }
        );

        let relocator = Relocator::new(&root, reader, config.dry_run());
        let walker = TreeWalker::new(&root, config.exclusion().clone());
        let tally = Tally::default();
        let stats = relocate_all(&config, &walker, &relocator, &tally, &shutdown, &on_outcome)?;
        let simulated = tally
            .simulated
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let mut interrupted = shutdown.load(Ordering::SeqCst);
        let reclaim = if config.reclaim() && !interrupted {
            Reclaimer::new(&root, config.exclusion().clone(), config.dry_run())
                .with_simulated_moves(simulated)
                .with_shutdown(Arc::clone(&shutdown))
                .reclaim()
        } else {
            if interrupted {
                warn!("Interrupted, skipping empty directory cleanup");
            }
            ReclaimReport::default()
        };
        interrupted |= reclaim.interrupted;
        reclaim.removed.iter().for_each(&on_removed);

        let report = RunReport {
            root,
            dry_run: config.dry_run(),
            started_at,
            finished_at: Local::now(),
            files_scanned: stats.files,
            candidates: stats.candidates,
            files_moved: tally.moved.into_inner(),
            files_skipped: tally.skipped.into_inner(),
            files_failed: tally.failed.into_inner(),
            dirs_scanned: reclaim.dirs_scanned,
            dirs_removed: reclaim.removed_count(),
            dirs_failed: reclaim.failures.len(),
            interrupted,
        };

        info!(
            "Done: {} files scanned, {} moved, {} skipped, {} failed",
            report.files_scanned, report.files_moved, report.files_skipped, report.files_failed
        );
        Ok(report)
    }
}

/// Feeds every candidate through the relocator and returns the walk totals.
fn relocate_all<R, F>(
    config: &ArrangeConfig,
    walker: &TreeWalker,
    relocator: &Relocator<R>,
    tally: &Tally,
    shutdown: &AtomicBool,
    on_outcome: &F,
) -> Result<WalkStats, InvocationError>
where
    R: MetadataReader,
    F: Fn(&Outcome) + Sync,
{
    let claims = relocator.claims();
    let mut walk = walker.walk().ignoring(move |path| claims.contains(path));
    let process = |path: PathBuf| {
        let outcome = relocator.relocate(&path);
        tally.record(&outcome, relocator.is_dry_run());
        on_outcome(&outcome);
    };

    match config.workers() {
        Some(1) => {
            for path in walk.by_ref() {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                process(path);
            }
        }
        workers => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers.unwrap_or(0))
                .thread_name(|idx| format!("relocate-{}", idx))
                .build()
                .map_err(|e| InvocationError::ThreadPool(e.to_string()))?;

            pool.install(|| {
                walk.by_ref()
                    .take_while(|_| !shutdown.load(Ordering::SeqCst))
                    .par_bridge()
                    .for_each(process);
            });
        }
    }

    Ok(walk.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::metadata::{CaptureTimestamp, parse_capture_timestamp};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Dates every file from its stem: `20181209_x.jpg` -> 2018-12-09.
    struct StemDates;

    impl MetadataReader for StemDates {
        fn read(&self, path: &Path) -> Result<CaptureTimestamp, MetadataError> {
            let stem = path.file_stem().unwrap().to_string_lossy();
            let digits = stem.get(..8).ok_or(MetadataError::NoTimestampTag)?;
            parse_capture_timestamp(&format!(
                "{}:{}:{} 12:00:00",
                &digits[..4],
                &digits[4..6],
                &digits[6..8]
            ))
        }
    }

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn config(root: &Path) -> ArrangeConfig {
        ArrangeConfig::new(root).unwrap()
    }

    #[test]
    fn test_run_moves_and_reclaims() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "100/20181209_a.jpg");
        write(root, "100/200/20190101_b.JPG");
        write(root, "notes.txt");

        let report = Arranger::new(config(root).with_workers(Some(1)), StemDates)
            .run(|_| {}, |_| {})
            .unwrap();

        assert_eq!(report.files_scanned, 3);
        assert_eq!(report.candidates, 2);
        assert_eq!(report.files_moved, 2);
        assert_eq!(report.dirs_removed, 2);
        assert!(!report.interrupted);
        assert!(report.elapsed() >= TimeDelta::zero());
        let canonical = config(root).root().to_path_buf();
        assert!(canonical.join("2018/2018-12-09/20181209_a.jpg").exists());
        assert!(canonical.join("2019/2019-01-01/20190101_b.JPG").exists());
        assert!(!canonical.join("100").exists());
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for day in 1..=9 {
            write(root, &format!("{0}/2020010{0}_{0}.jpg", day));
        }
        write(root, "1/nodate.jpg");

        let report = Arranger::new(config(root).with_workers(Some(4)), StemDates)
            .run(|_| {}, |_| {})
            .unwrap();

        assert_eq!(report.files_moved, 9);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.dirs_removed, 8);
    }

    #[test]
    fn test_dry_run_counts_dirs_a_real_run_would_empty() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "100/200/20181209_a.jpg");
        write(root, "300/20190101_b.jpg");
        write(root, "300/undated.jpg");

        let dry = Arranger::new(config(root).with_dry_run(true), StemDates)
            .run(|_| {}, |_| {})
            .unwrap();
        assert!(root.join("100/200/20181209_a.jpg").exists());

        let real = Arranger::new(config(root), StemDates)
            .run(|_| {}, |_| {})
            .unwrap();

        assert_eq!(dry.files_moved, real.files_moved);
        assert_eq!(dry.dirs_removed, 2);
        assert_eq!(dry.dirs_removed, real.dirs_removed);
        assert!(!root.join("100").exists());
        assert!(root.join("300/undated.jpg").exists());
    }

    #[test]
    fn test_existing_year_folder_is_walked_once() {
        for dry_run in [true, false] {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path();
            write(root, "1/20181209_a.jpg");
            fs::create_dir(root.join("2018")).unwrap();

            let seen = Mutex::new(Vec::new());
            let report = Arranger::new(
                config(root).with_workers(Some(1)).with_dry_run(dry_run),
                StemDates,
            )
            .run(|outcome| seen.lock().unwrap().push(outcome.kind()), |_| {})
            .unwrap();

            assert_eq!(seen.into_inner().unwrap(), vec![OutcomeKind::Moved]);
            assert_eq!(report.files_scanned, 1, "dry_run={}", dry_run);
            assert_eq!(report.candidates, 1);
            assert_eq!(report.files_skipped, 0);
            assert_eq!(report.dirs_removed, 1, "dry_run={}", dry_run);
            assert!(root.join("2018").is_dir());
        }
    }

    #[test]
    fn test_one_failure_does_not_stop_the_run() {
        for workers in [1, 4] {
            for dry_run in [true, false] {
                let temp_dir = TempDir::new().unwrap();
                let root = temp_dir.path();
                write(root, "1/20181209_a.jpg");
                write(root, "1/20190101_b.jpg");
                write(root, "2/20200101_c.jpg");
                // A plain file where the 2019 folder would go.
                write(root, "2019");

                let report = Arranger::new(
                    config(root)
                        .with_workers(Some(workers))
                        .with_dry_run(dry_run),
                    StemDates,
                )
                .run(|_| {}, |_| {})
                .unwrap();

                let label = format!("workers={} dry_run={}", workers, dry_run);
                assert_eq!(report.files_scanned, 4, "{}", label);
                assert_eq!(report.candidates, 3, "{}", label);
                assert_eq!(report.files_moved, 2, "{}", label);
                assert_eq!(report.files_failed, 1, "{}", label);
                assert_eq!(report.files_skipped, 0, "{}", label);
                assert_eq!(report.dirs_removed, 1, "{}", label);
                assert!(root.join("1/20190101_b.jpg").exists());
                assert!(root.join("2019").is_file());
            }
        }
    }

    #[test]
    fn test_outcomes_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "1/20181209_a.jpg");
        write(root, "1/undated.jpg");

        let seen = Mutex::new(Vec::new());
        let removed = Mutex::new(Vec::new());
        Arranger::new(config(root).with_workers(Some(1)), StemDates)
            .run(
                |outcome| seen.lock().unwrap().push(outcome.kind()),
                |dir| removed.lock().unwrap().push(dir.clone()),
            )
            .unwrap();

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![OutcomeKind::Moved, OutcomeKind::SkippedNoTimestamp]
        );
        assert!(removed.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_shutdown_before_start_processes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "1/20181209_a.jpg");
        fs::create_dir_all(root.join("2")).unwrap();

        let report = Arranger::new(config(root).with_workers(Some(1)), StemDates)
            .with_shutdown(Arc::new(AtomicBool::new(true)))
            .run(|_| {}, |_| {})
            .unwrap();

        assert!(report.interrupted);
        assert_eq!(report.files_moved, 0);
        assert_eq!(report.dirs_removed, 0);
        assert!(root.join("1/20181209_a.jpg").exists());
        assert!(root.join("2").exists());
    }

    #[test]
    fn test_no_reclaim_keeps_empty_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "1/20181209_a.jpg");

        let report = Arranger::new(config(root).with_reclaim(false), StemDates)
            .run(|_| {}, |_| {})
            .unwrap();

        assert_eq!(report.files_moved, 1);
        assert_eq!(report.dirs_scanned, 0);
        assert!(root.join("1").exists());
    }

    #[test]
    fn test_report_serializes() {
        let temp_dir = TempDir::new().unwrap();
        let report = Arranger::new(config(temp_dir.path()), StemDates)
            .run(|_| {}, |_| {})
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files_moved"], 0);
        assert_eq!(json["dry_run"], false);
        assert!(json["started_at"].is_string());
    }
}
