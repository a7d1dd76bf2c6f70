//! Empty directory removal.
//!
//! Directories are examined deepest first, so a parent emptied by the
//! removal of its last child is removed in the same pass. The root and
//! excluded folders are never touched.

use crate::folder_filter::ExclusionRule;
use crate::walker::TreeWalker;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A directory that looked empty but could not be removed.
#[derive(Debug)]
pub struct ReclaimFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Result of one reclamation pass.
#[derive(Debug, Default)]
pub struct ReclaimReport {
    /// Directories examined, the root excluded.
    pub dirs_scanned: usize,
    /// Directories removed (or that would be, in a dry run), deepest first.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<ReclaimFailure>,
    /// The pass stopped early on a shutdown request.
    pub interrupted: bool,
}

impl ReclaimReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Removes empty directories below a root.
pub struct Reclaimer {
    walker: TreeWalker,
    dry_run: bool,
    vacated: HashSet<PathBuf>,
    occupied: HashSet<PathBuf>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl Reclaimer {
    pub fn new(root: impl Into<PathBuf>, rule: ExclusionRule, dry_run: bool) -> Self {
        Self {
            walker: TreeWalker::new(root, rule),
            dry_run,
            vacated: HashSet::new(),
            occupied: HashSet::new(),
            shutdown: None,
        }
    }

    /// Moves a dry run decided on but did not perform, as `(source,
    /// destination)` pairs.
    ///
    /// Sources count as absent and every folder holding a destination counts
    /// as occupied, so the pass removes what the real run would.
    pub fn with_simulated_moves(
        mut self,
        moves: impl IntoIterator<Item = (PathBuf, PathBuf)>,
    ) -> Self {
        for (source, destination) in moves {
            self.occupied
                .extend(destination.ancestors().skip(1).map(Path::to_path_buf));
            self.vacated.insert(source);
        }
        self
    }

    /// Stops the pass before the next removal once `signal` is set.
    pub fn with_shutdown(mut self, signal: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Runs a single bottom-up pass and reports what was removed.
    pub fn reclaim(&self) -> ReclaimReport {
        let mut report = ReclaimReport::default();
        // Directories removed so far; in a dry run they still exist on disk
        // and are treated as gone.
        let mut removed: HashSet<PathBuf> = self.vacated.clone();

        for dir in self.walker.directories().into_iter().rev() {
            if self.is_shutdown() {
                info!("Shutdown requested, stopping directory cleanup");
                report.interrupted = true;
                break;
            }
            report.dirs_scanned += 1;

            if self.occupied.contains(&dir) {
                continue;
            }
            match is_vacant(&dir, &removed) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!("Cannot list {}: {}", dir.display(), e);
                    continue;
                }
            }

            if !self.dry_run
                && let Err(e) = fs::remove_dir(&dir)
            {
                warn!("Failed to remove {}: {}", dir.display(), e);
                report.failures.push(ReclaimFailure {
                    path: dir,
                    error: e,
                });
                continue;
            }

            debug!("Removed empty directory {}", dir.display());
            removed.insert(dir.clone());
            report.removed.push(dir);
        }

        info!(
            "Directory cleanup: {} scanned, {} removed",
            report.dirs_scanned,
            report.removed.len()
        );
        report
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|signal| signal.load(Ordering::SeqCst))
    }
}

/// True if every entry of `dir` is already gone in this pass.
fn is_vacant(dir: &Path, removed: &HashSet<PathBuf>) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if !removed.contains(&entry?.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}
