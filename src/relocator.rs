//! Per-file relocation into date folders.
//!
//! The relocator decides, for one file at a time, whether it must move and
//! where to, then performs the move unless running dry. Every failure is
//! turned into an [`Outcome`] so that one bad file never stops a run.

use crate::error::{MetadataError, RelocateError};
use crate::metadata::{CaptureTimestamp, MetadataReader};
use crate::planner::plan_destination;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Why a file was left where it is.
#[derive(Debug)]
pub enum SkipReason {
    /// No usable capture timestamp.
    NoTimestamp(MetadataError),
    /// The file already sits at its canonical destination.
    AlreadyInPlace,
    /// Something already occupies the destination, or another file of this
    /// run has claimed it.
    Collision { destination: PathBuf },
}

/// The result of relocating one file.
#[derive(Debug)]
pub enum Outcome {
    /// The file was moved, or would be in a dry run.
    Moved {
        source: PathBuf,
        destination: PathBuf,
        timestamp: CaptureTimestamp,
    },
    /// The file was deliberately left in place.
    Skipped { source: PathBuf, reason: SkipReason },
    /// A filesystem operation failed; the file is still at `source`.
    Failed {
        source: PathBuf,
        error: RelocateError,
    },
}

/// Decision class of an [`Outcome`], without paths or error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Moved,
    SkippedNoTimestamp,
    SkippedInPlace,
    SkippedCollision,
    Failed,
}

impl Outcome {
    pub fn source(&self) -> &Path {
        match self {
            Outcome::Moved { source, .. }
            | Outcome::Skipped { source, .. }
            | Outcome::Failed { source, .. } => source,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Moved { .. } => OutcomeKind::Moved,
            Outcome::Skipped { reason, .. } => match reason {
                SkipReason::NoTimestamp(_) => OutcomeKind::SkippedNoTimestamp,
                SkipReason::AlreadyInPlace => OutcomeKind::SkippedInPlace,
                SkipReason::Collision { .. } => OutcomeKind::SkippedCollision,
            },
            Outcome::Failed { .. } => OutcomeKind::Failed,
        }
    }
}

/// Destinations reserved during one run. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct ClaimSet(Arc<Mutex<HashSet<PathBuf>>>);

impl ClaimSet {
    /// Reserves `destination`.
    ///
    /// Fails if another file of this run already holds it or if anything
    /// exists at that path on disk.
    fn try_claim(&self, destination: &Path) -> bool {
        let mut claimed = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if claimed.contains(destination) || fs::symlink_metadata(destination).is_ok() {
            return false;
        }
        claimed.insert(destination.to_path_buf());
        true
    }

    /// True if `path` was reserved as a destination in this run.
    pub fn contains(&self, path: &Path) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// Moves files under a fixed root into `<year>/<year-month-day>/`.
///
/// Safe to share between worker threads: destinations claimed during the run
/// are tracked so two files can never be sent to the same path.
pub struct Relocator<R> {
    root: PathBuf,
    reader: R,
    dry_run: bool,
    claimed: ClaimSet,
}

impl<R: MetadataReader> Relocator<R> {
    pub fn new(root: impl Into<PathBuf>, reader: R, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            reader,
            dry_run,
            claimed: ClaimSet::default(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// A handle on the destinations claimed so far. Files found there later
    /// in the same run arrived through this relocator.
    pub fn claims(&self) -> ClaimSet {
        self.claimed.clone()
    }

    /// Relocates a single file and reports what happened.
    ///
    /// Existing files are never overwritten. In dry-run mode the same
    /// decisions are taken but neither directories nor files are touched; a
    /// destination folder that could not be created is still reported as a
    /// failure.
    pub fn relocate(&self, file_path: &Path) -> Outcome {
        let source = file_path.to_path_buf();

        let timestamp = match self.reader.read(file_path) {
            Ok(ts) => ts,
            Err(e) => {
                debug!("No timestamp for {}: {}", file_path.display(), e);
                return Outcome::Skipped {
                    source,
                    reason: SkipReason::NoTimestamp(e),
                };
            }
        };

        let Some(destination) = plan_destination(&self.root, file_path, &timestamp) else {
            return Outcome::Failed {
                error: RelocateError::NoFileName(source.clone()),
                source,
            };
        };

        if destination == source {
            return Outcome::Skipped {
                source,
                reason: SkipReason::AlreadyInPlace,
            };
        }

        if !self.claimed.try_claim(&destination) {
            debug!(
                "Collision: {} is taken, leaving {}",
                destination.display(),
                source.display()
            );
            return Outcome::Skipped {
                source,
                reason: SkipReason::Collision { destination },
            };
        }

        let result = if self.dry_run {
            check_parent_creatable(&destination)
        } else {
            self.move_file(&source, &destination)
        };
        if let Err(error) = result {
            warn!("{}", error);
            return Outcome::Failed { source, error };
        }

        debug!("{} -> {}", source.display(), destination.display());
        Outcome::Moved {
            source,
            destination,
            timestamp,
        }
    }

    fn move_file(&self, source: &Path, destination: &Path) -> Result<(), RelocateError> {
        if let Some(parent) = destination.parent() {
            // create_dir_all tolerates directories created concurrently.
            fs::create_dir_all(parent).map_err(|e| RelocateError::DirectoryCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                copy_and_remove(source, destination)
            }
            Err(e) => Err(RelocateError::Move {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Dry-run stand-in for `create_dir_all`: the nearest existing ancestor of
/// the destination folder must be a directory.
fn check_parent_creatable(destination: &Path) -> Result<(), RelocateError> {
    let Some(parent) = destination.parent() else {
        return Ok(());
    };
    for ancestor in parent.ancestors() {
        let Ok(metadata) = fs::metadata(ancestor) else {
            continue;
        };
        if metadata.is_dir() {
            return Ok(());
        }
        return Err(RelocateError::DirectoryCreation {
            path: parent.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", ancestor.display()),
            ),
        });
    }
    Ok(())
}

/// Fallback for renames across filesystems.
fn copy_and_remove(source: &Path, destination: &Path) -> Result<(), RelocateError> {
    let move_error = |e: io::Error| RelocateError::Move {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    };

    fs::copy(source, destination).map_err(move_error)?;
    if let Err(e) = fs::remove_file(source) {
        // Keep a single copy: the source is still intact.
        let _ = fs::remove_file(destination);
        return Err(move_error(e));
    }
    Ok(())
}
