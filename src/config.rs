//! Run configuration.
//!
//! There is no configuration file: an [`ArrangeConfig`] is assembled from
//! command-line flags and validated once, before any file is touched.
//!
//! ```no_run
//! use phototidy::config::ArrangeConfig;
//!
//! let config = ArrangeConfig::new(std::path::Path::new("/media/photos"))?
//!     .with_dry_run(true)
//!     .with_workers(Some(4));
//! # Ok::<(), phototidy::error::InvocationError>(())
//! ```

use crate::error::InvocationError;
use crate::folder_filter::ExclusionRule;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one invocation.
#[derive(Debug, Clone)]
pub struct ArrangeConfig {
    root: PathBuf,
    dry_run: bool,
    verbose: bool,
    workers: Option<usize>,
    reclaim: bool,
    any_date_tag: bool,
    exclusion: ExclusionRule,
}

impl ArrangeConfig {
    /// Validates `root` and returns a configuration with default settings.
    ///
    /// The root is canonicalized so that computed destinations and walked
    /// paths share the same form.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationError`] if the root is missing, is not a
    /// directory, or cannot be listed.
    pub fn new(root: &Path) -> Result<Self, InvocationError> {
        Ok(Self {
            root: validate_root(root)?,
            dry_run: false,
            verbose: false,
            workers: None,
            reclaim: true,
            any_date_tag: false,
            exclusion: ExclusionRule::default(),
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// `None` lets the worker pool size itself to the machine.
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_reclaim(mut self, reclaim: bool) -> Self {
        self.reclaim = reclaim;
        self
    }

    pub fn with_any_date_tag(mut self, any_date_tag: bool) -> Self {
        self.any_date_tag = any_date_tag;
        self
    }

    pub fn with_exclusion(mut self, exclusion: ExclusionRule) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    pub fn reclaim(&self) -> bool {
        self.reclaim
    }

    pub fn any_date_tag(&self) -> bool {
        self.any_date_tag
    }

    pub fn exclusion(&self) -> &ExclusionRule {
        &self.exclusion
    }
}

/// Checks that `root` is an existing, listable directory.
fn validate_root(root: &Path) -> Result<PathBuf, InvocationError> {
    let canonical = fs::canonicalize(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => InvocationError::RootNotFound(root.to_path_buf()),
        _ => InvocationError::RootUnreadable {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !canonical.is_dir() {
        return Err(InvocationError::RootNotDirectory(root.to_path_buf()));
    }

    fs::read_dir(&canonical).map_err(|e| InvocationError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(canonical)
}

/// Rejects a zero worker count.
pub fn validate_workers(workers: Option<usize>) -> Result<Option<usize>, InvocationError> {
    match workers {
        Some(0) => Err(InvocationError::InvalidWorkerCount),
        other => Ok(other),
    }
}
