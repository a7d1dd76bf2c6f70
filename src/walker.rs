//! Candidate discovery.
//!
//! [`TreeWalker`] walks the root depth-first in file-name order, pruning
//! excluded subtrees before descending, and yields JPEG files lazily.

use crate::folder_filter::ExclusionRule;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, IntoIter, WalkDir};

/// Extensions (lowercase, without the dot) of files eligible for relocation.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Returns true if the file's extension is in [`ACCEPTED_EXTENSIONS`],
/// ignoring case.
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Counters collected while a [`Walk`] is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Regular files seen in traversed directories.
    pub files: usize,
    /// Files among them with an accepted extension.
    pub candidates: usize,
    /// Traversed directories, the root included.
    pub directories: usize,
    /// Entries that could not be read.
    pub errors: usize,
}

/// Walks a root directory honoring an [`ExclusionRule`].
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    rule: ExclusionRule,
}

type EntryPredicate = Box<dyn FnMut(&DirEntry) -> bool + Send>;
type PathPredicate = Box<dyn Fn(&Path) -> bool + Send>;

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>, rule: ExclusionRule) -> Self {
        Self {
            root: root.into(),
            rule,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a fresh walk. Each walk is single-use.
    pub fn walk(&self) -> Walk {
        Walk {
            inner: self.entries(0),
            stats: WalkStats::default(),
            ignore: None,
        }
    }

    /// Every traversed directory below the root, in depth-first pre-order.
    ///
    /// Reversing the result gives an order in which every directory comes
    /// after all of its descendants.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.entries(1)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .map(DirEntry::into_path)
            .collect()
    }

    fn entries(&self, min_depth: usize) -> FilterEntry<IntoIter, EntryPredicate> {
        let rule = self.rule.clone();
        let predicate: EntryPredicate = Box::new(move |entry: &DirEntry| {
            // The root is always eligible, whatever its name.
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let allowed = rule.allows(&entry.file_name().to_string_lossy());
            if !allowed {
                debug!("Excluding curated folder {}", entry.path().display());
            }
            allowed
        });

        WalkDir::new(&self.root)
            .min_depth(min_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(predicate)
    }
}

/// A lazy sequence of candidate files.
pub struct Walk {
    inner: FilterEntry<IntoIter, EntryPredicate>,
    stats: WalkStats,
    ignore: Option<PathPredicate>,
}

impl Walk {
    /// Passes over files for which `predicate` holds, without counting them.
    ///
    /// Directories are read lazily, so a file moved ahead of the walk during
    /// the same run would otherwise be seen a second time.
    pub fn ignoring(mut self, predicate: impl Fn(&Path) -> bool + Send + 'static) -> Self {
        self.ignore = Some(Box::new(predicate));
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }
}

impl Iterator for Walk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    self.stats.errors += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                self.stats.directories += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            if self.ignore.as_ref().is_some_and(|ignore| ignore(entry.path())) {
                debug!("Already placed in this run: {}", entry.path().display());
                continue;
            }

            self.stats.files += 1;
            if has_accepted_extension(entry.path()) {
                self.stats.candidates += 1;
                return Some(entry.into_path());
            }
        }
    }
}
