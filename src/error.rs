//! Error types for phototidy.
//!
//! Three classes of failure exist:
//! - [`MetadataError`]: a file has no usable capture timestamp. The file is
//!   skipped and left in place.
//! - [`RelocateError`]: creating a destination directory or moving a file
//!   failed. Recorded as a per-file failure; the run continues.
//! - [`InvocationError`]: the run cannot start at all (bad root, bad flags).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a capture timestamp could not be read from a file.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The file vanished between the walk and the read.
    #[error("file not found")]
    NotFound,

    /// The file could not be opened or read.
    #[error("file is unreadable: {0}")]
    Unreadable(#[source] io::Error),

    /// The file carries no metadata, or none of the date tags.
    #[error("no capture timestamp tag")]
    NoTimestampTag,

    /// A date tag was present but its value could not be parsed.
    #[error("malformed metadata: {0}")]
    Malformed(String),
}

/// A filesystem failure while relocating one file.
#[derive(Error, Debug)]
pub enum RelocateError {
    /// The destination directory chain could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rename (or cross-device copy) failed.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path has no final component to keep as the file name.
    #[error("path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
}

/// Fatal errors raised before any file is touched.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("root path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("root path is unreadable {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid exclusion pattern '{pattern}': {reason}")]
    InvalidExclusionPattern { pattern: String, reason: String },

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),
}

impl MetadataError {
    /// Classifies an I/O error raised while opening or reading a file.
    pub fn from_io(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Unreadable(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_not_found() {
        let err = MetadataError::from_io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, MetadataError::NotFound));
    }

    #[test]
    fn test_from_io_permission_denied_is_unreadable() {
        let err = MetadataError::from_io(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(matches!(err, MetadataError::Unreadable(_)));
    }

    #[test]
    fn test_invocation_error_messages() {
        let err = InvocationError::RootNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "root path does not exist: /missing");
        assert_eq!(
            InvocationError::InvalidWorkerCount.to_string(),
            "worker count must be at least 1"
        );
    }
}
