//! Capture timestamp extraction from photo metadata.
//!
//! The [`MetadataReader`] trait is the seam between the relocation engine and
//! the EXIF decoder. [`ExifReader`] is the production implementation; tests
//! substitute an in-memory map.
//!
//! # Examples
//!
//! ```
//! use phototidy::metadata::parse_capture_timestamp;
//!
//! let ts = parse_capture_timestamp("2018:12:09 14:30:00").unwrap();
//! assert_eq!((ts.year(), ts.month(), ts.day()), (2018, 12, 9));
//! ```

use crate::error::MetadataError;
use chrono::{Datelike, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Textual layout of EXIF date values after `-` has been folded to `:`.
const TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// The date and time a photo was taken, as naive local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureTimestamp(NaiveDateTime);

impl CaptureTimestamp {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for CaptureTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Parses an EXIF date string such as `2018:12:09 14:30:00`.
///
/// `-` is accepted as a separator anywhere `:` is expected, and surrounding
/// whitespace or trailing NUL padding is ignored.
pub fn parse_capture_timestamp(raw: &str) -> Result<CaptureTimestamp, MetadataError> {
    let normalized = raw
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .replace('-', ":");

    NaiveDateTime::parse_from_str(&normalized, TIMESTAMP_FORMAT)
        .map(CaptureTimestamp)
        .map_err(|e| MetadataError::Malformed(format!("'{}': {}", raw.trim(), e)))
}

/// Anything that can tell when a file was captured.
pub trait MetadataReader: Sync {
    fn read(&self, path: &Path) -> Result<CaptureTimestamp, MetadataError>;
}

/// Reads the capture timestamp from a file's EXIF block.
///
/// Tags are consulted in priority order and the first one holding a
/// parseable value wins.
#[derive(Debug, Clone)]
pub struct ExifReader {
    tags: Vec<Tag>,
}

impl ExifReader {
    /// Only `DateTimeOriginal`, the moment the shutter fired.
    pub fn new() -> Self {
        Self::with_tags(vec![Tag::DateTimeOriginal])
    }

    /// `DateTimeOriginal`, then `DateTimeDigitized`, then the IFD0 `DateTime`.
    pub fn any_date_tag() -> Self {
        Self::with_tags(vec![Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime])
    }

    pub fn with_tags(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

impl Default for ExifReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataReader for ExifReader {
    fn read(&self, path: &Path) -> Result<CaptureTimestamp, MetadataError> {
        // The handle is dropped on every return path, including decode errors.
        let file = File::open(path).map_err(MetadataError::from_io)?;
        let mut reader = BufReader::new(file);

        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| match e {
                exif::Error::Io(io) => MetadataError::from_io(io),
                exif::Error::NotFound(_) => MetadataError::NoTimestampTag,
                other => MetadataError::Malformed(other.to_string()),
            })?;

        let mut last_error = None;
        for tag in &self.tags {
            let Some(field) = exif.get_field(*tag, In::PRIMARY) else {
                continue;
            };
            let Value::Ascii(ref values) = field.value else {
                last_error = Some(MetadataError::Malformed(format!(
                    "{} is not an ASCII value",
                    tag
                )));
                continue;
            };
            let Some(raw) = values.first() else {
                continue;
            };
            match parse_capture_timestamp(&String::from_utf8_lossy(raw)) {
                Ok(ts) => return Ok(ts),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(MetadataError::NoTimestampTag))
    }
}
