//! phototidy - sort photos into date folders by their capture time
//!
//! This library walks a photo tree, reads each JPEG's EXIF capture
//! timestamp, moves the file to `<root>/<year>/<year-month-day>/`, and then
//! removes the directories the moves left empty. Folders renamed by hand
//! (any name containing a letter) are never entered.

pub mod arranger;
pub mod cli;
pub mod config;
pub mod error;
pub mod folder_filter;
pub mod metadata;
pub mod output;
pub mod planner;
pub mod reclaimer;
pub mod relocator;
pub mod signal;
pub mod walker;

pub use arranger::{Arranger, RunReport};
pub use config::ArrangeConfig;
pub use error::{InvocationError, MetadataError, RelocateError};
pub use folder_filter::ExclusionRule;
pub use metadata::{CaptureTimestamp, ExifReader, MetadataReader};
pub use reclaimer::{ReclaimReport, Reclaimer};
pub use relocator::{ClaimSet, Outcome, OutcomeKind, Relocator, SkipReason};
pub use walker::TreeWalker;

pub use cli::{Cli, run_cli};
