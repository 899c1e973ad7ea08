//! Constants used throughout the clinic core crate.
//!
//! Capacity defaults mirror the limits the clinic has always run with. They are defaults only:
//! [`crate::config::CoreConfig`] carries the values actually enforced at runtime.

use crate::codec::FormatVersion;

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "hospital_data.txt";

/// Default maximum number of patients held by the registry.
pub const DEFAULT_MAX_PATIENTS: usize = 100;

/// Default number of beds in the ward.
pub const DEFAULT_BED_COUNT: usize = 50;

/// Default maximum number of medications recorded per patient.
pub const DEFAULT_MAX_MEDICATIONS: usize = 20;

/// Maximum number of keywords a single disease may list.
pub const MAX_DISEASE_KEYWORDS: usize = 5;

/// Maximum number of diseases in a catalogue.
pub const MAX_DISEASES: usize = 10;

/// Format written when nothing else is configured. V1 keeps the data file readable by older
/// installs.
pub const DEFAULT_FORMAT: FormatVersion = FormatVersion::V1;

/// Latest supported on-disk format.
pub const LATEST_FORMAT: FormatVersion = FormatVersion::V2;

/// Line written between patient records.
pub const RECORD_SEPARATOR: &str = "---";

/// Line written between patients in the human-readable listing.
pub const DISPLAY_SEPARATOR: &str = "-----------------";
