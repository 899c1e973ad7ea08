//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup (by the binaries, from the environment and
//! command-line flags) and then passed into the registry as an `Arc<CoreConfig>`. Nothing in
//! this crate reads environment variables.

use crate::codec::FormatVersion;
use crate::constants::{
    DEFAULT_BED_COUNT, DEFAULT_DATA_FILE, DEFAULT_FORMAT, DEFAULT_MAX_MEDICATIONS,
    DEFAULT_MAX_PATIENTS,
};
use crate::diagnosis::DiseaseCatalogue;
use crate::{RegistryError, RegistryResult};
use std::path::{Path, PathBuf};

/// Capacity limits enforced by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capacity {
    pub max_patients: usize,
    pub bed_count: usize,
    pub max_medications: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            max_patients: DEFAULT_MAX_PATIENTS,
            bed_count: DEFAULT_BED_COUNT,
            max_medications: DEFAULT_MAX_MEDICATIONS,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
    format_version: FormatVersion,
    capacity: Capacity,
    disease_catalogue: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidInput`] if the data file path is empty or any capacity is
    /// zero.
    pub fn new(
        data_file: PathBuf,
        format_version: FormatVersion,
        capacity: Capacity,
        disease_catalogue: Option<PathBuf>,
    ) -> RegistryResult<Self> {
        if data_file.as_os_str().is_empty() {
            return Err(RegistryError::InvalidInput(
                "data file path cannot be empty".into(),
            ));
        }

        for (name, value) in [
            ("max_patients", capacity.max_patients),
            ("bed_count", capacity.bed_count),
            ("max_medications", capacity.max_medications),
        ] {
            if value == 0 {
                return Err(RegistryError::InvalidInput(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        Ok(Self {
            data_file,
            format_version,
            capacity,
            disease_catalogue,
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn format_version(&self) -> FormatVersion {
        self.format_version
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn disease_catalogue_path(&self) -> Option<&Path> {
        self.disease_catalogue.as_deref()
    }

    /// Load the configured disease catalogue, falling back to the seed catalogue when no file
    /// is configured.
    pub fn load_disease_catalogue(&self) -> RegistryResult<DiseaseCatalogue> {
        match &self.disease_catalogue {
            Some(path) => DiseaseCatalogue::load(path),
            None => Ok(DiseaseCatalogue::seeded()),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            format_version: DEFAULT_FORMAT,
            capacity: Capacity::default(),
            disease_catalogue: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the on-disk format version from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default format.
pub fn format_version_from_env_value(value: Option<String>) -> RegistryResult<FormatVersion> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<FormatVersion>())
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_FORMAT))
}

/// Parse a capacity limit from an optional string value.
///
/// `name` is only used in the error message.
pub fn capacity_from_env_value(
    name: &str,
    value: Option<String>,
    default: usize,
) -> RegistryResult<usize> {
    match non_blank(value) {
        None => Ok(default),
        Some(v) => v.parse::<usize>().map_err(|_| {
            RegistryError::InvalidInput(format!("{name} must be a positive integer, got '{v}'"))
        }),
    }
}

/// Resolve all three capacity limits from optional string values, defaulting each one.
pub fn capacity_from_env_values(
    max_patients: Option<String>,
    bed_count: Option<String>,
    max_medications: Option<String>,
) -> RegistryResult<Capacity> {
    Ok(Capacity {
        max_patients: capacity_from_env_value(
            "CLINIC_MAX_PATIENTS",
            max_patients,
            DEFAULT_MAX_PATIENTS,
        )?,
        bed_count: capacity_from_env_value("CLINIC_BED_COUNT", bed_count, DEFAULT_BED_COUNT)?,
        max_medications: capacity_from_env_value(
            "CLINIC_MAX_MEDICATIONS",
            max_medications,
            DEFAULT_MAX_MEDICATIONS,
        )?,
    })
}

/// Resolve the data file path, using the default name when nothing is supplied.
pub fn data_file_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}
