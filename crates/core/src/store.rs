//! Data file storage.
//!
//! The whole patient collection is rewritten on every save. Writes go to a temporary file in
//! the same directory which is then renamed over the data file, so a crash mid-write leaves the
//! previous file intact.

use crate::codec::{self, FormatVersion};
use crate::config::CoreConfig;
use crate::patient::Patient;
use crate::{RegistryError, RegistryResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct RecordStore {
    path: PathBuf,
    format: FormatVersion,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, format: FormatVersion) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.data_file(), cfg.format_version())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format used when saving. Loading accepts every supported version.
    pub fn format(&self) -> FormatVersion {
        self.format
    }

    /// Reads every patient from the data file.
    ///
    /// A missing data file is a first run and yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::FileRead`] if the file exists but cannot be read and
    /// [`RegistryError::Decode`] if its content is malformed.
    pub fn load(&self) -> RegistryResult<Vec<Patient>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no data file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RegistryError::FileRead(e)),
        };

        let decoded = codec::decode(&text).map_err(|source| RegistryError::Decode {
            path: self.path.clone(),
            source,
        })?;

        if decoded.version != self.format {
            tracing::info!(
                path = %self.path.display(),
                found = %decoded.version,
                configured = %self.format,
                "data file will be rewritten in the configured format on next save"
            );
        }

        tracing::debug!(
            path = %self.path.display(),
            patients = decoded.patients.len(),
            "loaded data file"
        );
        Ok(decoded.patients)
    }

    /// Atomically replaces the data file with the encoded collection.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::FileWrite`] if the directory cannot be created or the temporary
    /// file cannot be written, synced or renamed.
    pub fn save(&self, patients: &[Patient]) -> RegistryResult<()> {
        let encoded = codec::encode(patients, self.format);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(RegistryError::FileWrite)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(RegistryError::FileWrite)?;
        tmp.write_all(encoded.as_bytes())
            .map_err(RegistryError::FileWrite)?;
        tmp.as_file().sync_all().map_err(RegistryError::FileWrite)?;
        tmp.persist(&self.path)
            .map_err(|e| RegistryError::FileWrite(e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            patients = patients.len(),
            format = %self.format,
            "saved data file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beds::BedNumber;
    use crate::patient::PatientId;
    use tempfile::TempDir;

    fn patients() -> Vec<Patient> {
        let mut alice = Patient::new(PatientId::new(1), "Alice", 30, "F", "fever cough");
        alice.admit(BedNumber::new(2)).unwrap();
        let bob = Patient::new(PatientId::new(2), "Bob", 45, "M", "sneezing");
        vec![alice, bob]
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = RecordStore::new(dir.path().join("hospital_data.txt"), FormatVersion::V1);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = RecordStore::new(dir.path().join("hospital_data.txt"), FormatVersion::V1);

        store.save(&patients()).unwrap();
        assert_eq!(store.load().unwrap(), patients());
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("ward").join("a").join("data.txt");
        let store = RecordStore::new(&path, FormatVersion::V2);

        store.save(&patients()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = RecordStore::new(dir.path().join("hospital_data.txt"), FormatVersion::V1);

        store.save(&patients()).unwrap();
        store.save(&patients()[..1]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("hospital_data.txt")]);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn malformed_file_reports_path_and_line() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("hospital_data.txt");
        fs::write(&path, "Name: Alice\nAge: old\n").unwrap();

        let err = RecordStore::new(&path, FormatVersion::V1)
            .load()
            .unwrap_err();
        match err {
            RegistryError::Decode { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.line, 2);
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn from_config_takes_path_and_format() {
        let cfg = CoreConfig::new(
            "ward/data.txt".into(),
            FormatVersion::V2,
            Default::default(),
            None,
        )
        .expect("CoreConfig::new should succeed");
        let store = RecordStore::from_config(&cfg);
        assert_eq!(store.path(), Path::new("ward/data.txt"));
        assert_eq!(store.format(), FormatVersion::V2);
    }

    #[test]
    fn reads_either_version_regardless_of_configured_format() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("hospital_data.txt");

        RecordStore::new(&path, FormatVersion::V2)
            .save(&patients())
            .unwrap();
        let loaded = RecordStore::new(&path, FormatVersion::V1).load().unwrap();
        assert_eq!(loaded, patients());
    }
}
