//! # Clinic Core
//!
//! Patient registry logic for a single clinic:
//! - Appointment booking with sequential patient ids and severity ordering
//! - Bed allocation against a fixed pool
//! - Medication tracking and reminders
//! - Keyword-based diagnosis against a configurable disease catalogue
//! - Persistence to a line-oriented text file
//!
//! **No presentation concerns**: menus, argument parsing and output formatting belong in the
//! `clinic-run` and `clinic-cli` binaries.

pub mod beds;
pub mod codec;
pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod error;
pub mod patient;
pub mod registry;
pub mod store;

pub use beds::{BedNumber, BedPool};
pub use clinic_types::NonEmptyText;
pub use codec::FormatVersion;
pub use config::{Capacity, CoreConfig};
pub use diagnosis::{DiagnosisMatch, Disease, DiseaseCatalogue};
pub use error::{RegistryError, RegistryResult};
pub use patient::{Medication, Patient, PatientId, Severity};
pub use registry::{BedOccupancy, HospitalRegistry};
pub use store::RecordStore;
