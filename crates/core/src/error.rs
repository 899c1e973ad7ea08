use crate::beds::BedNumber;
use crate::codec::DecodeError;
use crate::patient::PatientId;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] clinic_types::TextError),

    #[error("hospital at full capacity ({capacity} patients)")]
    PatientCapacityExceeded { capacity: usize },
    #[error("medication list for patient {id} is full ({capacity} entries)")]
    MedicationCapacityExceeded { id: PatientId, capacity: usize },
    #[error("no available beds")]
    NoBedAvailable,
    #[error("patient ids exhausted, highest issued id is {0}")]
    PatientIdsExhausted(PatientId),

    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("patient {0} is already admitted")]
    AlreadyAdmitted(PatientId),
    #[error("patient {0} is not admitted")]
    NotAdmitted(PatientId),

    #[error("bed {bed} is outside the bed pool (size {bed_count})")]
    BedOutOfRange { bed: BedNumber, bed_count: usize },
    #[error("bed {0} is already occupied")]
    BedOccupied(BedNumber),

    #[error("stored data does not fit the configured capacity: {0}")]
    StoredDataExceedsCapacity(String),
    #[error("failed to decode data file {path}: {source}", path = .path.display())]
    Decode {
        path: std::path::PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("invalid disease catalogue: {0}")]
    Catalogue(String),

    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
