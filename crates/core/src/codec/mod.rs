//! On-disk record format.
//!
//! The data file is a line-oriented text document holding every patient. Each record is a run
//! of `Label: value` lines in a fixed order, terminated by a `---` line.
//!
//! Two versions exist:
//!
//! - **V1** has no header and carries exactly the fields below. It is the layout the clinic's
//!   data files have always used, so medications are not persisted.
//! - **V2** starts with a `Format-Version: 2` line and lets each record carry medication
//!   entries after the admission lines.
//!
//! ```text
//! Name: Alice
//! Age: 30
//! Gender: F
//! Patient ID: 1
//! Symptoms: fever cough
//! Severity: 1
//! Diagnosis: Possible diagnosis: Flu
//! Admitted: Yes
//! Bed Number: 0
//! Medication: Ibuprofen          (V2 only, repeated)
//! Medication Time: 08:00         (V2 only, repeated)
//! ---
//! ```
//!
//! Decoding checks every label, parses every value and fails with a [`DecodeError`] naming the
//! line instead of guessing.

mod lines;
mod v1;
mod v2;

use crate::constants::{LATEST_FORMAT, RECORD_SEPARATOR};
use crate::patient::{Patient, PatientId};
use crate::RegistryError;
use lines::LineCursor;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Header line label announcing the format version.
const VERSION_LABEL: &str = "Format-Version";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    V1,
    V2,
}

impl FormatVersion {
    pub fn number(self) -> u8 {
        match self {
            FormatVersion::V1 => 1,
            FormatVersion::V2 => 2,
        }
    }

    fn from_number(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(FormatVersion::V1),
            "2" => Some(FormatVersion::V2),
            _ => None,
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for FormatVersion {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        Self::from_number(number).ok_or_else(|| {
            RegistryError::InvalidInput(format!(
                "unsupported format version '{s}', expected 1 to {LATEST_FORMAT}"
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    #[error("expected '{expected}:' line, found end of file")]
    UnexpectedEof { expected: &'static str },
    #[error("expected '{expected}:' line, found '{found}'")]
    UnexpectedLine {
        expected: &'static str,
        found: String,
    },
    #[error("expected record separator '---', found {}", .found.as_deref().unwrap_or("end of file"))]
    MissingSeparator { found: Option<String> },
    #[error("invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },
    #[error("unsupported format version '{0}'")]
    UnsupportedVersion(String),
    #[error("duplicate patient id {0}")]
    DuplicatePatientId(PatientId),
}

/// A decoding failure and the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct DecodeError {
    pub line: usize,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(line: usize, kind: DecodeErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Result of decoding a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub version: FormatVersion,
    pub patients: Vec<Patient>,
}

/// Encode every patient using the given format version.
pub fn encode(patients: &[Patient], version: FormatVersion) -> String {
    let mut out = String::new();
    if version != FormatVersion::V1 {
        out.push_str(&format!("{VERSION_LABEL}: {version}\n"));
    }

    for patient in patients {
        match version {
            FormatVersion::V1 => v1::encode_record(patient, &mut out),
            FormatVersion::V2 => v2::encode_record(patient, &mut out),
        }
        out.push_str(RECORD_SEPARATOR);
        out.push('\n');
    }

    out
}

/// Decode a data file, detecting its format version from the first line.
///
/// An empty document decodes to an empty patient list.
pub fn decode(text: &str) -> Result<Decoded, DecodeError> {
    let mut lines = LineCursor::new(text);

    let version = if lines.next_is(VERSION_LABEL) {
        let (line, value) = lines.field(VERSION_LABEL)?;
        FormatVersion::from_number(value).ok_or_else(|| {
            DecodeError::new(line, DecodeErrorKind::UnsupportedVersion(value.to_string()))
        })?
    } else {
        FormatVersion::V1
    };

    let mut patients = Vec::new();
    let mut seen = HashSet::new();

    loop {
        lines.skip_blank();
        let Some(start) = lines.peek_line_number() else {
            break;
        };

        let patient = match version {
            FormatVersion::V1 => v1::decode_record(&mut lines)?,
            FormatVersion::V2 => v2::decode_record(&mut lines)?,
        };
        lines.separator()?;

        if !seen.insert(patient.id()) {
            return Err(DecodeError::new(
                start,
                DecodeErrorKind::DuplicatePatientId(patient.id()),
            ));
        }
        patients.push(patient);
    }

    Ok(Decoded { version, patients })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beds::BedNumber;
    use crate::patient::{Medication, Severity};
    use clinic_types::NonEmptyText;

    fn sample_patients() -> Vec<Patient> {
        let mut alice = Patient::new(PatientId::new(1), "Alice", 30, "F", "fever cough");
        alice.set_diagnosis("Possible diagnosis: Flu");
        alice.admit(BedNumber::new(0)).unwrap();
        alice
            .add_medication(
                Medication::new(NonEmptyText::new("Ibuprofen").unwrap(), "08:00").unwrap(),
                20,
            )
            .unwrap();

        let mut bob = Patient::new(PatientId::new(2), "Bob Stone", 61, "M", "runny nose");
        bob.set_severity(Severity::new(4).unwrap());
        bob.set_diagnosis("Possible diagnosis: Common Cold");

        let carol = Patient::new(PatientId::new(3), "", 9, "F", "");

        vec![bob, alice, carol]
    }

    #[test]
    fn v1_layout_matches_existing_data_files() {
        let mut patient = Patient::new(PatientId::new(4), "Dana", 52, "F", "headache");
        patient.set_diagnosis("Possible diagnosis: Flu");
        patient.admit(BedNumber::new(12)).unwrap();

        let expected = "Name: Dana\nAge: 52\nGender: F\nPatient ID: 4\nSymptoms: headache\nSeverity: 1\nDiagnosis: Possible diagnosis: Flu\nAdmitted: Yes\nBed Number: 12\n---\n";
        assert_eq!(encode(&[patient], FormatVersion::V1), expected);
    }

    #[test]
    fn encoding_is_stable_across_a_round_trip() {
        let patients = sample_patients();
        for version in [FormatVersion::V1, FormatVersion::V2] {
            let first = encode(&patients, version);
            let decoded = decode(&first).expect("decode should succeed");
            assert_eq!(decoded.version, version);
            assert_eq!(encode(&decoded.patients, version), first);
        }
    }

    #[test]
    fn v1_drops_medications_and_v2_keeps_them() {
        let patients = sample_patients();

        let v1 = decode(&encode(&patients, FormatVersion::V1)).unwrap();
        assert!(v1.patients.iter().all(|p| p.medications().is_empty()));

        let v2 = decode(&encode(&patients, FormatVersion::V2)).unwrap();
        assert_eq!(v2.patients, patients);
    }

    #[test]
    fn record_order_is_preserved() {
        let patients = sample_patients();
        let decoded = decode(&encode(&patients, FormatVersion::V1)).unwrap();
        let ids: Vec<u64> = decoded.patients.iter().map(|p| p.id().get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn empty_document_has_no_patients() {
        assert!(decode("").unwrap().patients.is_empty());
        assert!(decode("\n\n").unwrap().patients.is_empty());
        let v2 = decode("Format-Version: 2\n").unwrap();
        assert_eq!(v2.version, FormatVersion::V2);
        assert!(v2.patients.is_empty());
    }

    #[test]
    fn truncated_record_reports_end_of_file() {
        let text = "Name: Alice\nAge: 30\nGender: F\n";
        let err = decode(text).unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(
            err.kind,
            DecodeErrorKind::UnexpectedEof {
                expected: "Patient ID"
            }
        );
    }

    #[test]
    fn reordered_fields_are_rejected() {
        let text = "Name: Alice\nGender: F\nAge: 30\n";
        let err = decode(text).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(
            err.kind,
            DecodeErrorKind::UnexpectedLine { expected: "Age", .. }
        ));
    }

    #[test]
    fn out_of_range_severity_is_rejected() {
        let text = "Name: A\nAge: 1\nGender: F\nPatient ID: 1\nSymptoms: x\nSeverity: 9\nDiagnosis: d\nAdmitted: No\n---\n";
        let err = decode(text).unwrap_err();
        assert_eq!(err.line, 6);
        assert!(matches!(
            err.kind,
            DecodeErrorKind::InvalidValue {
                field: "Severity",
                ..
            }
        ));
    }

    #[test]
    fn admission_flag_must_be_yes_or_no() {
        let text = "Name: A\nAge: 1\nGender: F\nPatient ID: 1\nSymptoms: x\nSeverity: 2\nDiagnosis: d\nAdmitted: maybe\n---\n";
        let err = decode(text).unwrap_err();
        assert_eq!(err.line, 8);
    }

    #[test]
    fn missing_separator_is_rejected() {
        let text = "Name: A\nAge: 1\nGender: F\nPatient ID: 1\nSymptoms: x\nSeverity: 2\nDiagnosis: d\nAdmitted: No\n";
        let err = decode(text).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MissingSeparator { found: None });
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let record = "Name: A\nAge: 1\nGender: F\nPatient ID: 7\nSymptoms: x\nSeverity: 2\nDiagnosis: d\nAdmitted: No\n---\n";
        let err = decode(&format!("{record}{record}")).unwrap_err();
        assert_eq!(err.line, 10);
        assert_eq!(
            err.kind,
            DecodeErrorKind::DuplicatePatientId(PatientId::new(7))
        );
    }

    #[test]
    fn unknown_version_header_is_rejected() {
        let err = decode("Format-Version: 9\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(
            err.kind,
            DecodeErrorKind::UnsupportedVersion("9".to_string())
        );
    }

    #[test]
    fn format_version_parsing() {
        assert_eq!("1".parse::<FormatVersion>().unwrap(), FormatVersion::V1);
        assert_eq!("v2".parse::<FormatVersion>().unwrap(), FormatVersion::V2);
        let err = "3".parse::<FormatVersion>().unwrap_err();
        assert!(err.to_string().contains("expected 1 to 2"));
    }
}
