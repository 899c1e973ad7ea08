//! Format V1: the legacy header-less record layout.

use super::lines::LineCursor;
use super::{DecodeError, DecodeErrorKind};
use crate::beds::BedNumber;
use crate::patient::{Patient, PatientId, Severity};

pub(super) const NAME: &str = "Name";
pub(super) const AGE: &str = "Age";
pub(super) const GENDER: &str = "Gender";
pub(super) const PATIENT_ID: &str = "Patient ID";
pub(super) const SYMPTOMS: &str = "Symptoms";
pub(super) const SEVERITY: &str = "Severity";
pub(super) const DIAGNOSIS: &str = "Diagnosis";
pub(super) const ADMITTED: &str = "Admitted";
pub(super) const BED_NUMBER: &str = "Bed Number";

pub(super) fn encode_record(patient: &Patient, out: &mut String) {
    out.push_str(&format!("{NAME}: {}\n", patient.name()));
    out.push_str(&format!("{AGE}: {}\n", patient.age()));
    out.push_str(&format!("{GENDER}: {}\n", patient.gender()));
    out.push_str(&format!("{PATIENT_ID}: {}\n", patient.id()));
    out.push_str(&format!("{SYMPTOMS}: {}\n", patient.symptoms()));
    out.push_str(&format!("{SEVERITY}: {}\n", patient.severity()));
    out.push_str(&format!("{DIAGNOSIS}: {}\n", patient.diagnosis()));
    match patient.bed_number() {
        Some(bed) => {
            out.push_str(&format!("{ADMITTED}: Yes\n"));
            out.push_str(&format!("{BED_NUMBER}: {bed}\n"));
        }
        None => out.push_str(&format!("{ADMITTED}: No\n")),
    }
}

pub(super) fn decode_record(lines: &mut LineCursor<'_>) -> Result<Patient, DecodeError> {
    let (_, name) = lines.field(NAME)?;
    let age: u32 = lines.parsed(AGE)?;
    let (_, gender) = lines.field(GENDER)?;
    let id: PatientId = lines.parsed(PATIENT_ID)?;
    let (_, symptoms) = lines.field(SYMPTOMS)?;
    let severity: Severity = lines.parsed(SEVERITY)?;
    let (_, diagnosis) = lines.field(DIAGNOSIS)?;

    let mut patient = Patient::new(id, name, age, gender, symptoms);
    patient.set_severity(severity);
    patient.set_diagnosis(diagnosis);

    let (line, admitted) = lines.field(ADMITTED)?;
    match admitted {
        "Yes" => {
            let bed: BedNumber = lines.parsed(BED_NUMBER)?;
            // A freshly built record is never admitted.
            let _ = patient.admit(bed);
        }
        "No" => {}
        other => {
            return Err(DecodeError::new(
                line,
                DecodeErrorKind::InvalidValue {
                    field: ADMITTED,
                    value: other.to_string(),
                },
            ))
        }
    }

    Ok(patient)
}
