//! Format V2: V1 records followed by medication entries.

use super::lines::LineCursor;
use super::v1;
use super::{DecodeError, DecodeErrorKind};
use crate::patient::{Medication, Patient};
use clinic_types::NonEmptyText;

const MEDICATION: &str = "Medication";
const MEDICATION_TIME: &str = "Medication Time";

pub(super) fn encode_record(patient: &Patient, out: &mut String) {
    v1::encode_record(patient, out);
    for medication in patient.medications() {
        out.push_str(&format!("{MEDICATION}: {}\n", medication.name()));
        out.push_str(&format!("{MEDICATION_TIME}: {}\n", medication.time()));
    }
}

pub(super) fn decode_record(lines: &mut LineCursor<'_>) -> Result<Patient, DecodeError> {
    let mut patient = v1::decode_record(lines)?;

    while lines.next_is(MEDICATION) {
        let (line, name) = lines.field(MEDICATION)?;
        let (_, time) = lines.field(MEDICATION_TIME)?;
        let invalid = || {
            DecodeError::new(
                line,
                DecodeErrorKind::InvalidValue {
                    field: MEDICATION,
                    value: name.to_string(),
                },
            )
        };
        let name = NonEmptyText::new(name).map_err(|_| invalid())?;
        let medication = Medication::new(name, time).map_err(|_| invalid())?;
        patient.push_medication(medication);
    }

    Ok(patient)
}
