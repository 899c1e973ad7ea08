//! Patient records.
//!
//! A [`Patient`] is the single concrete record the registry stores: identity, the medical case
//! (symptoms, severity, diagnosis), admission state and a medication log. Admission is held as
//! an `Option<BedNumber>`, so a bed number can only exist while the patient is admitted.

use crate::beds::BedNumber;
use crate::{RegistryError, RegistryResult};
use clinic_types::NonEmptyText;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Registry-assigned patient identifier. Issued sequentially starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PatientId(u64);

impl PatientId {
    /// The id given to the first patient booked into an empty registry.
    pub const FIRST: PatientId = PatientId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The id issued after this one, or `None` once the id space is used up.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| RegistryError::InvalidInput(format!("invalid patient id '{s}'")))
    }
}

/// Case urgency on a 1 (lowest) to 5 (highest) scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const LOWEST: Severity = Severity(1);
    pub const HIGHEST: Severity = Severity(5);

    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidInput`] if `value` is outside 1..=5.
    pub fn new(value: u8) -> RegistryResult<Self> {
        if (Self::LOWEST.0..=Self::HIGHEST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RegistryError::InvalidInput(format!(
                "severity must be between {} and {}, got {value}",
                Self::LOWEST.0,
                Self::HIGHEST.0
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Severity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u8>()
            .map_err(|_| RegistryError::InvalidInput(format!("invalid severity '{s}'")))?;
        Self::new(value)
    }
}

/// A scheduled medication. The time is free text as entered by staff (e.g. `08:00`, `after
/// meals`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Medication {
    name: NonEmptyText,
    time: String,
}

impl Medication {
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidInput`] if `time` spans several lines.
    pub fn new(name: NonEmptyText, time: impl Into<String>) -> RegistryResult<Self> {
        let time = time.into();
        ensure_single_line("medication time", &time)?;
        Ok(Self { name, time })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn time(&self) -> &str {
        &self.time
    }
}

/// Rejects text that would break the line-oriented data file.
pub(crate) fn ensure_single_line(field: &str, value: &str) -> RegistryResult<()> {
    if value.contains(['\n', '\r']) {
        return Err(RegistryError::InvalidInput(format!(
            "{field} must fit on a single line"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Patient {
    name: String,
    age: u32,
    gender: String,
    id: PatientId,
    symptoms: String,
    severity: Severity,
    diagnosis: String,
    bed: Option<BedNumber>,
    medications: Vec<Medication>,
}

impl Patient {
    /// Creates a patient with the lowest severity, no diagnosis, not admitted and no
    /// medications.
    pub fn new(
        id: PatientId,
        name: impl Into<String>,
        age: u32,
        gender: impl Into<String>,
        symptoms: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            gender: gender.into(),
            id,
            symptoms: symptoms.into(),
            severity: Severity::default(),
            diagnosis: String::new(),
            bed: None,
            medications: Vec::new(),
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn symptoms(&self) -> &str {
        &self.symptoms
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    pub fn is_admitted(&self) -> bool {
        self.bed.is_some()
    }

    /// The bed held by the patient, `None` unless admitted.
    pub fn bed_number(&self) -> Option<BedNumber> {
        self.bed
    }

    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn medication_count(&self) -> usize {
        self.medications.len()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    pub fn set_gender(&mut self, gender: impl Into<String>) {
        self.gender = gender.into();
    }

    pub fn set_symptoms(&mut self, symptoms: impl Into<String>) {
        self.symptoms = symptoms.into();
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    pub fn set_diagnosis(&mut self, diagnosis: impl Into<String>) {
        self.diagnosis = diagnosis.into();
    }

    /// Assigns `bed` to the patient.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyAdmitted`] and leaves the record untouched if the
    /// patient already holds a bed.
    pub fn admit(&mut self, bed: BedNumber) -> RegistryResult<()> {
        if self.bed.is_some() {
            return Err(RegistryError::AlreadyAdmitted(self.id));
        }
        self.bed = Some(bed);
        Ok(())
    }

    /// Clears the admission and returns the bed the patient was holding.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAdmitted`] if the patient holds no bed.
    pub fn discharge(&mut self) -> RegistryResult<BedNumber> {
        self.bed.take().ok_or(RegistryError::NotAdmitted(self.id))
    }

    /// Appends a medication if the log holds fewer than `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MedicationCapacityExceeded`] when the log is full; the entry is
    /// not recorded.
    pub fn add_medication(
        &mut self,
        medication: Medication,
        capacity: usize,
    ) -> RegistryResult<()> {
        if self.medications.len() >= capacity {
            return Err(RegistryError::MedicationCapacityExceeded {
                id: self.id,
                capacity,
            });
        }
        self.medications.push(medication);
        Ok(())
    }

    /// Decoding path: capacity is checked by the registry once the whole file is loaded.
    pub(crate) fn push_medication(&mut self, medication: Medication) {
        self.medications.push(medication);
    }

    /// Renders the medication reminder list.
    pub fn medication_reminders(&self) -> String {
        let mut out = format!("Medications for {}:\n", self.name);
        for medication in &self.medications {
            out.push_str(&format!("- {} at {}\n", medication.name(), medication.time()));
        }
        out
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}\nAge: {}\nGender: {}\nPatient ID: {}\nSymptoms: {}\nSeverity: {}\nDiagnosis: {}\nAdmitted: {}",
            self.name,
            self.age,
            self.gender,
            self.id,
            self.symptoms,
            self.severity,
            self.diagnosis,
            if self.is_admitted() { "Yes" } else { "No" }
        )?;
        if let Some(bed) = self.bed {
            write!(f, "\nBed Number: {bed}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Patient {
        Patient::new(PatientId::FIRST, "Alice", 30, "F", "fever cough")
    }

    fn medication(name: &str, time: &str) -> Medication {
        Medication::new(NonEmptyText::new(name).unwrap(), time).unwrap()
    }

    #[test]
    fn next_id_stops_at_the_end_of_the_id_space() {
        assert_eq!(PatientId::FIRST.next(), Some(PatientId::new(2)));
        assert_eq!(PatientId::new(u64::MAX).next(), None);
    }

    #[test]
    fn new_patient_defaults() {
        let patient = alice();
        assert_eq!(patient.severity(), Severity::LOWEST);
        assert!(!patient.is_admitted());
        assert_eq!(patient.bed_number(), None);
        assert_eq!(patient.diagnosis(), "");
        assert_eq!(patient.medication_count(), 0);
    }

    #[test]
    fn admit_then_readmit_is_rejected() {
        let mut patient = alice();
        patient.admit(BedNumber::new(3)).unwrap();
        assert_eq!(patient.bed_number(), Some(BedNumber::new(3)));

        let err = patient.admit(BedNumber::new(4)).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyAdmitted(id) if id == PatientId::FIRST));
        assert_eq!(patient.bed_number(), Some(BedNumber::new(3)));
    }

    #[test]
    fn discharge_returns_bed_and_clears_admission() {
        let mut patient = alice();
        assert!(matches!(
            patient.discharge(),
            Err(RegistryError::NotAdmitted(_))
        ));

        patient.admit(BedNumber::new(0)).unwrap();
        assert_eq!(patient.discharge().unwrap(), BedNumber::new(0));
        assert!(!patient.is_admitted());
        assert_eq!(patient.bed_number(), None);
    }

    #[test]
    fn medication_log_is_capacity_bounded() {
        let mut patient = alice();
        patient.add_medication(medication("Ibuprofen", "08:00"), 2).unwrap();
        patient.add_medication(medication("Paracetamol", "12:00"), 2).unwrap();

        let err = patient
            .add_medication(medication("Codeine", "20:00"), 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MedicationCapacityExceeded { capacity: 2, .. }
        ));
        assert_eq!(patient.medication_count(), 2);
    }

    #[test]
    fn severity_range_is_enforced() {
        assert!(Severity::new(0).is_err());
        assert!(Severity::new(6).is_err());
        assert_eq!("5".parse::<Severity>().unwrap(), Severity::HIGHEST);
        assert!("high".parse::<Severity>().is_err());
    }

    #[test]
    fn medication_time_must_be_single_line() {
        let name = NonEmptyText::new("Ibuprofen").unwrap();
        assert!(Medication::new(name, "08:00\nAdmitted: Yes").is_err());
    }

    #[test]
    fn display_layout_includes_bed_only_when_admitted() {
        let mut patient = alice();
        patient.set_diagnosis("Possible diagnosis: Flu");
        assert_eq!(
            patient.to_string(),
            "Name: Alice\nAge: 30\nGender: F\nPatient ID: 1\nSymptoms: fever cough\nSeverity: 1\nDiagnosis: Possible diagnosis: Flu\nAdmitted: No"
        );

        patient.admit(BedNumber::new(7)).unwrap();
        assert!(patient.to_string().ends_with("Admitted: Yes\nBed Number: 7"));
    }

    #[test]
    fn reminders_list_every_medication() {
        let mut patient = alice();
        patient.add_medication(medication("Ibuprofen", "08:00"), 20).unwrap();
        patient.add_medication(medication("Paracetamol", "after meals"), 20).unwrap();

        assert_eq!(
            patient.medication_reminders(),
            "Medications for Alice:\n- Ibuprofen at 08:00\n- Paracetamol at after meals\n"
        );
    }
}
