//! The clinic registry.
//!
//! [`HospitalRegistry`] owns every patient, the bed pool and the disease catalogue, and is the
//! only place where they change together. Mutating operations take `&mut self`; each one either
//! applies completely or leaves the registry untouched, and then rewrites the data file.
//!
//! A failed save after a successful mutation does not undo the mutation. It is logged, and
//! [`HospitalRegistry::save`] can be called to retry and observe the error.

use crate::beds::{BedNumber, BedPool};
use crate::config::CoreConfig;
use crate::constants::DISPLAY_SEPARATOR;
use crate::diagnosis::{DiagnosisMatch, DiseaseCatalogue};
use crate::patient::{ensure_single_line, Medication, Patient, PatientId, Severity};
use crate::store::RecordStore;
use crate::{RegistryError, RegistryResult};
use clinic_types::NonEmptyText;
use std::sync::Arc;

/// Bed usage snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BedOccupancy {
    pub occupied: usize,
    pub total: usize,
}

#[derive(Debug)]
pub struct HospitalRegistry {
    cfg: Arc<CoreConfig>,
    catalogue: DiseaseCatalogue,
    patients: Vec<Patient>,
    beds: BedPool,
    store: Option<RecordStore>,
}

impl HospitalRegistry {
    /// Creates an empty registry that never touches the filesystem.
    pub fn in_memory(cfg: Arc<CoreConfig>, catalogue: DiseaseCatalogue) -> Self {
        let beds = BedPool::new(cfg.capacity().bed_count);
        Self {
            cfg,
            catalogue,
            patients: Vec::new(),
            beds,
            store: None,
        }
    }

    /// Opens the registry backed by the configured data file, loading any saved patients.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be read or decoded, or if its content does not
    /// fit the configured capacities (too many patients, too many medications, beds outside the
    /// pool or held twice).
    pub fn open(cfg: Arc<CoreConfig>, catalogue: DiseaseCatalogue) -> RegistryResult<Self> {
        let store = RecordStore::from_config(&cfg);
        let patients = store.load()?;
        let capacity = cfg.capacity();

        if patients.len() > capacity.max_patients {
            return Err(RegistryError::StoredDataExceedsCapacity(format!(
                "{} patients stored, capacity is {}",
                patients.len(),
                capacity.max_patients
            )));
        }
        if let Some(patient) = patients
            .iter()
            .find(|p| p.medication_count() > capacity.max_medications)
        {
            return Err(RegistryError::StoredDataExceedsCapacity(format!(
                "patient {} has {} medications, capacity is {}",
                patient.id(),
                patient.medication_count(),
                capacity.max_medications
            )));
        }

        let beds = BedPool::from_patients(capacity.bed_count, &patients)?;

        tracing::info!(
            path = %store.path().display(),
            format = %store.format(),
            patients = patients.len(),
            occupied_beds = beds.occupied_count(),
            "registry opened"
        );

        Ok(Self {
            cfg,
            catalogue,
            patients,
            beds,
            store: Some(store),
        })
    }

    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }

    /// Patient at `index` in the current (severity) order.
    pub fn patient(&self, index: usize) -> Option<&Patient> {
        self.patients.get(index)
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn find_patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id() == id)
    }

    fn find_patient_mut(&mut self, id: PatientId) -> RegistryResult<&mut Patient> {
        self.patients
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(RegistryError::PatientNotFound(id))
    }

    fn next_patient_id(&self) -> RegistryResult<PatientId> {
        match self.patients.iter().map(Patient::id).max() {
            None => Ok(PatientId::FIRST),
            Some(highest) => highest
                .next()
                .ok_or(RegistryError::PatientIdsExhausted(highest)),
        }
    }

    /// Highest severity first. The sort is stable: equal severities keep their relative order.
    fn sort_by_severity(&mut self) {
        self.patients.sort_by(|a, b| b.severity().cmp(&a.severity()));
    }

    pub fn diagnose(&self, symptoms: &str) -> DiagnosisMatch<'_> {
        self.catalogue.diagnose(symptoms)
    }

    /// Books a new patient and returns the id they were given.
    ///
    /// The patient starts at the lowest severity, not admitted, with a diagnosis computed from
    /// `symptoms`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PatientCapacityExceeded`] if the registry is full,
    /// [`RegistryError::PatientIdsExhausted`] if no higher id can be issued and
    /// [`RegistryError::InvalidInput`] if a text field spans several lines.
    pub fn book_appointment(
        &mut self,
        name: &str,
        age: u32,
        gender: &str,
        symptoms: &str,
    ) -> RegistryResult<PatientId> {
        let capacity = self.cfg.capacity().max_patients;
        if self.patients.len() >= capacity {
            tracing::warn!(capacity, "booking rejected, hospital at full capacity");
            return Err(RegistryError::PatientCapacityExceeded { capacity });
        }
        ensure_single_line("name", name)?;
        ensure_single_line("gender", gender)?;
        ensure_single_line("symptoms", symptoms)?;

        let id = self.next_patient_id()?;
        let mut patient = Patient::new(id, name, age, gender, symptoms);
        patient.set_diagnosis(self.catalogue.diagnose(symptoms).to_string());

        self.patients.push(patient);
        self.sort_by_severity();
        tracing::info!(patient_id = %id, "appointment booked");

        self.persist();
        Ok(id)
    }

    /// Admits a patient into the lowest-numbered free bed and returns that bed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PatientNotFound`], [`RegistryError::AlreadyAdmitted`] or
    /// [`RegistryError::NoBedAvailable`]; the registry is unchanged in each case.
    pub fn admit_patient(&mut self, id: PatientId) -> RegistryResult<BedNumber> {
        let patient = self
            .patients
            .iter()
            .find(|p| p.id() == id)
            .ok_or(RegistryError::PatientNotFound(id))?;
        if patient.is_admitted() {
            tracing::warn!(patient_id = %id, "admission rejected, already admitted");
            return Err(RegistryError::AlreadyAdmitted(id));
        }

        let bed = self.beds.find_available().ok_or_else(|| {
            tracing::warn!(patient_id = %id, "admission rejected, no available beds");
            RegistryError::NoBedAvailable
        })?;

        self.beds.occupy(bed)?;
        self.find_patient_mut(id)?.admit(bed)?;
        tracing::info!(patient_id = %id, bed = %bed, "patient admitted");

        self.persist();
        Ok(bed)
    }

    /// Discharges an admitted patient and returns the bed they released.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PatientNotFound`] or [`RegistryError::NotAdmitted`].
    pub fn discharge_patient(&mut self, id: PatientId) -> RegistryResult<BedNumber> {
        let bed = self.find_patient_mut(id)?.discharge()?;
        self.beds.release(bed)?;
        tracing::info!(patient_id = %id, bed = %bed, "patient discharged");

        self.persist();
        Ok(bed)
    }

    /// Records a medication for a patient.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PatientNotFound`], [`RegistryError::MedicationCapacityExceeded`]
    /// or a text error for an empty medication name. Nothing is saved on failure.
    pub fn add_medication(&mut self, id: PatientId, name: &str, time: &str) -> RegistryResult<()> {
        let capacity = self.cfg.capacity().max_medications;
        let medication = Medication::new(NonEmptyText::new(name)?, time)?;

        self.find_patient_mut(id)?
            .add_medication(medication, capacity)
            .inspect_err(|e| tracing::warn!(patient_id = %id, "medication rejected: {e}"))?;
        tracing::info!(patient_id = %id, "medication added");

        self.persist();
        Ok(())
    }

    /// Renders the medication reminders for a patient.
    pub fn medication_reminders(&self, id: PatientId) -> RegistryResult<String> {
        self.find_patient(id)
            .map(Patient::medication_reminders)
            .ok_or(RegistryError::PatientNotFound(id))
    }

    /// Sets a patient's severity and re-sorts the registry.
    pub fn update_severity(&mut self, id: PatientId, severity: Severity) -> RegistryResult<()> {
        self.find_patient_mut(id)?.set_severity(severity);
        self.sort_by_severity();
        tracing::info!(patient_id = %id, severity = %severity, "severity updated");

        self.persist();
        Ok(())
    }

    /// Replaces the computed diagnosis with one entered by a clinician.
    pub fn update_diagnosis(&mut self, id: PatientId, diagnosis: &str) -> RegistryResult<()> {
        ensure_single_line("diagnosis", diagnosis)?;
        self.find_patient_mut(id)?.set_diagnosis(diagnosis);
        tracing::info!(patient_id = %id, "diagnosis updated");

        self.persist();
        Ok(())
    }

    /// Lowest-numbered free bed, without reserving it.
    pub fn find_available_bed(&self) -> Option<BedNumber> {
        self.beds.find_available()
    }

    pub fn is_bed_available(&self, bed: BedNumber) -> bool {
        self.beds.is_available(bed)
    }

    pub fn bed_occupancy(&self) -> BedOccupancy {
        BedOccupancy {
            occupied: self.beds.occupied_count(),
            total: self.beds.len(),
        }
    }

    /// Every patient in the display layout, each followed by a separator line.
    pub fn display_all_patients(&self) -> String {
        let mut out = String::new();
        for patient in &self.patients {
            out.push_str(&format!("{patient}\n{DISPLAY_SEPARATOR}\n"));
        }
        out
    }

    /// Writes the data file now. A no-op for in-memory registries.
    pub fn save(&self) -> RegistryResult<()> {
        match &self.store {
            Some(store) => store.save(&self.patients),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::error!(
                path = %self.cfg.data_file().display(),
                "failed to save data file: {e}"
            );
        }
    }
}
