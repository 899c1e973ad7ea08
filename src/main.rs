use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clinic_core::config::{
    capacity_from_env_values, data_file_from_env_value, format_version_from_env_value,
};
use clinic_core::{CoreConfig, HospitalRegistry, PatientId};

const MENU: &str = "\nHospital Management System
1. Book Appointment
2. Admit Patient
3. Discharge Patient
4. Add Medication
5. Show Medication Reminders
6. Display All Patients
7. Find Available Bed
8. Exit
Enter your choice: ";

const DEFAULT_LOG_FILTER: &str = "clinic_core=warn";

/// Main entry point for the interactive clinic menu
///
/// Loads the registry from the configured data file and runs the text menu on stdin/stdout
/// until the user exits or input ends. Logs go to stderr.
///
/// # Environment Variables
/// - `CLINIC_DATA_FILE`: data file path (default: "hospital_data.txt")
/// - `CLINIC_FORMAT_VERSION`: on-disk format written, 1 or 2 (default: 1)
/// - `CLINIC_MAX_PATIENTS`, `CLINIC_BED_COUNT`, `CLINIC_MAX_MEDICATIONS`: capacity limits
/// - `CLINIC_DISEASE_CATALOGUE`: YAML disease catalogue (default: built-in catalogue)
///
/// # Errors
/// Returns an error if configuration is invalid or the data file cannot be loaded.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let capacity = capacity_from_env_values(
        std::env::var("CLINIC_MAX_PATIENTS").ok(),
        std::env::var("CLINIC_BED_COUNT").ok(),
        std::env::var("CLINIC_MAX_MEDICATIONS").ok(),
    )?;
    let cfg = Arc::new(CoreConfig::new(
        data_file_from_env_value(std::env::var("CLINIC_DATA_FILE").ok()),
        format_version_from_env_value(std::env::var("CLINIC_FORMAT_VERSION").ok())?,
        capacity,
        std::env::var("CLINIC_DISEASE_CATALOGUE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from),
    )?);

    tracing::info!(
        catalogue = ?cfg.disease_catalogue_path(),
        "-- Opening clinic registry at {}",
        cfg.data_file().display()
    );

    let catalogue = cfg.load_disease_catalogue()?;
    let mut registry = HospitalRegistry::open(cfg, catalogue)?;

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout().lock());
    menu.run(&mut registry)?;

    Ok(())
}

/// `RUST_LOG` when it is set and valid, otherwise warnings from the core crate only.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Line-based menu driver over any input/output pair.
struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Runs until choice 8 or end of input.
    fn run(&mut self, registry: &mut HospitalRegistry) -> io::Result<()> {
        loop {
            write!(self.output, "{MENU}")?;
            self.output.flush()?;

            let Some(choice) = self.read_line()? else {
                return Ok(());
            };

            let keep_going = match choice.trim() {
                "1" => self.book(registry)?,
                "2" => self.admit(registry)?,
                "3" => self.discharge(registry)?,
                "4" => self.add_medication(registry)?,
                "5" => self.reminders(registry)?,
                "6" => {
                    write!(self.output, "{}", registry.display_all_patients())?;
                    true
                }
                "7" => {
                    match registry.find_available_bed() {
                        Some(bed) => {
                            writeln!(self.output, "Available bed found. Bed number: {bed}")?
                        }
                        None => writeln!(self.output, "No available beds.")?,
                    }
                    true
                }
                "8" => {
                    writeln!(self.output, "Exiting system...")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid choice. Please enter 1-8.")?;
                    true
                }
            };

            if !keep_going {
                return Ok(());
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompts for a patient id. `Ok(None)` means input ended; a malformed id is reported and
    /// yields `Some(None)`.
    fn prompt_id(&mut self, label: &str) -> io::Result<Option<Option<PatientId>>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse::<PatientId>() {
            Ok(id) => Ok(Some(Some(id))),
            Err(e) => {
                writeln!(self.output, "{e}")?;
                Ok(Some(None))
            }
        }
    }

    fn book(&mut self, registry: &mut HospitalRegistry) -> io::Result<bool> {
        let Some(name) = self.prompt("Patient name: ")? else {
            return Ok(false);
        };
        let Some(age) = self.prompt("Age: ")? else {
            return Ok(false);
        };
        let Some(gender) = self.prompt("Gender: ")? else {
            return Ok(false);
        };
        let Some(symptoms) = self.prompt("Symptoms: ")? else {
            return Ok(false);
        };

        let Ok(age) = age.trim().parse::<u32>() else {
            writeln!(self.output, "Invalid age: {}", age.trim())?;
            return Ok(true);
        };

        match registry.book_appointment(name.trim(), age, gender.trim(), symptoms.trim()) {
            Ok(id) => {
                writeln!(self.output, "Appointment booked with Patient ID: {id}")?;
                if let Some(patient) = registry.find_patient(id) {
                    writeln!(self.output, "{}", patient.diagnosis())?;
                }
            }
            Err(e) => writeln!(self.output, "Booking failed: {e}")?,
        }
        Ok(true)
    }

    fn admit(&mut self, registry: &mut HospitalRegistry) -> io::Result<bool> {
        let Some(id) = self.prompt_id("Patient ID to admit: ")? else {
            return Ok(false);
        };
        if let Some(id) = id {
            match registry.admit_patient(id) {
                Ok(bed) => writeln!(
                    self.output,
                    "Patient admitted successfully. Bed number: {bed}"
                )?,
                Err(e) => writeln!(self.output, "Admission failed: {e}")?,
            }
        }
        Ok(true)
    }

    fn discharge(&mut self, registry: &mut HospitalRegistry) -> io::Result<bool> {
        let Some(id) = self.prompt_id("Patient ID to discharge: ")? else {
            return Ok(false);
        };
        if let Some(id) = id {
            match registry.discharge_patient(id) {
                Ok(_) => writeln!(self.output, "Patient discharged successfully.")?,
                Err(e) => writeln!(self.output, "Discharge failed: {e}")?,
            }
        }
        Ok(true)
    }

    fn add_medication(&mut self, registry: &mut HospitalRegistry) -> io::Result<bool> {
        let Some(id) = self.prompt_id("Patient ID: ")? else {
            return Ok(false);
        };
        let Some(name) = self.prompt("Medication name: ")? else {
            return Ok(false);
        };
        let Some(time) = self.prompt("Time: ")? else {
            return Ok(false);
        };
        if let Some(id) = id {
            match registry.add_medication(id, name.trim(), time.trim()) {
                Ok(()) => writeln!(self.output, "Medication added successfully.")?,
                Err(e) => writeln!(self.output, "Failed to add medication: {e}")?,
            }
        }
        Ok(true)
    }

    fn reminders(&mut self, registry: &mut HospitalRegistry) -> io::Result<bool> {
        let Some(id) = self.prompt_id("Patient ID: ")? else {
            return Ok(false);
        };
        if let Some(id) = id {
            match registry.medication_reminders(id) {
                Ok(text) => write!(self.output, "{text}")?,
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
        Ok(true)
    }
}
