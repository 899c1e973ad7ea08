use anyhow::Context;
use clap::{Parser, Subcommand};
use clinic_core::config::{
    capacity_from_env_values, data_file_from_env_value, format_version_from_env_value,
};
use clinic_core::{CoreConfig, HospitalRegistry, PatientId, Severity};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "clinic_core=warn";

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic patient registry CLI")]
struct Cli {
    /// Data file (overrides CLINIC_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<String>,
    /// On-disk format to write, 1 or 2 (overrides CLINIC_FORMAT_VERSION)
    #[arg(long, global = true)]
    format_version: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Book an appointment for a new patient
    Book {
        name: String,
        age: u32,
        gender: String,
        /// Free-text symptom description
        symptoms: String,
    },
    /// Admit a patient into the lowest free bed
    Admit { id: u64 },
    /// Discharge an admitted patient
    Discharge { id: u64 },
    /// Record a medication for a patient
    AddMedication {
        id: u64,
        name: String,
        /// Time of day, e.g. 08:00
        time: String,
    },
    /// Show medication reminders for a patient
    Reminders { id: u64 },
    /// List all patients, highest severity first
    List {
        /// Print the patients as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the lowest free bed
    FindBed,
    /// Run the diagnosis matcher on symptom text without booking
    Diagnose { symptoms: String },
    /// Set a patient's severity (1-5)
    SetSeverity { id: u64, severity: u8 },
    /// Replace a patient's diagnosis
    SetDiagnosis { id: u64, diagnosis: String },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let data_file: PathBuf =
        data_file_from_env_value(cli.data_file.or_else(|| std::env::var("CLINIC_DATA_FILE").ok()));
    let format_version = format_version_from_env_value(
        cli.format_version
            .or_else(|| std::env::var("CLINIC_FORMAT_VERSION").ok()),
    )?;
    let capacity = capacity_from_env_values(
        std::env::var("CLINIC_MAX_PATIENTS").ok(),
        std::env::var("CLINIC_BED_COUNT").ok(),
        std::env::var("CLINIC_MAX_MEDICATIONS").ok(),
    )?;
    let disease_catalogue = std::env::var("CLINIC_DISEASE_CATALOGUE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let cfg = Arc::new(CoreConfig::new(
        data_file,
        format_version,
        capacity,
        disease_catalogue,
    )?);
    tracing::info!(
        format = %cfg.format_version(),
        catalogue = ?cfg.disease_catalogue_path(),
        "-- Using data file {}",
        cfg.data_file().display()
    );

    let catalogue = cfg.load_disease_catalogue()?;
    let mut registry = HospitalRegistry::open(cfg.clone(), catalogue)
        .with_context(|| format!("opening {}", cfg.data_file().display()))?;

    let mutates = matches!(
        command,
        Commands::Book { .. }
            | Commands::Admit { .. }
            | Commands::Discharge { .. }
            | Commands::AddMedication { .. }
            | Commands::SetSeverity { .. }
            | Commands::SetDiagnosis { .. }
    );

    match command {
        Commands::Book {
            name,
            age,
            gender,
            symptoms,
        } => {
            let id = registry.book_appointment(&name, age, &gender, &symptoms)?;
            let diagnosis = registry
                .find_patient(id)
                .map(|p| p.diagnosis().to_string())
                .unwrap_or_default();
            println!("Appointment booked with Patient ID: {id}");
            println!("{diagnosis}");
        }
        Commands::Admit { id } => {
            let bed = registry.admit_patient(PatientId::new(id))?;
            println!("Patient {id} admitted to bed {bed}");
        }
        Commands::Discharge { id } => {
            let bed = registry.discharge_patient(PatientId::new(id))?;
            println!("Patient {id} discharged from bed {bed}");
        }
        Commands::AddMedication { id, name, time } => {
            registry.add_medication(PatientId::new(id), &name, &time)?;
            println!("Medication added for patient {id}");
        }
        Commands::Reminders { id } => {
            print!("{}", registry.medication_reminders(PatientId::new(id))?);
        }
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(registry.patients())?);
            } else if registry.patient_count() == 0 {
                println!("No patients found.");
            } else {
                print!("{}", registry.display_all_patients());
            }
        }
        Commands::FindBed => {
            let occupancy = registry.bed_occupancy();
            match registry.find_available_bed() {
                Some(bed) => println!("Available bed: {bed}"),
                None => println!("No available beds"),
            }
            println!("Occupied: {}/{}", occupancy.occupied, occupancy.total);
        }
        Commands::Diagnose { symptoms } => {
            println!("{}", registry.diagnose(&symptoms));
        }
        Commands::SetSeverity { id, severity } => {
            registry.update_severity(PatientId::new(id), Severity::new(severity)?)?;
            println!("Severity for patient {id} set to {severity}");
        }
        Commands::SetDiagnosis { id, diagnosis } => {
            registry.update_diagnosis(PatientId::new(id), &diagnosis)?;
            println!("Diagnosis for patient {id} updated");
        }
    }

    // Mutations persist as they happen; this surfaces a failed write as a non-zero exit.
    if mutates {
        registry.save()?;
    }

    Ok(())
}

/// `RUST_LOG` when it is set and valid, otherwise warnings from the core crate only.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}
