use clap::{Args, Parser, Subcommand};
use health_core::{CoreConfig, DataFormat, ExtraVitals, Patient, RecordStore, ReportWriter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "health")]
#[command(about = "Patient health record manager CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// The ten patient fields, in record-file order.
#[derive(Args)]
struct PatientArgs {
    /// Patient ID ('P' followed by digits)
    patient_id: String,
    name: String,
    /// Age in years (0-120)
    age: i64,
    /// 男/女 or M/F
    gender: String,
    /// Height in cm (50-250)
    height: f64,
    /// Weight in kg (20-200)
    weight: f64,
    /// Blood pressure as systolic/diastolic
    blood_pressure: String,
    /// Blood sugar in mmol/L
    blood_sugar: f64,
    /// Cholesterol in mmol/L
    cholesterol: f64,
    /// Check date (YYYY-MM-DD)
    check_date: String,
}

impl PatientArgs {
    fn into_patient(self) -> Patient {
        Patient::new(
            &self.patient_id,
            &self.name,
            self.age,
            &self.gender,
            self.height,
            self.weight,
            &self.blood_pressure,
            self.blood_sugar,
            self.cholesterol,
            &self.check_date,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Show {
        patient_id: String,
    },
    /// Add a new patient
    Add(PatientArgs),
    /// Replace an existing patient's record
    Update(PatientArgs),
    /// Delete a patient
    Delete {
        patient_id: String,
    },
    /// Generate a health report
    Report {
        patient_id: String,
        /// Heart rate in bpm (optional)
        #[arg(long)]
        heart_rate: Option<u32>,
        /// Body temperature in °C (optional)
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// Import patients from a CSV or JSON file
    Import {
        path: PathBuf,
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: String,
    },
    /// Export all patients to a CSV or JSON file
    Export {
        path: PathBuf,
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("health_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'health --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("HEALTH_DATA_FILE").ok(),
        std::env::var("HEALTH_REPORTS_DIR").ok(),
        std::env::var("HEALTH_LOG_FILE").ok(),
    )?);
    let mut store = RecordStore::open(cfg.clone())?;

    match command {
        Commands::List => {
            let patients = store.list_all();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Age: {}, Check date: {}",
                        patient.patient_id, patient.name, patient.age, patient.check_date
                    );
                }
            }
        }
        Commands::Show { patient_id } => match store.get(&patient_id) {
            Some(patient) => println!("{patient}"),
            None => println!("Patient not found: {patient_id}"),
        },
        Commands::Add(args) => match store.add(args.into_patient()) {
            Ok(()) => println!("Patient added."),
            Err(e) => eprintln!("Error adding patient: {e}"),
        },
        Commands::Update(args) => match store.update(args.into_patient()) {
            Ok(()) => println!("Patient updated."),
            Err(e) => eprintln!("Error updating patient: {e}"),
        },
        Commands::Delete { patient_id } => match store.delete(&patient_id) {
            Ok(_) => println!("Deleted patient: {patient_id}"),
            Err(e) => eprintln!("Error deleting patient: {e}"),
        },
        Commands::Report {
            patient_id,
            heart_rate,
            temperature,
        } => match store.get(&patient_id) {
            Some(patient) => {
                let extra = ExtraVitals {
                    heart_rate,
                    temperature,
                };
                let outcome = ReportWriter::new(cfg).write(patient, extra);
                print!("{}", outcome.text);
                match outcome.saved {
                    Ok(path) => println!("Report saved to {}", path.display()),
                    Err(e) => eprintln!("Error saving report: {e}"),
                }
            }
            None => println!("Patient not found: {patient_id}"),
        },
        Commands::Import { path, format } => {
            match format
                .parse::<DataFormat>()
                .and_then(|format| store.import_from(&path, format))
            {
                Ok(summary) => println!(
                    "Imported {} patients ({} skipped).",
                    summary.imported, summary.skipped
                ),
                Err(e) => eprintln!("Error importing data: {e}"),
            }
        }
        Commands::Export { path, format } => {
            match format
                .parse::<DataFormat>()
                .and_then(|format| store.export_to(&path, format))
            {
                Ok(()) => println!("Exported patients to {}", path.display()),
                Err(e) => eprintln!("Error exporting data: {e}"),
            }
        }
    }

    Ok(())
}
