use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use health_core::{
    CoreConfig, DataFormat, ExtraVitals, HealthError, Patient, RecordStore, ReportWriter,
};

/// Application state shared across menu actions.
struct App {
    store: RecordStore,
    reports: ReportWriter,
}

/// Main entry point for the interactive health record manager.
///
/// # Environment Variables
/// - `HEALTH_DATA_FILE`: record file (default: "data/patient_records.txt")
/// - `HEALTH_REPORTS_DIR`: report directory (default: "reports")
/// - `HEALTH_LOG_FILE`: log file, appended to (default: "logs/system.log")
/// - `RUST_LOG`: extra tracing directives
///
/// # Errors
/// Returns an error if the log file cannot be opened or the record store cannot be loaded.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("HEALTH_DATA_FILE").ok(),
        std::env::var("HEALTH_REPORTS_DIR").ok(),
        std::env::var("HEALTH_LOG_FILE").ok(),
    )?);

    init_tracing(cfg.log_file())?;

    println!("Starting health record manager...");
    let store = RecordStore::open(cfg.clone()).context("failed to initialise record store")?;
    tracing::info!("health record manager initialised");

    let mut app = App {
        store,
        reports: ReportWriter::new(cfg),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    app.run(&mut input)
}

/// Log to stderr and append plain-text lines to `log_file`.
fn init_tracing(log_file: &Path) -> anyhow::Result<()> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("health_core=info".parse()?)
                .add_directive("health_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

impl App {
    fn run(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        loop {
            print_menu();
            let Some(choice) = prompt(input, "Choose an option (1-8): ")? else {
                break;
            };
            match choice.as_str() {
                "1" => self.view(input)?,
                "2" => self.add(input)?,
                "3" => self.update(input)?,
                "4" => self.delete(input)?,
                "5" => self.report(input)?,
                "6" => self.import(input)?,
                "7" => self.export(input)?,
                "8" => break,
                _ => println!("Invalid choice, please try again."),
            }
        }
        println!("Goodbye!");
        Ok(())
    }

    fn view(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        let id = prompt_or_empty(input, "Patient ID: ")?;
        match self.store.get(&id) {
            Some(patient) => println!("{patient}"),
            None => println!("Patient not found."),
        }
        Ok(())
    }

    fn add(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        if let Some(patient) = read_patient(input, None)? {
            match self.store.add(patient) {
                Ok(()) => println!("Patient added."),
                Err(e) => report_failure("add", &e),
            }
        }
        Ok(())
    }

    fn update(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        let id = prompt_or_empty(input, "Patient ID to update: ")?;
        if !self.store.contains(&id) {
            println!("Patient not found.");
            return Ok(());
        }
        println!("Enter the new patient details:");
        if let Some(patient) = read_patient(input, Some(&id))? {
            match self.store.update(patient) {
                Ok(()) => println!("Patient updated."),
                Err(e) => report_failure("update", &e),
            }
        }
        Ok(())
    }

    fn delete(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        let id = prompt_or_empty(input, "Patient ID to delete: ")?;
        match self.store.delete(&id) {
            Ok(_) => println!("Patient deleted."),
            Err(e) => report_failure("delete", &e),
        }
        Ok(())
    }

    fn report(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        let id = prompt_or_empty(input, "Patient ID: ")?;
        let Some(patient) = self.store.get(&id) else {
            println!("Patient not found.");
            return Ok(());
        };

        let mut extra = ExtraVitals::default();
        let answer = prompt_or_empty(input, "Enter heart rate and temperature? (y/n): ")?;
        if answer.eq_ignore_ascii_case("y") {
            extra.heart_rate = prompt_parsed(input, "Heart rate (bpm): ")?;
            extra.temperature = prompt_parsed(input, "Temperature (°C): ")?;
        }

        let outcome = self.reports.write(patient, extra);
        println!("{}", outcome.text);
        match outcome.saved {
            Ok(path) => println!("Report saved to {}", path.display()),
            Err(e) => report_failure("report", &e),
        }
        Ok(())
    }

    fn import(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        let path = PathBuf::from(prompt_or_empty(input, "File to import: ")?);
        let format = prompt_or_empty(input, "File type (csv/json): ")?;
        match format
            .parse::<DataFormat>()
            .and_then(|format| self.store.import_from(&path, format))
        {
            Ok(summary) => println!(
                "Imported {} patients ({} skipped).",
                summary.imported, summary.skipped
            ),
            Err(e) => report_failure("import", &e),
        }
        Ok(())
    }

    fn export(&mut self, input: &mut impl BufRead) -> anyhow::Result<()> {
        let path = PathBuf::from(prompt_or_empty(input, "Export to file: ")?);
        let format = prompt_or_empty(input, "File type (csv/json): ")?;
        match format
            .parse::<DataFormat>()
            .and_then(|format| self.store.export_to(&path, format))
        {
            Ok(()) => println!("Data exported."),
            Err(e) => report_failure("export", &e),
        }
        Ok(())
    }
}

fn print_menu() {
    println!();
    println!("=== Patient Health Record Manager ===");
    println!("1. View patient");
    println!("2. Add patient");
    println!("3. Update patient");
    println!("4. Delete patient");
    println!("5. Generate health report");
    println!("6. Import data");
    println!("7. Export data");
    println!("8. Exit");
}

fn report_failure(op: &str, error: &HealthError) {
    println!("{op} failed: {error}");
    tracing::error!(op, error = %error, "operation failed");
}

/// Prompts for all ten fields. Returns `None` (after printing why) if a numeric field does
/// not parse; rule validation is left to the store so every violation is reported together.
fn read_patient(input: &mut impl BufRead, existing_id: Option<&str>) -> anyhow::Result<Option<Patient>> {
    let patient_id = match existing_id {
        Some(id) => id.to_string(),
        None => prompt_or_empty(input, "Patient ID (starting with 'P'): ")?,
    };
    let name = prompt_or_empty(input, "Name: ")?;
    let Some(age) = prompt_parsed::<i64>(input, "Age (0-120): ")? else {
        return Ok(None);
    };
    let gender = prompt_or_empty(input, "Gender (男/女 or M/F): ")?;
    let Some(height) = prompt_parsed::<f64>(input, "Height (cm): ")? else {
        return Ok(None);
    };
    let Some(weight) = prompt_parsed::<f64>(input, "Weight (kg): ")? else {
        return Ok(None);
    };
    let blood_pressure = prompt_or_empty(input, "Blood pressure (systolic/diastolic): ")?;
    let Some(blood_sugar) = prompt_parsed::<f64>(input, "Blood sugar (mmol/L): ")? else {
        return Ok(None);
    };
    let Some(cholesterol) = prompt_parsed::<f64>(input, "Cholesterol (mmol/L): ")? else {
        return Ok(None);
    };
    let check_date = prompt_or_empty(input, "Check date (YYYY-MM-DD): ")?;

    Ok(Some(Patient::new(
        &patient_id,
        &name,
        age,
        &gender,
        height,
        weight,
        &blood_pressure,
        blood_sugar,
        cholesterol,
        &check_date,
    )))
}

/// Reads one trimmed line. `None` means stdin reached end of file.
fn prompt(input: &mut impl BufRead, label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_or_empty(input: &mut impl BufRead, label: &str) -> anyhow::Result<String> {
    Ok(prompt(input, label)?.unwrap_or_default())
}

fn prompt_parsed<T: std::str::FromStr>(
    input: &mut impl BufRead,
    label: &str,
) -> anyhow::Result<Option<T>> {
    let text = prompt_or_empty(input, label)?;
    match text.parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            println!("Input error: '{text}' is not a valid number.");
            tracing::warn!(input = %text, "rejected non-numeric input");
            Ok(None)
        }
    }
}
