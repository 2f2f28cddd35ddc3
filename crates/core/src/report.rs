//! Plain-text health reports.
//!
//! A report embeds the patient's base fields and every classification from
//! [`HealthAnalyzer::analyze`]. Reports are written to `{reports_dir}/{patient_id}_report.txt`,
//! replacing any earlier report for the same patient.

use crate::analyzer::{ExtraVitals, HealthAnalysis, HealthAnalyzer};
use crate::config::CoreConfig;
use crate::constants::REPORT_FILE_SUFFIX;
use crate::error::{HealthError, HealthResult};
use crate::patient::Patient;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of [`ReportWriter::write`].
///
/// The rendered text is always available, even when persisting it failed.
#[derive(Debug)]
pub struct ReportOutcome {
    pub text: String,
    pub saved: HealthResult<PathBuf>,
}

/// Renders and persists health reports.
#[derive(Clone, Debug)]
pub struct ReportWriter {
    cfg: Arc<CoreConfig>,
}

impl ReportWriter {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Location of the report for `patient_id`.
    pub fn report_path(&self, patient_id: &str) -> PathBuf {
        self.cfg
            .reports_dir()
            .join(format!("{patient_id}{REPORT_FILE_SUFFIX}"))
    }

    /// Renders the report text. Output depends only on the inputs.
    pub fn render(patient: &Patient, extra: ExtraVitals) -> String {
        let analysis = HealthAnalyzer::analyze(patient, extra);
        render_report(patient, &analysis)
    }

    /// Renders the report and writes it to the reports directory.
    pub fn write(&self, patient: &Patient, extra: ExtraVitals) -> ReportOutcome {
        let text = Self::render(patient, extra);
        let saved = self.persist(&patient.patient_id, &text);
        match &saved {
            Ok(path) => {
                tracing::info!(op = "report", patient_id = %patient.patient_id, path = %path.display(), "health report written");
            }
            Err(e) => {
                tracing::error!(op = "report", patient_id = %patient.patient_id, error = %e, "failed to write health report");
            }
        }
        ReportOutcome { text, saved }
    }

    fn persist(&self, patient_id: &str, text: &str) -> HealthResult<PathBuf> {
        fs::create_dir_all(self.cfg.reports_dir()).map_err(HealthError::StorageDirCreation)?;
        let path = self.report_path(patient_id);
        fs::write(&path, text).map_err(HealthError::FileWrite)?;
        Ok(path)
    }
}

fn render_report(patient: &Patient, analysis: &HealthAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Health Report - {} ({})\n",
        patient.name, patient.patient_id
    ));
    output.push_str("----------------------------------------\n");
    output.push_str(&format!("Check date: {}\n\n", patient.check_date));

    output.push_str("Basic information:\n");
    output.push_str(&format!("Age: {} years\n", patient.age));
    output.push_str(&format!("Gender: {}\n", patient.gender));
    output.push_str(&format!("Height: {} cm\n", patient.height_cm));
    output.push_str(&format!("Weight: {} kg\n\n", patient.weight_kg));

    output.push_str(&format!(
        "BMI: {} ({})\n",
        analysis.bmi,
        analysis.bmi_category.label()
    ));
    output.push_str(&format!(
        "Blood pressure: {} ({})\n",
        patient.blood_pressure,
        analysis.blood_pressure.label()
    ));
    output.push_str(&format!(
        "Blood sugar: {} mmol/L ({})\n",
        patient.blood_sugar,
        analysis.blood_sugar.label()
    ));
    output.push_str(&format!(
        "Cholesterol: {} mmol/L ({})\n",
        patient.cholesterol,
        analysis.cholesterol.label()
    ));
    if let Some((rate, status)) = analysis.heart_rate {
        output.push_str(&format!("Heart rate: {rate} bpm ({})\n", status.label()));
    }
    if let Some((temp, status)) = analysis.temperature {
        output.push_str(&format!("Temperature: {temp} °C ({})\n", status.label()));
    }

    output
}
