//! # Health Core
//!
//! Core business logic for the patient health-record manager.
//!
//! This crate contains pure data operations and file management:
//! - Patient entity with accumulate-all-errors validation
//! - Record store backed by a whitespace-delimited text file
//! - CSV and JSON import/export
//! - Health metric classification and plain-text report generation
//!
//! **No UI concerns**: menus, prompts and logging subscribers belong in the `health-run` and
//! `health-cli` binaries. Core emits `tracing` events and leaves formatting to them.

pub mod analyzer;
pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod raw_record;
pub mod report;
pub mod repositories;
pub mod validation;

pub use analyzer::{
    BloodPressureStatus, BloodSugarStatus, BmiCategory, CholesterolStatus, ExtraVitals,
    HealthAnalysis, HealthAnalyzer, HeartRateStatus, TemperatureStatus,
};
pub use config::CoreConfig;
pub use error::{HealthError, HealthResult};
pub use patient::{Gender, Patient};
pub use raw_record::{RawRecord, RecordSkip};
pub use report::{ReportOutcome, ReportWriter};
pub use repositories::interchange::{DataFormat, ImportSummary};
pub use repositories::records::{LoadSummary, RecordStore};
pub use validation::ValidationErrors;
