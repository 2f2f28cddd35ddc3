//! Constants used throughout the health core crate.
//!
//! This module contains all path, filename and wire-token constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default location of the patient record file when no explicit path is configured.
pub const DEFAULT_DATA_FILE: &str = "data/patient_records.txt";

/// Default directory for generated health reports.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Default location of the application log file.
pub const DEFAULT_LOG_FILE: &str = "logs/system.log";

/// Number of positional fields in a stored record line or CSV row.
pub const RECORD_FIELD_COUNT: usize = 10;

/// Suffix appended to a patient ID to form its report filename.
pub const REPORT_FILE_SUFFIX: &str = "_report.txt";

/// Canonical on-disk gender token for male patients.
pub const MALE_TOKEN: &str = "男";

/// Canonical on-disk gender token for female patients.
pub const FEMALE_TOKEN: &str = "女";

/// Legacy single-letter alias for [`MALE_TOKEN`], accepted on input only.
pub const MALE_ALIAS: &str = "M";

/// Legacy single-letter alias for [`FEMALE_TOKEN`], accepted on input only.
pub const FEMALE_ALIAS: &str = "F";

/// `chrono` format string for check dates.
pub const CHECK_DATE_FORMAT: &str = "%Y-%m-%d";
