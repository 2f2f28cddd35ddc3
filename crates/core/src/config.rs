//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the record store and report writer. Core services never read environment
//! variables themselves; binaries collect the raw values and hand them to
//! [`CoreConfig::from_env_values`].

use crate::constants::{DEFAULT_DATA_FILE, DEFAULT_LOG_FILE, DEFAULT_REPORTS_DIR};
use crate::{HealthError, HealthResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
    reports_dir: PathBuf,
    log_file: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::InvalidInput`] if any path is empty.
    pub fn new(data_file: PathBuf, reports_dir: PathBuf, log_file: PathBuf) -> HealthResult<Self> {
        for (label, path) in [
            ("data_file", &data_file),
            ("reports_dir", &reports_dir),
            ("log_file", &log_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(HealthError::InvalidInput(format!("{label} cannot be empty")));
            }
        }

        Ok(Self {
            data_file,
            reports_dir,
            log_file,
        })
    }

    /// Build a configuration from optional raw values, typically read from the environment.
    ///
    /// `None` or blank values fall back to [`DEFAULT_DATA_FILE`], [`DEFAULT_REPORTS_DIR`] and
    /// [`DEFAULT_LOG_FILE`] respectively.
    pub fn from_env_values(
        data_file: Option<String>,
        reports_dir: Option<String>,
        log_file: Option<String>,
    ) -> HealthResult<Self> {
        Self::new(
            path_or_default(data_file, DEFAULT_DATA_FILE),
            path_or_default(reports_dir, DEFAULT_REPORTS_DIR),
            path_or_default(log_file, DEFAULT_LOG_FILE),
        )
    }

    /// Path of the whitespace-delimited patient record file.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Directory that receives `{patient_id}_report.txt` files.
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

fn path_or_default(value: Option<String>, default: &str) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_values_uses_defaults_for_missing_or_blank() {
        let cfg = CoreConfig::from_env_values(None, Some("   ".into()), None)
            .expect("defaults should be valid");

        assert_eq!(cfg.data_file(), Path::new(DEFAULT_DATA_FILE));
        assert_eq!(cfg.reports_dir(), Path::new(DEFAULT_REPORTS_DIR));
        assert_eq!(cfg.log_file(), Path::new(DEFAULT_LOG_FILE));
    }

    #[test]
    fn from_env_values_trims_overrides() {
        let cfg = CoreConfig::from_env_values(
            Some(" /tmp/records.txt ".into()),
            Some("/tmp/reports".into()),
            Some("/tmp/health.log".into()),
        )
        .expect("overrides should be valid");

        assert_eq!(cfg.data_file(), Path::new("/tmp/records.txt"));
        assert_eq!(cfg.reports_dir(), Path::new("/tmp/reports"));
        assert_eq!(cfg.log_file(), Path::new("/tmp/health.log"));
    }

    #[test]
    fn new_rejects_empty_paths() {
        let err = CoreConfig::new(PathBuf::new(), "reports".into(), "log".into())
            .expect_err("empty data_file should be rejected");
        assert!(matches!(err, HealthError::InvalidInput(msg) if msg.contains("data_file")));
    }
}
