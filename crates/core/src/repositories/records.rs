//! Patient record store.
//!
//! The store is the authoritative collection of validated patients. It is loaded wholesale
//! from the record file when opened, and every mutation rewrites that file in full.
//!
//! ## Record File Layout
//!
//! One patient per line, ten whitespace-delimited fields:
//!
//! ```text
//! P1	Alice	30	女	170.00	70.00	118/76	5.40	4.20	2024-03-15
//! ```
//!
//! Malformed lines are skipped with a warning when loading; only I/O failures abort a load.
//!
//! ## Consistency
//!
//! Every mutation validates before touching the in-memory map. If the subsequent save fails,
//! the in-memory change is reverted so memory and disk never disagree.

use crate::config::CoreConfig;
use crate::error::{HealthError, HealthResult};
use crate::patient::Patient;
use crate::raw_record::parse_record_line;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Outcome of a [`RecordStore::load`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

/// In-memory index of patients keyed by ID, backed by the record file.
#[derive(Debug)]
pub struct RecordStore {
    cfg: Arc<CoreConfig>,
    pub(super) patients: BTreeMap<String, Patient>,
}

impl RecordStore {
    /// Opens the store, creating an empty record file if none exists, and loads it.
    ///
    /// # Errors
    ///
    /// Returns an I/O [`HealthError`] if the record file cannot be created or read.
    pub fn open(cfg: Arc<CoreConfig>) -> HealthResult<Self> {
        let mut store = Self {
            cfg,
            patients: BTreeMap::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Path of the backing record file.
    pub fn data_file(&self) -> &Path {
        self.cfg.data_file()
    }

    /// Replaces the in-memory contents with the record file.
    ///
    /// Lines with the wrong field count, an unrecognised gender token or failing validation
    /// are skipped and logged. A later line with the same ID replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::StorageDirCreation`], [`HealthError::FileWrite`] or
    /// [`HealthError::FileRead`] if the file cannot be created or read. The in-memory contents
    /// are left unchanged on error.
    pub fn load(&mut self) -> HealthResult<LoadSummary> {
        let path = self.cfg.data_file();

        if !path.exists() {
            create_parent_dir(path)?;
            fs::write(path, "").map_err(|e| {
                tracing::error!(op = "load", path = %path.display(), error = %e, "failed to create record file");
                HealthError::FileWrite(e)
            })?;
            tracing::info!(op = "load", path = %path.display(), "record file missing, created empty file");
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            tracing::error!(op = "load", path = %path.display(), error = %e, "failed to read record file");
            HealthError::FileRead(e)
        })?;

        let mut patients = BTreeMap::new();
        let mut summary = LoadSummary::default();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_record_line(line) {
                Ok(patient) => {
                    patients.insert(patient.patient_id.clone(), patient);
                }
                Err(reason) => {
                    summary.skipped += 1;
                    tracing::warn!(
                        op = "load",
                        line = index + 1,
                        reason = %reason,
                        "skipping record line: {line}"
                    );
                }
            }
        }

        summary.loaded = patients.len();
        self.patients = patients;
        tracing::info!(
            op = "load",
            count = summary.loaded,
            skipped = summary.skipped,
            "loaded patient records"
        );
        Ok(summary)
    }

    /// Rewrites the record file with one line per patient.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::StorageDirCreation`] or [`HealthError::FileWrite`] if the file
    /// cannot be written.
    pub fn save(&self) -> HealthResult<()> {
        let path = self.cfg.data_file();
        let mut contents = String::new();
        for patient in self.patients.values() {
            contents.push_str(&patient.to_record_line());
            contents.push('\n');
        }

        create_parent_dir(path)?;
        fs::write(path, contents).map_err(|e| {
            tracing::error!(op = "save", path = %path.display(), error = %e, "failed to save records");
            HealthError::FileWrite(e)
        })?;

        tracing::info!(op = "save", count = self.patients.len(), "saved patient records");
        Ok(())
    }

    /// Adds a new patient.
    ///
    /// # Errors
    ///
    /// - [`HealthError::DuplicateKey`] if the ID is already present
    /// - [`HealthError::Validation`] if any field is invalid
    /// - an I/O error if the record file cannot be rewritten
    ///
    /// The store is unchanged on any error.
    pub fn add(&mut self, mut patient: Patient) -> HealthResult<()> {
        let id = patient.patient_id.clone();
        if self.patients.contains_key(&id) {
            tracing::warn!(op = "add", patient_id = %id, "patient ID already exists");
            return Err(HealthError::DuplicateKey(id));
        }
        validate_for(&mut patient, "add")?;

        self.patients.insert(id.clone(), patient);
        if let Err(e) = self.save() {
            self.patients.remove(&id);
            return Err(e);
        }

        tracing::info!(op = "add", patient_id = %id, "added patient");
        Ok(())
    }

    /// Replaces an existing patient with a freshly validated one.
    ///
    /// # Errors
    ///
    /// - [`HealthError::NotFound`] if the ID is absent
    /// - [`HealthError::Validation`] if any field is invalid
    /// - an I/O error if the record file cannot be rewritten
    ///
    /// The store is unchanged on any error.
    pub fn update(&mut self, mut patient: Patient) -> HealthResult<()> {
        let id = patient.patient_id.clone();
        if !self.patients.contains_key(&id) {
            tracing::warn!(op = "update", patient_id = %id, "patient not found");
            return Err(HealthError::NotFound(id));
        }
        validate_for(&mut patient, "update")?;

        let previous = self.patients.insert(id.clone(), patient);
        if let Err(e) = self.save() {
            if let Some(previous) = previous {
                self.patients.insert(id, previous);
            }
            return Err(e);
        }

        tracing::info!(op = "update", patient_id = %id, "updated patient");
        Ok(())
    }

    /// Removes a patient and returns the removed record.
    ///
    /// # Errors
    ///
    /// - [`HealthError::NotFound`] if the ID is absent
    /// - an I/O error if the record file cannot be rewritten
    pub fn delete(&mut self, patient_id: &str) -> HealthResult<Patient> {
        let Some(removed) = self.patients.remove(patient_id) else {
            tracing::warn!(op = "delete", patient_id = %patient_id, "patient not found");
            return Err(HealthError::NotFound(patient_id.to_string()));
        };

        if let Err(e) = self.save() {
            self.patients.insert(patient_id.to_string(), removed);
            return Err(e);
        }

        tracing::info!(op = "delete", patient_id = %patient_id, "deleted patient");
        Ok(removed)
    }

    /// Looks up a patient by ID.
    pub fn get(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.get(patient_id)
    }

    /// Snapshot of every patient, ordered by ID.
    pub fn list_all(&self) -> Vec<Patient> {
        self.patients.values().cloned().collect()
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.patients.contains_key(patient_id)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

fn validate_for(patient: &mut Patient, op: &'static str) -> HealthResult<()> {
    patient.validate().map_err(|e| {
        tracing::warn!(op, patient_id = %patient.patient_id, error = %e, "rejected invalid patient");
        e
    })
}

pub(super) fn create_parent_dir(path: &Path) -> HealthResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(HealthError::StorageDirCreation)
        }
        _ => Ok(()),
    }
}
