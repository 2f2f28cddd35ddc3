//! CSV and JSON import/export for the record store.
//!
//! Both formats carry the same ten fields as the record file:
//!
//! - CSV: positional, no header row, standard comma-quoted
//! - JSON: an array of objects keyed by the canonical field names
//!
//! Imported records that fail to parse or validate are skipped and logged. Valid records are
//! inserted or overwrite existing IDs, then the store is persisted once.

use super::records::{create_parent_dir, RecordStore};
use crate::error::{HealthError, HealthResult};
use crate::patient::Patient;
use crate::raw_record::{RawRecord, RecordSkip};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Interchange file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
        }
    }
}

impl FromStr for DataFormat {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            _ => Err(HealthError::UnsupportedFormat(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`RecordStore::import_from`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

impl RecordStore {
    /// Imports patients from a CSV or JSON file.
    ///
    /// Existing IDs are overwritten without a duplicate check. The store is saved once after
    /// all records have been applied.
    ///
    /// # Errors
    ///
    /// - [`HealthError::FileRead`] if the source cannot be read
    /// - [`HealthError::Json`] if a JSON source is not an array
    /// - an I/O error if the record file cannot be rewritten, in which case the import is
    ///   rolled back
    pub fn import_from(&mut self, path: &Path, format: DataFormat) -> HealthResult<ImportSummary> {
        let contents = fs::read_to_string(path).map_err(|e| {
            tracing::error!(op = "import", path = %path.display(), error = %e, "failed to read import file");
            HealthError::FileRead(e)
        })?;

        let parsed = match format {
            DataFormat::Csv => parse_csv(&contents),
            DataFormat::Json => parse_json(&contents)?,
        };

        let mut summary = ImportSummary::default();
        let mut accepted = Vec::new();
        for (index, result) in parsed.into_iter().enumerate() {
            match result.and_then(RawRecord::into_validated) {
                Ok(patient) => accepted.push(patient),
                Err(reason) => {
                    summary.skipped += 1;
                    tracing::warn!(
                        op = "import",
                        format = %format,
                        record = index + 1,
                        reason = %reason,
                        "skipping imported record"
                    );
                }
            }
        }
        summary.imported = accepted.len();

        let previous = self.patients.clone();
        for patient in accepted {
            self.patients.insert(patient.patient_id.clone(), patient);
        }
        if let Err(e) = self.save() {
            self.patients = previous;
            return Err(e);
        }

        tracing::info!(
            op = "import",
            format = %format,
            path = %path.display(),
            count = summary.imported,
            skipped = summary.skipped,
            "imported patient records"
        );
        Ok(summary)
    }

    /// Writes every patient to `path` in the given format.
    ///
    /// # Errors
    ///
    /// Returns an I/O, [`HealthError::Csv`] or [`HealthError::Json`] error if the export file
    /// cannot be written.
    pub fn export_to(&self, path: &Path, format: DataFormat) -> HealthResult<()> {
        let patients: Vec<&Patient> = self.patients.values().collect();
        let contents = match format {
            DataFormat::Csv => render_csv(&patients)?,
            DataFormat::Json => render_json(&patients)?,
        };

        create_parent_dir(path)?;
        fs::write(path, contents).map_err(|e| {
            tracing::error!(op = "export", path = %path.display(), error = %e, "failed to write export file");
            HealthError::FileWrite(e)
        })?;

        tracing::info!(
            op = "export",
            format = %format,
            path = %path.display(),
            count = patients.len(),
            "exported patient records"
        );
        Ok(())
    }
}

fn parse_csv(contents: &str) -> Vec<Result<RawRecord, RecordSkip>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    reader
        .records()
        .map(|row| match row {
            Ok(row) => {
                let fields: Vec<&str> = row.iter().collect();
                RawRecord::from_fields(&fields)
            }
            Err(e) => Err(RecordSkip::Schema {
                path: "<row>".into(),
                message: e.to_string(),
            }),
        })
        .collect()
}

fn parse_json(contents: &str) -> HealthResult<Vec<Result<RawRecord, RecordSkip>>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(contents).map_err(|e| {
        HealthError::Json(format!("import file must contain an array of objects: {e}"))
    })?;

    Ok(items
        .into_iter()
        .map(|item| {
            serde_path_to_error::deserialize::<_, RawRecord>(item).map_err(|err| {
                let path = err.path().to_string();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                RecordSkip::Schema {
                    path,
                    message: err.into_inner().to_string(),
                }
            })
        })
        .collect())
}

fn render_csv(patients: &[&Patient]) -> HealthResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for patient in patients {
        writer.write_record([
            patient.patient_id.clone(),
            patient.name.clone(),
            patient.age.to_string(),
            patient.gender.clone(),
            patient.height_cm.to_string(),
            patient.weight_kg.to_string(),
            patient.blood_pressure.clone(),
            patient.blood_sugar.to_string(),
            patient.cholesterol.to_string(),
            patient.check_date.clone(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        HealthError::FileWrite(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })?;
    String::from_utf8(bytes)
        .map_err(|e| HealthError::FileWrite(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn render_json(patients: &[&Patient]) -> HealthResult<String> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    patients
        .serialize(&mut serializer)
        .map_err(|e| HealthError::Json(format!("failed to serialise patients: {e}")))?;

    String::from_utf8(buf).map_err(|e| HealthError::Json(format!("JSON output is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_store(dir: &Path) -> RecordStore {
        let cfg = CoreConfig::new(
            dir.join("patient_records.txt"),
            dir.join("reports"),
            dir.join("system.log"),
        )
        .expect("CoreConfig::new should succeed");
        RecordStore::open(Arc::new(cfg)).expect("open should succeed")
    }

    fn seed(store: &mut RecordStore) {
        store
            .add(Patient::new(
                "P1", "Alice", 30, "F", 170.0, 70.0, "118/76", 5.4, 4.2, "2024-03-15",
            ))
            .expect("add P1");
        store
            .add(Patient::new(
                "P2", "Bob", 61, "M", 175.5, 77.25, "135/85", 6.3, 5.6, "2023-12-01",
            ))
            .expect("add P2");
    }

    #[test]
    fn data_format_parses_known_values_only() {
        assert_eq!("csv".parse::<DataFormat>().unwrap(), DataFormat::Csv);
        assert_eq!(" JSON ".parse::<DataFormat>().unwrap(), DataFormat::Json);

        let err = "xml".parse::<DataFormat>().expect_err("xml is unsupported");
        assert!(matches!(err, HealthError::UnsupportedFormat(f) if f == "xml"));
    }

    #[test]
    fn csv_export_has_no_header_and_field_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());
        seed(&mut store);

        let out = temp_dir.path().join("out.csv");
        store.export_to(&out, DataFormat::Csv).expect("export");

        let text = fs::read_to_string(&out).expect("read export");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "P1,Alice,30,女,170,70,118/76,5.4,4.2,2024-03-15");
    }

    #[test]
    fn json_export_uses_canonical_field_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());
        seed(&mut store);

        let out = temp_dir.path().join("out.json");
        store.export_to(&out, DataFormat::Json).expect("export");

        let text = fs::read_to_string(&out).expect("read export");
        assert!(text.contains("\"gender\": \"男\""), "non-ASCII kept verbatim");

        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        let first = &value[0];
        assert_eq!(first["patient_id"], "P1");
        assert_eq!(first["age"], 30);
        assert_eq!(first["height"], 170.0);
        assert_eq!(first["weight"], 70.0);
        assert_eq!(first["check_date"], "2024-03-15");
        assert_eq!(first.as_object().map(|o| o.len()), Some(10));
    }

    #[test]
    fn export_then_import_round_trips_both_formats() {
        for format in [DataFormat::Csv, DataFormat::Json] {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let mut source = open_store(&temp_dir.path().join("source"));
            seed(&mut source);

            let out = temp_dir.path().join(format!("export.{format}"));
            source.export_to(&out, format).expect("export");

            let mut target = open_store(&temp_dir.path().join("target"));
            let summary = target.import_from(&out, format).expect("import");

            assert_eq!(
                summary,
                ImportSummary {
                    imported: 2,
                    skipped: 0
                },
                "{format}"
            );
            assert_eq!(target.list_all(), source.list_all(), "{format}");
        }
    }

    #[test]
    fn csv_import_skips_malformed_rows_and_overwrites_existing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());
        seed(&mut store);

        let src = temp_dir.path().join("in.csv");
        fs::write(
            &src,
            concat!(
                "P1,Alicia,31,F,171,69,117/75,5.3,4.1,2024-04-01\n",
                "P3,\"Chen\",45,男,168,66,128/84,6.0,5.0,2024-02-02\n",
                "P4,Short,row\n",
                "P5,Dan,40,M,180,80,120/80,5.0,4.0,2024-01-01,extra\n",
                "P6,Eve,abc,F,160,55,110/70,5.0,4.0,2024-01-01\n",
            ),
        )
        .expect("write csv");

        let summary = store.import_from(&src, DataFormat::Csv).expect("import");
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                skipped: 3
            }
        );
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("P1").map(|p| p.name.as_str()), Some("Alicia"));
        assert!(store.contains("P3"));

        let reopened = open_store(temp_dir.path());
        assert_eq!(reopened.list_all(), store.list_all(), "import is persisted");
    }

    #[test]
    fn json_import_requires_exact_field_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());

        let src = temp_dir.path().join("in.json");
        fs::write(
            &src,
            r#"[
                {"patient_id": "P1", "name": "Alice", "age": 30, "gender": "F",
                 "height": 170, "weight": 70, "blood_pressure": "118/76",
                 "blood_sugar": 5.4, "cholesterol": 4.2, "check_date": "2024-03-15"},
                {"patient_id": "P2", "name": "Bob", "age": 40, "gender": "M",
                 "height_cm": 180, "weight": 80, "blood_pressure": "120/80",
                 "blood_sugar": 5.0, "cholesterol": 4.0, "check_date": "2024-01-01"},
                {"patient_id": "P3", "name": "Carol", "age": "old", "gender": "F",
                 "height": 160, "weight": 60, "blood_pressure": "120/80",
                 "blood_sugar": 5.0, "cholesterol": 4.0, "check_date": "2024-01-01"},
                {"patient_id": "P4", "name": "Dave", "age": 40, "gender": "M",
                 "height": 180, "weight": 80, "blood_pressure": "120/80",
                 "blood_sugar": 5.0, "cholesterol": 4.0}
            ]"#,
        )
        .expect("write json");

        let summary = store.import_from(&src, DataFormat::Json).expect("import");
        assert_eq!(
            summary,
            ImportSummary {
                imported: 1,
                skipped: 3
            }
        );
        assert!(store.contains("P1"));
        assert_eq!(store.get("P1").map(|p| p.gender.as_str()), Some("女"));
    }

    #[test]
    fn json_import_rejects_non_array_without_changes() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());
        seed(&mut store);

        let src = temp_dir.path().join("in.json");
        fs::write(&src, r#"{"patient_id": "P9"}"#).expect("write json");

        let err = store
            .import_from(&src, DataFormat::Json)
            .expect_err("object root should fail");
        assert!(matches!(err, HealthError::Json(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn failed_save_rolls_back_import() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());
        seed(&mut store);
        let before = store.list_all();

        let src = temp_dir.path().join("in.csv");
        fs::write(
            &src,
            concat!(
                "P1,Alicia,31,F,171,69,117/75,5.3,4.1,2024-04-01\n",
                "P3,Chen,45,男,168,66,128/84,6.0,5.0,2024-02-02\n",
            ),
        )
        .expect("write csv");

        let data_file = store.data_file().to_path_buf();
        fs::remove_file(&data_file).expect("remove record file");
        fs::create_dir(&data_file).expect("create directory at record path");

        let err = store
            .import_from(&src, DataFormat::Csv)
            .expect_err("save should fail");
        assert!(matches!(err, HealthError::FileWrite(_)));
        assert_eq!(store.list_all(), before, "failed import must not stay in memory");
    }

    #[test]
    fn import_missing_file_is_io_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = open_store(temp_dir.path());

        let err = store
            .import_from(&temp_dir.path().join("missing.csv"), DataFormat::Csv)
            .expect_err("missing file should fail");
        assert!(matches!(err, HealthError::FileRead(_)));
    }
}
