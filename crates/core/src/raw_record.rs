//! Canonical raw record shared by every ingestion path.
//!
//! The record file, CSV import and JSON import each produce a [`RawRecord`] and then converge
//! on [`RawRecord::into_validated`]. They differ only in how the raw record is produced:
//!
//! - record file lines are split on runs of whitespace ([`parse_record_line`])
//! - CSV rows are taken positionally ([`RawRecord::from_fields`])
//! - JSON objects are deserialised by field name (`serde`, unknown keys rejected)

use crate::constants::RECORD_FIELD_COUNT;
use crate::patient::{Gender, Patient};
use crate::validation::ValidationErrors;
use serde::Deserialize;

/// Typed but unvalidated field values. `None` marks a field that was missing or unparseable.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRecord {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub blood_pressure: Option<String>,
    #[serde(default)]
    pub blood_sugar: Option<f64>,
    #[serde(default)]
    pub cholesterol: Option<f64>,
    #[serde(default)]
    pub check_date: Option<String>,
}

/// Why a single line, row or object was left out of the store.
#[derive(Debug, thiserror::Error)]
pub enum RecordSkip {
    #[error("expected {} fields, found {found}", RECORD_FIELD_COUNT)]
    FieldCount { found: usize },
    #[error("unrecognised gender token '{0}'")]
    Gender(String),
    #[error("schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),
}

impl RawRecord {
    /// Builds a raw record from exactly [`RECORD_FIELD_COUNT`] positional fields.
    ///
    /// Each field is trimmed. Numeric fields that fail to parse become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordSkip::FieldCount`] for any other number of fields.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, RecordSkip> {
        if fields.len() != RECORD_FIELD_COUNT {
            return Err(RecordSkip::FieldCount {
                found: fields.len(),
            });
        }

        let text = |i: usize| Some(fields[i].as_ref().trim().to_string());
        let number = |i: usize| fields[i].as_ref().trim().parse::<f64>().ok();

        Ok(Self {
            patient_id: text(0),
            name: text(1),
            age: fields[2].as_ref().trim().parse::<i64>().ok(),
            gender: text(3),
            height: number(4),
            weight: number(5),
            blood_pressure: text(6),
            blood_sugar: number(7),
            cholesterol: number(8),
            check_date: text(9),
        })
    }

    /// Converts into a [`Patient`] without running the validation rules.
    ///
    /// # Errors
    ///
    /// Returns one message per missing or unparseable field.
    pub fn into_patient(self) -> Result<Patient, ValidationErrors> {
        let mut missing = Vec::new();
        let mut require = |present: bool, message: &str| {
            if !present {
                missing.push(message.to_string());
            }
        };
        require(self.patient_id.is_some(), "patient_id is missing");
        require(self.name.is_some(), "name is missing");
        require(self.age.is_some(), "age is missing or not an integer");
        require(self.gender.is_some(), "gender is missing");
        require(self.height.is_some(), "height is missing or not a number");
        require(self.weight.is_some(), "weight is missing or not a number");
        require(self.blood_pressure.is_some(), "blood_pressure is missing");
        require(self.blood_sugar.is_some(), "blood_sugar is missing or not a number");
        require(self.cholesterol.is_some(), "cholesterol is missing or not a number");
        require(self.check_date.is_some(), "check_date is missing");

        match self {
            RawRecord {
                patient_id: Some(patient_id),
                name: Some(name),
                age: Some(age),
                gender: Some(gender),
                height: Some(height),
                weight: Some(weight),
                blood_pressure: Some(blood_pressure),
                blood_sugar: Some(blood_sugar),
                cholesterol: Some(cholesterol),
                check_date: Some(check_date),
            } => Ok(Patient::new(
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
            )),
            _ => Err(ValidationErrors::new(missing)),
        }
    }

    /// Converts and validates in one step. This is the single entry point every ingestion path
    /// uses before a patient reaches the store.
    ///
    /// # Errors
    ///
    /// Returns [`RecordSkip::Invalid`] with every missing field or failed rule.
    pub fn into_validated(self) -> Result<Patient, RecordSkip> {
        let mut patient = self.into_patient().map_err(RecordSkip::Invalid)?;
        patient.check().map_err(RecordSkip::Invalid)?;
        Ok(patient)
    }
}

/// Parses one non-empty line of the record file.
///
/// The line is split on runs of whitespace and must yield exactly [`RECORD_FIELD_COUNT`]
/// fields. The gender token is normalised before the patient is built and validated.
///
/// # Errors
///
/// Returns a [`RecordSkip`] describing why the line cannot be loaded.
pub fn parse_record_line(line: &str) -> Result<Patient, RecordSkip> {
    let mut fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != RECORD_FIELD_COUNT {
        return Err(RecordSkip::FieldCount {
            found: fields.len(),
        });
    }

    let gender = Gender::from_token(fields[3])
        .ok_or_else(|| RecordSkip::Gender(fields[3].to_string()))?;
    fields[3] = gender.token();

    RawRecord::from_fields(&fields)?.into_validated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MALE_TOKEN;

    const LINE: &str = "P1\tAlice\t30\t女\t170.00\t70.00\t118/76\t5.40\t4.20\t2024-03-15";

    #[test]
    fn parse_record_line_inverts_to_record_line() {
        let patient = parse_record_line(LINE).expect("line should parse");
        assert_eq!(patient.to_record_line(), LINE);
    }

    #[test]
    fn parse_record_line_accepts_mixed_whitespace() {
        let line = "P2  Bob \t 45 M 180.5\t80 130/85 6.00 5.10   2023-11-02";
        let patient = parse_record_line(line).expect("line should parse");
        assert_eq!(patient.patient_id, "P2");
        assert_eq!(patient.gender, MALE_TOKEN);
        assert_eq!(patient.height_cm, 180.5);
    }

    #[test]
    fn parse_record_line_rejects_wrong_field_counts() {
        let nine = "P1 Alice 30 女 170 70 118/76 5.4 4.2";
        let eleven = format!("{LINE}\textra");

        assert!(matches!(
            parse_record_line(nine),
            Err(RecordSkip::FieldCount { found: 9 })
        ));
        assert!(matches!(
            parse_record_line(&eleven),
            Err(RecordSkip::FieldCount { found: 11 })
        ));
    }

    #[test]
    fn parse_record_line_rejects_unknown_gender_before_validation() {
        let line = LINE.replace('女', "X");
        assert!(matches!(parse_record_line(&line), Err(RecordSkip::Gender(g)) if g == "X"));
    }

    #[test]
    fn parse_record_line_reports_unparseable_numbers() {
        let line = LINE.replace("\t30\t", "\tthirty\t");
        match parse_record_line(&line) {
            Err(RecordSkip::Invalid(errors)) => {
                assert_eq!(
                    errors.messages().to_vec(),
                    vec!["age is missing or not an integer".to_string()]
                );
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn from_fields_trims_positional_values() {
        let fields = [
            " P3", "Carol ", " 52", "F", "165", " 60.5", "125/82", "6.5", "5.5", "2024-01-09 ",
        ];
        let raw = RawRecord::from_fields(&fields).expect("ten fields");
        assert_eq!(raw.patient_id.as_deref(), Some("P3"));
        assert_eq!(raw.age, Some(52));
        assert_eq!(raw.weight, Some(60.5));

        let patient = raw.into_validated().expect("valid record");
        assert_eq!(patient.gender, "女");
    }

    #[test]
    fn into_patient_lists_every_missing_field() {
        let raw = RawRecord {
            patient_id: Some("P9".into()),
            ..RawRecord::default()
        };
        let errors = raw.into_patient().expect_err("nine fields are missing");
        assert_eq!(errors.len(), 9);
    }
}
