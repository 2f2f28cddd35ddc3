//! Patient entity.
//!
//! A [`Patient`] is built from raw field values, trimming string fields but performing no
//! validation until [`Patient::validate`] is called. The record store only ever holds patients
//! that have passed validation.

use crate::constants::{FEMALE_ALIAS, FEMALE_TOKEN, MALE_ALIAS, MALE_TOKEN};
use crate::validation::{self, ValidationErrors};
use crate::{HealthError, HealthResult};
use serde::Serialize;

/// Patient gender as persisted in the record file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Canonical on-disk token.
    pub fn token(self) -> &'static str {
        match self {
            Gender::Male => MALE_TOKEN,
            Gender::Female => FEMALE_TOKEN,
        }
    }

    /// Parse a canonical token or one of the legacy `M`/`F` aliases.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            MALE_TOKEN | MALE_ALIAS => Some(Gender::Male),
            FEMALE_TOKEN | FEMALE_ALIAS => Some(Gender::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Split a `systolic/diastolic` reading into its two integers.
///
/// Returns `None` unless the text is exactly two integers separated by a single `/`.
pub fn parse_blood_pressure(text: &str) -> Option<(i32, i32)> {
    let (systolic, diastolic) = text.split_once('/')?;
    if diastolic.contains('/') {
        return None;
    }
    Some((systolic.parse().ok()?, diastolic.parse().ok()?))
}

/// A single patient's health record.
///
/// Serialises with the canonical field names used by JSON import and export.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    #[serde(rename = "height")]
    pub height_cm: f64,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub blood_pressure: String,
    pub blood_sugar: f64,
    pub cholesterol: f64,
    pub check_date: String,
}

impl Patient {
    /// Creates an unvalidated patient, trimming every string field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        patient_id: &str,
        name: &str,
        age: i64,
        gender: &str,
        height_cm: f64,
        weight_kg: f64,
        blood_pressure: &str,
        blood_sugar: f64,
        cholesterol: f64,
        check_date: &str,
    ) -> Self {
        Self {
            patient_id: patient_id.trim().to_string(),
            name: name.trim().to_string(),
            age,
            gender: gender.trim().to_string(),
            height_cm,
            weight_kg,
            blood_pressure: blood_pressure.trim().to_string(),
            blood_sugar,
            cholesterol,
            check_date: check_date.trim().to_string(),
        }
    }

    /// Checks every field, normalising legacy gender aliases and rounding the measured values
    /// to the two decimals the record file keeps.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::Validation`] listing every failed rule, not just the first.
    pub fn validate(&mut self) -> HealthResult<()> {
        self.check().map_err(HealthError::Validation)
    }

    pub(crate) fn check(&mut self) -> Result<(), ValidationErrors> {
        if let Some(gender) = Gender::from_token(&self.gender) {
            self.gender = gender.token().to_string();
        }
        self.height_cm = round_to_cents(self.height_cm);
        self.weight_kg = round_to_cents(self.weight_kg);
        self.blood_sugar = round_to_cents(self.blood_sugar);
        self.cholesterol = round_to_cents(self.cholesterol);
        validation::run_rules(self)
    }

    /// Parsed gender, if the stored token is recognised.
    pub fn gender_kind(&self) -> Option<Gender> {
        Gender::from_token(&self.gender)
    }

    /// Serialises the patient as one tab-delimited record line.
    ///
    /// Floating-point fields are fixed at two decimals. The output is the exact inverse of
    /// [`crate::raw_record::parse_record_line`].
    pub fn to_record_line(&self) -> String {
        [
            self.patient_id.clone(),
            self.name.clone(),
            self.age.to_string(),
            self.gender.clone(),
            format!("{:.2}", self.height_cm),
            format!("{:.2}", self.weight_kg),
            self.blood_pressure.clone(),
            format!("{:.2}", self.blood_sugar),
            format!("{:.2}", self.cholesterol),
            self.check_date.clone(),
        ]
        .join("\t")
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl std::fmt::Display for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Patient ID: {}", self.patient_id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Age: {}", self.age)?;
        writeln!(f, "Gender: {}", self.gender)?;
        writeln!(f, "Height: {:.2} cm", self.height_cm)?;
        writeln!(f, "Weight: {:.2} kg", self.weight_kg)?;
        writeln!(f, "Blood pressure: {}", self.blood_pressure)?;
        writeln!(f, "Blood sugar: {:.2} mmol/L", self.blood_sugar)?;
        writeln!(f, "Cholesterol: {:.2} mmol/L", self.cholesterol)?;
        write!(f, "Check date: {}", self.check_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Patient {
        Patient::new(
            "P1", "Alice", 30, "女", 170.0, 70.0, "118/76", 5.4, 4.2, "2024-03-15",
        )
    }

    #[test]
    fn new_trims_string_fields() {
        let p = Patient::new(
            "  P7 ", " Bob\t", 40, " M ", 180.0, 80.0, " 120/80 ", 5.0, 4.0, " 2024-01-01 ",
        );
        assert_eq!(p.patient_id, "P7");
        assert_eq!(p.name, "Bob");
        assert_eq!(p.gender, "M");
        assert_eq!(p.blood_pressure, "120/80");
        assert_eq!(p.check_date, "2024-01-01");
    }

    #[test]
    fn validate_accepts_valid_patient() {
        let mut p = sample();
        p.validate().expect("sample patient should be valid");
    }

    #[test]
    fn validate_normalises_legacy_gender_aliases() {
        let mut male = Patient {
            gender: "M".into(),
            ..sample()
        };
        male.validate().expect("M should be accepted");
        assert_eq!(male.gender, MALE_TOKEN);
        assert_eq!(male.gender_kind(), Some(Gender::Male));

        let mut female = Patient {
            gender: "F".into(),
            ..sample()
        };
        female.validate().expect("F should be accepted");
        assert_eq!(female.gender, FEMALE_TOKEN);
    }

    #[test]
    fn validate_reports_every_violation_at_once() {
        let mut p = Patient::new(
            "X1", "", 130, "unknown", 10.0, 500.0, "abc", 0.0, -1.0, "2024-02-30",
        );

        let err = p.validate().expect_err("every field is invalid");
        match err {
            HealthError::Validation(errors) => {
                assert_eq!(errors.len(), 10, "got: {errors}");
                assert!(errors.messages()[0].contains("patient_id"));
                assert!(errors.messages()[9].contains("check_date"));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
        assert_eq!(p.gender, "unknown", "unrecognised gender is left untouched");
    }

    #[test]
    fn validate_rejects_out_of_range_blood_pressure() {
        for bp in ["300/80", "120/200", "0/80", "120/0", "120/80/60", "120 / 80", "120"] {
            let mut p = Patient {
                blood_pressure: bp.into(),
                ..sample()
            };
            let err = p.validate().expect_err("blood pressure should be rejected");
            assert!(
                matches!(&err, HealthError::Validation(e) if e.len() == 1),
                "{bp}: {err}"
            );
        }
    }

    #[test]
    fn validate_accepts_boundary_values() {
        let mut p = Patient {
            age: 0,
            height_cm: 50.0,
            weight_kg: 200.0,
            blood_pressure: "299/199".into(),
            ..sample()
        };
        p.validate().expect("inclusive bounds should pass");

        let mut p = Patient {
            age: 120,
            height_cm: 250.0,
            weight_kg: 20.0,
            ..sample()
        };
        p.validate().expect("inclusive bounds should pass");
    }

    #[test]
    fn validate_rejects_non_finite_numbers() {
        let mut p = Patient {
            blood_sugar: f64::NAN,
            cholesterol: f64::INFINITY,
            height_cm: f64::NAN,
            ..sample()
        };
        let err = p.validate().expect_err("non-finite values should fail");
        assert!(matches!(err, HealthError::Validation(e) if e.len() == 3));
    }

    #[test]
    fn validate_rounds_measurements_to_stored_precision() {
        let mut p = Patient {
            height_cm: 170.456,
            weight_kg: 70.004,
            blood_sugar: 6.104,
            cholesterol: 5.206,
            ..sample()
        };
        p.validate().expect("rounded values are valid");

        assert_eq!(p.height_cm, 170.46);
        assert_eq!(p.weight_kg, 70.0);
        assert_eq!(p.blood_sugar, 6.1);
        assert_eq!(p.cholesterol, 5.21);

        let reparsed =
            crate::raw_record::parse_record_line(&p.to_record_line()).expect("line should parse");
        assert_eq!(reparsed, p);
    }

    #[test]
    fn to_record_line_fixes_two_decimals() {
        let p = Patient {
            height_cm: 170.456,
            ..sample()
        };
        assert_eq!(
            p.to_record_line(),
            "P1\tAlice\t30\t女\t170.46\t70.00\t118/76\t5.40\t4.20\t2024-03-15"
        );
    }

    #[test]
    fn display_renders_labelled_lines() {
        let text = sample().to_string();
        assert!(text.starts_with("Patient ID: P1\n"));
        assert!(text.contains("Blood pressure: 118/76\n"));
        assert!(text.ends_with("Check date: 2024-03-15"));
        assert_eq!(text.lines().count(), 10);
    }

    #[test]
    fn parse_blood_pressure_requires_two_integers() {
        assert_eq!(parse_blood_pressure("118/76"), Some((118, 76)));
        assert_eq!(parse_blood_pressure("abc"), None);
        assert_eq!(parse_blood_pressure("120/"), None);
        assert_eq!(parse_blood_pressure("120/80/1"), None);
        assert_eq!(parse_blood_pressure("12.5/80"), None);
    }
}
