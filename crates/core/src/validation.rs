//! Patient field validation rules.
//!
//! Every rule inspects one field and returns an optional message. [`run_rules`] evaluates the
//! whole list and collects every message, so a caller sees all violations of a record at once.

use crate::constants::CHECK_DATE_FORMAT;
use crate::patient::{parse_blood_pressure, Gender, Patient};
use chrono::NaiveDate;

/// Accumulated rule violations for a single patient record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    /// The individual violation messages, in rule order.
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

type Rule = fn(&Patient) -> Option<String>;

const RULES: &[Rule] = &[
    check_patient_id,
    check_name,
    check_age,
    check_gender,
    check_height,
    check_weight,
    check_blood_pressure,
    check_blood_sugar,
    check_cholesterol,
    check_check_date,
];

/// Runs every rule against `patient` without short-circuiting.
///
/// # Errors
///
/// Returns [`ValidationErrors`] holding one message per failed rule.
pub fn run_rules(patient: &Patient) -> Result<(), ValidationErrors> {
    let messages: Vec<String> = RULES.iter().filter_map(|rule| rule(patient)).collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(messages))
    }
}

/// Returns true if `id` is `P` followed by one or more ASCII digits.
pub fn is_valid_patient_id(id: &str) -> bool {
    match id.strip_prefix('P') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Returns true if `date` is exactly `YYYY-MM-DD` and names a real calendar day.
pub fn is_valid_check_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    shape_ok && NaiveDate::parse_from_str(date, CHECK_DATE_FORMAT).is_ok()
}

fn check_patient_id(p: &Patient) -> Option<String> {
    (!is_valid_patient_id(&p.patient_id))
        .then(|| "patient_id must start with 'P' followed by digits".to_string())
}

fn check_name(p: &Patient) -> Option<String> {
    if p.name.is_empty() {
        return Some("name cannot be empty".into());
    }
    // The record file is whitespace-delimited, so a name must be a single token.
    p.name
        .chars()
        .any(char::is_whitespace)
        .then(|| "name cannot contain whitespace".to_string())
}

fn check_age(p: &Patient) -> Option<String> {
    (!(0..=120).contains(&p.age)).then(|| "age must be between 0 and 120".to_string())
}

fn check_gender(p: &Patient) -> Option<String> {
    Gender::from_token(&p.gender)
        .is_none()
        .then(|| "gender must be '男' or '女' (or the aliases 'M'/'F')".to_string())
}

fn check_height(p: &Patient) -> Option<String> {
    (!(50.0..=250.0).contains(&p.height_cm))
        .then(|| "height must be between 50 and 250 cm".to_string())
}

fn check_weight(p: &Patient) -> Option<String> {
    (!(20.0..=200.0).contains(&p.weight_kg))
        .then(|| "weight must be between 20 and 200 kg".to_string())
}

fn check_blood_pressure(p: &Patient) -> Option<String> {
    let in_range = matches!(
        parse_blood_pressure(&p.blood_pressure),
        Some((systolic, diastolic)) if systolic > 0 && systolic < 300 && diastolic > 0 && diastolic < 200
    );
    (!in_range).then(|| {
        "blood_pressure must be 'systolic/diastolic' with 0 < systolic < 300 and 0 < diastolic < 200"
            .to_string()
    })
}

fn check_blood_sugar(p: &Patient) -> Option<String> {
    (!is_positive(p.blood_sugar)).then(|| "blood_sugar must be a positive number".to_string())
}

fn check_cholesterol(p: &Patient) -> Option<String> {
    (!is_positive(p.cholesterol)).then(|| "cholesterol must be a positive number".to_string())
}

fn check_check_date(p: &Patient) -> Option<String> {
    (!is_valid_check_date(&p.check_date))
        .then(|| "check_date must be a real date in YYYY-MM-DD format".to_string())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
