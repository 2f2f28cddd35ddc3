//! Health metric classification.
//!
//! Pure, stateless functions that map vitals onto categorical statuses. Every function is
//! total: a malformed blood pressure string yields [`BloodPressureStatus::Malformed`] rather
//! than an error.

use crate::patient::{parse_blood_pressure, Patient};

/// BMI category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

/// Blood pressure status, ordered from lowest to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BloodPressureStatus {
    Low,
    Ideal,
    Normal,
    MildHypertension,
    ModerateHypertension,
    SevereHypertension,
    /// The reading was not two integers separated by `/`.
    Malformed,
}

impl BloodPressureStatus {
    pub fn label(self) -> &'static str {
        match self {
            BloodPressureStatus::Low => "low",
            BloodPressureStatus::Ideal => "ideal",
            BloodPressureStatus::Normal => "normal",
            BloodPressureStatus::MildHypertension => "mild-hypertension",
            BloodPressureStatus::ModerateHypertension => "moderate-hypertension",
            BloodPressureStatus::SevereHypertension => "severe-hypertension",
            BloodPressureStatus::Malformed => "malformed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BloodSugarStatus {
    Low,
    Normal,
    Impaired,
    Diabetic,
}

impl BloodSugarStatus {
    pub fn label(self) -> &'static str {
        match self {
            BloodSugarStatus::Low => "low",
            BloodSugarStatus::Normal => "normal",
            BloodSugarStatus::Impaired => "impaired",
            BloodSugarStatus::Diabetic => "diabetic",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CholesterolStatus {
    Low,
    Normal,
    High,
}

impl CholesterolStatus {
    pub fn label(self) -> &'static str {
        match self {
            CholesterolStatus::Low => "low",
            CholesterolStatus::Normal => "normal",
            CholesterolStatus::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartRateStatus {
    Bradycardia,
    Normal,
    Tachycardia,
}

impl HeartRateStatus {
    pub fn label(self) -> &'static str {
        match self {
            HeartRateStatus::Bradycardia => "bradycardia",
            HeartRateStatus::Normal => "normal",
            HeartRateStatus::Tachycardia => "tachycardia",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemperatureStatus {
    Low,
    Normal,
    Fever,
}

impl TemperatureStatus {
    pub fn label(self) -> &'static str {
        match self {
            TemperatureStatus::Low => "low",
            TemperatureStatus::Normal => "normal",
            TemperatureStatus::Fever => "fever",
        }
    }
}

/// Optional vitals measured at report time rather than stored with the patient.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtraVitals {
    /// Beats per minute.
    pub heart_rate: Option<u32>,
    /// Degrees Celsius.
    pub temperature: Option<f64>,
}

/// Every classification derived for one patient.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthAnalysis {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub blood_pressure: BloodPressureStatus,
    pub blood_sugar: BloodSugarStatus,
    pub cholesterol: CholesterolStatus,
    pub heart_rate: Option<(u32, HeartRateStatus)>,
    pub temperature: Option<(f64, TemperatureStatus)>,
}

/// Namespace for the classification functions.
pub struct HealthAnalyzer;

impl HealthAnalyzer {
    /// BMI rounded to two decimals, with its category.
    pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> (f64, BmiCategory) {
        let height_m = height_cm / 100.0;
        let bmi = (weight_kg / (height_m * height_m) * 100.0).round() / 100.0;

        let category = if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 24.0 {
            BmiCategory::Normal
        } else if bmi < 28.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        };
        (bmi, category)
    }

    /// Classifies a `systolic/diastolic` reading.
    ///
    /// A reading is low if either value is below its floor (90/60). Otherwise each value is
    /// placed in its own band and the more severe band wins.
    pub fn analyze_blood_pressure(reading: &str) -> BloodPressureStatus {
        let Some((systolic, diastolic)) = parse_blood_pressure(reading) else {
            return BloodPressureStatus::Malformed;
        };
        if systolic < 90 || diastolic < 60 {
            return BloodPressureStatus::Low;
        }

        let systolic_band = match systolic {
            i32::MIN..=119 => BloodPressureStatus::Ideal,
            120..=139 => BloodPressureStatus::Normal,
            140..=159 => BloodPressureStatus::MildHypertension,
            160..=179 => BloodPressureStatus::ModerateHypertension,
            _ => BloodPressureStatus::SevereHypertension,
        };
        let diastolic_band = match diastolic {
            i32::MIN..=79 => BloodPressureStatus::Ideal,
            80..=89 => BloodPressureStatus::Normal,
            90..=99 => BloodPressureStatus::MildHypertension,
            100..=109 => BloodPressureStatus::ModerateHypertension,
            _ => BloodPressureStatus::SevereHypertension,
        };
        systolic_band.max(diastolic_band)
    }

    /// Blood sugar in mmol/L.
    pub fn analyze_blood_sugar(blood_sugar: f64) -> BloodSugarStatus {
        if blood_sugar < 3.9 {
            BloodSugarStatus::Low
        } else if blood_sugar <= 6.1 {
            BloodSugarStatus::Normal
        } else if blood_sugar <= 7.0 {
            BloodSugarStatus::Impaired
        } else {
            BloodSugarStatus::Diabetic
        }
    }

    /// Total cholesterol in mmol/L.
    pub fn analyze_cholesterol(cholesterol: f64) -> CholesterolStatus {
        if cholesterol < 3.1 {
            CholesterolStatus::Low
        } else if cholesterol <= 5.2 {
            CholesterolStatus::Normal
        } else {
            CholesterolStatus::High
        }
    }

    pub fn analyze_heart_rate(heart_rate: u32) -> HeartRateStatus {
        match heart_rate {
            0..=59 => HeartRateStatus::Bradycardia,
            60..=100 => HeartRateStatus::Normal,
            _ => HeartRateStatus::Tachycardia,
        }
    }

    pub fn analyze_temperature(temperature: f64) -> TemperatureStatus {
        if temperature < 36.0 {
            TemperatureStatus::Low
        } else if temperature <= 37.2 {
            TemperatureStatus::Normal
        } else {
            TemperatureStatus::Fever
        }
    }

    /// Runs every classification for `patient` plus whichever extra vitals were supplied.
    pub fn analyze(patient: &Patient, extra: ExtraVitals) -> HealthAnalysis {
        let (bmi, bmi_category) = Self::calculate_bmi(patient.height_cm, patient.weight_kg);
        HealthAnalysis {
            bmi,
            bmi_category,
            blood_pressure: Self::analyze_blood_pressure(&patient.blood_pressure),
            blood_sugar: Self::analyze_blood_sugar(patient.blood_sugar),
            cholesterol: Self::analyze_cholesterol(patient.cholesterol),
            heart_rate: extra
                .heart_rate
                .map(|hr| (hr, Self::analyze_heart_rate(hr))),
            temperature: extra
                .temperature
                .map(|t| (t, Self::analyze_temperature(t))),
        }
    }
}
