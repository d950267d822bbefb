use crate::api::{Demographics, FreeText, PredictionRequest, Vitals};
use std::collections::BTreeMap;

/// Value used for each numeric field that is missing or not a number.
pub const NUMERIC_DEFAULTS: &[(&str, f64)] = &[
    ("age", 30.0),
    ("bmi", 25.0),
    ("glucose", 100.0),
    ("blood_pressure", 120.0),
    ("diabetes_pedigree", 0.5),
    ("pregnancies", 0.0),
    ("skin_thickness", 20.0),
    ("insulin", 80.0),
];

/// Value used for each text field that is missing or blank.
pub const TEXT_DEFAULTS: &[(&str, &str)] = &[
    ("gender", "unknown"),
    ("lifestyle", "Not specified"),
    ("symptoms", "Not specified"),
];

/// Raw, unvalidated prediction form input keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionForm {
    fields: BTreeMap<String, String>,
}

impl PredictionForm {
    pub fn set(&mut self, name: &str, value: &str) {
        self.fields
            .insert(name.trim().to_ascii_lowercase(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_known_field(name: &str) -> bool {
        NUMERIC_DEFAULTS.iter().any(|(n, _)| *n == name)
            || TEXT_DEFAULTS.iter().any(|(n, _)| *n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn number(&self, name: &str) -> f64 {
        self.get(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or_else(|| default_number(name))
    }

    pub fn text(&self, name: &str) -> String {
        self.get(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .unwrap_or_else(|| default_text(name).to_string())
    }

    pub fn to_request(&self, user_id: i64) -> PredictionRequest {
        PredictionRequest {
            user_id,
            demographics: Demographics {
                age: self.number("age"),
                gender: self.text("gender"),
                pregnancies: self.number("pregnancies"),
            },
            lifestyle: FreeText {
                description: self.text("lifestyle"),
            },
            symptoms: FreeText {
                description: self.text("symptoms"),
            },
            vitals: Vitals {
                bmi: self.number("bmi"),
                glucose: self.number("glucose"),
                blood_pressure: self.number("blood_pressure"),
                skin_thickness: self.number("skin_thickness"),
                insulin: self.number("insulin"),
                diabetes_pedigree: self.number("diabetes_pedigree"),
            },
        }
    }
}

fn default_number(name: &str) -> f64 {
    NUMERIC_DEFAULTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or(0.0)
}

fn default_text(name: &str) -> &'static str {
    TEXT_DEFAULTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or("")
}
