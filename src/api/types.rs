use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub user_id: i64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub age: f64,
    pub gender: String,
    pub pregnancies: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vitals {
    pub bmi: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub diabetes_pedigree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeText {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub user_id: i64,
    pub demographics: Demographics,
    pub lifestyle: FreeText,
    pub symptoms: FreeText,
    pub vitals: Vitals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResult {
    pub disease: String,
    pub risk: f64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub recommendations: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportAnalysis {
    #[serde(default)]
    pub findings: Option<String>,
    #[serde(default)]
    pub advice: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    #[serde(default)]
    pub disease: String,
    #[serde(default)]
    pub risk: f64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRecord {
    pub id: i64,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRecord {
    pub id: i64,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub advice: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Identifiers passed to report generation. Absent ids are left out of the
/// query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportRequest {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
}

impl ReportRequest {
    pub fn has_sources(&self) -> bool {
        self.prediction_id.is_some() || self.chat_id.is_some() || self.report_id.is_some()
    }
}

/// Report generation answers either with the rendered document or with a
/// JSON acknowledgment, depending on the response content type.
#[derive(Debug, Clone)]
pub enum GeneratedReport {
    Document(Vec<u8>),
    Acknowledgment(Value),
}

/// A report picked for upload. `size` comes from the file's metadata, so a
/// file can be judged before its contents are read.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl ReportFile {
    pub fn content_type_for(path: &Path) -> String {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}
