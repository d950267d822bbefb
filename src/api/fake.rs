//! Scripted in-memory backend for controller tests.

use super::*;
use reqwest::StatusCode;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

#[derive(Default)]
pub struct FakeBackend {
    pub healthy: bool,
    /// Number of leading `create_user` calls answered with a duplicate email.
    pub duplicate_rejections: AtomicUsize,
    pub create_user_fails: bool,
    pub chat_reply: Option<Value>,
    pub prediction: Option<PredictionResult>,
    pub analysis: Option<ReportAnalysis>,
    pub prediction_records: Option<Vec<PredictionRecord>>,
    pub chat_records: Option<Vec<ChatRecord>>,
    pub report_records: Option<Vec<ReportRecord>>,
    pub generated: Option<GeneratedReport>,

    pub calls: Mutex<Vec<&'static str>>,
    pub new_users: Mutex<Vec<NewUser>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub prediction_requests: Mutex<Vec<PredictionRequest>>,
    pub report_requests: Mutex<Vec<ReportRequest>>,
}

impl FakeBackend {
    pub fn calls_to(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: "scripted failure".to_string(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn health(&self) -> Result<(), ApiError> {
        self.record("health");
        if self.healthy {
            Ok(())
        } else {
            Err(ApiError::Network("connection refused".to_string()))
        }
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.record("create_user");
        self.new_users.lock().unwrap().push(user.clone());

        if self.create_user_fails {
            return Err(server_error());
        }

        let remaining = self.duplicate_rejections.load(Ordering::SeqCst);
        if remaining > 0 {
            self.duplicate_rejections
                .store(remaining - 1, Ordering::SeqCst);
            return Err(ApiError::DuplicateIdentity);
        }

        Ok(User {
            id: 42,
            name: user.name.clone(),
            email: user.email.clone(),
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<Value, ApiError> {
        self.record("chat");
        self.chat_requests.lock().unwrap().push(request.clone());
        self.chat_reply.clone().ok_or_else(server_error)
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ApiError> {
        self.record("predict");
        self.prediction_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.prediction.clone().ok_or_else(server_error)
    }

    async fn analyze_report(
        &self,
        _user_id: i64,
        _file: &ReportFile,
    ) -> Result<ReportAnalysis, ApiError> {
        self.record("analyze_report");
        self.analysis.clone().ok_or_else(server_error)
    }

    async fn prediction_history(&self, _user_id: i64) -> Result<Vec<PredictionRecord>, ApiError> {
        self.record("prediction_history");
        self.prediction_records.clone().ok_or_else(server_error)
    }

    async fn chat_history(&self, _user_id: i64) -> Result<Vec<ChatRecord>, ApiError> {
        self.record("chat_history");
        self.chat_records.clone().ok_or_else(server_error)
    }

    async fn report_history(&self, _user_id: i64) -> Result<Vec<ReportRecord>, ApiError> {
        self.record("report_history");
        self.report_records.clone().ok_or_else(server_error)
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<GeneratedReport, ApiError> {
        self.record("generate_report");
        self.report_requests.lock().unwrap().push(request.clone());
        self.generated.clone().ok_or_else(server_error)
    }
}
