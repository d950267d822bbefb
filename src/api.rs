use async_trait::async_trait;
use serde_json::Value;

mod error;
#[cfg(test)]
pub mod fake;
mod http;
mod types;

pub use error::ApiError;
pub use http::HttpBackend;
pub use types::*;

/// The AI Health Assistant REST API as seen by the session controller.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn health(&self) -> Result<(), ApiError>;

    /// Fails with [`ApiError::DuplicateIdentity`] when the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError>;

    /// Returns the raw reply object; the field holding the answer varies.
    async fn chat(&self, request: &ChatRequest) -> Result<Value, ApiError>;

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ApiError>;

    async fn analyze_report(
        &self,
        user_id: i64,
        file: &ReportFile,
    ) -> Result<ReportAnalysis, ApiError>;

    async fn prediction_history(&self, user_id: i64) -> Result<Vec<PredictionRecord>, ApiError>;

    async fn chat_history(&self, user_id: i64) -> Result<Vec<ChatRecord>, ApiError>;

    async fn report_history(&self, user_id: i64) -> Result<Vec<ReportRecord>, ApiError>;

    async fn generate_report(&self, request: &ReportRequest) -> Result<GeneratedReport, ApiError>;
}
