use super::{
    ApiError, Backend, ChatRecord, ChatRequest, GeneratedReport, NewUser, PDF_CONTENT_TYPE,
    PredictionRecord, PredictionRequest, PredictionResult, ReportAnalysis, ReportFile,
    ReportRecord, ReportRequest, User,
};
use async_trait::async_trait;
use reqwest::{
    Response, StatusCode,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DUPLICATE_EMAIL_DETAIL: &str = "Email already registered";

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Turns a non-success response into [`ApiError::Status`], pulling the
/// message out of a `{"detail": ...}` body when there is one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status,
        detail: error_detail(&body),
    })
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v.get("detail")? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn is_duplicate_email(status: StatusCode, detail: &str) -> bool {
    status == StatusCode::BAD_REQUEST && detail == DUPLICATE_EMAIL_DETAIL
}

#[async_trait]
impl Backend for HttpBackend {
    async fn health(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        debug!("POST /users/ ({})", user.email);
        let response = self
            .client
            .post(self.url("/users/"))
            .json(user)
            .send()
            .await?;

        match check_status(response).await {
            Ok(response) => Ok(response.json().await?),
            Err(ApiError::Status { status, detail }) if is_duplicate_email(status, &detail) => {
                Err(ApiError::DuplicateIdentity)
            }
            Err(e) => Err(e),
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<Value, ApiError> {
        debug!("POST /chat/ for user {}", request.user_id);
        let response = self
            .client
            .post(self.url("/chat/"))
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ApiError> {
        debug!("POST /predict/ for user {}", request.user_id);
        let response = self
            .client
            .post(self.url("/predict/"))
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn analyze_report(
        &self,
        user_id: i64,
        file: &ReportFile,
    ) -> Result<ReportAnalysis, ApiError> {
        debug!(
            "POST /analyze-report/ for user {} ({}, {} bytes)",
            user_id,
            file.name,
            file.size
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("user_id", user_id.to_string());

        let response = self
            .client
            .post(self.url("/analyze-report/"))
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn prediction_history(&self, user_id: i64) -> Result<Vec<PredictionRecord>, ApiError> {
        self.get_json(&format!("/history/predictions/{}", user_id))
            .await
    }

    async fn chat_history(&self, user_id: i64) -> Result<Vec<ChatRecord>, ApiError> {
        self.get_json(&format!("/history/chats/{}", user_id)).await
    }

    async fn report_history(&self, user_id: i64) -> Result<Vec<ReportRecord>, ApiError> {
        self.get_json(&format!("/history/reports/{}", user_id)).await
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<GeneratedReport, ApiError> {
        debug!("POST /generate-report/ {:?}", request);
        let response = self
            .client
            .post(self.url("/generate-report/"))
            .query(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let is_document = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with(PDF_CONTENT_TYPE));

        let bytes = response.bytes().await?;
        if is_document {
            return Ok(GeneratedReport::Document(bytes.to_vec()));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(GeneratedReport::Acknowledgment(Value::Null));
        }

        let ack = serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(GeneratedReport::Acknowledgment(ack))
    }
}
