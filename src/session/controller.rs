use super::{
    busy::{Action, BusyGuard, BusyIndicators},
    form::PredictionForm,
    notice::Notifier,
    render, report,
    transcript::{Role, Transcript},
    upload,
};
use crate::api::{
    ApiError, Backend, ChatRequest, GeneratedReport, NewUser, ReportFile, ReportRequest, User,
};
use crate::config::Config;
use crate::store::{ChatHistoryEntry, LocalStore};
use chrono::{Local, Utc};
use rand::Rng;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, warn};
use uuid::Uuid;

const PLACEHOLDER_NAME: &str = "Guest User";
const EMAIL_DOMAIN: &str = "healthassistant.app";

/// Owns the identity and transcript of one interactive session and mediates
/// every backend call. No operation returns an error: failures end up as a
/// transcript entry, a notice, or both.
pub struct SessionController {
    backend: Arc<dyn Backend>,
    store: Arc<LocalStore>,
    notifier: Notifier,
    busy: BusyIndicators,
    transcript: Transcript,
    user: Option<User>,
    display_name: String,
    downloads_dir: PathBuf,
}

fn unique_email() -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!(
        "user_{}_{}@{}",
        Utc::now().timestamp_millis(),
        &tag[..8],
        EMAIL_DOMAIN
    )
}

fn placeholder_user() -> User {
    User {
        id: rand::rng().random_range(100_000..1_000_000),
        name: PLACEHOLDER_NAME.to_string(),
        email: unique_email(),
    }
}

fn newest_id<T>(
    kind: &str,
    lookup: Result<Vec<T>, ApiError>,
    id: impl Fn(&T) -> i64,
) -> Option<i64> {
    match lookup {
        Ok(records) => records.first().map(id),
        Err(e) => {
            warn!("Failed to fetch {} history: {}", kind, e);
            None
        }
    }
}

fn lookup_ok<T>(kind: &str, lookup: Result<Vec<T>, ApiError>) -> Option<Vec<T>> {
    lookup
        .inspect_err(|e| warn!("Failed to fetch {} history: {}", kind, e))
        .ok()
}

impl SessionController {
    pub fn new(
        config: &Config,
        backend: Arc<dyn Backend>,
        store: Arc<LocalStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            backend,
            store,
            notifier,
            busy: BusyIndicators::default(),
            transcript: Transcript::default(),
            user: None,
            display_name: config.display_name.clone(),
            downloads_dir: config.downloads_dir.clone(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[cfg(test)]
    pub fn busy(&self) -> BusyIndicators {
        self.busy.clone()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn begin(&self, action: Action) -> Option<BusyGuard> {
        let guard = self.busy.try_begin(action);
        if guard.is_none() {
            self.notifier
                .info(format!("{} is already in progress", action.label()));
        }
        guard
    }

    pub async fn check_health(&self) -> bool {
        match self.backend.health().await {
            Ok(()) => {
                self.notifier.info("Connected to the health assistant service");
                true
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                self.notifier.error(
                    "Cannot reach the health assistant service. Some features may be unavailable.",
                );
                false
            }
        }
    }

    /// Returns the session identity, creating and persisting one if needed.
    pub async fn ensure_user(&mut self) -> User {
        if let Some(user) = &self.user {
            return user.clone();
        }

        match self.store.load_user().await {
            Ok(Some(user)) => {
                info!("Using stored identity {}", user.id);
                self.user = Some(user.clone());
                return user;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load stored identity: {}", e),
        }

        let user = self.register_user().await;
        if let Err(e) = self.store.save_user(&user).await {
            warn!("Failed to persist identity {}: {}", user.id, e);
        }
        self.user = Some(user.clone());
        user
    }

    async fn register_user(&self) -> User {
        let mut request = NewUser {
            name: self.display_name.clone(),
            email: unique_email(),
        };

        let mut result = self.backend.create_user(&request).await;
        if matches!(result, Err(ApiError::DuplicateIdentity)) {
            info!("Email {} already registered, retrying", request.email);
            request.email = unique_email();
            result = self.backend.create_user(&request).await;
        }

        match result {
            Ok(user) => {
                info!("Created user {}", user.id);
                user
            }
            Err(e) => {
                let user = placeholder_user();
                warn!(
                    "Failed to create user ({}), continuing with local identity {}",
                    e, user.id
                );
                user
            }
        }
    }

    pub async fn send_message(&mut self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            return;
        }
        let Some(_busy) = self.begin(Action::SendMessage) else {
            return;
        };

        self.transcript.push(Role::User, query);
        let user = self.ensure_user().await;

        let request = ChatRequest {
            user_id: user.id,
            query: query.to_string(),
        };

        match self.backend.chat(&request).await {
            Ok(reply) => {
                let answer = render::reply_text(&reply);
                self.transcript.push(Role::Assistant, &answer);

                if let Err(e) = self
                    .store
                    .append_history(ChatHistoryEntry::new(query, &answer))
                    .await
                {
                    warn!("Failed to save chat history: {}", e);
                }
            }
            Err(e) => {
                error!("Chat request failed: {}", e);
                self.transcript.push(Role::Assistant, render::CHAT_APOLOGY);
                self.notifier
                    .error("Failed to get a response. Please try again.");
            }
        }
    }

    /// Clears `form` only when the prediction succeeds.
    pub async fn submit_prediction(&mut self, form: &mut PredictionForm) {
        let Some(_busy) = self.begin(Action::Predict) else {
            return;
        };

        let user = self.ensure_user().await;
        let request = form.to_request(user.id);

        match self.backend.predict(&request).await {
            Ok(result) => {
                info!(
                    "Prediction for user {}: {} at {:.3}",
                    user.id, result.disease, result.risk
                );
                self.transcript
                    .push(Role::Assistant, &render::prediction(&result));
                self.notifier.success("Risk assessment completed");
                form.clear();
            }
            Err(e) => {
                error!("Prediction request failed: {}", e);
                self.notifier
                    .error("Failed to get risk prediction. Please try again.");
            }
        }
    }

    pub async fn analyze_report(&mut self, selected: Option<ReportFile>) {
        let file = match upload::validate(selected.as_ref()) {
            Ok(file) => file,
            Err(rejection) => {
                warn!("Report rejected: {}", rejection);
                self.notifier.error(rejection.to_string());
                return;
            }
        };

        let Some(_busy) = self.begin(Action::AnalyzeReport) else {
            return;
        };

        let user = self.ensure_user().await;

        match self.backend.analyze_report(user.id, file).await {
            Ok(analysis) => {
                self.transcript
                    .push(Role::Assistant, &render::analysis(&file.name, &analysis));
                self.notifier.success("Report analyzed");
            }
            Err(e) => {
                error!("Report analysis for '{}' failed: {}", file.name, e);
                self.notifier
                    .error("Failed to analyze report. Please try again.");
            }
        }
    }

    pub async fn generate_report(&mut self) {
        let Some(_busy) = self.begin(Action::GenerateReport) else {
            return;
        };

        let user = self.ensure_user().await;

        let backend = &self.backend;
        let (predictions, chats, reports) = futures_util::join!(
            backend.prediction_history(user.id),
            backend.chat_history(user.id),
            backend.report_history(user.id),
        );

        let request = ReportRequest {
            user_id: user.id,
            prediction_id: newest_id("prediction", predictions, |p| p.id),
            chat_id: newest_id("chat", chats, |c| c.id),
            report_id: newest_id("report", reports, |r| r.id),
        };

        let today = Local::now().date_naive();

        if !request.has_sources() {
            info!(
                "No server records for user {}, summarizing local history",
                user.id
            );
            let history = self.store.history().await;
            self.transcript
                .push(Role::Assistant, &report::local_summary(&history, today));
            return;
        }

        match self.backend.generate_report(&request).await {
            Ok(GeneratedReport::Document(bytes)) => {
                match report::save_document(&self.downloads_dir, &bytes, today).await {
                    Ok(path) => {
                        info!("Saved report ({} bytes) to {}", bytes.len(), path.display());
                        self.notifier
                            .success(format!("Report downloaded to {}", path.display()));
                    }
                    Err(e) => {
                        error!("Failed to save report: {}", e);
                        self.notifier
                            .error("The report was generated but could not be saved.");
                    }
                }
            }
            Ok(GeneratedReport::Acknowledgment(ack)) => {
                self.notifier.success(render::acknowledgment(&ack));
            }
            Err(e) => {
                error!("Report generation failed: {}", e);
                self.notifier
                    .error("Failed to generate report. Please try again.");
            }
        }
    }

    pub async fn history_overview(&mut self) {
        let Some(_busy) = self.begin(Action::History) else {
            return;
        };

        let user = self.ensure_user().await;

        let backend = &self.backend;
        let (predictions, chats, reports) = futures_util::join!(
            backend.prediction_history(user.id),
            backend.chat_history(user.id),
            backend.report_history(user.id),
        );

        let predictions = lookup_ok("prediction", predictions);
        let chats = lookup_ok("chat", chats);
        let reports = lookup_ok("report", reports);

        let overview = render::history_overview(
            predictions.as_deref(),
            chats.as_deref(),
            reports.as_deref(),
        );
        self.transcript.push(Role::Assistant, &overview);
    }

    /// Starts over: empty transcript, no stored chat history. The identity
    /// is kept.
    pub async fn new_session(&mut self) {
        self.transcript.clear();
        if let Err(e) = self.store.clear_history().await {
            warn!("Failed to clear chat history: {}", e);
        }
        self.notifier.info("Started a new chat");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ChatRecord, PDF_CONTENT_TYPE, PredictionRecord, PredictionResult, ReportAnalysis,
        fake::FakeBackend,
    };
    use crate::session::{Notice, NoticeLevel};
    use crate::store::HISTORY_LIMIT;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tempfile::{TempDir, tempdir};
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        controller: SessionController,
        backend: Arc<FakeBackend>,
        store: Arc<LocalStore>,
        notices: UnboundedReceiver<Notice>,
        dir: TempDir,
    }

    impl Harness {
        async fn new(backend: FakeBackend) -> Self {
            let dir = tempdir().unwrap();
            let config = Config {
                api_url: "http://backend.test".to_string(),
                api_timeout: 5,
                data_dir: dir.path().join("data"),
                downloads_dir: dir.path().join("downloads"),
                display_name: "Tester".to_string(),
            };

            let store = Arc::new(LocalStore::open(&config.data_dir).await.unwrap());
            let backend = Arc::new(backend);
            let (notifier, notices) = Notifier::channel();
            let controller =
                SessionController::new(&config, backend.clone(), store.clone(), notifier);

            Self {
                controller,
                backend,
                store,
                notices,
                dir,
            }
        }

        fn drain_notices(&mut self) -> Vec<Notice> {
            let mut out = Vec::new();
            while let Ok(notice) = self.notices.try_recv() {
                out.push(notice);
            }
            out
        }

        fn errors(&mut self) -> Vec<String> {
            self.drain_notices()
                .into_iter()
                .filter(|n| n.level == NoticeLevel::Error)
                .map(|n| n.message)
                .collect()
        }
    }

    fn chatty() -> FakeBackend {
        FakeBackend {
            chat_reply: Some(json!({"id": 1, "response": "Stay hydrated."})),
            ..Default::default()
        }
    }

    fn pdf(size: usize) -> ReportFile {
        ReportFile {
            name: "labs.pdf".to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            size: size as u64,
            bytes: vec![b'%'; size],
        }
    }

    #[tokio::test]
    async fn whitespace_message_does_nothing() {
        let mut h = Harness::new(chatty()).await;

        h.controller.send_message("  \n\t ").await;

        assert!(h.controller.transcript().is_empty());
        assert_eq!(h.backend.total_calls(), 0);
        assert!(h.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn successful_chat_adds_two_entries_and_one_history_record() {
        let mut h = Harness::new(chatty()).await;

        h.controller.send_message("  How much water per day?  ").await;

        let entries = h.controller.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].text, "How much water per day?");
        assert_eq!(entries[1].role, Role::Assistant);
        assert_eq!(entries[1].text, "Stay hydrated.");

        let history = h.store.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "How much water per day?");
        assert_eq!(history[0].response, "Stay hydrated.");

        let requests = h.backend.chat_requests.lock().unwrap().clone();
        assert_eq!(requests[0].user_id, 42);
        assert!(!h.controller.busy().is_busy(Action::SendMessage));
    }

    #[tokio::test]
    async fn history_stays_capped_after_successful_chat() {
        let mut h = Harness::new(chatty()).await;
        for i in 0..HISTORY_LIMIT {
            h.store
                .append_history(ChatHistoryEntry::new(&format!("q{}", i), "a"))
                .await
                .unwrap();
        }

        h.controller.send_message("one more").await;

        let history = h.store.history().await;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.last().unwrap().query, "one more");
        assert_eq!(history.first().unwrap().query, "q1");
    }

    #[tokio::test]
    async fn failed_chat_appends_apology_without_history() {
        let mut h = Harness::new(FakeBackend::default()).await;

        h.controller.send_message("Is my blood pressure ok?").await;

        let entries = h.controller.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[1].role, Role::Assistant);
        assert_eq!(entries[1].text, render::CHAT_APOLOGY);
        assert!(h.store.history().await.is_empty());
        assert_eq!(h.errors().len(), 1);
        assert!(!h.controller.busy().any_busy());
    }

    #[tokio::test]
    async fn duplicate_email_is_retried_once_with_new_email() {
        let mut h = Harness::new(FakeBackend {
            duplicate_rejections: AtomicUsize::new(1),
            ..chatty()
        })
        .await;

        h.controller.send_message("hello").await;

        let new_users = h.backend.new_users.lock().unwrap().clone();
        assert_eq!(new_users.len(), 2);
        assert_ne!(new_users[0].email, new_users[1].email);
        assert_eq!(new_users[1].name, "Tester");
        assert_eq!(h.controller.user().unwrap().id, 42);
        assert!(h.errors().is_empty());
        assert_eq!(h.store.load_user().await.unwrap().unwrap().id, 42);
    }

    #[tokio::test]
    async fn second_duplicate_falls_back_to_placeholder_identity() {
        let mut h = Harness::new(FakeBackend {
            duplicate_rejections: AtomicUsize::new(2),
            ..chatty()
        })
        .await;

        let user = h.controller.ensure_user().await;

        assert_eq!(h.backend.calls_to("create_user"), 2);
        assert_eq!(user.name, PLACEHOLDER_NAME);
        assert!((100_000..1_000_000).contains(&user.id));
        assert!(user.email.ends_with(EMAIL_DOMAIN));
        assert_eq!(h.store.load_user().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn backend_failure_still_lets_the_session_chat() {
        let mut h = Harness::new(FakeBackend {
            create_user_fails: true,
            ..chatty()
        })
        .await;

        h.controller.send_message("hello").await;

        assert_eq!(h.backend.calls_to("create_user"), 1);
        let placeholder_id = h.controller.user().unwrap().id;
        let requests = h.backend.chat_requests.lock().unwrap().clone();
        assert_eq!(requests[0].user_id, placeholder_id);
        assert_eq!(h.controller.transcript().len(), 2);
    }

    #[tokio::test]
    async fn identity_is_created_once_and_reused() {
        let mut h = Harness::new(chatty()).await;

        h.controller.send_message("first").await;
        h.controller.send_message("second").await;
        h.controller.generate_report().await;

        assert_eq!(h.backend.calls_to("create_user"), 1);
    }

    #[tokio::test]
    async fn stored_identity_skips_creation() {
        let mut h = Harness::new(chatty()).await;
        let stored = User {
            id: 7,
            name: "Returning".to_string(),
            email: "returning@healthassistant.app".to_string(),
        };
        h.store.save_user(&stored).await.unwrap();

        assert_eq!(h.controller.ensure_user().await, stored);
        assert_eq!(h.backend.calls_to("create_user"), 0);
    }

    #[tokio::test]
    async fn prediction_fills_defaults_and_clears_form() {
        let mut h = Harness::new(FakeBackend {
            prediction: Some(PredictionResult {
                disease: "Diabetes".to_string(),
                risk: 0.625,
                explanation: "Glucose is elevated.".to_string(),
                recommendations: "Reduce sugar intake.".to_string(),
            }),
            ..Default::default()
        })
        .await;

        let mut form = PredictionForm::default();
        form.set("age", "51");
        form.set("glucose", "162");
        form.set("bmi", "not sure");

        h.controller.submit_prediction(&mut form).await;

        let request = h.backend.prediction_requests.lock().unwrap()[0].clone();
        assert_eq!(request.demographics.age, 51.0);
        assert_eq!(request.vitals.glucose, 162.0);
        assert_eq!(request.vitals.bmi, 25.0);
        assert_eq!(request.vitals.insulin, 80.0);
        assert_eq!(request.demographics.gender, "unknown");

        assert!(form.is_empty());
        let last = h.controller.transcript().last().unwrap();
        assert!(last.text.contains("Risk level: 62.5%"));
        assert!(
            h.drain_notices()
                .iter()
                .any(|n| n.level == NoticeLevel::Success)
        );
    }

    #[tokio::test]
    async fn failed_prediction_keeps_form() {
        let mut h = Harness::new(FakeBackend::default()).await;
        let mut form = PredictionForm::default();
        form.set("age", "40");

        h.controller.submit_prediction(&mut form).await;

        assert_eq!(form.get("age"), Some("40"));
        assert!(h.controller.transcript().is_empty());
        assert_eq!(h.errors().len(), 1);
        assert!(!h.controller.busy().is_busy(Action::Predict));
    }

    #[tokio::test]
    async fn invalid_reports_never_reach_the_backend() {
        let mut h = Harness::new(FakeBackend {
            analysis: Some(ReportAnalysis::default()),
            ..Default::default()
        })
        .await;

        h.controller.analyze_report(None).await;
        h.controller
            .analyze_report(Some(ReportFile {
                name: "photo.png".to_string(),
                content_type: "image/png".to_string(),
                size: 16,
                bytes: vec![0; 16],
            }))
            .await;
        h.controller
            .analyze_report(Some(pdf(upload::MAX_REPORT_SIZE as usize + 1)))
            .await;

        assert_eq!(h.backend.total_calls(), 0);
        let errors = h.errors();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("select a PDF"));
        assert!(errors[1].contains("Only PDF files"));
        assert!(errors[2].contains("too large"));
    }

    #[tokio::test]
    async fn analyzed_report_renders_findings_with_fallback_advice() {
        let mut h = Harness::new(FakeBackend {
            analysis: Some(ReportAnalysis {
                findings: Some("LDL cholesterol above range.".to_string()),
                advice: None,
            }),
            ..Default::default()
        })
        .await;

        h.controller.analyze_report(Some(pdf(2048))).await;

        assert_eq!(h.backend.calls_to("analyze_report"), 1);
        let text = &h.controller.transcript().last().unwrap().text;
        assert!(text.contains("LDL cholesterol above range."));
        assert!(text.contains(render::ADVICE_FALLBACK));
    }

    #[tokio::test]
    async fn report_without_server_records_is_summarized_locally() {
        let mut h = Harness::new(FakeBackend::default()).await;
        h.store
            .append_history(ChatHistoryEntry::new("What is a normal BMI?", "18.5-24.9"))
            .await
            .unwrap();

        h.controller.generate_report().await;

        assert_eq!(h.backend.calls_to("prediction_history"), 1);
        assert_eq!(h.backend.calls_to("chat_history"), 1);
        assert_eq!(h.backend.calls_to("report_history"), 1);
        assert_eq!(h.backend.calls_to("generate_report"), 0);

        let text = &h.controller.transcript().last().unwrap().text;
        assert!(text.starts_with("Health Summary Report"));
        assert!(text.contains("What is a normal BMI?"));
        assert!(h.errors().is_empty());
        assert!(!h.controller.busy().is_busy(Action::GenerateReport));
    }

    #[tokio::test]
    async fn empty_histories_also_fall_back_to_local_summary() {
        let mut h = Harness::new(FakeBackend {
            prediction_records: Some(vec![]),
            chat_records: Some(vec![]),
            report_records: Some(vec![]),
            generated: Some(GeneratedReport::Document(b"%PDF".to_vec())),
            ..Default::default()
        })
        .await;

        h.controller.generate_report().await;

        assert_eq!(h.backend.calls_to("generate_report"), 0);
        assert_eq!(h.controller.transcript().len(), 1);
    }

    #[tokio::test]
    async fn generated_document_is_downloaded_with_found_ids() {
        let mut h = Harness::new(FakeBackend {
            prediction_records: Some(vec![
                PredictionRecord {
                    id: 11,
                    disease: "Diabetes".to_string(),
                    risk: 0.3,
                    created_at: None,
                },
                PredictionRecord {
                    id: 4,
                    disease: "Diabetes".to_string(),
                    risk: 0.2,
                    created_at: None,
                },
            ]),
            chat_records: None,
            report_records: Some(vec![]),
            generated: Some(GeneratedReport::Document(b"%PDF-1.4 report".to_vec())),
            ..Default::default()
        })
        .await;

        h.controller.generate_report().await;

        let request = h.backend.report_requests.lock().unwrap()[0].clone();
        assert_eq!(
            request,
            ReportRequest {
                user_id: 42,
                prediction_id: Some(11),
                chat_id: None,
                report_id: None,
            }
        );

        let filename = report::report_filename(Local::now().date_naive());
        let saved = h.dir.path().join("downloads").join(filename);
        assert_eq!(std::fs::read(saved).unwrap(), b"%PDF-1.4 report");
        assert!(
            h.drain_notices()
                .iter()
                .any(|n| n.level == NoticeLevel::Success && n.message.contains("downloaded"))
        );
    }

    #[tokio::test]
    async fn acknowledged_report_is_reported_as_success() {
        let mut h = Harness::new(FakeBackend {
            chat_records: Some(vec![ChatRecord {
                id: 9,
                query: "q".to_string(),
                response: "r".to_string(),
                created_at: None,
            }]),
            generated: Some(GeneratedReport::Acknowledgment(json!({"status": "queued"}))),
            ..Default::default()
        })
        .await;

        h.controller.generate_report().await;

        assert_eq!(h.backend.calls_to("generate_report"), 1);
        let notices = h.drain_notices();
        assert!(
            notices
                .iter()
                .any(|n| n.level == NoticeLevel::Success && n.message.ends_with(": queued"))
        );
        assert!(!h.dir.path().join("downloads").exists());
    }

    #[tokio::test]
    async fn busy_action_refuses_reentry() {
        let mut h = Harness::new(chatty()).await;
        let busy = h.controller.busy();
        let guard = busy.try_begin(Action::SendMessage).unwrap();

        h.controller.send_message("hello").await;

        assert!(h.controller.transcript().is_empty());
        assert_eq!(h.backend.calls_to("chat"), 0);
        assert_eq!(h.drain_notices()[0].level, NoticeLevel::Info);

        drop(guard);
        h.controller.send_message("hello").await;
        assert_eq!(h.controller.transcript().len(), 2);
    }

    #[tokio::test]
    async fn new_session_clears_transcript_and_history_but_keeps_identity() {
        let mut h = Harness::new(chatty()).await;
        h.controller.send_message("hello").await;
        let user = h.controller.user().cloned();

        h.controller.new_session().await;

        assert!(h.controller.transcript().is_empty());
        assert!(h.store.history().await.is_empty());
        assert_eq!(h.controller.user().cloned(), user);
    }

    #[tokio::test]
    async fn history_overview_survives_partial_failures() {
        let mut h = Harness::new(FakeBackend {
            chat_records: Some(vec![ChatRecord {
                id: 1,
                query: "Can I eat bananas?".to_string(),
                response: "In moderation.".to_string(),
                created_at: None,
            }]),
            ..Default::default()
        })
        .await;

        h.controller.history_overview().await;

        let text = &h.controller.transcript().last().unwrap().text;
        assert!(text.contains("Risk assessments: unavailable right now"));
        assert!(text.contains("Can I eat bananas?"));
    }

    #[tokio::test]
    async fn health_check_reports_connectivity() {
        let mut h = Harness::new(FakeBackend {
            healthy: true,
            ..Default::default()
        })
        .await;
        assert!(h.controller.check_health().await);
        assert_eq!(h.drain_notices()[0].level, NoticeLevel::Info);

        let mut down = Harness::new(FakeBackend::default()).await;
        assert!(!down.controller.check_health().await);
        assert_eq!(down.errors().len(), 1);
    }
}
