//! HTTP surface tests: health probe and the SSE check flow end-to-end
//! with stub sources.

use async_trait::async_trait;
use axum::Router;
use axum_test::multipart::MultipartForm;
use axum_test::TestServer;
use dossier::pipeline::Aggregator;
use dossier::providers::LinkedInProvider;
use dossier::report::{GeneratedReport, ReportGenerator};
use dossier::sources::{
    CodeHostSource, CompanySource, PhotoSource, ReferenceSource, ResumeExtractor, SearchSource,
    SocialSource, Sources,
};
use dossier::types::{
    AggregatedData, CheckRequest, CompanyCheck, GitHubProfile, LinkedInProfile,
    PhotoSearchOutcome, ProviderKind, ReferenceContact, ResumeData, Result, SearchHit,
    SocialProfile,
};
use dossier::{AppState, Settings};
use std::collections::HashMap;
use std::sync::Arc;

struct EmptySource;

#[async_trait]
impl SearchSource for EmptySource {
    async fn search_web(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
    async fn search_news(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl CodeHostSource for EmptySource {
    async fn search_users(&self, _query: &str) -> Result<Vec<GitHubProfile>> {
        Ok(Vec::new())
    }
    async fn get_user(&self, _username: &str) -> Result<Option<GitHubProfile>> {
        Ok(None)
    }
}

#[async_trait]
impl CompanySource for EmptySource {
    async fn verify_companies(&self, _resume: &ResumeData) -> Result<Vec<CompanyCheck>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl SocialSource for EmptySource {
    async fn scan(&self, _request: &CheckRequest) -> Result<Vec<SocialProfile>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl PhotoSource for EmptySource {
    async fn upload(&self, _image: &[u8]) -> Result<Option<String>> {
        Ok(None)
    }
    async fn reverse_search(&self, _image_url: &str) -> Result<PhotoSearchOutcome> {
        Ok(PhotoSearchOutcome::default())
    }
}

#[async_trait]
impl ReferenceSource for EmptySource {
    async fn discover(
        &self,
        _request: &CheckRequest,
        _resume: Option<&ResumeData>,
    ) -> Result<Vec<ReferenceContact>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ResumeExtractor for EmptySource {
    async fn extract(&self, raw_text: &str) -> Result<ResumeData> {
        Ok(ResumeData {
            name: Some("Jane Doe".to_string()),
            skills: vec!["Rust".to_string()],
            raw_text: Some(raw_text.to_string()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl LinkedInProvider for EmptySource {
    async fn fetch_profile(&self, _request: &CheckRequest) -> Result<Option<LinkedInProfile>> {
        Ok(None)
    }
}

struct StubReporter;

#[async_trait]
impl ReportGenerator for StubReporter {
    async fn summarize(
        &self,
        request: &CheckRequest,
        _data: &AggregatedData,
    ) -> Result<GeneratedReport> {
        Ok(GeneratedReport {
            summary: format!("Report for {}", request.name),
            ..Default::default()
        })
    }
}

fn test_server() -> TestServer {
    let mut providers: HashMap<ProviderKind, Arc<dyn LinkedInProvider>> = HashMap::new();
    providers.insert(ProviderKind::Scraper, Arc::new(EmptySource));
    providers.insert(ProviderKind::Serpapi, Arc::new(EmptySource));

    let sources = Arc::new(Sources::new(
        Arc::new(EmptySource),
        Arc::new(EmptySource),
        Arc::new(EmptySource),
        Arc::new(EmptySource),
        Arc::new(EmptySource),
        Arc::new(EmptySource),
        Arc::new(EmptySource),
        providers,
    ));
    let aggregator = Aggregator::new(
        Arc::clone(&sources),
        Arc::new(StubReporter),
        ProviderKind::Scraper,
    );
    let state = AppState {
        settings: Arc::new(Settings::default()),
        sources,
        aggregator,
    };

    let app = Router::new()
        .nest("/api/v1", dossier::api::create_router())
        .with_state(state);
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let server = test_server();
    let response = server.get("/api/v1/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn check_requires_a_name() {
    let server = test_server();
    let form = MultipartForm::new().add_text("company", "Acme");
    let response = server.post("/api/v1/check").multipart(form).await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn check_streams_status_events_and_a_final_result() {
    let server = test_server();
    let form = MultipartForm::new().add_text("name", "Jane Doe");
    let response = server.post("/api/v1/check").multipart(form).await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("event: status"));
    assert!(body.contains("search_start"));
    assert!(body.contains("task_done"));
    assert!(body.contains("analyzing"));
    assert!(body.contains("event: result"));
    assert!(body.contains("Report for Jane Doe"));

    // The result frame is the last event in the stream.
    let result_pos = body.rfind("event: result").expect("result frame");
    assert!(!body[result_pos..].contains("event: status"));
}

#[tokio::test]
async fn resume_upload_triggers_the_parse_phase() {
    let server = test_server();
    let form = MultipartForm::new()
        .add_text("name", "Jane Doe")
        .add_text("resume", "Jane Doe\nStaff Engineer at Acme\nSkills: Rust");
    let response = server.post("/api/v1/check").multipart(form).await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("resume_parse"));
    assert!(body.contains("Resume parsed"));
    // Extracted skill/role counts surface in the status detail.
    assert!(body.contains("1 skills, 0 roles extracted"));
}
