//! External data-source adapters.
//!
//! Every collaborator the pipeline fans out to sits behind one of these
//! traits, so tests can substitute mocks and the orchestrator never knows
//! how any one source is queried.

pub mod company;
pub mod github;
pub mod photo;
pub mod references;
pub mod resume;
pub mod search;
pub mod serp;
pub mod social;

use crate::config::Settings;
use crate::providers::{self, LinkedInProvider};
use crate::report::llm::ChatClient;
use crate::types::{
    CheckRequest, CompanyCheck, GitHubProfile, PhotoSearchOutcome, ProviderKind, ReferenceContact,
    ResumeData, Result, SearchHit, SocialProfile,
};
use async_trait::async_trait;
use serp::SerpClient;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search_web(&self, query: &str) -> Result<Vec<SearchHit>>;
    async fn search_news(&self, query: &str) -> Result<Vec<SearchHit>>;
}

#[async_trait]
pub trait CodeHostSource: Send + Sync {
    async fn search_users(&self, query: &str) -> Result<Vec<GitHubProfile>>;
    async fn get_user(&self, username: &str) -> Result<Option<GitHubProfile>>;
}

#[async_trait]
pub trait CompanySource: Send + Sync {
    async fn verify_companies(&self, resume: &ResumeData) -> Result<Vec<CompanyCheck>>;
}

#[async_trait]
pub trait SocialSource: Send + Sync {
    async fn scan(&self, request: &CheckRequest) -> Result<Vec<SocialProfile>>;
}

#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn upload(&self, image: &[u8]) -> Result<Option<String>>;
    async fn reverse_search(&self, image_url: &str) -> Result<PhotoSearchOutcome>;
}

#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn discover(
        &self,
        request: &CheckRequest,
        resume: Option<&ResumeData>,
    ) -> Result<Vec<ReferenceContact>>;
}

#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<ResumeData>;
}

/// The capability table: every source the pipeline can dispatch to,
/// resolved once at startup and owned by the application state.
pub struct Sources {
    pub search: Arc<dyn SearchSource>,
    pub github: Arc<dyn CodeHostSource>,
    pub company: Arc<dyn CompanySource>,
    pub social: Arc<dyn SocialSource>,
    pub photo: Arc<dyn PhotoSource>,
    pub references: Arc<dyn ReferenceSource>,
    pub resume: Arc<dyn ResumeExtractor>,
    providers: HashMap<ProviderKind, Arc<dyn LinkedInProvider>>,
}

impl Sources {
    /// Build the production source set against real endpoints, sharing one
    /// HTTP client.
    pub fn from_settings(http: &reqwest::Client, settings: &Settings, chat: ChatClient) -> Self {
        let serp = SerpClient::new(http.clone(), settings.serpapi_api_key.clone());
        Self {
            search: Arc::new(search::SerpApiSearch::new(serp.clone())),
            github: Arc::new(github::GitHubClient::new(http.clone())),
            company: Arc::new(company::CompanyVerifier::new(serp.clone())),
            social: Arc::new(social::SocialScanner::new(
                serp.clone(),
                settings.social_retry_threshold,
            )),
            photo: Arc::new(photo::PhotoSearcher::new(
                serp.clone(),
                http.clone(),
                settings.imgbb_api_key.clone(),
            )),
            references: Arc::new(references::ReferenceDiscovery::new(serp.clone())),
            resume: Arc::new(resume::LlmResumeExtractor::new(chat)),
            providers: providers::build_providers(http, &serp, settings),
        }
    }

    /// Hand-assembled source set; used by tests with mock implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        search: Arc<dyn SearchSource>,
        github: Arc<dyn CodeHostSource>,
        company: Arc<dyn CompanySource>,
        social: Arc<dyn SocialSource>,
        photo: Arc<dyn PhotoSource>,
        references: Arc<dyn ReferenceSource>,
        resume: Arc<dyn ResumeExtractor>,
        providers: HashMap<ProviderKind, Arc<dyn LinkedInProvider>>,
    ) -> Self {
        Self {
            search,
            github,
            company,
            social,
            photo,
            references,
            resume,
            providers,
        }
    }

    /// Look up a profile provider by kind.
    pub fn provider(&self, kind: ProviderKind) -> Option<Arc<dyn LinkedInProvider>> {
        self.providers.get(&kind).cloned()
    }
}
