//! Core types (requests, payloads, reports, errors).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Request Types =============

/// Profile provider selection.
///
/// `Scraper` and `Serpapi` are the baseline providers that run on every
/// check in addition to the chosen one; `Proxycurl` and `RapidApi` are
/// paid API providers that only run when explicitly selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Serpapi,
    Scraper,
    Proxycurl,
    Rapidapi,
}

impl ProviderKind {
    /// Parse a provider name as supplied in a form field or env var.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "serpapi" => Some(Self::Serpapi),
            "scraper" => Some(Self::Scraper),
            "proxycurl" => Some(Self::Proxycurl),
            "rapidapi" => Some(Self::Rapidapi),
            _ => None,
        }
    }

    /// Human-readable provider name used in reports and task labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serpapi => "SerpAPI",
            Self::Scraper => "Scraper",
            Self::Proxycurl => "Proxycurl",
            Self::Rapidapi => "RapidAPI",
        }
    }

    /// Stable id segment for task ids (`linkedin:<id>`).
    pub fn id(&self) -> &'static str {
        match self {
            Self::Serpapi => "serpapi",
            Self::Scraper => "scraper",
            Self::Proxycurl => "proxycurl",
            Self::Rapidapi => "rapidapi",
        }
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Scraper
    }
}

/// A background-check request for a named individual.
///
/// Only `name` is required. Résumé-derived fields are merged in via
/// [`CheckRequest::merged_with_resume`] and never override explicit input.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
}

impl CheckRequest {
    /// A request with just a name; the usual starting point.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: None,
            location: None,
            title: None,
            linkedin_url: None,
            provider: None,
        }
    }

    /// Fill fields the caller left empty from parsed résumé data.
    ///
    /// Explicit user input always wins; the résumé only supplies what is
    /// absent.
    pub fn merged_with_resume(&self, resume: &ResumeData) -> Self {
        let mut merged = self.clone();
        if merged.company.is_none() {
            merged.company = resume.company.clone();
        }
        if merged.title.is_none() {
            merged.title = resume.title.clone();
        }
        if merged.location.is_none() {
            merged.location = resume.location.clone();
        }
        if merged.linkedin_url.is_none() {
            merged.linkedin_url = resume.linkedin_url.clone();
        }
        merged
    }

}

// ============= Résumé Types =============

/// One work-history entry extracted from a résumé or profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExperienceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One education entry extracted from a résumé or profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EducationEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Structured data extracted from an uploaded résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ResumeData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub key_search_terms: Vec<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

// ============= Source Payload Types =============

/// A LinkedIn profile as recovered by one of the providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LinkedInProfile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

/// A repository summary attached to a GitHub profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub url: String,
}

/// A GitHub user profile with their top repositories.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GitHubProfile {
    pub username: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub top_repos: Vec<RepoSummary>,
}

/// One web or news search hit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Provenance label: which query surfaced this hit.
    pub source: String,
}

/// Outcome of verifying that a claimed employer actually exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyCheck {
    pub name: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A social-platform presence discovered for the subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialProfile {
    pub platform: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub snippet: String,
}

/// A page where the subject's photo (or a similar one) appears.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoMatch {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Combined result of a reverse-image search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PhotoSearchOutcome {
    pub visual_matches: Vec<PhotoMatch>,
    /// Social profiles derived from matches on known platforms.
    pub profiles: Vec<SocialProfile>,
}

/// A person who could plausibly verify the subject's employment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferenceContact {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    /// "HR / People Ops", "Management", "Same Department" or "Colleague".
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub snippet: String,
}

/// Typed result of one source task.
///
/// Every task resolves to exactly one of these shapes; a failed task
/// resolves to no result at all (`None` at the executor boundary).
#[derive(Debug, Clone)]
pub enum SourceResult {
    Profile(Option<LinkedInProfile>),
    GitHub(Vec<GitHubProfile>),
    Search(Vec<SearchHit>),
    News(Vec<SearchHit>),
    Companies(Vec<CompanyCheck>),
    Social(Vec<SocialProfile>),
    Photo(PhotoSearchOutcome),
    References(Vec<ReferenceContact>),
}

// ============= Aggregate & Report Types =============

/// The merged snapshot of everything the run found, plus the rendered
/// context handed to the report generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AggregatedData {
    #[serde(default)]
    pub linkedin: Option<LinkedInProfile>,
    #[serde(default)]
    pub github_profiles: Vec<GitHubProfile>,
    #[serde(default)]
    pub resume: Option<ResumeData>,
    #[serde(default)]
    pub company_checks: Vec<CompanyCheck>,
    #[serde(default)]
    pub social_profiles: Vec<SocialProfile>,
    #[serde(default)]
    pub photo_matches: Vec<PhotoMatch>,
    #[serde(default)]
    pub reference_contacts: Vec<ReferenceContact>,
    #[serde(default)]
    pub search_results: Vec<SearchHit>,
    #[serde(default)]
    pub news_articles: Vec<SearchHit>,
    #[serde(default)]
    pub raw_context: String,
}

/// A profile the analyst model attributed to some source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileSighting {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The analyst model's assessment of whether the findings describe one
/// person or several who share a name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IdentityVerification {
    /// "high", "medium" or "low".
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub multiple_people_detected: bool,
    #[serde(default)]
    pub profiles_found: Vec<ProfileSighting>,
    #[serde(default)]
    pub cross_reference_notes: Vec<String>,
}

/// The analyst model's verdict on the background as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckVerdict {
    /// "clean", "caution" or "red_flags".
    #[serde(default)]
    pub rating: String,
    /// 0-100; higher is cleaner.
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub resume_vs_online: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub green_flags: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// The terminal payload of a run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BackgroundReport {
    pub name: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub linkedin_profile: Option<LinkedInProfile>,
    #[serde(default)]
    pub github_profiles: Vec<GitHubProfile>,
    #[serde(default)]
    pub resume_data: Option<ResumeData>,
    #[serde(default)]
    pub company_checks: Vec<CompanyCheck>,
    #[serde(default)]
    pub social_profiles: Vec<SocialProfile>,
    #[serde(default)]
    pub photo_matches: Vec<PhotoMatch>,
    #[serde(default)]
    pub reference_contacts: Vec<ReferenceContact>,
    #[serde(default)]
    pub identity_verification: Option<IdentityVerification>,
    #[serde(default)]
    pub verdict: Option<CheckVerdict>,
    pub summary: String,
    pub professional_background: String,
    pub key_highlights: Vec<String>,
    #[serde(default)]
    pub news_mentions: Vec<SearchHit>,
    pub sources_used: Vec<String>,
    pub provider_used: String,
    #[serde(default)]
    pub confidence_note: String,
}

// ============= Error Types =============

/// Application-level error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Source(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (axum::http::StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Config(msg)
            | AppError::Source(msg)
            | AppError::Llm(msg)
            | AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn resume_with_fields() -> ResumeData {
        ResumeData {
            company: Some("Globex".to_string()),
            title: Some("Engineer".to_string()),
            location: Some("Berlin".to_string()),
            linkedin_url: Some("https://linkedin.com/in/jd".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resume_fills_only_missing_fields() {
        let request = CheckRequest {
            company: Some("Acme".to_string()),
            ..CheckRequest::named("Jane Doe")
        };

        let merged = request.merged_with_resume(&resume_with_fields());

        // Explicit company survives; everything else comes from the résumé.
        assert_eq!(merged.company.as_deref(), Some("Acme"));
        assert_eq!(merged.title.as_deref(), Some("Engineer"));
        assert_eq!(merged.location.as_deref(), Some("Berlin"));
        assert_eq!(
            merged.linkedin_url.as_deref(),
            Some("https://linkedin.com/in/jd")
        );
    }

    #[test]
    fn resume_never_overrides_explicit_input() {
        let request = CheckRequest {
            company: Some("Acme".to_string()),
            title: Some("CTO".to_string()),
            location: Some("Boston".to_string()),
            linkedin_url: Some("https://linkedin.com/in/explicit".to_string()),
            ..CheckRequest::named("Jane Doe")
        };

        let merged = request.merged_with_resume(&resume_with_fields());

        assert_eq!(merged.company.as_deref(), Some("Acme"));
        assert_eq!(merged.title.as_deref(), Some("CTO"));
        assert_eq!(merged.location.as_deref(), Some("Boston"));
        assert_eq!(
            merged.linkedin_url.as_deref(),
            Some("https://linkedin.com/in/explicit")
        );
    }

    #[test]
    fn provider_kind_parses_form_values() {
        assert_eq!(ProviderKind::parse("serpapi"), Some(ProviderKind::Serpapi));
        assert_eq!(ProviderKind::parse(" Scraper "), Some(ProviderKind::Scraper));
        assert_eq!(ProviderKind::parse("unknown"), None);
    }
}
