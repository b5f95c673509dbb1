//! Environment-backed configuration.

use crate::types::{AppError, ProviderKind, Result};
use std::env;

/// Runtime settings, loaded once at startup.
///
/// API keys default to empty strings; sources that need a missing key
/// degrade to empty results rather than failing the run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Default LinkedIn provider when a request does not choose one.
    pub linkedin_provider: ProviderKind,

    // SerpAPI (search, news, social, references, photo, company verify)
    pub serpapi_api_key: String,

    // Proxycurl
    pub proxycurl_api_key: String,

    // RapidAPI
    pub rapidapi_key: String,
    pub rapidapi_host: String,

    // OpenAI-compatible chat endpoint (résumé extraction + report)
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,

    // ImgBB (photo upload for reverse image search)
    pub imgbb_api_key: String,

    // HTTP client
    pub max_concurrency: usize,
    pub request_timeout_secs: u64,

    /// When the first social-scan pass finds fewer profiles than this,
    /// a broadened retry pass runs on the key platforms.
    pub social_retry_threshold: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let provider = match env::var("LINKEDIN_PROVIDER") {
            Ok(value) => ProviderKind::parse(&value).ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown LINKEDIN_PROVIDER '{}'. Choose from: serpapi, scraper, proxycurl, rapidapi",
                    value
                ))
            })?,
            Err(_) => ProviderKind::default(),
        };

        Ok(Settings {
            linkedin_provider: provider,
            serpapi_api_key: env::var("SERPAPI_API_KEY").unwrap_or_default(),
            proxycurl_api_key: env::var("PROXYCURL_API_KEY").unwrap_or_default(),
            rapidapi_key: env::var("RAPIDAPI_KEY").unwrap_or_default(),
            rapidapi_host: env::var("RAPIDAPI_HOST")
                .unwrap_or_else(|_| "linkedin-data-api.p.rapidapi.com".to_string()),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://integrate.api.nvidia.com/v1".to_string()),
            llm_model: env::var("LLM_MODEL")
                .unwrap_or_else(|_| "meta/llama-3.1-70b-instruct".to_string()),
            imgbb_api_key: env::var("IMGBB_API_KEY").unwrap_or_default(),
            max_concurrency: parse_var("MAX_CONCURRENCY", 5)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT", 30)?,
            social_retry_threshold: parse_var("SOCIAL_RETRY_THRESHOLD", 2)?,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            linkedin_provider: ProviderKind::default(),
            serpapi_api_key: String::new(),
            proxycurl_api_key: String::new(),
            rapidapi_key: String::new(),
            rapidapi_host: "linkedin-data-api.p.rapidapi.com".to_string(),
            llm_api_key: String::new(),
            llm_base_url: "https://integrate.api.nvidia.com/v1".to_string(),
            llm_model: "meta/llama-3.1-70b-instruct".to_string(),
            imgbb_api_key: String::new(),
            max_concurrency: 5,
            request_timeout_secs: 30,
            social_retry_threshold: 2,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, value))),
        Err(_) => Ok(default),
    }
}
