//! LinkedIn profile providers.
//!
//! Each provider implements the same contract: given a request, recover a
//! profile or report that it found none. Several providers run per check;
//! the merge step keeps the richest result.

pub mod proxycurl;
pub mod rapidapi;
pub mod scrape;
pub mod serpapi;

use crate::config::Settings;
use crate::sources::serp::SerpClient;
use crate::types::{CheckRequest, LinkedInProfile, ProviderKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait LinkedInProvider: Send + Sync {
    /// Fetch the subject's profile, either from a known URL or by
    /// name/company/title/location discovery.
    async fn fetch_profile(&self, request: &CheckRequest) -> Result<Option<LinkedInProfile>>;
}

/// The discovery query shared by providers that search by name.
pub(crate) fn build_search_query(request: &CheckRequest) -> String {
    let mut parts = vec![request.name.clone()];
    if let Some(company) = &request.company {
        parts.push(company.clone());
    }
    if let Some(title) = &request.title {
        parts.push(title.clone());
    }
    if let Some(location) = &request.location {
        parts.push(location.clone());
    }
    parts.push("LinkedIn".to_string());
    parts.join(" ")
}

/// Extract the profile id from a LinkedIn URL
/// (`https://linkedin.com/in/janedoe` -> `janedoe`).
pub(crate) fn extract_profile_id(url: &str) -> Option<&str> {
    let rest = url.split_once("linkedin.com/in/").map(|(_, rest)| rest)?;
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|id| !id.is_empty())?;
    Some(id)
}

/// Build every provider once at startup, keyed by kind.
pub fn build_providers(
    http: &reqwest::Client,
    serp: &SerpClient,
    settings: &Settings,
) -> HashMap<ProviderKind, Arc<dyn LinkedInProvider>> {
    let mut providers: HashMap<ProviderKind, Arc<dyn LinkedInProvider>> = HashMap::new();
    providers.insert(
        ProviderKind::Serpapi,
        Arc::new(serpapi::SerpApiProvider::new(serp.clone())),
    );
    providers.insert(
        ProviderKind::Scraper,
        Arc::new(scrape::ScraperProvider::new(http.clone(), serp.clone())),
    );
    providers.insert(
        ProviderKind::Proxycurl,
        Arc::new(proxycurl::ProxycurlProvider::new(
            http.clone(),
            settings.proxycurl_api_key.clone(),
        )),
    );
    providers.insert(
        ProviderKind::Rapidapi,
        Arc::new(rapidapi::RapidApiProvider::new(
            http.clone(),
            settings.rapidapi_key.clone(),
            settings.rapidapi_host.clone(),
        )),
    );
    providers
}
