//! Search-engine-backed profile provider.
//!
//! Recovers what Google already knows about a profile: given a direct URL
//! it returns a minimal profile (the scraping provider runs concurrently
//! and fills in the rest); otherwise it tries progressively broader
//! queries against `site:linkedin.com/in/`.

use crate::providers::{build_search_query, extract_profile_id, LinkedInProvider};
use crate::sources::serp::{organic_results, str_field, SerpClient};
use crate::types::{CheckRequest, LinkedInProfile, Result};
use crate::util::truncate;
use async_trait::async_trait;

pub struct SerpApiProvider {
    serp: SerpClient,
}

impl SerpApiProvider {
    pub fn new(serp: SerpClient) -> Self {
        Self { serp }
    }

    fn profile_from_url(&self, url: &str) -> Option<LinkedInProfile> {
        let profile_id = extract_profile_id(url)?;
        // Title-case the slug as a display-name guess.
        let name = profile_id
            .split('-')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        Some(LinkedInProfile {
            url: Some(url.to_string()),
            name: Some(name),
            ..Default::default()
        })
    }

    async fn search_via_google(&self, request: &CheckRequest) -> Result<Option<LinkedInProfile>> {
        // Most specific first, bare quoted name last.
        let mut queries = vec![build_search_query(request)];
        if let Some(company) = &request.company {
            queries.push(format!("{} {}", request.name, company));
        }
        queries.push(format!("\"{}\"", request.name));

        let first_name = request
            .name
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        for query in &queries {
            let discovery_query = format!("site:linkedin.com/in/ {}", query);
            let data = match self
                .serp
                .search(&[
                    ("engine", "google"),
                    ("q", discovery_query.as_str()),
                    ("num", "5"),
                ])
                .await
            {
                Ok(data) => data,
                Err(err) => {
                    tracing::debug!(query, error = %err, "profile discovery query failed");
                    continue;
                }
            };

            for result in organic_results(&data) {
                let url = str_field(result, "link");
                if !url.contains("linkedin.com/in/") {
                    continue;
                }

                // Relevance: the first name should appear in the title.
                let title = str_field(result, "title");
                if !title.to_lowercase().contains(&first_name) {
                    continue;
                }

                // Build a profile from the snippet alone; no premium API.
                let snippet = str_field(result, "snippet");
                let mut title_parts = title.split(" - ");
                let name = title_parts.next().unwrap_or("").trim().to_string();
                let headline = title_parts.next().unwrap_or("").trim().to_string();
                return Ok(Some(LinkedInProfile {
                    url: Some(url),
                    name: Some(name),
                    headline: Some(if headline.is_empty() {
                        truncate(&snippet, 200).to_string()
                    } else {
                        headline
                    }),
                    raw_text: Some(snippet),
                    ..Default::default()
                }));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl LinkedInProvider for SerpApiProvider {
    async fn fetch_profile(&self, request: &CheckRequest) -> Result<Option<LinkedInProfile>> {
        if let Some(url) = &request.linkedin_url {
            return Ok(self.profile_from_url(url));
        }
        if !self.serp.is_configured() {
            return Ok(None);
        }
        self.search_via_google(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn direct_url_yields_a_minimal_profile() {
        let serp = SerpClient::new(reqwest::Client::new(), String::new());
        let provider = SerpApiProvider::new(serp);
        let request = CheckRequest {
            linkedin_url: Some("https://linkedin.com/in/jane-doe".to_string()),
            ..CheckRequest::named("Jane Doe")
        };

        let profile = provider
            .fetch_profile(&request)
            .await
            .expect("fetch succeeds")
            .expect("profile present");
        assert_eq!(profile.url.as_deref(), Some("https://linkedin.com/in/jane-doe"));
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn unconfigured_client_finds_nothing_by_search() {
        let serp = SerpClient::new(reqwest::Client::new(), String::new());
        let provider = SerpApiProvider::new(serp);
        let result = provider
            .fetch_profile(&CheckRequest::named("Jane Doe"))
            .await
            .expect("fetch succeeds");
        assert!(result.is_none());
    }
}
