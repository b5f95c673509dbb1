//! Proxycurl API profile provider.

use crate::providers::LinkedInProvider;
use crate::types::{CheckRequest, EducationEntry, ExperienceEntry, LinkedInProfile, Result};
use async_trait::async_trait;
use serde_json::Value;

const PROXYCURL_ENDPOINT: &str = "https://nubela.co/proxycurl/api/v2/linkedin";
const PROXYCURL_SEARCH: &str = "https://nubela.co/proxycurl/api/search/person";

pub struct ProxycurlProvider {
    http: reqwest::Client,
    api_key: String,
}

impl ProxycurlProvider {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    /// Resolve a profile URL from the request fields via person search.
    async fn resolve_url(&self, request: &CheckRequest) -> Result<Option<String>> {
        let name_parts: Vec<&str> = request.name.split_whitespace().collect();
        let mut params: Vec<(&str, String)> = vec![(
            "first_name",
            name_parts.first().copied().unwrap_or("").to_string(),
        )];
        if name_parts.len() > 1 {
            params.push(("last_name", name_parts[name_parts.len() - 1].to_string()));
        }
        if let Some(company) = &request.company {
            params.push(("current_company_name", company.clone()));
        }

        let response = self
            .http
            .get(PROXYCURL_SEARCH)
            .bearer_auth(&self.api_key)
            .query(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Proxycurl person search failed");
            return Ok(None);
        }

        let data: Value = response.json().await?;
        Ok(data
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|result| result.get("linkedin_profile_url"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[async_trait]
impl LinkedInProvider for ProxycurlProvider {
    async fn fetch_profile(&self, request: &CheckRequest) -> Result<Option<LinkedInProfile>> {
        if self.api_key.is_empty() {
            return Ok(None);
        }

        let url = match &request.linkedin_url {
            Some(url) => url.clone(),
            None => match self.resolve_url(request).await? {
                Some(url) => url,
                None => return Ok(None),
            },
        };

        let response = self
            .http
            .get(PROXYCURL_ENDPOINT)
            .bearer_auth(&self.api_key)
            .query(&[("url", url.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Proxycurl profile fetch failed");
            return Ok(None);
        }

        let data: Value = response.json().await?;
        Ok(Some(parse_profile(&data, &url)))
    }
}

fn parse_profile(data: &Value, url: &str) -> LinkedInProfile {
    LinkedInProfile {
        url: Some(url.to_string()),
        name: opt_str(data, "full_name"),
        headline: opt_str(data, "headline"),
        location: opt_str(data, "city").or_else(|| opt_str(data, "country_full_name")),
        summary: opt_str(data, "summary"),
        experience: data
            .get("experiences")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|exp| ExperienceEntry {
                title: opt_str(exp, "title"),
                company: opt_str(exp, "company"),
                duration: opt_str(exp, "duration"),
                description: opt_str(exp, "description"),
            })
            .collect(),
        education: data
            .get("education")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|edu| EducationEntry {
                school: opt_str(edu, "school"),
                degree: opt_str(edu, "degree_name"),
                field: opt_str(edu, "field_of_study"),
            })
            .collect(),
        skills: data
            .get("skills")
            .and_then(Value::as_array)
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        raw_text: None,
    }
}

fn opt_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
