//! RapidAPI LinkedIn-data profile provider.
//!
//! Requires a direct profile URL; it has no name-search endpoint. Field
//! names vary between API versions, so parsing accepts both spellings.

use crate::providers::LinkedInProvider;
use crate::types::{CheckRequest, EducationEntry, ExperienceEntry, LinkedInProfile, Result};
use async_trait::async_trait;
use serde_json::Value;

pub struct RapidApiProvider {
    http: reqwest::Client,
    api_key: String,
    host: String,
}

impl RapidApiProvider {
    pub fn new(http: reqwest::Client, api_key: String, host: String) -> Self {
        Self { http, api_key, host }
    }
}

#[async_trait]
impl LinkedInProvider for RapidApiProvider {
    async fn fetch_profile(&self, request: &CheckRequest) -> Result<Option<LinkedInProfile>> {
        if self.api_key.is_empty() {
            return Ok(None);
        }
        let Some(url) = &request.linkedin_url else {
            tracing::warn!("RapidAPI provider requires a linkedin_url in the request");
            return Ok(None);
        };

        let username = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        let response = self
            .http
            .get(format!("https://{}/", self.host))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(&[("username", username)])
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "RapidAPI profile fetch failed");
            return Ok(None);
        }

        let data: Value = response.json().await?;
        Ok(Some(parse_profile(&data, url)))
    }
}

fn parse_profile(data: &Value, url: &str) -> LinkedInProfile {
    let experience_entries = data
        .get("position")
        .or_else(|| data.get("experiences"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let education_entries = data
        .get("educations")
        .or_else(|| data.get("education"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    LinkedInProfile {
        url: Some(url.to_string()),
        name: opt_str(data, "full_name").or_else(|| opt_str(data, "fullName")),
        headline: opt_str(data, "headline"),
        location: opt_str(data, "location").or_else(|| {
            data.get("geo")
                .and_then(|geo| geo.get("full"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }),
        summary: opt_str(data, "summary").or_else(|| opt_str(data, "about")),
        experience: experience_entries
            .iter()
            .map(|exp| ExperienceEntry {
                title: opt_str(exp, "title"),
                company: opt_str(exp, "companyName").or_else(|| opt_str(exp, "company")),
                duration: opt_str(exp, "duration").or_else(|| opt_str(exp, "dateRange")),
                description: opt_str(exp, "description"),
            })
            .collect(),
        education: education_entries
            .iter()
            .map(|edu| EducationEntry {
                school: opt_str(edu, "schoolName").or_else(|| opt_str(edu, "school")),
                degree: opt_str(edu, "degreeName").or_else(|| opt_str(edu, "degree")),
                field: opt_str(edu, "fieldOfStudy"),
            })
            .collect(),
        skills: data
            .get("skills")
            .and_then(Value::as_array)
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(|s| match s {
                        Value::String(name) => Some(name.clone()),
                        Value::Object(_) => s
                            .get("name")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        _ => None,
                    })
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parsing_accepts_both_field_spellings() {
        let data = json!({
            "fullName": "Jane Doe",
            "geo": {"full": "Boston, US"},
            "about": "Engineer.",
            "position": [
                {"title": "Engineer", "companyName": "Acme", "dateRange": "2020 - now"}
            ],
            "educations": [{"schoolName": "MIT", "degreeName": "BSc"}],
            "skills": [{"name": "Rust"}, "Go"]
        });
        let profile = parse_profile(&data, "https://linkedin.com/in/janedoe");
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
        assert_eq!(profile.location.as_deref(), Some("Boston, US"));
        assert_eq!(profile.summary.as_deref(), Some("Engineer."));
        assert_eq!(profile.experience[0].company.as_deref(), Some("Acme"));
        assert_eq!(profile.education[0].school.as_deref(), Some("MIT"));
        assert_eq!(profile.skills, vec!["Rust", "Go"]);
    }
}
