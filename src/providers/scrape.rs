//! Scraping profile provider.
//!
//! Fetches the public profile page over plain HTTP and extracts what the
//! markup gives up. Selectors target the logged-out page layout and will
//! drift as LinkedIn changes it; the full page text is always captured as
//! a fallback so the analyst can still read an unparsed profile.

use crate::providers::{build_search_query, LinkedInProvider};
use crate::sources::serp::{organic_results, str_field, SerpClient};
use crate::types::{CheckRequest, EducationEntry, ExperienceEntry, LinkedInProfile, Result};
use crate::util::truncate;
use async_trait::async_trait;
use scraper::{Html, Selector};

const MAX_RAW_TEXT: usize = 6000;

pub struct ScraperProvider {
    http: reqwest::Client,
    serp: SerpClient,
}

impl ScraperProvider {
    pub fn new(http: reqwest::Client, serp: SerpClient) -> Self {
        Self { http, serp }
    }

    /// Resolve a profile URL by name search when the request has none.
    async fn find_profile_url(&self, request: &CheckRequest) -> Option<String> {
        if !self.serp.is_configured() {
            return None;
        }

        let first_name = request
            .name
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        let mut queries = vec![build_search_query(request)];
        if let Some(company) = &request.company {
            queries.push(format!("{} {}", request.name, company));
        }
        queries.push(format!("\"{}\"", request.name));

        for query in &queries {
            let discovery_query = format!("site:linkedin.com/in/ {}", query);
            let data = match self
                .serp
                .search(&[
                    ("engine", "google"),
                    ("q", discovery_query.as_str()),
                    ("num", "3"),
                ])
                .await
            {
                Ok(data) => data,
                Err(_) => continue,
            };

            for result in organic_results(&data) {
                let link = str_field(result, "link");
                let title = str_field(result, "title");
                if link.contains("linkedin.com/in/") && title.to_lowercase().contains(&first_name)
                {
                    return Some(link);
                }
            }
        }
        None
    }

    async fn scrape_profile(&self, url: &str) -> Result<Option<LinkedInProfile>> {
        // Strip tracking params that cause redirects.
        let clean_url = url.split('?').next().unwrap_or(url).to_string();

        let response = self.http.get(&clean_url).send().await?;
        let final_url = response.url().to_string();
        if final_url.contains("/login") || final_url.contains("/authwall") {
            tracing::warn!(url = %clean_url, "profile page redirected to a login wall");
            return Ok(None);
        }
        if !response.status().is_success() {
            tracing::warn!(url = %clean_url, status = %response.status(), "profile page fetch failed");
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(Some(extract_profile(&body, &clean_url)))
    }
}

#[async_trait]
impl LinkedInProvider for ScraperProvider {
    async fn fetch_profile(&self, request: &CheckRequest) -> Result<Option<LinkedInProfile>> {
        let url = match &request.linkedin_url {
            Some(url) => url.clone(),
            None => match self.find_profile_url(request).await {
                Some(url) => url,
                None => return Ok(None),
            },
        };
        self.scrape_profile(&url).await
    }
}

/// Extract a profile from the page markup. Synchronous so the non-Send
/// parsed document never lives across an await point.
fn extract_profile(html: &str, url: &str) -> LinkedInProfile {
    let document = Html::parse_document(html);

    let name = first_text(&document, "h1.top-card-layout__title")
        .or_else(|| first_text(&document, "h1"));
    let headline = first_text(&document, "h2.top-card-layout__headline")
        .or_else(|| first_text(&document, ".top-card-layout__headline"));
    let location = first_text(&document, ".top-card-layout__first-subline .not-first-middot > span")
        .or_else(|| first_text(&document, ".top-card-layout__first-subline"));
    let summary = first_text(&document, "section.summary p")
        .or_else(|| first_text(&document, ".core-section-container__content p"));

    let experience = section_items(&document, "li.experience-item")
        .into_iter()
        .map(|lines| ExperienceEntry {
            title: lines.first().cloned(),
            company: lines.get(1).cloned(),
            duration: lines.get(2).cloned(),
            description: None,
        })
        .collect();

    let education = section_items(&document, "li.education__list-item")
        .into_iter()
        .map(|lines| EducationEntry {
            school: lines.first().cloned(),
            degree: lines.get(1).cloned(),
            field: lines.get(2).cloned(),
        })
        .collect();

    // Full page text as the LLM fallback when selectors miss.
    let raw_text = page_text(&document);

    LinkedInProfile {
        url: Some(url.to_string()),
        name,
        headline,
        location,
        summary,
        experience,
        education,
        skills: Vec::new(),
        raw_text: (!raw_text.is_empty()).then(|| truncate(&raw_text, MAX_RAW_TEXT).to_string()),
    }
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}

/// Non-empty text lines per matched list item.
fn section_items(document: &Html, css: &str) -> Vec<Vec<String>> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .take(10)
        .map(|item| {
            item.text()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

fn page_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("main, body") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
