//! Reverse image search via Google Lens, plus photo hosting for uploads.

use crate::sources::serp::{str_field, SerpClient};
use crate::sources::PhotoSource;
use crate::types::{PhotoMatch, PhotoSearchOutcome, Result, SocialProfile};
use crate::util::truncate;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

const IMGBB_UPLOAD: &str = "https://api.imgbb.com/1/upload";

/// Domains that identify a match as a social/professional profile page.
const DOMAIN_PLATFORM_MAP: &[(&str, &str)] = &[
    ("linkedin.com", "LinkedIn"),
    ("twitter.com", "Twitter/X"),
    ("x.com", "Twitter/X"),
    ("facebook.com", "Facebook"),
    ("instagram.com", "Instagram"),
    ("github.com", "GitHub"),
    ("youtube.com", "YouTube"),
    ("reddit.com", "Reddit"),
    ("medium.com", "Medium"),
    ("dev.to", "Dev.to"),
    ("stackoverflow.com", "Stack Overflow"),
    ("quora.com", "Quora"),
    ("kaggle.com", "Kaggle"),
    ("behance.net", "Behance"),
    ("dribbble.com", "Dribbble"),
    ("flickr.com", "Flickr"),
    ("pinterest.com", "Pinterest"),
    ("tumblr.com", "Tumblr"),
    ("vimeo.com", "Vimeo"),
    ("tiktok.com", "TikTok"),
    ("researchgate.net", "ResearchGate"),
    ("scholar.google.com", "Google Scholar"),
    ("leetcode.com", "LeetCode"),
    ("hackerrank.com", "HackerRank"),
    ("gitlab.com", "GitLab"),
    ("huggingface.co", "HuggingFace"),
    ("substack.com", "Substack"),
];

pub struct PhotoSearcher {
    serp: SerpClient,
    http: reqwest::Client,
    imgbb_api_key: String,
    upload_url: String,
}

impl PhotoSearcher {
    pub fn new(serp: SerpClient, http: reqwest::Client, imgbb_api_key: String) -> Self {
        Self {
            serp,
            http,
            imgbb_api_key,
            upload_url: IMGBB_UPLOAD.to_string(),
        }
    }

    /// Point the uploader at a different endpoint (used by tests).
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }
}

#[async_trait]
impl PhotoSource for PhotoSearcher {
    /// Host an uploaded photo so the reverse search has a public URL.
    /// Uploads expire server-side after ten minutes.
    async fn upload(&self, image: &[u8]) -> Result<Option<String>> {
        if self.imgbb_api_key.is_empty() {
            tracing::warn!("no IMGBB_API_KEY configured for photo upload");
            return Ok(None);
        }

        let form = reqwest::multipart::Form::new()
            .text("key", self.imgbb_api_key.clone())
            .text("expiration", "600")
            .part(
                "image",
                reqwest::multipart::Part::bytes(image.to_vec()).file_name("photo.jpg"),
            );

        let response = self.http.post(&self.upload_url).multipart(form).send().await?;
        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "photo upload failed");
            return Ok(None);
        }

        let data: Value = response.json().await?;
        let url = data
            .get("data")
            .and_then(|d| d.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(url) = &url {
            tracing::info!(url, "photo uploaded");
        }
        Ok(url)
    }

    async fn reverse_search(&self, image_url: &str) -> Result<PhotoSearchOutcome> {
        if !self.serp.is_configured() {
            return Ok(PhotoSearchOutcome::default());
        }

        let data = self
            .serp
            .search(&[("engine", "google_lens"), ("url", image_url)])
            .await?;

        let mut outcome = PhotoSearchOutcome::default();
        let mut seen = HashSet::new();

        // Pages where this image (or a similar one) appears.
        for item in array(&data, "visual_matches") {
            let url = str_field(item, "link");
            if url.is_empty() || !seen.insert(url.clone()) {
                continue;
            }
            let title = str_field(item, "title");
            let platform = detect_platform(&url);

            if let Some(platform) = &platform {
                outcome.profiles.push(SocialProfile {
                    platform: format!("{} (photo match)", platform),
                    username: extract_username_from_url(&url),
                    url: url.clone(),
                    snippet: format!("Photo found on {}: {}", platform, truncate(&title, 150)),
                });
            }
            outcome.visual_matches.push(PhotoMatch {
                url,
                title,
                source: str_field(item, "source"),
                thumbnail: str_field(item, "thumbnail"),
                platform,
            });
        }

        // Google may identify the person outright.
        for item in array(&data, "knowledge_graph") {
            let name = str_field(item, "title");
            let link = str_field(item, "link");
            if name.is_empty() || link.is_empty() || !seen.insert(link.clone()) {
                continue;
            }
            outcome.visual_matches.push(PhotoMatch {
                platform: detect_platform(&link),
                url: link,
                title: format!("Google identified: {}", name),
                source: "Google Knowledge Graph".to_string(),
                thumbnail: String::new(),
            });
        }

        for item in array(&data, "exact_matches") {
            let url = str_field(item, "link");
            if url.is_empty() || !seen.insert(url.clone()) {
                continue;
            }
            let platform = detect_platform(&url);
            if let Some(platform) = &platform {
                outcome.profiles.push(SocialProfile {
                    platform: format!("{} (exact match)", platform),
                    username: extract_username_from_url(&url),
                    url: url.clone(),
                    snippet: format!("Exact photo match on {}", platform),
                });
            }
            let title = str_field(item, "title");
            outcome.visual_matches.push(PhotoMatch {
                url,
                title: if title.is_empty() {
                    "Exact image match".to_string()
                } else {
                    title
                },
                source: str_field(item, "source"),
                thumbnail: str_field(item, "thumbnail"),
                platform,
            });
        }

        Ok(outcome)
    }
}

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn detect_platform(url: &str) -> Option<String> {
    let url_lower = url.to_lowercase();
    DOMAIN_PLATFORM_MAP
        .iter()
        .find(|(domain, _)| url_lower.contains(domain))
        .map(|(_, platform)| platform.to_string())
}

fn extract_username_from_url(url: &str) -> Option<String> {
    let last = url
        .trim_end_matches('/')
        .split('/')
        .filter(|p| !p.is_empty())
        .next_back()?;
    if !last.contains('.') && !matches!(last, "profile" | "users" | "user" | "u" | "in") {
        Some(last.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_detection_uses_the_domain_map() {
        assert_eq!(
            detect_platform("https://www.linkedin.com/in/janedoe"),
            Some("LinkedIn".to_string())
        );
        assert_eq!(
            detect_platform("https://x.com/janedoe"),
            Some("Twitter/X".to_string())
        );
        assert_eq!(detect_platform("https://unknown.example/janedoe"), None);
    }

    #[test]
    fn username_fallback_rejects_structural_segments() {
        assert_eq!(
            extract_username_from_url("https://x.com/janedoe"),
            Some("janedoe".to_string())
        );
        assert_eq!(extract_username_from_url("https://linkedin.com/in"), None);
        assert_eq!(extract_username_from_url("https://example.com/index.html"), None);
    }
}
