//! Social-platform presence scan.
//!
//! Platforms are grouped into batches; each batch becomes a single Google
//! query with `site:` OR-operators. Queries use only the person's name --
//! people rarely mention their employer on social profiles.

use crate::sources::serp::{organic_results, str_field, SerpClient};
use crate::sources::SocialSource;
use crate::types::{CheckRequest, Result, SocialProfile};
use crate::util::truncate;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;

struct PlatformBatch {
    label: &'static str,
    platforms: &'static [(&'static str, &'static [&'static str])],
}

const PLATFORM_BATCHES: &[PlatformBatch] = &[
    PlatformBatch {
        label: "Major Social",
        platforms: &[
            ("Twitter/X", &["twitter.com", "x.com"]),
            ("Facebook", &["facebook.com"]),
            ("Instagram", &["instagram.com"]),
            ("Reddit", &["reddit.com/user"]),
        ],
    },
    PlatformBatch {
        label: "Dev Platforms",
        platforms: &[
            ("Stack Overflow", &["stackoverflow.com/users"]),
            ("Medium", &["medium.com"]),
            ("Dev.to", &["dev.to"]),
            ("Hashnode", &["hashnode.dev"]),
            ("HackerNoon", &["hackernoon.com"]),
        ],
    },
    PlatformBatch {
        label: "Code Platforms",
        platforms: &[
            ("GitLab", &["gitlab.com"]),
            ("Bitbucket", &["bitbucket.org"]),
            ("npm", &["npmjs.com/~"]),
            ("PyPI", &["pypi.org/user"]),
            ("HuggingFace", &["huggingface.co"]),
        ],
    },
    PlatformBatch {
        label: "Creative Platforms",
        platforms: &[
            ("Behance", &["behance.net"]),
            ("Dribbble", &["dribbble.com"]),
            ("Figma", &["figma.com/@"]),
            ("CodePen", &["codepen.io"]),
        ],
    },
    PlatformBatch {
        label: "Research & Competitions",
        platforms: &[
            ("Kaggle", &["kaggle.com"]),
            ("Google Scholar", &["scholar.google.com"]),
            ("ResearchGate", &["researchgate.net/profile"]),
            ("LeetCode", &["leetcode.com/u"]),
            ("HackerRank", &["hackerrank.com/profile"]),
            ("Codeforces", &["codeforces.com/profile"]),
        ],
    },
    PlatformBatch {
        label: "Content Platforms",
        platforms: &[
            ("YouTube", &["youtube.com"]),
            ("Substack", &["substack.com"]),
            ("Quora", &["quora.com/profile"]),
            ("Speakerdeck", &["speakerdeck.com"]),
            ("SlideShare", &["slideshare.net"]),
        ],
    },
];

/// Platforms worth a second, relaxed pass when the first one comes back
/// nearly empty.
const RETRY_PLATFORMS: &[(&str, &str)] = &[
    ("Twitter/X", "twitter.com"),
    ("Instagram", "instagram.com"),
    ("YouTube", "youtube.com"),
    ("LeetCode", "leetcode.com"),
    ("Medium", "medium.com"),
];

pub struct SocialScanner {
    serp: SerpClient,
    retry_threshold: usize,
}

impl SocialScanner {
    pub fn new(serp: SerpClient, retry_threshold: usize) -> Self {
        Self {
            serp,
            retry_threshold,
        }
    }

    /// Search one batch of platforms. Tries the exact quoted name first and
    /// only falls back to a relaxed first+last query when that finds nothing.
    async fn search_batch(&self, name: &str, batch: &PlatformBatch) -> Vec<SocialProfile> {
        let mut sites: Vec<(&str, &str)> = Vec::new();
        for (platform, platform_sites) in batch.platforms {
            for site in *platform_sites {
                sites.push((*site, *platform));
            }
        }

        let site_query = sites
            .iter()
            .map(|(site, _)| format!("site:{}", site))
            .collect::<Vec<_>>()
            .join(" OR ");

        let name_parts: Vec<&str> = name.split_whitespace().collect();
        let mut queries = vec![format!("({}) \"{}\"", site_query, name)];
        if name_parts.len() >= 2 {
            queries.push(format!(
                "({}) {} {}",
                site_query,
                name_parts[0],
                name_parts[name_parts.len() - 1]
            ));
        }

        let name_lower: Vec<String> = name_parts.iter().map(|p| p.to_lowercase()).collect();
        let mut profiles = Vec::new();

        for query in &queries {
            let data = match self
                .serp
                .search(&[("engine", "google"), ("q", query.as_str()), ("num", "10")])
                .await
            {
                Ok(data) => data,
                Err(err) => {
                    tracing::debug!(batch = batch.label, error = %err, "social batch query failed");
                    continue;
                }
            };

            for item in organic_results(&data) {
                let url = str_field(item, "link");
                let title = str_field(item, "title");
                let snippet = str_field(item, "snippet");
                let text = format!("{} {}", title, snippet).to_lowercase();

                // Relevance: at least one name part must appear.
                if !name_lower.iter().any(|part| text.contains(part)) {
                    continue;
                }
                let Some(platform) = match_platform(&url, &sites) else {
                    continue;
                };

                let display = if snippet.is_empty() { &title } else { &snippet };
                profiles.push(SocialProfile {
                    platform: platform.to_string(),
                    username: extract_username(&url),
                    url,
                    snippet: truncate(display, 200).to_string(),
                });
            }

            // The exact-name query found something; skip the relaxed one.
            if !profiles.is_empty() {
                break;
            }
        }

        profiles
    }

    /// Broadened retry on the key platforms with unquoted first+last name.
    async fn retry_key_platforms(&self, name: &str) -> Vec<SocialProfile> {
        let searches = RETRY_PLATFORMS
            .iter()
            .map(|(platform, site)| self.search_single_platform(name, platform, site));
        join_all(searches).await.into_iter().flatten().collect()
    }

    async fn search_single_platform(
        &self,
        name: &str,
        platform: &str,
        site: &str,
    ) -> Vec<SocialProfile> {
        let name_parts: Vec<&str> = name.split_whitespace().collect();
        let Some(first) = name_parts.first() else {
            return Vec::new();
        };
        let mut query = format!("site:{} {}", site, first);
        if name_parts.len() > 1 {
            query.push(' ');
            query.push_str(name_parts[name_parts.len() - 1]);
        }

        let data = match self
            .serp
            .search(&[("engine", "google"), ("q", query.as_str()), ("num", "5")])
            .await
        {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(platform, error = %err, "social retry query failed");
                return Vec::new();
            }
        };

        let name_lower: Vec<String> = name_parts.iter().map(|p| p.to_lowercase()).collect();
        let mut results = Vec::new();
        for item in organic_results(&data) {
            let url = str_field(item, "link");
            let title = str_field(item, "title");
            let snippet = str_field(item, "snippet");
            let text = format!("{} {}", title, snippet).to_lowercase();

            if !name_lower.iter().any(|part| text.contains(part)) {
                continue;
            }
            if !url.contains(site) {
                continue;
            }

            let display = if snippet.is_empty() { &title } else { &snippet };
            results.push(SocialProfile {
                platform: platform.to_string(),
                username: extract_username(&url),
                url,
                snippet: truncate(display, 200).to_string(),
            });
        }
        results
    }
}

#[async_trait]
impl SocialSource for SocialScanner {
    async fn scan(&self, request: &CheckRequest) -> Result<Vec<SocialProfile>> {
        if !self.serp.is_configured() {
            return Ok(Vec::new());
        }

        let name = request.name.as_str();
        let batches = join_all(
            PLATFORM_BATCHES
                .iter()
                .map(|batch| self.search_batch(name, batch)),
        )
        .await;

        let mut seen = HashSet::new();
        let mut profiles = Vec::new();
        for batch in batches {
            for profile in batch {
                if seen.insert(profile.url.clone()) {
                    profiles.push(profile);
                }
            }
        }

        // Sparse first pass: rerun the key platforms with relaxed queries.
        if profiles.len() < self.retry_threshold {
            for profile in self.retry_key_platforms(name).await {
                if seen.insert(profile.url.clone()) {
                    profiles.push(profile);
                }
            }
        }

        Ok(profiles)
    }
}

fn match_platform<'a>(url: &str, sites: &[(&str, &'a str)]) -> Option<&'a str> {
    let url_lower = url.to_lowercase();
    for (site, platform) in sites {
        let clean_site = site.trim_start_matches("*.");
        if url_lower.contains(clean_site) {
            return Some(*platform);
        }
    }
    None
}

/// Best-effort username extraction from a profile URL; the path layout is
/// platform-specific.
pub fn extract_username(url: &str) -> Option<String> {
    let parts: Vec<&str> = url
        .trim_end_matches('/')
        .split('/')
        .filter(|p| !p.is_empty())
        .collect();

    if url.contains("stackoverflow") {
        let idx = parts.iter().position(|p| *p == "users")?;
        return parts
            .get(idx + 2)
            .or_else(|| parts.get(idx + 1))
            .map(|s| s.to_string());
    }
    if url.contains("medium.com") {
        if let Some(handle) = parts.iter().find(|p| p.starts_with('@')) {
            return Some(handle.to_string());
        }
        let last = *parts.last()?;
        return (last != "medium.com").then(|| last.to_string());
    }
    if url.contains("reddit.com") {
        let idx = parts.iter().position(|p| *p == "user")?;
        return parts.get(idx + 1).map(|s| s.to_string());
    }
    if url.contains("scholar.google") {
        return None;
    }
    if url.contains("leetcode.com")
        || url.contains("hackerrank.com")
        || url.contains("codeforces.com")
        || url.contains("huggingface.co")
    {
        return parts.last().map(|s| s.to_string());
    }
    if url.contains("figma.com") || url.contains("youtube.com") {
        if let Some(handle) = parts.iter().find(|p| p.starts_with('@')) {
            return Some(handle.to_string());
        }
        if url.contains("youtube.com") && (parts.contains(&"channel") || parts.contains(&"c")) {
            return parts.last().map(|s| s.to_string());
        }
    }
    if url.contains("codepen.io") {
        return parts.last().map(|s| s.to_string());
    }

    let last = *parts.last()?;
    if !last.contains('.') && !matches!(last, "profile" | "users" | "user" | "u") {
        Some(last.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://stackoverflow.com/users/12345/janedoe", Some("janedoe"))]
    #[case("https://medium.com/@janedoe", Some("@janedoe"))]
    #[case("https://www.reddit.com/user/janedoe/", Some("janedoe"))]
    #[case("https://scholar.google.com/citations?user=abc", None)]
    #[case("https://leetcode.com/u/janedoe", Some("janedoe"))]
    #[case("https://www.youtube.com/@janedoe", Some("@janedoe"))]
    #[case("https://codepen.io/janedoe", Some("janedoe"))]
    #[case("https://twitter.com/janedoe", Some("janedoe"))]
    #[case("https://example.com/profile", None)]
    fn username_extraction_per_platform(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_username(url).as_deref(), expected);
    }

    #[test]
    fn platform_matches_by_site_substring() {
        let sites = [("twitter.com", "Twitter/X"), ("reddit.com/user", "Reddit")];
        assert_eq!(
            match_platform("https://twitter.com/janedoe", &sites),
            Some("Twitter/X")
        );
        assert_eq!(
            match_platform("https://www.reddit.com/user/janedoe", &sites),
            Some("Reddit")
        );
        assert_eq!(match_platform("https://example.com", &sites), None);
    }

    #[test]
    fn batches_cover_the_expected_platform_count() {
        let total: usize = PLATFORM_BATCHES
            .iter()
            .map(|batch| batch.platforms.len())
            .sum();
        assert_eq!(total, 29);
    }
}
