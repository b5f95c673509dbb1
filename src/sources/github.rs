//! GitHub user search and profile fetch.

use crate::sources::CodeHostSource;
use crate::types::{GitHubProfile, RepoSummary, Result};
use async_trait::async_trait;
use serde_json::Value;

const GITHUB_API: &str = "https://api.github.com";
const MAX_USERS_PER_SEARCH: usize = 5;
const MAX_TOP_REPOS: usize = 5;

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: GITHUB_API.to_string(),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github+json")
    }
}

#[async_trait]
impl CodeHostSource for GitHubClient {
    async fn search_users(&self, query: &str) -> Result<Vec<GitHubProfile>> {
        let response = self
            .get("/search/users")
            .query(&[("q", query), ("per_page", "5")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(query, status = %response.status(), "GitHub user search failed");
            return Ok(Vec::new());
        }

        let data: Value = response.json().await?;
        let logins: Vec<String> = data
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .take(MAX_USERS_PER_SEARCH)
            .filter_map(|item| item.get("login").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let mut profiles = Vec::new();
        for login in logins {
            if let Some(profile) = self.get_user(&login).await? {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    async fn get_user(&self, username: &str) -> Result<Option<GitHubProfile>> {
        let response = self.get(&format!("/users/{}", username)).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let user: Value = response.json().await?;

        // Top repositories by stars; failures here just leave the list empty.
        let mut repos = Vec::new();
        let repos_response = self
            .get(&format!("/users/{}/repos", username))
            .query(&[("sort", "stars"), ("per_page", "5")])
            .send()
            .await?;
        if repos_response.status().is_success() {
            let repo_list: Value = repos_response.json().await?;
            for repo in repo_list
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .take(MAX_TOP_REPOS)
            {
                repos.push(RepoSummary {
                    name: text(repo, "name"),
                    description: text(repo, "description"),
                    stars: repo
                        .get("stargazers_count")
                        .and_then(Value::as_u64)
                        .unwrap_or(0),
                    language: text(repo, "language"),
                    url: text(repo, "html_url"),
                });
            }
        }

        Ok(Some(GitHubProfile {
            username: text(&user, "login"),
            url: text(&user, "html_url"),
            name: opt_text(&user, "name"),
            bio: opt_text(&user, "bio"),
            company: opt_text(&user, "company"),
            location: opt_text(&user, "location"),
            blog: opt_text(&user, "blog").filter(|blog| !blog.is_empty()),
            public_repos: user.get("public_repos").and_then(Value::as_u64).unwrap_or(0),
            followers: user.get("followers").and_then(Value::as_u64).unwrap_or(0),
            following: user.get("following").and_then(Value::as_u64).unwrap_or(0),
            top_repos: repos,
        }))
    }
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Extract the username from a GitHub profile URL
/// (`https://github.com/janedoe` -> `janedoe`).
pub fn extract_github_username(url: &str) -> Option<&str> {
    let rest = url
        .split_once("github.com/")
        .map(|(_, rest)| rest)?
        .trim_end_matches('/');
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    if rest
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_extraction_accepts_profile_urls_only() {
        assert_eq!(
            extract_github_username("https://github.com/janedoe"),
            Some("janedoe")
        );
        assert_eq!(
            extract_github_username("https://github.com/jane-doe_1/"),
            Some("jane-doe_1")
        );
        // Repository URLs are not profile URLs.
        assert_eq!(extract_github_username("https://github.com/janedoe/repo"), None);
        assert_eq!(extract_github_username("https://example.com/janedoe"), None);
        assert_eq!(extract_github_username("https://github.com/"), None);
    }
}
